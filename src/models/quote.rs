use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::pool::PoolKind;
use super::token::TokenAmount;

/// Serialized view of a pool on a quoted route. Carries only what the client
/// needs to render and execute the swap; all simulation capability is
/// stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedPoolResponse {
    pub id: u64,
    pub pool_type: PoolKind,
    pub balances: BTreeMap<String, u128>,
    pub spread_factor: Decimal,
    pub token_out_denom: String,
    pub taker_fee: Decimal,
}

/// One route of a split quote with its assigned input slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRouteResponse {
    pub pools: Vec<SerializedPoolResponse>,
    pub in_amount: u128,
    pub out_amount: u128,
}

/// Client-facing quote payload, produced once per request and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub amount_in: TokenAmount,
    pub amount_out: u128,
    pub route: Vec<SplitRouteResponse>,
    pub effective_spread_factor: Decimal,
}
