use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::errors::{RouterError, RouterResult};
use crate::models::pool::PoolKind;
use crate::models::token::TokenAmount;

use super::RoutablePool;

/// Transport-only snapshot of a pool that already executed on a quoted
/// route. Preserves the fields a client needs and nothing else; invoking
/// swap simulation on it is always an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedResultPool {
    id: u64,
    pool_type: PoolKind,
    denoms: Vec<String>,
    balances: BTreeMap<String, u128>,
    spread_factor: Decimal,
    token_out_denom: String,
    taker_fee: Decimal,
}

impl SerializedResultPool {
    pub fn from_pool(pool: &dyn RoutablePool) -> Self {
        Self {
            id: pool.id(),
            pool_type: pool.pool_type(),
            denoms: pool.denoms().to_vec(),
            balances: pool.balances().clone(),
            spread_factor: pool.spread_factor(),
            token_out_denom: pool.token_out_denom().to_string(),
            taker_fee: pool.taker_fee(),
        }
    }

}

impl RoutablePool for SerializedResultPool {
    fn id(&self) -> u64 {
        self.id
    }

    fn kind(&self) -> PoolKind {
        PoolKind::SerializedResult
    }

    fn pool_type(&self) -> PoolKind {
        self.pool_type
    }

    fn denoms(&self) -> &[String] {
        &self.denoms
    }

    fn token_out_denom(&self) -> &str {
        &self.token_out_denom
    }

    fn spread_factor(&self) -> Decimal {
        self.spread_factor
    }

    fn taker_fee(&self) -> Decimal {
        self.taker_fee
    }

    fn balances(&self) -> &BTreeMap<String, u128> {
        &self.balances
    }

    fn calculate_token_out_by_token_in(&self, _token_in: &TokenAmount) -> RouterResult<TokenAmount> {
        Err(RouterError::SwapNotSupported { pool_id: self.id })
    }
}
