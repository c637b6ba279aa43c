use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Pool variant tag. Every variant implements the shared routing capability
/// independently; `SerializedResult` is the transport-only view produced
/// during quote assembly and carries no compute capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    ConstantFunction,
    ConcentratedLiquidity,
    NoSlipTransmuter,
    SerializedResult,
}

impl PoolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolKind::ConstantFunction => "constant_function",
            PoolKind::ConcentratedLiquidity => "concentrated_liquidity",
            PoolKind::NoSlipTransmuter => "no_slip_transmuter",
            PoolKind::SerializedResult => "serialized_result",
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only pool record materialized once per block by the ingestion
/// collaborator. The routing core never mutates it; a quote computation
/// shares one snapshot across all of its routes.
///
/// `liquidity_cap_error` is advisory: estimation failures upstream are
/// non-fatal and only demote the pool in the preference sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub id: u64,
    pub kind: PoolKind,
    pub denoms: Vec<String>,
    pub balances: BTreeMap<String, u128>,
    pub liquidity_cap: u128,
    #[serde(default)]
    pub liquidity_cap_error: String,
    pub spread_factor: Decimal,
    /// Current tick of a concentrated pool; unused for other kinds.
    #[serde(default)]
    pub current_tick: i64,
    /// Current sqrt price of a concentrated pool; unused for other kinds.
    #[serde(default)]
    pub current_sqrt_price: Decimal,
}

impl PoolSnapshot {
    pub fn new(id: u64, kind: PoolKind, denoms: Vec<String>) -> Self {
        Self {
            id,
            kind,
            denoms,
            balances: BTreeMap::new(),
            liquidity_cap: 0,
            liquidity_cap_error: String::new(),
            spread_factor: Decimal::ZERO,
            current_tick: 0,
            current_sqrt_price: Decimal::ZERO,
        }
    }

    pub fn has_denom(&self, denom: &str) -> bool {
        self.denoms.iter().any(|d| d == denom)
    }

    pub fn has_liquidity_cap_error(&self) -> bool {
        !self.liquidity_cap_error.is_empty()
    }

    pub fn balance_of(&self, denom: &str) -> u128 {
        self.balances.get(denom).copied().unwrap_or(0)
    }

    // Copy-constructor builders. Each returns a new value, leaving the
    // receiver untouched for reuse across fixtures.

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    pub fn with_denoms(mut self, denoms: Vec<String>) -> Self {
        self.denoms = denoms;
        self
    }

    pub fn with_balances(mut self, balances: BTreeMap<String, u128>) -> Self {
        self.balances = balances;
        self
    }

    pub fn with_balance(mut self, denom: impl Into<String>, amount: u128) -> Self {
        self.balances.insert(denom.into(), amount);
        self
    }

    pub fn with_liquidity_cap(mut self, liquidity_cap: u128) -> Self {
        self.liquidity_cap = liquidity_cap;
        self
    }

    pub fn with_liquidity_cap_error(mut self, error: impl Into<String>) -> Self {
        self.liquidity_cap_error = error.into();
        self
    }

    pub fn with_spread_factor(mut self, spread_factor: Decimal) -> Self {
        self.spread_factor = spread_factor;
        self
    }

    pub fn with_current_tick(mut self, current_tick: i64) -> Self {
        self.current_tick = current_tick;
        self
    }

    pub fn with_current_sqrt_price(mut self, current_sqrt_price: Decimal) -> Self {
        self.current_sqrt_price = current_sqrt_price;
        self
    }
}
