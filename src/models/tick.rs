use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One liquidity bucket of a concentrated pool: the liquidity active between
/// two initialized ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityBucket {
    pub lower_tick: i64,
    pub upper_tick: i64,
    pub liquidity: Decimal,
}

/// Full-range liquidity view of a concentrated pool, fetched lazily for the
/// pools that end up on a hydrated route.
///
/// Buckets are sorted by tick. When `has_no_liquidity` is false,
/// `current_bucket_index` addresses the bucket containing the pool's current
/// tick; the simulator re-validates both invariants before walking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickModel {
    pub buckets: Vec<LiquidityBucket>,
    pub current_bucket_index: i64,
    pub has_no_liquidity: bool,
}

impl TickModel {
    pub fn new(buckets: Vec<LiquidityBucket>, current_bucket_index: i64) -> Self {
        Self {
            buckets,
            current_bucket_index,
            has_no_liquidity: false,
        }
    }

    pub fn empty() -> Self {
        Self {
            buckets: Vec::new(),
            current_bucket_index: -1,
            has_no_liquidity: true,
        }
    }

    pub fn with_current_bucket_index(mut self, current_bucket_index: i64) -> Self {
        self.current_bucket_index = current_bucket_index;
        self
    }

    pub fn with_no_liquidity(mut self) -> Self {
        self.has_no_liquidity = true;
        self
    }
}
