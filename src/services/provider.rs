use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;
use tracing::info;

use crate::errors::{RouterError, RouterResult};
use crate::models::fees::TakerFeeMap;
use crate::models::pool::PoolSnapshot;
use crate::models::tick::TickModel;

/// Boundary to the pool-snapshot collaborator. Everything behind it is
/// already resident when a quote computation starts; none of these calls
/// perform I/O from the router's perspective.
pub trait PoolProvider: Send + Sync {
    /// Ordered pool snapshot for one request, read-only.
    fn get_all_pools(&self) -> Vec<Arc<PoolSnapshot>>;

    /// Tick models for the given pools, fetched lazily and only for
    /// concentrated-liquidity pools appearing on a hydrated route.
    fn get_tick_models(&self, pool_ids: &[u64]) -> BTreeMap<u64, TickModel>;

    fn get_all_taker_fees(&self) -> TakerFeeMap;

    /// Strict lookup without the default fallback; a missing pair is a named
    /// error.
    fn get_taker_fee(&self, denom0: &str, denom1: &str) -> RouterResult<Decimal>;
}

struct StoreInner {
    block_height: u64,
    pools: Vec<Arc<PoolSnapshot>>,
    tick_models: BTreeMap<u64, TickModel>,
    taker_fees: TakerFeeMap,
}

/// Reference in-memory implementation of the provider boundary. The
/// ingestion side replaces the whole snapshot once per block; quote
/// computations running concurrently keep their `Arc` handles to the
/// previous snapshot untouched.
pub struct InMemoryPoolStore {
    min_liquidity_cap: u128,
    inner: RwLock<StoreInner>,
}

impl InMemoryPoolStore {
    pub fn new(min_liquidity_cap: u128) -> Self {
        Self {
            min_liquidity_cap,
            inner: RwLock::new(StoreInner {
                block_height: 0,
                pools: Vec::new(),
                tick_models: BTreeMap::new(),
                taker_fees: TakerFeeMap::new(),
            }),
        }
    }

    /// Replaces the resident snapshot with the given block's state. Pools
    /// below the liquidity cap floor are dropped here, at the collaborator
    /// boundary; pools carrying a cap-estimation error are kept, the error
    /// is advisory.
    pub fn apply_block(
        &self,
        block_height: u64,
        pools: Vec<PoolSnapshot>,
        tick_models: BTreeMap<u64, TickModel>,
        taker_fees: TakerFeeMap,
    ) {
        let total = pools.len();
        let kept: Vec<Arc<PoolSnapshot>> = pools
            .into_iter()
            .filter(|pool| pool.liquidity_cap >= self.min_liquidity_cap)
            .map(Arc::new)
            .collect();

        info!(
            block_height,
            total_pools = total,
            kept_pools = kept.len(),
            taker_fees = taker_fees.len(),
            "applied pool snapshot"
        );

        let mut inner = self.inner.write().unwrap();
        *inner = StoreInner {
            block_height,
            pools: kept,
            tick_models,
            taker_fees,
        };
    }

    pub fn block_height(&self) -> u64 {
        self.inner.read().unwrap().block_height
    }

    pub fn total_pools(&self) -> usize {
        self.inner.read().unwrap().pools.len()
    }
}

impl PoolProvider for InMemoryPoolStore {
    fn get_all_pools(&self) -> Vec<Arc<PoolSnapshot>> {
        self.inner.read().unwrap().pools.clone()
    }

    fn get_tick_models(&self, pool_ids: &[u64]) -> BTreeMap<u64, TickModel> {
        let inner = self.inner.read().unwrap();
        pool_ids
            .iter()
            .filter_map(|id| inner.tick_models.get(id).map(|model| (*id, model.clone())))
            .collect()
    }

    fn get_all_taker_fees(&self) -> TakerFeeMap {
        self.inner.read().unwrap().taker_fees.clone()
    }

    fn get_taker_fee(&self, denom0: &str, denom1: &str) -> RouterResult<Decimal> {
        self.inner
            .read()
            .unwrap()
            .taker_fees
            .get(denom0, denom1)
            .ok_or_else(|| RouterError::TakerFeeNotFound {
                denom0: denom0.to_string(),
                denom1: denom1.to_string(),
            })
    }
}
