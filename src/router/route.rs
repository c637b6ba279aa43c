use std::fmt;
use std::sync::Arc;

use crate::errors::{RouterError, RouterResult};
use crate::models::token::TokenAmount;
use crate::pools::RoutablePool;

/// A hydrated route: an ordered chain of routable pools, each annotated with
/// its token out denom. Request-scoped; hops are shared via `Arc` so cloning
/// a route for split search is cheap.
#[derive(Clone, Default)]
pub struct Route {
    pools: Vec<Arc<dyn RoutablePool>>,
}

impl Route {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pool(&mut self, pool: Arc<dyn RoutablePool>) {
        self.pools.push(pool);
    }

    pub fn with_pool(mut self, pool: Arc<dyn RoutablePool>) -> Self {
        self.add_pool(pool);
        self
    }

    pub fn pools(&self) -> &[Arc<dyn RoutablePool>] {
        &self.pools
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Final token out denom of the route, if it has any hops.
    pub fn token_out_denom(&self) -> Option<&str> {
        self.pools.last().map(|pool| pool.token_out_denom())
    }

    pub fn contains_pool(&self, pool_id: u64) -> bool {
        self.pools.iter().any(|pool| pool.id() == pool_id)
    }

    /// Simulates the route end to end: per hop, the taker fee is charged on
    /// the exact input first, then the pool-level swap runs on the remainder.
    pub fn calculate_token_out_by_token_in(
        &self,
        token_in: &TokenAmount,
    ) -> RouterResult<TokenAmount> {
        if self.pools.is_empty() {
            return Err(RouterError::NoPoolsInRoute { route_index: 0 });
        }

        let mut current = token_in.clone();
        for pool in &self.pools {
            let after_fee = pool.charge_taker_fee_exact_in(&current)?;
            current = pool.calculate_token_out_by_token_in(&after_fee)?;
        }
        Ok(current)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hops: Vec<String> = self
            .pools
            .iter()
            .map(|pool| format!("{}(->{})", pool.id(), pool.token_out_denom()))
            .collect();
        write!(f, "Route[{}]", hops.join(" "))
    }
}
