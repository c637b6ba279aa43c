use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One hop of a candidate route: the pool and the denom it swaps into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePool {
    pub id: u64,
    pub token_out_denom: String,
}

/// Unhydrated, cacheable chain of pool ids with per-hop output denoms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRoute {
    pub pools: Vec<CandidatePool>,
}

impl CandidateRoute {
    pub fn token_out_denom(&self) -> Option<&str> {
        self.pools.last().map(|pool| pool.token_out_denom.as_str())
    }

    pub fn pool_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.pools.iter().map(|pool| pool.id)
    }
}

/// Validated candidate routes for one token pair, plus the set of pool ids
/// they touch (used to hydrate tick models lazily).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRoutes {
    pub routes: Vec<CandidateRoute>,
    pub unique_pool_ids: BTreeSet<u64>,
}

impl CandidateRoutes {
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }
}

/// Search-time hop: the candidate plus its pool's denoms, carried so the
/// validator can check membership without re-fetching pools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePoolWrapper {
    pub candidate: CandidatePool,
    pub denoms: Vec<String>,
}

impl CandidatePoolWrapper {
    pub fn new(id: u64, token_out_denom: impl Into<String>, denoms: Vec<String>) -> Self {
        Self {
            candidate: CandidatePool {
                id,
                token_out_denom: token_out_denom.into(),
            },
            denoms,
        }
    }
}
