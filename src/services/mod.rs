pub mod provider;
pub mod refresh;
pub mod router_service;

pub use provider::{InMemoryPoolStore, PoolProvider};
pub use refresh::{refresh_candidate_routes, RefreshSummary};
pub use router_service::RouterService;
