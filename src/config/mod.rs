mod logging;
pub use logging::init_logging;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Router options, threaded explicitly through constructors. Nothing in the
/// core reads ambient global state.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Pool ids searched before everything else, in the given order.
    pub preferred_pool_ids: Vec<u64>,
    /// Hop bound for a single route.
    pub max_pools_per_route: usize,
    /// Bound on accepted candidate routes per search.
    pub max_routes: usize,
    /// Bound on routes participating in a split; zero disables splits.
    pub max_split_routes: usize,
    /// Number of discretized allocation units for the split optimizer.
    pub max_split_iterations: usize,
    /// Liquidity capitalization floor, applied by the snapshot collaborator
    /// when materializing pools, not by the routing core.
    pub min_liquidity_cap: u128,
    /// Serve and persist candidate routes through the in-process cache.
    pub route_cache_enabled: bool,
    /// Restart the path from empty when an intermediate hop produces the
    /// original token in denom again.
    pub path_reset_on_token_in_cycle: bool,
    /// Fallback taker fee for denom pairs without an explicit entry.
    pub default_taker_fee: Decimal,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            preferred_pool_ids: Vec::new(),
            max_pools_per_route: 4,
            max_routes: 20,
            max_split_routes: 3,
            max_split_iterations: 10,
            min_liquidity_cap: 0,
            route_cache_enabled: true,
            path_reset_on_token_in_cycle: true,
            default_taker_fee: dec!(0.001),
        }
    }
}

pub fn load_config() -> RouterConfig {
    dotenv::dotenv().ok();

    let defaults = RouterConfig::default();

    let preferred_pool_ids = std::env::var("ROUTER_PREFERRED_POOL_IDS")
        .map(|raw| {
            raw.split(',')
                .filter(|part| !part.trim().is_empty())
                .map(|part| {
                    part.trim()
                        .parse()
                        .expect("Invalid ROUTER_PREFERRED_POOL_IDS")
                })
                .collect()
        })
        .unwrap_or(defaults.preferred_pool_ids);

    let max_pools_per_route = env_usize("ROUTER_MAX_POOLS_PER_ROUTE", defaults.max_pools_per_route);
    let max_routes = env_usize("ROUTER_MAX_ROUTES", defaults.max_routes);
    let max_split_routes = env_usize("ROUTER_MAX_SPLIT_ROUTES", defaults.max_split_routes);
    let max_split_iterations =
        env_usize("ROUTER_MAX_SPLIT_ITERATIONS", defaults.max_split_iterations);

    let min_liquidity_cap: u128 = std::env::var("ROUTER_MIN_LIQUIDITY_CAP")
        .map(|raw| raw.parse().expect("Invalid ROUTER_MIN_LIQUIDITY_CAP"))
        .unwrap_or(defaults.min_liquidity_cap);

    let route_cache_enabled = env_bool("ROUTER_ROUTE_CACHE_ENABLED", defaults.route_cache_enabled);
    let path_reset_on_token_in_cycle = env_bool(
        "ROUTER_PATH_RESET_ON_TOKEN_IN_CYCLE",
        defaults.path_reset_on_token_in_cycle,
    );

    let default_taker_fee: Decimal = std::env::var("ROUTER_DEFAULT_TAKER_FEE")
        .map(|raw| raw.parse().expect("Invalid ROUTER_DEFAULT_TAKER_FEE"))
        .unwrap_or(defaults.default_taker_fee);

    // The search and split bounds terminate the algorithms; they must be
    // meaningful before any quote computation starts.
    assert!(
        max_pools_per_route > 0,
        "ROUTER_MAX_POOLS_PER_ROUTE must be > 0"
    );
    assert!(max_routes > 0, "ROUTER_MAX_ROUTES must be > 0");
    assert!(
        max_split_iterations > 1,
        "ROUTER_MAX_SPLIT_ITERATIONS must be > 1"
    );
    assert!(
        default_taker_fee >= Decimal::ZERO && default_taker_fee < Decimal::ONE,
        "ROUTER_DEFAULT_TAKER_FEE must be in [0, 1)"
    );

    RouterConfig {
        preferred_pool_ids,
        max_pools_per_route,
        max_routes,
        max_split_routes,
        max_split_iterations,
        min_liquidity_cap,
        route_cache_enabled,
        path_reset_on_token_in_cycle,
        default_taker_fee,
    }
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .map(|raw| raw.parse().unwrap_or_else(|_| panic!("Invalid {name}")))
        .unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|raw| raw.parse().unwrap_or_else(|_| panic!("Invalid {name}")))
        .unwrap_or(default)
}
