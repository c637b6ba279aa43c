pub mod candidates;
pub mod quote;
pub mod route;
pub mod split;
pub mod validate;

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use crate::config::RouterConfig;
use crate::errors::{RouterError, RouterResult};
use crate::models::pool::PoolSnapshot;

use candidates::{CandidatePoolWrapper, CandidateRoutes};

pub use quote::{Quote, SplitRoute};
pub use route::Route;

/// Candidate-route search over one pool snapshot. Holds the pools in
/// preference order: preferred ids first (in their configured order), then
/// descending liquidity cap with cap-estimation-errored pools demoted, ties
/// broken by insertion order.
pub struct Router {
    config: RouterConfig,
    sorted_pools: Vec<Arc<PoolSnapshot>>,
}

impl Router {
    pub fn new(config: RouterConfig, pools: Vec<Arc<PoolSnapshot>>) -> Self {
        let sorted_pools = sort_pools(&config.preferred_pool_ids, pools);
        Self {
            config,
            sorted_pools,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn sorted_pools(&self) -> &[Arc<PoolSnapshot>] {
        &self.sorted_pools
    }

    pub fn sorted_pool_ids(&self) -> Vec<u64> {
        self.sorted_pools.iter().map(|pool| pool.id).collect()
    }

    /// Depth-first path search from `token_in_denom` to `token_out_denom`.
    ///
    /// Greedy: accepts the first paths found in preference order, not the
    /// ones with the fewest hops. `current_route` and `pools_used` seed the
    /// search; their lengths are validated against the sorted pool set and
    /// any mismatch is a hard invariant error.
    pub fn find_routes(
        &self,
        token_in_denom: &str,
        token_out_denom: &str,
        current_route: &[CandidatePoolWrapper],
        pools_used: &[bool],
    ) -> RouterResult<Vec<Vec<CandidatePoolWrapper>>> {
        if pools_used.len() != self.sorted_pools.len() {
            return Err(RouterError::SortedPoolsAndPoolsUsedLengthMismatch {
                sorted_pools: self.sorted_pools.len(),
                pools_used: pools_used.len(),
            });
        }
        if current_route.len() > self.sorted_pools.len() {
            return Err(RouterError::SortedPoolsAndPoolsInRouteLengthMismatch {
                sorted_pools: self.sorted_pools.len(),
                pools_in_route: current_route.len(),
            });
        }

        let mut found = Vec::new();
        self.search(
            current_route.to_vec(),
            pools_used.to_vec(),
            token_in_denom,
            token_out_denom,
            &mut found,
        );
        Ok(found)
    }

    fn search(
        &self,
        current_route: Vec<CandidatePoolWrapper>,
        pools_used: Vec<bool>,
        token_in_denom: &str,
        token_out_denom: &str,
        found: &mut Vec<Vec<CandidatePoolWrapper>>,
    ) {
        if found.len() >= self.config.max_routes
            || current_route.len() >= self.config.max_pools_per_route
        {
            return;
        }

        let frontier_denom = current_route
            .last()
            .map(|hop| hop.candidate.token_out_denom.as_str())
            .unwrap_or(token_in_denom);

        for (index, pool) in self.sorted_pools.iter().enumerate() {
            if found.len() >= self.config.max_routes {
                return;
            }
            if pools_used[index] || !pool.has_denom(frontier_denom) {
                continue;
            }

            for denom in &pool.denoms {
                if denom == frontier_denom {
                    continue;
                }
                if found.len() >= self.config.max_routes {
                    return;
                }

                // The used-pool markers are copied per branch; sibling
                // branches must never observe each other's bookkeeping.
                let mut next_used = pools_used.clone();
                next_used[index] = true;

                if denom == token_out_denom {
                    let mut route = current_route.clone();
                    route.push(CandidatePoolWrapper::new(
                        pool.id,
                        denom.clone(),
                        pool.denoms.clone(),
                    ));
                    found.push(route);
                    continue;
                }

                if denom == token_in_denom && self.config.path_reset_on_token_in_cycle {
                    // Cycling back through the input denom: anything this
                    // path accumulated is dominated by starting fresh here.
                    // May produce duplicate routes; filtered later.
                    self.search(
                        Vec::new(),
                        next_used,
                        token_in_denom,
                        token_out_denom,
                        found,
                    );
                    continue;
                }

                let mut route = current_route.clone();
                route.push(CandidatePoolWrapper::new(
                    pool.id,
                    denom.clone(),
                    pool.denoms.clone(),
                ));
                self.search(route, next_used, token_in_denom, token_out_denom, found);
            }
        }
    }

    /// Full candidate pipeline: depth-first search, shortest-first ordering,
    /// overlap dedup, then validation and filtering.
    pub fn get_candidate_routes(
        &self,
        token_in_denom: &str,
        token_out_denom: &str,
    ) -> RouterResult<CandidateRoutes> {
        let pools_used = vec![false; self.sorted_pools.len()];
        let found = self.find_routes(token_in_denom, token_out_denom, &[], &pools_used)?;
        let deduped = dedupe_routes_by_pool_overlap(found);
        validate::validate_and_filter_routes(deduped, token_in_denom)
    }

    /// Breadth-first candidate search used for cache population. Applies the
    /// same used-pool markers, hop/route bounds and token-in reset flag as
    /// the depth-first variant but explores shortest paths first.
    pub fn find_candidate_routes_bfs(
        &self,
        token_in_denom: &str,
        token_out_denom: &str,
    ) -> RouterResult<CandidateRoutes> {
        let mut found: Vec<Vec<CandidatePoolWrapper>> = Vec::new();
        let mut queue: VecDeque<(Vec<CandidatePoolWrapper>, Vec<bool>)> = VecDeque::new();
        queue.push_back((Vec::new(), vec![false; self.sorted_pools.len()]));

        while let Some((current_route, pools_used)) = queue.pop_front() {
            if found.len() >= self.config.max_routes {
                break;
            }
            if current_route.len() >= self.config.max_pools_per_route {
                continue;
            }

            let frontier_denom = current_route
                .last()
                .map(|hop| hop.candidate.token_out_denom.as_str())
                .unwrap_or(token_in_denom);

            for (index, pool) in self.sorted_pools.iter().enumerate() {
                if found.len() >= self.config.max_routes {
                    break;
                }
                if pools_used[index] || !pool.has_denom(frontier_denom) {
                    continue;
                }

                for denom in &pool.denoms {
                    if denom == frontier_denom {
                        continue;
                    }
                    if found.len() >= self.config.max_routes {
                        break;
                    }

                    let mut next_used = pools_used.clone();
                    next_used[index] = true;

                    if denom == token_out_denom {
                        let mut route = current_route.clone();
                        route.push(CandidatePoolWrapper::new(
                            pool.id,
                            denom.clone(),
                            pool.denoms.clone(),
                        ));
                        found.push(route);
                        continue;
                    }

                    if denom == token_in_denom && self.config.path_reset_on_token_in_cycle {
                        queue.push_back((Vec::new(), next_used));
                        continue;
                    }

                    let mut route = current_route.clone();
                    route.push(CandidatePoolWrapper::new(
                        pool.id,
                        denom.clone(),
                        pool.denoms.clone(),
                    ));
                    queue.push_back((route, next_used));
                }
            }
        }

        let deduped = dedupe_routes_by_pool_overlap(found);
        validate::validate_and_filter_routes(deduped, token_in_denom)
    }
}

/// Preference order for the search: preferred pools first in their
/// configured order, the rest by liquidity cap descending with
/// estimation-errored pools demoted. Sorting is stable, so insertion order
/// breaks ties.
fn sort_pools(preferred_pool_ids: &[u64], pools: Vec<Arc<PoolSnapshot>>) -> Vec<Arc<PoolSnapshot>> {
    let mut preferred: Vec<(usize, Arc<PoolSnapshot>)> = Vec::new();
    let mut rest: Vec<Arc<PoolSnapshot>> = Vec::new();

    for pool in pools {
        match preferred_pool_ids.iter().position(|id| *id == pool.id) {
            Some(rank) => preferred.push((rank, pool)),
            None => rest.push(pool),
        }
    }

    preferred.sort_by_key(|(rank, _)| *rank);
    rest.sort_by(|a, b| {
        a.has_liquidity_cap_error()
            .cmp(&b.has_liquidity_cap_error())
            .then(b.liquidity_cap.cmp(&a.liquidity_cap))
    });

    preferred
        .into_iter()
        .map(|(_, pool)| pool)
        .chain(rest)
        .collect()
}

/// Keeps the shorter route when two routes share a pool id. Expects the
/// routes sorted shortest-first and keeps the earlier one on overlap.
///
/// Known limitation, preserved deliberately: the shorter route wins by hop
/// count even when the longer one would produce a better split-adjusted
/// outcome.
fn dedupe_routes_by_pool_overlap(
    mut routes: Vec<Vec<CandidatePoolWrapper>>,
) -> Vec<Vec<CandidatePoolWrapper>> {
    routes.sort_by_key(|route| route.len());

    let mut used_pool_ids: BTreeSet<u64> = BTreeSet::new();
    let mut kept = Vec::with_capacity(routes.len());

    for route in routes {
        if route
            .iter()
            .any(|hop| used_pool_ids.contains(&hop.candidate.id))
        {
            continue;
        }
        used_pool_ids.extend(route.iter().map(|hop| hop.candidate.id));
        kept.push(route);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::pool::PoolKind;

    fn denom(i: usize) -> String {
        format!("denom{i}")
    }

    fn pool(id: u64, denoms: &[usize]) -> Arc<PoolSnapshot> {
        Arc::new(
            PoolSnapshot::new(
                id,
                PoolKind::ConstantFunction,
                denoms.iter().map(|i| denom(*i)).collect(),
            )
            .with_liquidity_cap(10),
        )
    }

    fn config(max_hops: usize, max_routes: usize) -> RouterConfig {
        RouterConfig {
            max_pools_per_route: max_hops,
            max_routes,
            ..RouterConfig::default()
        }
    }

    fn route_ids_and_outs(route: &[CandidatePoolWrapper]) -> Vec<(u64, String)> {
        route
            .iter()
            .map(|hop| (hop.candidate.id, hop.candidate.token_out_denom.clone()))
            .collect()
    }

    #[test]
    fn new_router_orders_preferred_pools_first_then_liquidity_cap() {
        let pools = vec![
            Arc::new(
                PoolSnapshot::new(1, PoolKind::ConstantFunction, vec![denom(1), denom(2)])
                    .with_liquidity_cap(5),
            ),
            Arc::new(
                PoolSnapshot::new(2, PoolKind::ConstantFunction, vec![denom(1), denom(2)])
                    .with_liquidity_cap(1),
            ),
            Arc::new(
                PoolSnapshot::new(3, PoolKind::ConcentratedLiquidity, vec![denom(1), denom(2)])
                    .with_liquidity_cap(4),
            ),
            Arc::new(
                PoolSnapshot::new(4, PoolKind::NoSlipTransmuter, vec![denom(1), denom(2)])
                    .with_liquidity_cap(3),
            ),
        ];
        let router = Router::new(
            RouterConfig {
                preferred_pool_ids: vec![1, 2],
                ..RouterConfig::default()
            },
            pools,
        );

        assert_eq!(router.sorted_pool_ids(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn liquidity_cap_error_demotes_a_pool() {
        let pools = vec![
            Arc::new(
                PoolSnapshot::new(1, PoolKind::ConstantFunction, vec![denom(1), denom(2)])
                    .with_liquidity_cap(100)
                    .with_liquidity_cap_error("spot price error"),
            ),
            Arc::new(
                PoolSnapshot::new(2, PoolKind::ConstantFunction, vec![denom(1), denom(2)])
                    .with_liquidity_cap(1),
            ),
        ];
        let router = Router::new(RouterConfig::default(), pools);
        assert_eq!(router.sorted_pool_ids(), vec![2, 1]);
    }

    #[test]
    fn no_pools_no_routes() {
        let router = Router::new(config(3, 3), vec![]);
        let routes = router.find_routes(&denom(1), &denom(2), &[], &[]).unwrap();
        assert!(routes.is_empty());
    }

    #[test]
    fn direct_route_found() {
        let router = Router::new(config(1, 1), vec![pool(1, &[1, 2])]);
        let routes = router
            .find_routes(&denom(1), &denom(2), &[], &[false])
            .unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(route_ids_and_outs(&routes[0]), vec![(1, denom(2))]);
    }

    #[test]
    fn zero_max_hops_prevents_any_route() {
        let router = Router::new(config(0, 3), vec![pool(1, &[1, 2])]);
        let routes = router
            .find_routes(&denom(1), &denom(2), &[], &[false])
            .unwrap();
        assert!(routes.is_empty());
    }

    #[test]
    fn zero_max_routes_prevents_any_route() {
        let router = Router::new(config(3, 0), vec![pool(1, &[1, 2])]);
        let routes = router
            .find_routes(&denom(1), &denom(2), &[], &[false])
            .unwrap();
        assert!(routes.is_empty());
    }

    #[test]
    fn unmatched_token_out_finds_nothing() {
        let router = Router::new(config(1, 1), vec![pool(1, &[1, 2])]);
        let routes = router
            .find_routes(&denom(1), &denom(3), &[], &[false])
            .unwrap();
        assert!(routes.is_empty());
    }

    #[test]
    fn unmatched_token_in_finds_nothing() {
        let router = Router::new(config(1, 1), vec![pool(1, &[1, 2])]);
        let routes = router
            .find_routes(&denom(3), &denom(2), &[], &[false])
            .unwrap();
        assert!(routes.is_empty());
    }

    #[test]
    fn two_pool_two_hop_route() {
        let router = Router::new(config(2, 1), vec![pool(1, &[1, 2]), pool(2, &[2, 3])]);
        let routes = router
            .find_routes(&denom(1), &denom(3), &[], &[false, false])
            .unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(
            route_ids_and_outs(&routes[0]),
            vec![(1, denom(2)), (2, denom(3))]
        );
    }

    #[test]
    fn max_hops_of_one_blocks_the_two_hop_route() {
        let router = Router::new(config(1, 1), vec![pool(1, &[1, 2]), pool(2, &[2, 3])]);
        let routes = router
            .find_routes(&denom(1), &denom(3), &[], &[false, false])
            .unwrap();
        assert!(routes.is_empty());
    }

    #[test]
    fn four_hop_route_found_out_of_order() {
        let pools = vec![
            pool(1, &[1, 2]),
            pool(2, &[2, 3]),
            pool(3, &[4, 1]),
            pool(4, &[4, 5]),
        ];
        let router = Router::new(config(4, 1), pools);
        let routes = router
            .find_routes(&denom(5), &denom(3), &[], &[false; 4])
            .unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(
            route_ids_and_outs(&routes[0]),
            vec![
                (4, denom(4)),
                (3, denom(1)),
                (1, denom(2)),
                (2, denom(3)),
            ]
        );
    }

    #[test]
    fn direct_and_two_hop_routes_found() {
        let pools = vec![pool(1, &[1, 2]), pool(2, &[2, 3]), pool(3, &[1, 3])];
        let router = Router::new(config(2, 2), pools);
        let routes = router
            .find_routes(&denom(1), &denom(2), &[], &[false; 3])
            .unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(route_ids_and_outs(&routes[0]), vec![(1, denom(2))]);
        assert_eq!(
            route_ids_and_outs(&routes[1]),
            vec![(3, denom(3)), (2, denom(2))]
        );
    }

    #[test]
    fn token_in_cycle_resets_the_path_and_duplicates_the_direct_route() {
        // A->B->C cycles back through denom1; the accumulated path is
        // discarded and the search restarts at D, duplicating the direct
        // route that the top-level scan also finds.
        let pools = vec![
            pool(1, &[1, 3]),
            pool(2, &[3, 4]),
            pool(3, &[4, 1]),
            pool(4, &[1, 2]),
        ];
        let router = Router::new(config(4, 2), pools);
        let routes = router
            .find_routes(&denom(1), &denom(2), &[], &[false; 4])
            .unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(route_ids_and_outs(&routes[0]), vec![(4, denom(2))]);
        assert_eq!(route_ids_and_outs(&routes[1]), vec![(4, denom(2))]);
    }

    #[test]
    fn token_in_cycle_extends_the_path_when_reset_is_disabled() {
        let pools = vec![
            pool(1, &[1, 3]),
            pool(2, &[3, 4]),
            pool(3, &[4, 1]),
            pool(4, &[1, 2]),
        ];
        let router = Router::new(
            RouterConfig {
                max_pools_per_route: 4,
                max_routes: 1,
                path_reset_on_token_in_cycle: false,
                ..RouterConfig::default()
            },
            pools,
        );
        let routes = router
            .find_routes(&denom(1), &denom(2), &[], &[false; 4])
            .unwrap();
        // Without the reset the A->B->C prefix is kept and extended into D.
        assert_eq!(routes.len(), 1);
        assert_eq!(
            route_ids_and_outs(&routes[0]),
            vec![
                (1, denom(3)),
                (2, denom(4)),
                (3, denom(1)),
                (4, denom(2)),
            ]
        );
    }

    #[test]
    fn greedy_search_respects_the_route_limit() {
        let pools = vec![
            pool(1, &[1, 2]),
            pool(2, &[2, 3]),
            pool(3, &[4, 6]),
            pool(4, &[3, 4]),
            pool(5, &[1, 3]),
            pool(6, &[3, 5]),
            pool(7, &[2, 4]),
            pool(8, &[1, 5]),
            pool(9, &[4, 5]),
        ];
        let router = Router::new(config(4, 3), pools);
        let routes = router
            .find_routes(&denom(1), &denom(5), &[], &[false; 9])
            .unwrap();
        assert_eq!(routes.len(), 3);
        assert_eq!(
            route_ids_and_outs(&routes[0]),
            vec![
                (1, denom(2)),
                (2, denom(3)),
                (4, denom(4)),
                (9, denom(5)),
            ]
        );
        // The second route reset through the token in denom and truncated to
        // the direct pool.
        assert_eq!(route_ids_and_outs(&routes[1]), vec![(8, denom(5))]);
        assert_eq!(
            route_ids_and_outs(&routes[2]),
            vec![(1, denom(2)), (2, denom(3)), (6, denom(5))]
        );
    }

    #[test]
    fn pools_used_length_mismatch_is_a_hard_error() {
        let router = Router::new(config(3, 3), vec![]);
        let err = router
            .find_routes(&denom(1), &denom(2), &[], &[true, false])
            .unwrap_err();
        assert_eq!(
            err,
            RouterError::SortedPoolsAndPoolsUsedLengthMismatch {
                sorted_pools: 0,
                pools_used: 2,
            }
        );
    }

    #[test]
    fn route_longer_than_pool_set_is_a_hard_error() {
        let router = Router::new(config(3, 3), vec![]);
        let seeded = vec![CandidatePoolWrapper::new(
            1,
            denom(2),
            vec![denom(1), denom(2)],
        )];
        let err = router
            .find_routes(&denom(1), &denom(2), &seeded, &[])
            .unwrap_err();
        assert_eq!(
            err,
            RouterError::SortedPoolsAndPoolsInRouteLengthMismatch {
                sorted_pools: 0,
                pools_in_route: 1,
            }
        );
    }

    #[test]
    fn candidate_routes_sorted_by_hops_and_deduped_by_overlap() {
        let pools = vec![
            pool(1, &[1, 2]),
            pool(2, &[2, 3]),
            pool(3, &[3, 4]),
            pool(4, &[5, 4]),
            pool(5, &[3, 5]),
        ];
        let router = Router::new(config(4, 2), pools);
        let candidate_routes = router.get_candidate_routes(&denom(1), &denom(5)).unwrap();

        // Both found routes share pools 1 and 2; only the shorter survives.
        assert_eq!(candidate_routes.len(), 1);
        let kept = &candidate_routes.routes[0];
        assert_eq!(kept.pool_ids().collect::<Vec<_>>(), vec![1, 2, 5]);
        assert_eq!(kept.token_out_denom(), Some(denom(5).as_str()));
    }

    #[test]
    fn candidate_routes_keep_disjoint_routes() {
        let pools = vec![
            pool(1, &[1, 2]),
            pool(2, &[2, 3]),
            pool(3, &[4, 6]),
            pool(4, &[3, 4]),
            pool(5, &[1, 3]),
            pool(6, &[3, 5]),
            pool(7, &[2, 4]),
            pool(8, &[1, 5]),
            pool(9, &[4, 5]),
        ];
        let router = Router::new(config(4, 3), pools);
        let candidate_routes = router.get_candidate_routes(&denom(1), &denom(5)).unwrap();

        assert_eq!(candidate_routes.len(), 2);
        assert_eq!(
            candidate_routes.routes[0].pool_ids().collect::<Vec<_>>(),
            vec![8]
        );
        assert_eq!(
            candidate_routes.routes[1].pool_ids().collect::<Vec<_>>(),
            vec![1, 2, 6]
        );
    }

    #[test]
    fn candidate_routes_are_deterministic() {
        let pools = vec![
            pool(1, &[1, 2]),
            pool(2, &[2, 3]),
            pool(3, &[1, 3]),
            pool(4, &[3, 4]),
        ];
        let router = Router::new(config(3, 5), pools);

        let first = router.get_candidate_routes(&denom(1), &denom(3)).unwrap();
        let second = router.get_candidate_routes(&denom(1), &denom(3)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn bfs_variant_respects_bounds_and_structure() {
        let pools = vec![
            pool(1, &[1, 2]),
            pool(2, &[2, 3]),
            pool(3, &[1, 3]),
            pool(4, &[3, 4]),
        ];
        let router = Router::new(config(3, 5), pools);
        let candidate_routes = router
            .find_candidate_routes_bfs(&denom(1), &denom(3))
            .unwrap();

        assert!(!candidate_routes.is_empty());
        for route in &candidate_routes.routes {
            assert!(route.pools.len() <= 3);
            assert_eq!(route.token_out_denom(), Some(denom(3).as_str()));
            let ids: BTreeSet<u64> = route.pool_ids().collect();
            assert_eq!(ids.len(), route.pools.len());
        }
    }
}
