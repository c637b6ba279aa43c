use std::collections::BTreeSet;

use tracing::warn;

use crate::errors::{RouterError, RouterResult};

use super::candidates::{CandidatePoolWrapper, CandidateRoute, CandidateRoutes};

/// Validates candidate routes against the structural route invariants and
/// filters out routes that are well-formed but undesirable.
///
/// Hard errors (implementation or data bugs, never swallowed): an empty
/// route; a hop whose pool does not hold the previous token out denom; a hop
/// whose declared token out denom is not among its pool denoms; disagreeing
/// final token out denoms across routes; a final token out equal to the
/// token in.
///
/// Filtered with a warning (named error value logged, route dropped): the
/// token in denom held by an intermediary pool, the route's final token out
/// held by an intermediary pool, and a pool id repeated within one route.
/// The same pool appearing in two different routes is allowed here; overlap
/// dedup already ran in the finder.
pub fn validate_and_filter_routes(
    routes: Vec<Vec<CandidatePoolWrapper>>,
    token_in_denom: &str,
) -> RouterResult<CandidateRoutes> {
    let mut agreed_token_out: Option<String> = None;
    let mut filtered: Vec<CandidateRoute> = Vec::new();
    let mut unique_pool_ids: BTreeSet<u64> = BTreeSet::new();

    'route_loop: for (route_index, route) in routes.iter().enumerate() {
        let last_hop = route
            .last()
            .ok_or(RouterError::NoPoolsInRoute { route_index })?;
        let route_token_out = last_hop.candidate.token_out_denom.clone();

        let mut seen_pool_ids: BTreeSet<u64> = BTreeSet::new();
        let mut previous_token_out = token_in_denom;

        for (hop_index, hop) in route.iter().enumerate() {
            let pool_id = hop.candidate.id;

            if !seen_pool_ids.insert(pool_id) {
                let err = RouterError::DuplicatePoolInRoute {
                    route_index,
                    pool_id,
                };
                warn!(error = %err, "route skipped");
                continue 'route_loop;
            }

            // Intermediary pools must not re-expose the endpoints of the
            // route; such paths are dominated by shorter ones.
            let is_intermediary = hop_index > 0 && hop_index + 1 < route.len();
            if is_intermediary {
                for denom in &hop.denoms {
                    if denom == token_in_denom {
                        let err = RouterError::RoutePoolWithTokenInDenom {
                            route_index,
                            pool_id,
                        };
                        warn!(error = %err, "route skipped");
                        continue 'route_loop;
                    }
                    if *denom == route_token_out {
                        let err = RouterError::RoutePoolWithTokenOutDenom {
                            route_index,
                            pool_id,
                        };
                        warn!(error = %err, "route skipped");
                        continue 'route_loop;
                    }
                }
            }

            if !hop.denoms.iter().any(|denom| denom == previous_token_out) {
                return Err(RouterError::PreviousTokenOutNotInPool {
                    route_index,
                    pool_id,
                    previous_token_out_denom: previous_token_out.to_string(),
                });
            }

            if !hop
                .denoms
                .iter()
                .any(|denom| *denom == hop.candidate.token_out_denom)
            {
                return Err(RouterError::CurrentTokenOutNotInPool {
                    route_index,
                    pool_id,
                    token_out_denom: hop.candidate.token_out_denom.clone(),
                });
            }

            previous_token_out = &hop.candidate.token_out_denom;
        }

        if route_token_out == token_in_denom {
            return Err(RouterError::TokenOutMatchesTokenIn {
                denom: route_token_out,
            });
        }

        match &agreed_token_out {
            Some(expected) if *expected != route_token_out => {
                return Err(RouterError::TokenOutMismatchBetweenRoutes {
                    token_out_a: expected.clone(),
                    token_out_b: route_token_out,
                });
            }
            Some(_) => {}
            None => agreed_token_out = Some(route_token_out.clone()),
        }

        unique_pool_ids.extend(route.iter().map(|hop| hop.candidate.id));
        filtered.push(CandidateRoute {
            pools: route.iter().map(|hop| hop.candidate.clone()).collect(),
        });
    }

    Ok(CandidateRoutes {
        routes: filtered,
        unique_pool_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hop(id: u64, token_out: &str, denoms: &[&str]) -> CandidatePoolWrapper {
        CandidatePoolWrapper::new(
            id,
            token_out,
            denoms.iter().map(|d| d.to_string()).collect(),
        )
    }

    #[test]
    fn valid_single_route_single_hop() {
        let routes = vec![vec![hop(1, "denom2", &["denom1", "denom2"])]];
        let validated = validate_and_filter_routes(routes, "denom1").unwrap();
        assert_eq!(validated.len(), 1);
        assert!(validated.unique_pool_ids.contains(&1));
    }

    #[test]
    fn valid_multi_route_same_token_out() {
        let routes = vec![
            vec![hop(1, "denom2", &["denom1", "denom2"])],
            vec![
                hop(2, "denom3", &["denom1", "denom3"]),
                hop(3, "denom2", &["denom2", "denom3"]),
            ],
        ];
        let validated = validate_and_filter_routes(routes, "denom1").unwrap();
        assert_eq!(validated.len(), 2);
        assert_eq!(
            validated.unique_pool_ids.iter().copied().collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn empty_route_is_a_hard_error() {
        let err = validate_and_filter_routes(vec![vec![]], "denom2").unwrap_err();
        assert_eq!(err, RouterError::NoPoolsInRoute { route_index: 0 });
    }

    #[test]
    fn token_out_mismatch_between_routes_is_a_hard_error() {
        let routes = vec![
            vec![hop(1, "denom2", &["denom1", "denom2"])],
            vec![hop(2, "denom3", &["denom1", "denom3"])],
        ];
        let err = validate_and_filter_routes(routes, "denom1").unwrap_err();
        assert_eq!(
            err,
            RouterError::TokenOutMismatchBetweenRoutes {
                token_out_a: "denom2".to_string(),
                token_out_b: "denom3".to_string(),
            }
        );
    }

    #[test]
    fn token_out_matching_token_in_is_a_hard_error() {
        let routes = vec![vec![hop(1, "denom1", &["denom1", "denom2"])]];
        let err = validate_and_filter_routes(routes, "denom1").unwrap_err();
        assert_eq!(
            err,
            RouterError::TokenOutMatchesTokenIn {
                denom: "denom1".to_string()
            }
        );
    }

    #[test]
    fn token_in_not_in_first_pool_is_a_hard_error() {
        let routes = vec![vec![hop(1, "denom1", &["denom1", "denom2"])]];
        let err = validate_and_filter_routes(routes, "denom3").unwrap_err();
        assert_eq!(
            err,
            RouterError::PreviousTokenOutNotInPool {
                route_index: 0,
                pool_id: 1,
                previous_token_out_denom: "denom3".to_string(),
            }
        );
    }

    #[test]
    fn declared_token_out_missing_from_pool_is_a_hard_error() {
        let routes = vec![vec![hop(1, "denom3", &["denom1", "denom2"])]];
        let err = validate_and_filter_routes(routes, "denom1").unwrap_err();
        assert_eq!(
            err,
            RouterError::CurrentTokenOutNotInPool {
                route_index: 0,
                pool_id: 1,
                token_out_denom: "denom3".to_string(),
            }
        );
    }

    #[test]
    fn token_in_held_by_intermediary_pool_filters_the_route() {
        let routes = vec![vec![
            hop(1, "denom2", &["denom1", "denom2"]),
            hop(2, "denom2", &["denom2", "denom4"]),
            hop(3, "denom4", &["denom2", "denom4"]),
            hop(4, "denom3", &["denom4", "denom1"]),
            hop(5, "denom3", &["denom1", "denom3"]),
        ]];
        let validated = validate_and_filter_routes(routes, "denom1").unwrap();
        assert!(validated.is_empty());
    }

    #[test]
    fn token_out_held_by_intermediary_pool_filters_the_route() {
        let routes = vec![vec![
            hop(1, "denom2", &["denom1", "denom2"]),
            hop(2, "denom2", &["denom2", "denom4"]),
            hop(3, "denom2", &["denom2", "denom4"]),
        ]];
        let validated = validate_and_filter_routes(routes, "denom1").unwrap();
        assert!(validated.is_empty());
    }

    #[test]
    fn duplicate_pool_id_within_one_route_filters_the_route() {
        let routes = vec![vec![
            hop(1, "denom2", &["denom1", "denom2"]),
            hop(1, "denom4", &["denom2", "denom4"]),
        ]];
        let validated = validate_and_filter_routes(routes, "denom1").unwrap();
        assert!(validated.is_empty());
    }

    #[test]
    fn same_pool_id_between_routes_is_not_filtered() {
        let routes = vec![
            vec![hop(1, "denom2", &["denom1", "denom2"])],
            vec![hop(1, "denom2", &["denom1", "denom2"])],
        ];
        let validated = validate_and_filter_routes(routes, "denom1").unwrap();
        assert_eq!(validated.len(), 2);
    }
}
