use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::{debug, info};

use crate::config::RouterConfig;
use crate::errors::{RouterError, RouterResult};
use crate::models::fees::TakerFeeForPair;
use crate::models::pool::{PoolKind, PoolSnapshot};
use crate::models::token::TokenAmount;
use crate::pools::new_routable_pool;
use crate::router::candidates::{CandidatePoolWrapper, CandidateRoutes};
use crate::router::{split, validate, Quote, Route, Router};

use super::provider::PoolProvider;

type RouteCacheKey = (String, String);

/// Orchestrates a quote request end to end: candidate discovery (through the
/// cache when enabled), validation, hydration against the resident snapshot,
/// ranking, split optimization and quote assembly. One instance serves many
/// concurrent requests; each quote computation itself is synchronous.
pub struct RouterService<P: PoolProvider> {
    provider: Arc<P>,
    config: RouterConfig,
    route_cache: RwLock<HashMap<RouteCacheKey, CandidateRoutes>>,
}

impl<P: PoolProvider> RouterService<P> {
    pub fn new(provider: Arc<P>, config: RouterConfig) -> Self {
        Self {
            provider,
            config,
            route_cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    fn build_router(&self) -> Router {
        Router::new(self.config.clone(), self.provider.get_all_pools())
    }

    /// Candidate routes for a token pair. Served from the cache when enabled
    /// and warm; computed against the current snapshot and persisted
    /// otherwise.
    pub fn get_candidate_routes(
        &self,
        token_in_denom: &str,
        token_out_denom: &str,
    ) -> RouterResult<CandidateRoutes> {
        let key = (token_in_denom.to_string(), token_out_denom.to_string());

        if self.config.route_cache_enabled {
            let cached = self.route_cache.read().unwrap().get(&key).cloned();
            if let Some(routes) = cached {
                if !routes.is_empty() {
                    debug!(
                        token_in = token_in_denom,
                        token_out = token_out_denom,
                        num_routes = routes.len(),
                        "serving candidate routes from cache"
                    );
                    return Ok(routes);
                }
            }
        }

        let routes = self
            .build_router()
            .get_candidate_routes(token_in_denom, token_out_denom)?;
        info!(
            token_in = token_in_denom,
            token_out = token_out_denom,
            num_routes = routes.len(),
            "calculated candidate routes"
        );

        if self.config.route_cache_enabled && !routes.is_empty() {
            self.route_cache.write().unwrap().insert(key, routes.clone());
        }

        Ok(routes)
    }

    /// Cache-only read; empty when the pair has not been computed yet.
    pub fn get_cached_candidate_routes(
        &self,
        token_in_denom: &str,
        token_out_denom: &str,
    ) -> RouterResult<CandidateRoutes> {
        if !self.config.route_cache_enabled {
            return Err(RouterError::RouteCacheDisabled);
        }
        let key = (token_in_denom.to_string(), token_out_denom.to_string());
        Ok(self
            .route_cache
            .read()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }

    /// Recomputes a pair via the breadth-first search variant and replaces
    /// its cache entry. Used by the background refresh worker.
    pub fn recompute_candidate_routes(
        &self,
        token_in_denom: &str,
        token_out_denom: &str,
    ) -> RouterResult<CandidateRoutes> {
        let routes = self
            .build_router()
            .find_candidate_routes_bfs(token_in_denom, token_out_denom)?;

        if self.config.route_cache_enabled {
            let key = (token_in_denom.to_string(), token_out_denom.to_string());
            self.route_cache.write().unwrap().insert(key, routes.clone());
        }

        Ok(routes)
    }

    /// Hydrates candidate routes into simulatable routes: resolves pool
    /// snapshots, fetches tick models lazily for the concentrated pools on
    /// the routes, and attaches per-hop taker fees from the canonicalized
    /// fee map.
    fn routes_from_candidates(
        &self,
        candidate_routes: &CandidateRoutes,
        token_in_denom: &str,
    ) -> RouterResult<Vec<Route>> {
        let pools_by_id: BTreeMap<u64, Arc<PoolSnapshot>> = self
            .provider
            .get_all_pools()
            .into_iter()
            .map(|pool| (pool.id, pool))
            .collect();

        let concentrated_ids: Vec<u64> = candidate_routes
            .unique_pool_ids
            .iter()
            .copied()
            .filter(|id| {
                pools_by_id
                    .get(id)
                    .is_some_and(|pool| pool.kind == PoolKind::ConcentratedLiquidity)
            })
            .collect();
        let tick_models = if concentrated_ids.is_empty() {
            BTreeMap::new()
        } else {
            self.provider.get_tick_models(&concentrated_ids)
        };

        let taker_fees = self.provider.get_all_taker_fees();

        let mut routes = Vec::with_capacity(candidate_routes.len());
        for candidate in &candidate_routes.routes {
            let mut route = Route::new();
            let mut previous_denom = token_in_denom.to_string();

            for hop in &candidate.pools {
                let snapshot = pools_by_id
                    .get(&hop.id)
                    .cloned()
                    .ok_or(RouterError::PoolNotFound { pool_id: hop.id })?;

                let tick_model = (snapshot.kind == PoolKind::ConcentratedLiquidity)
                    .then(|| tick_models.get(&hop.id).cloned())
                    .flatten();

                let taker_fee = taker_fees.fee_or_default(
                    &previous_denom,
                    &hop.token_out_denom,
                    self.config.default_taker_fee,
                );

                route.add_pool(new_routable_pool(
                    snapshot,
                    tick_model,
                    hop.token_out_denom.clone(),
                    taker_fee,
                )?);
                previous_denom = hop.token_out_denom.clone();
            }

            routes.push(route);
        }

        Ok(routes)
    }

    /// Best achievable quote for the request, considering all candidate
    /// routes and, when more than one route ranks, a discretized split
    /// across the top ones. A zero final output is an error, never a silent
    /// empty quote.
    pub fn get_optimal_quote(
        &self,
        token_in: &TokenAmount,
        token_out_denom: &str,
    ) -> RouterResult<Quote> {
        let candidate_routes = self.get_candidate_routes(&token_in.denom, token_out_denom)?;
        let routes = self.routes_from_candidates(&candidate_routes, &token_in.denom)?;

        let (top_single_quote, ranked) = split::estimate_best_single_route_quote(routes.as_slice(), token_in)?;

        let mut final_quote = top_single_quote;
        if self.config.max_split_routes > 1 && ranked.len() > 1 {
            let split_candidates: Vec<Route> = ranked
                .iter()
                .take(self.config.max_split_routes)
                .map(|entry| entry.route.clone())
                .collect();
            let split_quote = split::get_split_quote(
                &split_candidates,
                token_in,
                self.config.max_split_iterations,
            )?;

            if split_quote.amount_out > final_quote.amount_out {
                debug!(
                    route_count = split_quote.routes.len(),
                    amount_out = split_quote.amount_out as u64,
                    "split route selected"
                );
                final_quote = split_quote;
            }
        }

        if final_quote.amount_out == 0 {
            return Err(RouterError::NoTokensOut);
        }

        final_quote.prepare_result()?;
        Ok(final_quote)
    }

    /// Best quote over a single route, without considering splits.
    pub fn get_best_single_route_quote(
        &self,
        token_in: &TokenAmount,
        token_out_denom: &str,
    ) -> RouterResult<Quote> {
        let candidate_routes = self.get_candidate_routes(&token_in.denom, token_out_denom)?;
        let routes = self.routes_from_candidates(&candidate_routes, &token_in.denom)?;

        let (mut quote, _) = split::estimate_best_single_route_quote(routes.as_slice(), token_in)?;
        if quote.amount_out == 0 {
            return Err(RouterError::NoTokensOut);
        }

        quote.prepare_result()?;
        Ok(quote)
    }

    /// Quote constrained to exactly the given pools in the given order. The
    /// per-hop output denoms are deduced from the denom each pool shares
    /// with its successor; the chain must pass full route validation.
    pub fn get_custom_quote(
        &self,
        token_in: &TokenAmount,
        token_out_denom: &str,
        pool_ids: &[u64],
    ) -> RouterResult<Quote> {
        if pool_ids.is_empty() {
            return Err(RouterError::NoRoutesProvided);
        }

        let pools_by_id: BTreeMap<u64, Arc<PoolSnapshot>> = self
            .provider
            .get_all_pools()
            .into_iter()
            .map(|pool| (pool.id, pool))
            .collect();

        let mut hops = Vec::with_capacity(pool_ids.len());
        let mut previous_denom = token_in.denom.clone();

        for (position, pool_id) in pool_ids.iter().enumerate() {
            let snapshot = pools_by_id
                .get(pool_id)
                .ok_or(RouterError::PoolNotFound { pool_id: *pool_id })?;

            let is_last = position + 1 == pool_ids.len();
            let hop_token_out = if is_last {
                token_out_denom.to_string()
            } else {
                let next_id = pool_ids[position + 1];
                let next = pools_by_id
                    .get(&next_id)
                    .ok_or(RouterError::PoolNotFound { pool_id: next_id })?;
                snapshot
                    .denoms
                    .iter()
                    .find(|denom| **denom != previous_denom && next.has_denom(denom))
                    .cloned()
                    .ok_or(RouterError::CustomRouteNotConnected {
                        position,
                        pool_id: *pool_id,
                    })?
            };

            hops.push(CandidatePoolWrapper::new(
                *pool_id,
                hop_token_out.clone(),
                snapshot.denoms.clone(),
            ));
            previous_denom = hop_token_out;
        }

        let validated = validate::validate_and_filter_routes(vec![hops], &token_in.denom)?;
        if validated.is_empty() {
            return Err(RouterError::CustomRouteInvalid {
                pool_ids: pool_ids.to_vec(),
            });
        }

        let routes = self.routes_from_candidates(&validated, &token_in.denom)?;
        let (mut quote, _) = split::estimate_best_single_route_quote(routes.as_slice(), token_in)?;
        if quote.amount_out == 0 {
            return Err(RouterError::NoTokensOut);
        }

        quote.prepare_result()?;
        Ok(quote)
    }

    /// Taker fees for every denom pair of one pool.
    pub fn taker_fees_for_pool(&self, pool_id: u64) -> RouterResult<Vec<TakerFeeForPair>> {
        let pool = self
            .provider
            .get_all_pools()
            .into_iter()
            .find(|pool| pool.id == pool_id)
            .ok_or(RouterError::PoolNotFound { pool_id })?;

        let taker_fees = self.provider.get_all_taker_fees();

        let denoms = &pool.denoms;
        let mut result = Vec::new();
        for i in 0..denoms.len() {
            for j in (i + 1)..denoms.len() {
                result.push(TakerFeeForPair {
                    denom0: denoms[i].clone(),
                    denom1: denoms[j].clone(),
                    taker_fee: taker_fees.fee_or_default(
                        &denoms[i],
                        &denoms[j],
                        self.config.default_taker_fee,
                    ),
                });
            }
        }

        Ok(result)
    }
}

impl<P: PoolProvider + 'static> RouterService<P> {
    /// Request-boundary deadline guard: runs the synchronous quote
    /// computation on a blocking worker and abandons it when the deadline
    /// elapses. The computation itself is not preemptible; it terminates via
    /// its own search and allocation bounds.
    pub async fn optimal_quote_with_timeout(
        self: Arc<Self>,
        token_in: TokenAmount,
        token_out_denom: String,
        deadline: Duration,
    ) -> RouterResult<Quote> {
        let timeout_ms = deadline.as_millis() as u64;
        let computation = tokio::task::spawn_blocking(move || {
            self.get_optimal_quote(&token_in, &token_out_denom)
        });

        match tokio::time::timeout(deadline, computation).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(RouterError::Internal {
                message: format!("quote computation task failed: {join_err}"),
            }),
            Err(_) => Err(RouterError::QuoteTimeout { timeout_ms }),
        }
    }
}
