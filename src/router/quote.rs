use std::sync::Arc;

use rust_decimal::Decimal;

use crate::errors::RouterResult;
use crate::models::quote::{QuoteResponse, SerializedPoolResponse, SplitRouteResponse};
use crate::models::token::TokenAmount;
use crate::pools::{math, SerializedResultPool};

use super::route::Route;

/// One route of a quote with the input slice assigned to it and the output
/// it produced. Immutable once the quote is assembled.
#[derive(Debug, Clone)]
pub struct SplitRoute {
    pub route: Route,
    pub amount_in: u128,
    pub amount_out: u128,
}

/// A computed quote: the total input, the best achievable output and the
/// split routes producing it. Created once per request, never persisted.
#[derive(Debug, Clone)]
pub struct Quote {
    pub amount_in: TokenAmount,
    pub amount_out: u128,
    pub routes: Vec<SplitRoute>,
    pub effective_spread_factor: Decimal,
}

impl Quote {
    pub fn new(amount_in: TokenAmount, amount_out: u128, routes: Vec<SplitRoute>) -> Self {
        Self {
            amount_in,
            amount_out,
            routes,
            effective_spread_factor: Decimal::ZERO,
        }
    }

    pub fn token_out_denom(&self) -> Option<&str> {
        self.routes
            .first()
            .and_then(|split| split.route.token_out_denom())
    }

    /// Prepares the quote for transport: computes the effective blended
    /// spread factor and replaces every pool on the chosen routes with its
    /// serialized view, stripping all capability to re-simulate.
    pub fn prepare_result(&mut self) -> RouterResult<()> {
        self.effective_spread_factor = self.compute_effective_spread_factor()?;

        for split in &mut self.routes {
            let mut stripped = Route::new();
            for pool in split.route.pools() {
                stripped.add_pool(Arc::new(SerializedResultPool::from_pool(pool.as_ref())));
            }
            split.route = stripped;
        }

        Ok(())
    }

    /// Per route, hop spread factors compound as
    /// `route_fee = route_fee + (1 - route_fee) * hop_fee` (the taker fee is
    /// charged separately and excluded here); route fees are then weighted
    /// by each route's share of the total input.
    fn compute_effective_spread_factor(&self) -> RouterResult<Decimal> {
        if self.amount_in.amount == 0 {
            return Ok(Decimal::ZERO);
        }
        let total_in = math::dec_from_amount(self.amount_in.amount)?;

        let mut effective = Decimal::ZERO;
        for split in &self.routes {
            let mut route_fee = Decimal::ZERO;
            for pool in split.route.pools() {
                route_fee += (Decimal::ONE - route_fee) * pool.spread_factor();
            }
            let weight = math::dec_from_amount(split.amount_in)? / total_in;
            effective += route_fee * weight;
        }

        Ok(effective)
    }

    pub fn to_response(&self) -> QuoteResponse {
        QuoteResponse {
            amount_in: self.amount_in.clone(),
            amount_out: self.amount_out,
            route: self
                .routes
                .iter()
                .map(|split| SplitRouteResponse {
                    pools: split
                        .route
                        .pools()
                        .iter()
                        .map(|pool| SerializedPoolResponse {
                            id: pool.id(),
                            pool_type: pool.pool_type(),
                            balances: pool.balances().clone(),
                            spread_factor: pool.spread_factor(),
                            token_out_denom: pool.token_out_denom().to_string(),
                            taker_fee: pool.taker_fee(),
                        })
                        .collect(),
                    in_amount: split.amount_in,
                    out_amount: split.amount_out,
                })
                .collect(),
            effective_spread_factor: self.effective_spread_factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::models::pool::{PoolKind, PoolSnapshot};
    use crate::models::token::TokenAmount;
    use crate::pools::new_routable_pool;

    use super::*;

    fn pool_route(hops: &[(u64, Decimal)]) -> Route {
        let mut route = Route::new();
        for (id, spread_factor) in hops {
            let snapshot = Arc::new(
                PoolSnapshot::new(
                    *id,
                    PoolKind::ConstantFunction,
                    vec!["denomA".to_string(), "denomB".to_string()],
                )
                .with_balance("denomA", 1_000_000)
                .with_balance("denomB", 1_000_000)
                .with_spread_factor(*spread_factor),
            );
            route.add_pool(
                new_routable_pool(snapshot, None, "denomB".to_string(), dec!(0.0005)).unwrap(),
            );
        }
        route
    }

    #[test]
    fn effective_spread_factor_compounds_hops() {
        let route = pool_route(&[(1, dec!(0.01)), (2, dec!(0.03))]);
        let mut quote = Quote::new(
            TokenAmount::new("denomA", 1_000),
            900,
            vec![SplitRoute {
                route,
                amount_in: 1_000,
                amount_out: 900,
            }],
        );
        quote.prepare_result().unwrap();

        // 0.01 + (1 - 0.01) * 0.03 = 0.0397, single route at full weight.
        assert_eq!(quote.effective_spread_factor, dec!(0.0397));
    }

    #[test]
    fn effective_spread_factor_weights_routes_by_input_share() {
        let mut quote = Quote::new(
            TokenAmount::new("denomA", 1_000),
            900,
            vec![
                SplitRoute {
                    route: pool_route(&[(1, dec!(0.01))]),
                    amount_in: 750,
                    amount_out: 700,
                },
                SplitRoute {
                    route: pool_route(&[(2, dec!(0.05))]),
                    amount_in: 250,
                    amount_out: 200,
                },
            ],
        );
        quote.prepare_result().unwrap();

        // 0.01 * 0.75 + 0.05 * 0.25 = 0.02
        assert_eq!(quote.effective_spread_factor, dec!(0.0200));
    }

    #[test]
    fn prepare_result_strips_every_pool_to_the_serialized_view() {
        let route = pool_route(&[(1, dec!(0.01)), (2, dec!(0.03))]);
        let balances_before = route.pools()[0].balances().clone();
        let mut quote = Quote::new(
            TokenAmount::new("denomA", 1_000),
            900,
            vec![SplitRoute {
                route,
                amount_in: 1_000,
                amount_out: 900,
            }],
        );
        quote.prepare_result().unwrap();

        for pool in quote.routes[0].route.pools() {
            assert_eq!(pool.kind(), PoolKind::SerializedResult);
            assert_eq!(pool.pool_type(), PoolKind::ConstantFunction);
            assert_eq!(pool.taker_fee(), dec!(0.0005));
            assert_eq!(pool.token_out_denom(), "denomB");
            assert!(pool
                .calculate_token_out_by_token_in(&TokenAmount::new("denomA", 1))
                .is_err());
        }
        assert_eq!(quote.routes[0].route.pools()[0].balances(), &balances_before);
    }

    #[test]
    fn response_serializes_the_stripped_fields() {
        let route = pool_route(&[(4, dec!(0.02))]);
        let mut quote = Quote::new(
            TokenAmount::new("denomA", 500),
            480,
            vec![SplitRoute {
                route,
                amount_in: 500,
                amount_out: 480,
            }],
        );
        quote.prepare_result().unwrap();

        let response = quote.to_response();
        assert_eq!(response.amount_in, TokenAmount::new("denomA", 500));
        assert_eq!(response.amount_out, 480);
        assert_eq!(response.route.len(), 1);
        let pool = &response.route[0].pools[0];
        assert_eq!(pool.id, 4);
        assert_eq!(pool.pool_type, PoolKind::ConstantFunction);
        assert_eq!(pool.spread_factor, dec!(0.02));

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"pool_type\":\"constant_function\""));
    }
}
