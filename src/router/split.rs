use rust_decimal::Decimal;
use tracing::debug;

use crate::errors::{RouterError, RouterResult};
use crate::models::token::TokenAmount;
use crate::pools::math;

use super::quote::{Quote, SplitRoute};
use super::route::Route;

/// A route annotated with the outcome of a direct full-amount estimate.
#[derive(Debug, Clone)]
pub struct RouteWithAmountOut {
    pub route: Route,
    pub amount_in: u128,
    pub amount_out: u128,
}

/// Estimates a direct (unsplit) quote over every route and returns the best
/// one, plus all quotable routes ranked by output descending. Routes that
/// fail to quote are skipped with a debug log; having none left is an error.
pub fn estimate_best_single_route_quote(
    routes: &[Route],
    token_in: &TokenAmount,
) -> RouterResult<(Quote, Vec<RouteWithAmountOut>)> {
    if routes.is_empty() {
        return Err(RouterError::NoRoutesProvided);
    }

    let mut ranked = Vec::with_capacity(routes.len());
    for route in routes {
        match route.calculate_token_out_by_token_in(token_in) {
            Ok(token_out) => ranked.push(RouteWithAmountOut {
                route: route.clone(),
                amount_in: token_in.amount,
                amount_out: token_out.amount,
            }),
            Err(err) => {
                debug!(route = ?route, error = %err, "skipping route in direct quote estimate");
            }
        }
    }

    if ranked.is_empty() {
        return Err(RouterError::NoQuotableRoutes);
    }

    // Stable: equal outputs keep their search-preference order.
    ranked.sort_by(|a, b| b.amount_out.cmp(&a.amount_out));

    let best = &ranked[0];
    let quote = Quote::new(
        token_in.clone(),
        best.amount_out,
        vec![SplitRoute {
            route: best.route.clone(),
            amount_in: token_in.amount,
            amount_out: best.amount_out,
        }],
    );

    Ok((quote, ranked))
}

/// Splits the input across the given routes in discretized units to maximize
/// total output.
///
/// Brute-force search over (route index, units remaining) with memoized
/// per-route outputs: no concavity assumption is made about any route's
/// output curve, and a route that fails to quote at some allocation simply
/// contributes zero there. The last route always consumes the remaining
/// units. A single route short-circuits to the direct estimate.
pub fn get_split_quote(
    routes: &[Route],
    token_in: &TokenAmount,
    total_units: usize,
) -> RouterResult<Quote> {
    if routes.is_empty() {
        return Err(RouterError::NoRoutesProvided);
    }
    if routes.len() == 1 {
        let (quote, _) = estimate_best_single_route_quote(routes, token_in)?;
        return Ok(quote);
    }
    if total_units < 2 {
        return Err(RouterError::MaxSplitIterationsTooLow { value: total_units });
    }

    let mut search = SplitSearch {
        routes,
        token_in,
        total_units,
        memo: vec![vec![None; total_units + 1]; routes.len()],
    };

    let (allocation, _) = search.best_split(0, total_units)?;
    debug_assert_eq!(allocation.iter().sum::<usize>(), total_units);

    let mut split_routes = Vec::new();
    let mut total_out: u128 = 0;
    for (route_index, (route, units)) in routes.iter().zip(&allocation).enumerate() {
        if *units == 0 {
            continue;
        }
        let amount_in = search.amount_in_for_units(*units)?;
        let amount_out = search.output_for_units(route_index, *units)?;
        // A nonzero input with zero output (or the reverse) past this point
        // means the memoization or unit accounting broke.
        if (amount_in == 0) != (amount_out == 0) {
            return Err(RouterError::SplitInvariantViolation {
                amount_in,
                amount_out,
            });
        }
        total_out += amount_out;
        split_routes.push(SplitRoute {
            route: route.clone(),
            amount_in,
            amount_out,
        });
    }

    Ok(Quote::new(token_in.clone(), total_out, split_routes))
}

struct SplitSearch<'a> {
    routes: &'a [Route],
    token_in: &'a TokenAmount,
    total_units: usize,
    memo: Vec<Vec<Option<u128>>>,
}

impl SplitSearch<'_> {
    /// Input slice for a unit count, rounded down. The full unit count maps
    /// to the exact total so no dust is lost on an unsplit allocation.
    fn amount_in_for_units(&self, units: usize) -> RouterResult<u128> {
        if units == self.total_units {
            return Ok(self.token_in.amount);
        }
        let total = math::dec_from_amount(self.token_in.amount)?;
        let fraction = Decimal::from(units as u64) / Decimal::from(self.total_units as u64);
        Ok(math::amount_from_dec(total * fraction))
    }

    /// Memoized route output at a unit count; recomputation would be
    /// deterministic and expensive. Simulation failures contribute zero.
    fn output_for_units(&mut self, route_index: usize, units: usize) -> RouterResult<u128> {
        if let Some(cached) = self.memo[route_index][units] {
            return Ok(cached);
        }

        let amount_in = self.amount_in_for_units(units)?;
        let amount_out = if amount_in == 0 {
            0
        } else {
            let token_in = TokenAmount::new(self.token_in.denom.clone(), amount_in);
            match self.routes[route_index].calculate_token_out_by_token_in(&token_in) {
                Ok(token_out) => token_out.amount,
                Err(err) => {
                    debug!(
                        route_index,
                        units,
                        error = %err,
                        "allocation failed to quote; treating as zero output"
                    );
                    0
                }
            }
        };

        self.memo[route_index][units] = Some(amount_out);
        Ok(amount_out)
    }

    /// Best allocation of `units_remaining` across `routes[route_index..]`.
    /// Units iterate descending so that on ties the units stay with the
    /// earlier (higher-ranked) routes.
    fn best_split(
        &mut self,
        route_index: usize,
        units_remaining: usize,
    ) -> RouterResult<(Vec<usize>, u128)> {
        if route_index + 1 == self.routes.len() {
            let amount_out = self.output_for_units(route_index, units_remaining)?;
            return Ok((vec![units_remaining], amount_out));
        }

        let mut best_allocation: Vec<usize> = Vec::new();
        let mut best_out: u128 = 0;
        let mut initialized = false;

        for units in (0..=units_remaining).rev() {
            let out_here = self.output_for_units(route_index, units)?;
            let (rest_allocation, rest_out) =
                self.best_split(route_index + 1, units_remaining - units)?;
            let total = out_here.saturating_add(rest_out);

            if !initialized || total > best_out {
                let mut allocation = Vec::with_capacity(self.routes.len() - route_index);
                allocation.push(units);
                allocation.extend(rest_allocation);
                best_allocation = allocation;
                best_out = total;
                initialized = true;
            }
        }

        Ok((best_allocation, best_out))
    }
}
