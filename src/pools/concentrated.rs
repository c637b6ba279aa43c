use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::errors::{RouterError, RouterResult};
use crate::models::pool::{PoolKind, PoolSnapshot};
use crate::models::tick::TickModel;
use crate::models::token::TokenAmount;

use super::{math, RoutablePool};

/// Routable view of a concentrated-liquidity pool: the snapshot plus the
/// lazily fetched tick model. Simulation walks liquidity buckets in the swap
/// direction, stepping the sqrt price bucket by bucket until the input is
/// exhausted.
#[derive(Debug, Clone)]
pub struct RoutableConcentratedPool {
    snapshot: Arc<PoolSnapshot>,
    tick_model: Option<TickModel>,
    token_out_denom: String,
    taker_fee: Decimal,
}

impl RoutableConcentratedPool {
    pub fn new(
        snapshot: Arc<PoolSnapshot>,
        tick_model: Option<TickModel>,
        token_out_denom: String,
        taker_fee: Decimal,
    ) -> Self {
        Self {
            snapshot,
            tick_model,
            token_out_denom,
            taker_fee,
        }
    }

    /// Validates the tick model invariants and returns the starting bucket
    /// index. Every violation is a named error; the simulator never defaults
    /// its way past inconsistent ingested state.
    fn validated_tick_model(&self) -> RouterResult<(&TickModel, usize)> {
        let pool_id = self.snapshot.id;
        let tick_model = self
            .tick_model
            .as_ref()
            .ok_or(RouterError::ConcentratedNoTickModel { pool_id })?;

        if tick_model.has_no_liquidity {
            return Err(RouterError::ConcentratedNoLiquidity { pool_id });
        }

        let bucket_index = tick_model.current_bucket_index;
        if bucket_index < 0 || bucket_index as usize >= tick_model.buckets.len() {
            return Err(RouterError::ConcentratedCurrentBucketOutOfRange {
                pool_id,
                bucket_index,
                total_buckets: tick_model.buckets.len(),
            });
        }

        let bucket = &tick_model.buckets[bucket_index as usize];
        let current_tick = self.snapshot.current_tick;
        if current_tick < bucket.lower_tick || current_tick >= bucket.upper_tick {
            return Err(RouterError::ConcentratedTickAndBucketMismatch {
                pool_id,
                current_tick,
                lower_tick: bucket.lower_tick,
                upper_tick: bucket.upper_tick,
            });
        }

        Ok((tick_model, bucket_index as usize))
    }
}

impl RoutablePool for RoutableConcentratedPool {
    fn id(&self) -> u64 {
        self.snapshot.id
    }

    fn kind(&self) -> PoolKind {
        PoolKind::ConcentratedLiquidity
    }

    fn denoms(&self) -> &[String] {
        &self.snapshot.denoms
    }

    fn token_out_denom(&self) -> &str {
        &self.token_out_denom
    }

    fn spread_factor(&self) -> Decimal {
        self.snapshot.spread_factor
    }

    fn taker_fee(&self) -> Decimal {
        self.taker_fee
    }

    fn balances(&self) -> &BTreeMap<String, u128> {
        &self.snapshot.balances
    }

    fn calculate_token_out_by_token_in(&self, token_in: &TokenAmount) -> RouterResult<TokenAmount> {
        let pool_id = self.snapshot.id;

        if !self.snapshot.has_denom(&token_in.denom) {
            return Err(RouterError::DenomNotInPool {
                pool_id,
                denom: token_in.denom.clone(),
            });
        }
        if token_in.denom == self.token_out_denom {
            return Err(RouterError::TokenOutMatchesTokenIn {
                denom: token_in.denom.clone(),
            });
        }

        let (tick_model, start_bucket) = self.validated_tick_model()?;

        let sqrt_price_start = self.snapshot.current_sqrt_price;
        if sqrt_price_start.is_zero() {
            return Err(RouterError::ConcentratedZeroCurrentSqrtPrice { pool_id });
        }

        // token0 in drives the price down through lower buckets; token1 in
        // drives it up.
        let zero_for_one = token_in.denom == self.snapshot.denoms[0];

        let mut remaining = math::dec_from_amount(token_in.amount)?;
        let mut total_out = Decimal::ZERO;
        let mut sqrt_price_current = sqrt_price_start;
        let mut bucket_index = start_bucket as i64;

        while remaining > Decimal::ZERO {
            if bucket_index < 0 || bucket_index as usize >= tick_model.buckets.len() {
                return Err(RouterError::ConcentratedInsufficientLiquidity {
                    pool_id,
                    amount_in: token_in.amount,
                });
            }
            let bucket = &tick_model.buckets[bucket_index as usize];

            let target_tick = if zero_for_one {
                bucket.lower_tick
            } else {
                bucket.upper_tick
            };
            let sqrt_price_target = math::sqrt_price_at_tick(target_tick)?;

            if bucket.liquidity.is_zero() {
                // Uninitialized gap: the price jumps to the boundary.
                sqrt_price_current = sqrt_price_target;
                bucket_index += if zero_for_one { -1 } else { 1 };
                continue;
            }

            let step = math::swap_step(
                sqrt_price_current,
                sqrt_price_target,
                bucket.liquidity,
                remaining,
                self.snapshot.spread_factor,
            );

            remaining -= step.amount_in + step.spread_charge;
            total_out += step.amount_out;
            sqrt_price_current = step.next_sqrt_price;

            if remaining > Decimal::ZERO {
                bucket_index += if zero_for_one { -1 } else { 1 };
            }
        }

        Ok(TokenAmount::new(
            self.token_out_denom.clone(),
            math::amount_from_dec(total_out),
        ))
    }
}
