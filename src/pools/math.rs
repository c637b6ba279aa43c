//! Pure numerical primitives backing the pool simulators: fixed-point
//! conversions, the constant-product curve, tick/price conversion and the
//! within-bucket swap step for concentrated liquidity.

use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::errors::{RouterError, RouterResult};

/// Tick bounds for the geometric 1.0001^tick price curve. Prices outside
/// this window are not representable in the fixed-point type.
pub const MIN_TICK: i64 = -443_636;
pub const MAX_TICK: i64 = 443_636;

const TICK_BASE: Decimal = dec!(1.0001);

/// Converts an integer token amount into the fixed-point domain.
pub fn dec_from_amount(amount: u128) -> RouterResult<Decimal> {
    Decimal::from_u128(amount).ok_or(RouterError::AmountOutOfRange { amount })
}

/// Truncates a fixed-point value back to an integer token amount. Monetary
/// truncation always rounds down; negative values clamp to zero.
pub fn amount_from_dec(value: Decimal) -> u128 {
    value.trunc().to_u128().unwrap_or(0)
}

/// Sqrt of the spot price at an initialized tick: sqrt(1.0001^tick).
pub fn sqrt_price_at_tick(tick: i64) -> RouterResult<Decimal> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(RouterError::TickOutOfRange { tick });
    }
    let price = TICK_BASE
        .checked_powi(tick)
        .ok_or(RouterError::TickOutOfRange { tick })?;
    price.sqrt().ok_or(RouterError::TickOutOfRange { tick })
}

/// Constant-product curve: output for `amount_in` against the given
/// reserves, with the spread factor deducted from the input.
///
/// CONTRACT: both reserves are strictly positive and `spread_factor` is in
/// [0, 1); the result is non-negative and monotonically increasing in the
/// input.
pub fn constant_product_out(
    balance_in: Decimal,
    balance_out: Decimal,
    amount_in: Decimal,
    spread_factor: Decimal,
) -> Decimal {
    let amount_in_after_spread = amount_in * (Decimal::ONE - spread_factor);
    balance_out * amount_in_after_spread / (balance_in + amount_in_after_spread)
}

/// Result of one within-bucket price step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapStep {
    pub next_sqrt_price: Decimal,
    pub amount_in: Decimal,
    pub amount_out: Decimal,
    pub spread_charge: Decimal,
}

/// Advances the price within one liquidity bucket, consuming up to
/// `amount_remaining` of input.
///
/// CONTRACT: `liquidity`, `sqrt_price_current` and `sqrt_price_target` are
/// strictly positive, `spread_factor` is in [0, 1). Guarantees
/// `amount_in + spread_charge <= amount_remaining`, `amount_out >= 0`, and
/// a returned price between current and target. The caller derives the swap
/// direction from the target: a target below the current price swaps token0
/// for token1.
pub fn swap_step(
    sqrt_price_current: Decimal,
    sqrt_price_target: Decimal,
    liquidity: Decimal,
    amount_remaining: Decimal,
    spread_factor: Decimal,
) -> SwapStep {
    let zero_for_one = sqrt_price_target < sqrt_price_current;
    let fee_factor = Decimal::ONE - spread_factor;
    let amount_remaining_less_spread = amount_remaining * fee_factor;

    let amount_in_to_target = if zero_for_one {
        liquidity * (sqrt_price_current - sqrt_price_target)
            / (sqrt_price_current * sqrt_price_target)
    } else {
        liquidity * (sqrt_price_target - sqrt_price_current)
    };

    let reaches_target = amount_remaining_less_spread >= amount_in_to_target;
    let (next_sqrt_price, amount_in) = if reaches_target {
        (sqrt_price_target, amount_in_to_target)
    } else {
        let next = if zero_for_one {
            liquidity * sqrt_price_current
                / (liquidity + amount_remaining_less_spread * sqrt_price_current)
        } else {
            sqrt_price_current + amount_remaining_less_spread / liquidity
        };
        (next, amount_remaining_less_spread)
    };

    let amount_out = if zero_for_one {
        liquidity * (sqrt_price_current - next_sqrt_price)
    } else {
        liquidity * (next_sqrt_price - sqrt_price_current)
            / (sqrt_price_current * next_sqrt_price)
    };

    let mut spread_charge = if reaches_target {
        amount_in * spread_factor / fee_factor
    } else {
        amount_remaining - amount_in
    };
    // Uphold the consumption bound against rounding in the division above.
    if amount_in + spread_charge > amount_remaining {
        spread_charge = amount_remaining - amount_in;
    }

    SwapStep {
        next_sqrt_price,
        amount_in,
        amount_out,
        spread_charge,
    }
}
