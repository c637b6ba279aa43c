pub mod concentrated;
pub mod constant_function;
pub mod math;
pub mod serialized;
pub mod transmuter;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::errors::{RouterError, RouterResult};
use crate::models::pool::{PoolKind, PoolSnapshot};
use crate::models::tick::TickModel;
use crate::models::token::TokenAmount;

pub use concentrated::RoutableConcentratedPool;
pub use constant_function::RoutableConstantFunctionPool;
pub use serialized::SerializedResultPool;
pub use transmuter::RoutableTransmuterPool;

/// Shared capability contract of every pool variant on a route: identity,
/// denoms, the protocol-level taker fee charge and the pool-level swap
/// simulation. Each variant implements it independently.
pub trait RoutablePool: fmt::Debug + Send + Sync {
    fn id(&self) -> u64;

    /// Capability tag of this routable value.
    fn kind(&self) -> PoolKind;

    /// Underlying pool type. Differs from `kind` only for serialized result
    /// pools, which preserve the type of the pool they were stripped from.
    fn pool_type(&self) -> PoolKind {
        self.kind()
    }

    fn denoms(&self) -> &[String];

    fn token_out_denom(&self) -> &str;

    fn spread_factor(&self) -> Decimal;

    fn taker_fee(&self) -> Decimal;

    fn balances(&self) -> &BTreeMap<String, u128>;

    /// Deducts the protocol taker fee from an exact input, rounding the
    /// remainder down. Invoked once per hop before the pool-level swap.
    fn charge_taker_fee_exact_in(&self, token_in: &TokenAmount) -> RouterResult<TokenAmount> {
        let amount = math::dec_from_amount(token_in.amount)?;
        let after_fee = amount * (Decimal::ONE - self.taker_fee());
        Ok(TokenAmount::new(
            token_in.denom.clone(),
            math::amount_from_dec(after_fee),
        ))
    }

    fn calculate_token_out_by_token_in(&self, token_in: &TokenAmount) -> RouterResult<TokenAmount>;
}

/// Builds the routable variant for a pool snapshot, dispatching on the pool
/// kind. The tick model is only meaningful for concentrated pools and is
/// ignored by the other variants.
pub fn new_routable_pool(
    snapshot: Arc<PoolSnapshot>,
    tick_model: Option<TickModel>,
    token_out_denom: String,
    taker_fee: Decimal,
) -> RouterResult<Arc<dyn RoutablePool>> {
    if !snapshot.has_denom(&token_out_denom) {
        return Err(RouterError::DenomNotInPool {
            pool_id: snapshot.id,
            denom: token_out_denom,
        });
    }

    match snapshot.kind {
        PoolKind::ConstantFunction => Ok(Arc::new(RoutableConstantFunctionPool::new(
            snapshot,
            token_out_denom,
            taker_fee,
        ))),
        PoolKind::ConcentratedLiquidity => Ok(Arc::new(RoutableConcentratedPool::new(
            snapshot,
            tick_model,
            token_out_denom,
            taker_fee,
        ))),
        PoolKind::NoSlipTransmuter => Ok(Arc::new(RoutableTransmuterPool::new(
            snapshot,
            token_out_denom,
            taker_fee,
        ))),
        PoolKind::SerializedResult => Err(RouterError::UnsupportedPoolType {
            pool_id: snapshot.id,
            kind: snapshot.kind,
        }),
    }
}
