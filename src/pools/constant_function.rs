use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::errors::{RouterError, RouterResult};
use crate::models::pool::{PoolKind, PoolSnapshot};
use crate::models::token::TokenAmount;

use super::{math, RoutablePool};

/// Routable view of a constant-function pool. Delegates the curve itself to
/// the constant-product primitive over the pool's live reserves.
#[derive(Debug, Clone)]
pub struct RoutableConstantFunctionPool {
    snapshot: Arc<PoolSnapshot>,
    token_out_denom: String,
    taker_fee: Decimal,
}

impl RoutableConstantFunctionPool {
    pub fn new(snapshot: Arc<PoolSnapshot>, token_out_denom: String, taker_fee: Decimal) -> Self {
        Self {
            snapshot,
            token_out_denom,
            taker_fee,
        }
    }
}

impl RoutablePool for RoutableConstantFunctionPool {
    fn id(&self) -> u64 {
        self.snapshot.id
    }

    fn kind(&self) -> PoolKind {
        PoolKind::ConstantFunction
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
        if !self.snapshot.has_denom(&token_in.denom) {
            return Err(RouterError::DenomNotInPool {
                pool_id: self.snapshot.id,
                denom: token_in.denom.clone(),
            });
        }
        if token_in.denom == self.token_out_denom {
            return Err(RouterError::TokenOutMatchesTokenIn {
                denom: token_in.denom.clone(),
            });
        }

        let balance_in = self.snapshot.balance_of(&token_in.denom);
        let balance_out = self.snapshot.balance_of(&self.token_out_denom);
        if balance_in == 0 || balance_out == 0 {
            return Err(RouterError::EmptyPoolReserves {
                pool_id: self.snapshot.id,
            });
        }

        let amount_out = math::constant_product_out(
            math::dec_from_amount(balance_in)?,
            math::dec_from_amount(balance_out)?,
            math::dec_from_amount(token_in.amount)?,
            self.snapshot.spread_factor,
        );

        Ok(TokenAmount::new(
            self.token_out_denom.clone(),
            math::amount_from_dec(amount_out),
        ))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn pool(spread_factor: Decimal) -> RoutableConstantFunctionPool {
        let snapshot = Arc::new(
            PoolSnapshot::new(
                1,
                PoolKind::ConstantFunction,
                vec!["uatom".to_string(), "uosmo".to_string()],
            )
            .with_balance("uatom", 1_000_000_000)
            .with_balance("uosmo", 2_000_000_000)
            .with_spread_factor(spread_factor),
        );
        RoutableConstantFunctionPool::new(snapshot, "uosmo".to_string(), dec!(0.001))
    }

    #[test]
    fn swap_output_matches_constant_product_curve() {
        let out = pool(Decimal::ZERO)
            .calculate_token_out_by_token_in(&TokenAmount::new("uatom", 1_000_000))
            .unwrap();
        // 2e9 * 1e6 / (1e9 + 1e6) = 1998001.998..., truncated down.
        assert_eq!(out, TokenAmount::new("uosmo", 1_998_001));
    }

    #[test]
    fn spread_factor_reduces_output() {
        let no_fee = pool(Decimal::ZERO)
            .calculate_token_out_by_token_in(&TokenAmount::new("uatom", 1_000_000))
            .unwrap();
        let with_fee = pool(dec!(0.01))
            .calculate_token_out_by_token_in(&TokenAmount::new("uatom", 1_000_000))
            .unwrap();
        assert!(with_fee.amount < no_fee.amount);
        assert!(with_fee.amount > 0);
    }

    #[test]
    fn unknown_denom_is_rejected() {
        let err = pool(Decimal::ZERO)
            .calculate_token_out_by_token_in(&TokenAmount::new("uion", 100))
            .unwrap_err();
        assert_eq!(
            err,
            RouterError::DenomNotInPool {
                pool_id: 1,
                denom: "uion".to_string()
            }
        );
    }

    #[test]
    fn empty_reserves_are_rejected() {
        let snapshot = Arc::new(PoolSnapshot::new(
            9,
            PoolKind::ConstantFunction,
            vec!["uatom".to_string(), "uosmo".to_string()],
        ));
        let pool = RoutableConstantFunctionPool::new(snapshot, "uosmo".to_string(), Decimal::ZERO);
        let err = pool
            .calculate_token_out_by_token_in(&TokenAmount::new("uatom", 100))
            .unwrap_err();
        assert_eq!(err, RouterError::EmptyPoolReserves { pool_id: 9 });
    }
}
