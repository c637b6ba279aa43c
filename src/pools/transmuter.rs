use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::errors::{RouterError, RouterResult};
use crate::models::pool::{PoolKind, PoolSnapshot};
use crate::models::token::TokenAmount;

use super::RoutablePool;

/// Routable view of a no-slip transmuter: exchanges tokens 1:1 up to the
/// pool's available balance of both denoms. Transmuters are exempt from the
/// taker fee charge.
#[derive(Debug, Clone)]
pub struct RoutableTransmuterPool {
    snapshot: Arc<PoolSnapshot>,
    token_out_denom: String,
    taker_fee: Decimal,
}

impl RoutableTransmuterPool {
    pub fn new(snapshot: Arc<PoolSnapshot>, token_out_denom: String, taker_fee: Decimal) -> Self {
        Self {
            snapshot,
            token_out_denom,
            taker_fee,
        }
    }

    fn require_balance(&self, denom: &str, amount: u128) -> RouterResult<()> {
        let balance = self.snapshot.balance_of(denom);
        if balance < amount {
            return Err(RouterError::TransmuterInsufficientBalance {
                pool_id: self.snapshot.id,
                denom: denom.to_string(),
                balance,
                amount,
            });
        }
        Ok(())
    }
}

impl RoutablePool for RoutableTransmuterPool {
    fn id(&self) -> u64 {
        self.snapshot.id
    }

    fn kind(&self) -> PoolKind {
        PoolKind::NoSlipTransmuter
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

    // Identity: transmuters do not charge the taker fee.
    fn charge_taker_fee_exact_in(&self, token_in: &TokenAmount) -> RouterResult<TokenAmount> {
        Ok(token_in.clone())
    }

    fn calculate_token_out_by_token_in(&self, token_in: &TokenAmount) -> RouterResult<TokenAmount> {
        if !self.snapshot.has_denom(&token_in.denom) {
            return Err(RouterError::DenomNotInPool {
                pool_id: self.snapshot.id,
                denom: token_in.denom.clone(),
            });
        }

        self.require_balance(&token_in.denom, token_in.amount)?;
        self.require_balance(&self.token_out_denom, token_in.amount)?;

        Ok(TokenAmount::new(
            self.token_out_denom.clone(),
            token_in.amount,
        ))
    }
}
