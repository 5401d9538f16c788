//! Claim-share ownership ledger.
//!
//! A fungible, multi-series ledger: one series per order id, one balance
//! per (owner, order). The engine treats it purely as an ownership oracle;
//! token transfer semantics belong to whoever implements it.

use std::collections::HashMap;

use tpo_core::{AccountId, Amount, OrderId};

use crate::error::{BookError, BookResult};

pub trait ClaimShareLedger {
    fn mint(&mut self, owner: AccountId, order: OrderId, amount: Amount) -> BookResult<()>;

    /// Fails with `InsufficientShare` when `amount` exceeds the balance.
    fn burn(&mut self, owner: AccountId, order: OrderId, amount: Amount) -> BookResult<()>;

    fn balance_of(&self, owner: AccountId, order: OrderId) -> Amount;
}

/// Map-backed share ledger.
#[derive(Debug, Default, Clone)]
pub struct InMemoryShareLedger {
    balances: HashMap<(AccountId, OrderId), Amount>,
    supplies: HashMap<OrderId, Amount>,
}

impl InMemoryShareLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total shares minted and not burned for `order`.
    #[must_use]
    pub fn total_supply(&self, order: OrderId) -> Amount {
        self.supplies.get(&order).copied().unwrap_or(0)
    }

    /// Orders in which `owner` holds a non-zero balance.
    #[must_use]
    pub fn orders_of(&self, owner: AccountId) -> Vec<(OrderId, Amount)> {
        let mut held: Vec<_> = self
            .balances
            .iter()
            .filter(|((holder, _), _)| *holder == owner)
            .map(|((_, order), amount)| (*order, *amount))
            .collect();
        held.sort_by_key(|(order, _)| *order);
        held
    }
}

impl ClaimShareLedger for InMemoryShareLedger {
    fn mint(&mut self, owner: AccountId, order: OrderId, amount: Amount) -> BookResult<()> {
        let balance = self.balance_of(owner, order);
        let new_balance = balance
            .checked_add(amount)
            .ok_or(BookError::Overflow("share balance"))?;
        let new_supply = self
            .total_supply(order)
            .checked_add(amount)
            .ok_or(BookError::Overflow("share supply"))?;
        self.balances.insert((owner, order), new_balance);
        self.supplies.insert(order, new_supply);
        Ok(())
    }

    fn burn(&mut self, owner: AccountId, order: OrderId, amount: Amount) -> BookResult<()> {
        let balance = self.balance_of(owner, order);
        if amount > balance {
            return Err(BookError::InsufficientShare {
                owner,
                order,
                balance,
                requested: amount,
            });
        }
        let remaining = balance - amount;
        if remaining == 0 {
            self.balances.remove(&(owner, order));
        } else {
            self.balances.insert((owner, order), remaining);
        }
        let supply = self.total_supply(order).saturating_sub(amount);
        if supply == 0 {
            self.supplies.remove(&order);
        } else {
            self.supplies.insert(order, supply);
        }
        Ok(())
    }

    fn balance_of(&self, owner: AccountId, order: OrderId) -> Amount {
        self.balances.get(&(owner, order)).copied().unwrap_or(0)
    }
}
