//! Book error types.

use thiserror::Error;
use tpo_core::{AccountId, Amount, CoreError, OrderId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// Internal invariant violation: a pending amount, claim supply or
    /// claimable output would go negative.
    #[error("Underflow on {what}: have {available}, need {requested}")]
    Underflow {
        what: &'static str,
        available: Amount,
        requested: Amount,
    },

    #[error("Overflow on {0}")]
    Overflow(&'static str),

    /// Cancel requested on an order that has already been executed.
    #[error("Order {order} already executed: pending {pending}, share {share}")]
    AlreadyExecuted {
        order: OrderId,
        pending: Amount,
        share: Amount,
    },

    #[error("Nothing to claim for {0}")]
    NothingToClaim(OrderId),

    #[error("Insufficient share for {owner} on {order}: balance {balance}, requested {requested}")]
    InsufficientShare {
        owner: AccountId,
        order: OrderId,
        balance: Amount,
        requested: Amount,
    },

    #[error("Validation error: {0}")]
    Core(#[from] CoreError),
}

pub type BookResult<T> = Result<T, BookError>;
