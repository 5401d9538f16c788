//! Engine and collaborator error types.

use thiserror::Error;
use tpo_book::BookError;
use tpo_core::{AccountId, Amount, AssetId, CoreError, LevelKey, OrderId, PoolKey};

/// Failures reported by pool, trade and transfer collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VenueError {
    #[error("Unknown pool: {0}")]
    UnknownPool(PoolKey),

    #[error("Trade rejected on {pool}: {reason}")]
    TradeRejected { pool: PoolKey, reason: String },

    #[error("Insufficient liquidity on {pool}: need {requested}, have {available}")]
    InsufficientLiquidity {
        pool: PoolKey,
        requested: Amount,
        available: Amount,
    },

    #[error("Insufficient balance: {account} holds {balance} of {asset}, needs {requested}")]
    InsufficientBalance {
        account: AccountId,
        asset: AssetId,
        balance: Amount,
        requested: Amount,
    },

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}

pub type VenueResult<T> = Result<T, VenueError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Cancel or redeem by an account holding no claim on the order.
    #[error("Invalid order: {owner} holds no claim on {order}")]
    InvalidOrder { owner: AccountId, order: OrderId },

    #[error("Nothing to claim for {0}")]
    NothingToClaim(OrderId),

    #[error("Insufficient share for {owner} on {order}: balance {balance}, requested {requested}")]
    InsufficientShare {
        owner: AccountId,
        order: OrderId,
        balance: Amount,
        requested: Amount,
    },

    /// Internal invariant violation. Unreachable through the public API
    /// while the book's invariants hold.
    #[error("Underflow on {what}: have {available}, need {requested}")]
    Underflow {
        what: &'static str,
        available: Amount,
        requested: Amount,
    },

    #[error("Overflow on {0}")]
    Overflow(&'static str),

    /// The pool rejected the trade executing a resting level.
    #[error("Trade execution failed for {level}: {source}")]
    TradeExecutionFailed {
        level: LevelKey,
        #[source]
        source: VenueError,
    },

    /// Cancel refused because the order has been executed: the caller's
    /// share exceeds the unfilled amount, or filled output awaits redemption.
    #[error("Order {order} already executed: pending {pending}, share {share}")]
    OrderAlreadyExecuted {
        order: OrderId,
        pending: Amount,
        share: Amount,
    },

    #[error("Unknown pool: {0}")]
    UnknownPool(PoolKey),

    #[error("Pool already initialized: {0}")]
    PoolAlreadyInitialized(PoolKey),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Validation error: {0}")]
    Core(#[from] CoreError),

    #[error("Venue error: {0}")]
    Venue(#[from] VenueError),
}

impl From<BookError> for EngineError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::Underflow {
                what,
                available,
                requested,
            } => Self::Underflow {
                what,
                available,
                requested,
            },
            BookError::Overflow(what) => Self::Overflow(what),
            BookError::NothingToClaim(order) => Self::NothingToClaim(order),
            BookError::InsufficientShare {
                owner,
                order,
                balance,
                requested,
            } => Self::InsufficientShare {
                owner,
                order,
                balance,
                requested,
            },
            BookError::AlreadyExecuted {
                order,
                pending,
                share,
            } => Self::OrderAlreadyExecuted {
                order,
                pending,
                share,
            },
            BookError::Core(e) => Self::Core(e),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
