//! Resting-order bookkeeping for take-profit orders.
//!
//! - `PriceLevelIndex`: (pool, quantized tick, direction) -> pending sell amount
//! - `ClaimLedger`: per-order claim supply and filled output, pro-rata redemption
//! - `OrderBook`: the two above, mutated together so every operation is atomic
//! - `ClaimShareLedger`: per-depositor ownership of an order's claims

pub mod book;
pub mod claims;
pub mod error;
pub mod levels;
pub mod shares;

pub use book::OrderBook;
pub use claims::{ClaimEntry, ClaimLedger};
pub use error::{BookError, BookResult};
pub use levels::PriceLevelIndex;
pub use shares::{ClaimShareLedger, InMemoryShareLedger};
