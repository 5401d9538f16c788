//! Collaborator contracts consumed by the engine.
//!
//! The pool's curve, fee accrual and settlement arithmetic live behind
//! these traits. Implementations must reflect the latest price immediately
//! after every trade, including trades the engine itself issues.

use tpo_core::{AccountId, Amount, AssetId, Direction, PoolKey, Tick};

use crate::error::VenueResult;

pub trait PoolStateReader {
    /// Live tick of `pool`.
    fn current_tick(&self, pool: &PoolKey) -> VenueResult<Tick>;
}

pub trait TradeExecutor {
    /// Exact-input trade of `amount` in `direction`, settled atomically
    /// with the price update. Returns the realised output amount.
    ///
    /// Fails without partial settlement.
    fn trade(
        &mut self,
        pool: &PoolKey,
        trader: AccountId,
        direction: Direction,
        amount: Amount,
    ) -> VenueResult<Amount>;
}

/// Custody primitive between participants and the engine.
pub trait AssetTransfer {
    fn transfer_in(&mut self, asset: AssetId, from: AccountId, amount: Amount) -> VenueResult<()>;

    fn transfer_out(&mut self, asset: AssetId, to: AccountId, amount: Amount) -> VenueResult<()>;
}

/// Everything the engine needs from its host environment.
pub trait Venue: PoolStateReader + TradeExecutor + AssetTransfer {}

impl<T: PoolStateReader + TradeExecutor + AssetTransfer> Venue for T {}
