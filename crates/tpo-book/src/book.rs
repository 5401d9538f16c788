//! Price-level index and claim ledger, mutated together.
//!
//! Every method validates against both structures before touching either,
//! so a failed call leaves the book exactly as it was.

use tpo_core::{Amount, LevelKey, OrderId};
use tracing::debug;

use crate::claims::{ClaimEntry, ClaimLedger};
use crate::error::{BookError, BookResult};
use crate::levels::PriceLevelIndex;

#[derive(Debug, Default, Clone)]
pub struct OrderBook {
    levels: PriceLevelIndex,
    claims: ClaimLedger,
}

impl OrderBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn levels(&self) -> &PriceLevelIndex {
        &self.levels
    }

    #[must_use]
    pub fn claims(&self) -> &ClaimLedger {
        &self.claims
    }

    #[must_use]
    pub fn pending(&self, level: &LevelKey) -> Amount {
        self.levels.peek_level(level)
    }

    #[must_use]
    pub fn claim(&self, order: &OrderId) -> ClaimEntry {
        self.claims.entry(order)
    }

    /// Whether `deposit(level, amount)` would succeed.
    pub fn check_deposit(&self, level: &LevelKey, amount: Amount) -> BookResult<()> {
        self.pending(level)
            .checked_add(amount)
            .ok_or(BookError::Overflow("pending amount"))?;
        self.claims
            .claim_supply(&level.order_id())
            .checked_add(amount)
            .ok_or(BookError::Overflow("claim supply"))?;
        Ok(())
    }

    /// Register a deposit: pending amount and claim supply both grow.
    pub fn deposit(&mut self, level: LevelKey, amount: Amount) -> BookResult<()> {
        self.check_deposit(&level, amount)?;
        self.levels.add(level, amount)?;
        self.claims.record_deposit(level.order_id(), amount)?;
        debug!(%level, amount, "deposit booked");
        Ok(())
    }

    /// Whether `cancel(level, share)` would succeed.
    ///
    /// Once an order has claimable output, its claims are no longer backed
    /// by principal alone, so no depositor can cancel until that output is
    /// redeemed, even if the level has been refilled by newer deposits.
    pub fn check_cancel(&self, level: &LevelKey, share: Amount) -> BookResult<()> {
        let order = level.order_id();
        let pending = self.pending(level);
        let claim = self.claims.entry(&order);
        if claim.claimable_output > 0 || share > pending {
            return Err(BookError::AlreadyExecuted {
                order,
                pending,
                share,
            });
        }
        if share > claim.claim_supply {
            return Err(BookError::Underflow {
                what: "claim supply",
                available: claim.claim_supply,
                requested: share,
            });
        }
        Ok(())
    }

    /// Return `share` of unfilled principal: pending amount and claim supply
    /// both shrink.
    pub fn cancel(&mut self, level: LevelKey, share: Amount) -> BookResult<()> {
        self.check_cancel(&level, share)?;
        self.levels.subtract(level, share)?;
        self.claims.cancel(level.order_id(), share)?;
        debug!(%level, share, "principal cancelled");
        Ok(())
    }

    /// Book one execution: `input` leaves the level, `output` becomes
    /// claimable.
    pub fn fill(&mut self, level: LevelKey, input: Amount, output: Amount) -> BookResult<()> {
        let order = level.order_id();
        let pending = self.pending(&level);
        if input > pending {
            return Err(BookError::Underflow {
                what: "pending amount",
                available: pending,
                requested: input,
            });
        }
        self.claims
            .claimable_output(&order)
            .checked_add(output)
            .ok_or(BookError::Overflow("claimable output"))?;

        self.levels.subtract(level, input)?;
        self.claims.record_fill(order, output)?;
        Ok(())
    }

    pub fn preview_redeem(&self, order: &OrderId, share: Amount) -> BookResult<Amount> {
        self.claims.preview_redeem(order, share)
    }

    pub fn redeem(&mut self, order: OrderId, share: Amount) -> BookResult<Amount> {
        self.claims.redeem(order, share)
    }
}
