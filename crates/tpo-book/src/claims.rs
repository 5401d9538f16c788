//! Pro-rata claim accounting.
//!
//! Each order id carries two aggregates: `claim_supply`, the outstanding
//! input-asset-equivalent claims of every depositor, and
//! `claimable_output`, the output asset credited by fills and not yet
//! redeemed. Per-depositor ownership lives in a separate share ledger.
//!
//! Redemption pays `floor(share * claimable_output / claim_supply)` and
//! shrinks both aggregates together. Flooring means the ledger can never
//! pay out more than it holds, whatever order depositors redeem in.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tpo_core::{Amount, OrderId};
use tracing::debug;

use crate::error::{BookError, BookResult};

/// Aggregate claim state of one order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEntry {
    pub claim_supply: Amount,
    pub claimable_output: Amount,
}

impl ClaimEntry {
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.claim_supply == 0 && self.claimable_output == 0
    }
}

#[derive(Debug, Default, Clone)]
pub struct ClaimLedger {
    entries: HashMap<OrderId, ClaimEntry>,
}

impl ClaimLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entry(&self, order: &OrderId) -> ClaimEntry {
        self.entries.get(order).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn claim_supply(&self, order: &OrderId) -> Amount {
        self.entry(order).claim_supply
    }

    #[must_use]
    pub fn claimable_output(&self, order: &OrderId) -> Amount {
        self.entry(order).claimable_output
    }

    /// Increase `claim_supply` by a fresh deposit.
    pub fn record_deposit(&mut self, order: OrderId, amount: Amount) -> BookResult<()> {
        let mut entry = self.entry(&order);
        entry.claim_supply = entry
            .claim_supply
            .checked_add(amount)
            .ok_or(BookError::Overflow("claim supply"))?;
        self.store(order, entry);
        Ok(())
    }

    /// Credit the exact output realised by one execution.
    pub fn record_fill(&mut self, order: OrderId, output_amount: Amount) -> BookResult<()> {
        let mut entry = self.entry(&order);
        entry.claimable_output = entry
            .claimable_output
            .checked_add(output_amount)
            .ok_or(BookError::Overflow("claimable output"))?;
        self.store(order, entry);
        debug!(%order, output_amount, claimable = entry.claimable_output, "fill recorded");
        Ok(())
    }

    /// Output `share` would redeem right now, without changing state.
    ///
    /// Fails with `NothingToClaim` when the order has no supply, and with
    /// `Underflow` when `share` exceeds the supply.
    pub fn preview_redeem(&self, order: &OrderId, share: Amount) -> BookResult<Amount> {
        let entry = self.entry(order);
        if entry.claim_supply == 0 {
            return Err(BookError::NothingToClaim(*order));
        }
        if share > entry.claim_supply {
            return Err(BookError::Underflow {
                what: "claim supply",
                available: entry.claim_supply,
                requested: share,
            });
        }
        let numerator = share
            .checked_mul(entry.claimable_output)
            .ok_or(BookError::Overflow("redeem numerator"))?;
        Ok(numerator / entry.claim_supply)
    }

    /// Redeem `share` of an order's claims for its pro-rata output.
    pub fn redeem(&mut self, order: OrderId, share: Amount) -> BookResult<Amount> {
        let output = self.preview_redeem(&order, share)?;
        let mut entry = self.entry(&order);
        // preview_redeem bounds share by supply and output by claimable.
        entry.claim_supply -= share;
        entry.claimable_output -= output;
        self.store(order, entry);
        debug!(%order, share, output, "claims redeemed");
        Ok(output)
    }

    /// Drop `share` of principal claims without paying output.
    ///
    /// Only the supply moves; the caller removes the same principal from the
    /// price-level index (see `OrderBook::cancel`).
    pub fn cancel(&mut self, order: OrderId, share: Amount) -> BookResult<()> {
        let mut entry = self.entry(&order);
        entry.claim_supply = entry
            .claim_supply
            .checked_sub(share)
            .ok_or(BookError::Underflow {
                what: "claim supply",
                available: entry.claim_supply,
                requested: share,
            })?;
        self.store(order, entry);
        Ok(())
    }

    fn store(&mut self, order: OrderId, entry: ClaimEntry) {
        if entry.is_inert() {
            self.entries.remove(&order);
        } else {
            self.entries.insert(order, entry);
        }
    }
}
