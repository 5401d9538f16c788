//! Order lifecycle: place, cancel, redeem.
//!
//! Each operation validates everything it can before the first external
//! call, so a failed call leaves the book, the share ledger and custody
//! exactly as they were.

use serde::{Deserialize, Serialize};
use tpo_book::ClaimShareLedger;
use tpo_core::{AccountId, Amount, CoreError, Direction, LevelKey, OrderId, PoolKey, Tick};
use tpo_telemetry::Metrics;
use tracing::{error, info};

use crate::engine::TakeProfitEngine;
use crate::error::{EngineError, EngineResult};
use crate::venue::Venue;

/// Where a deposit landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub tick: Tick,
    pub order_id: OrderId,
}

impl<V: Venue, S: ClaimShareLedger> TakeProfitEngine<V, S> {
    /// Deposit `amount` of the sell-side asset to be sold in `direction` once
    /// the pool crosses `desired_tick` (floored to the pool's spacing).
    ///
    /// The depositor receives claim shares equal to `amount`.
    pub fn place_order(
        &mut self,
        owner: AccountId,
        pool: PoolKey,
        desired_tick: Tick,
        direction: Direction,
        amount: Amount,
    ) -> EngineResult<PlacedOrder> {
        self.pool_state(&pool)?;
        if amount == 0 {
            return Err(CoreError::ZeroAmount.into());
        }
        let level = LevelKey::quantized(pool, desired_tick, direction)?;
        let order_id = level.order_id();
        self.book.check_deposit(&level, amount)?;

        let asset = pool.input_asset(direction);
        self.venue.transfer_in(asset, owner, amount)?;
        if let Err(e) = self.shares.mint(owner, order_id, amount) {
            if let Err(refund) = self.venue.transfer_out(asset, owner, amount) {
                error!(%owner, %order_id, amount, error = %refund, "refund after failed mint failed");
            }
            return Err(e.into());
        }
        // check_deposit above rules out overflow.
        self.book.deposit(level, amount)?;

        Metrics::order_placed(&pool.to_string(), &direction.to_string());
        Metrics::pending_levels(&pool.to_string(), self.book.levels().level_count_for(&pool));
        info!(%owner, %pool, tick = %level.tick, %direction, amount, "order placed");

        Ok(PlacedOrder {
            tick: level.tick,
            order_id,
        })
    }

    /// Cancel the caller's whole share of an unfilled order and return the
    /// principal. Partial cancellation is not supported, and an order with
    /// unredeemed output cannot be cancelled by any holder.
    pub fn cancel_order(
        &mut self,
        owner: AccountId,
        pool: PoolKey,
        desired_tick: Tick,
        direction: Direction,
    ) -> EngineResult<Amount> {
        self.pool_state(&pool)?;
        let level = LevelKey::quantized(pool, desired_tick, direction)?;
        let order_id = level.order_id();

        let share = self.shares.balance_of(owner, order_id);
        if share == 0 {
            return Err(EngineError::InvalidOrder {
                owner,
                order: order_id,
            });
        }
        self.book.check_cancel(&level, share)?;

        self.venue
            .transfer_out(pool.input_asset(direction), owner, share)?;
        self.shares.burn(owner, order_id, share)?;
        self.book.cancel(level, share)?;

        Metrics::order_cancelled(&pool.to_string(), &direction.to_string());
        Metrics::pending_levels(&pool.to_string(), self.book.levels().level_count_for(&pool));
        info!(%owner, %pool, tick = %level.tick, %direction, amount = share, "order cancelled");
        Ok(share)
    }

    /// Redeem `share` claims on a filled order for the pro-rata output.
    ///
    /// Pays `floor(share * claimable_output / claim_supply)` of the output
    /// asset and burns `share` from the caller's balance.
    pub fn redeem_order(
        &mut self,
        owner: AccountId,
        pool: PoolKey,
        desired_tick: Tick,
        direction: Direction,
        share: Amount,
    ) -> EngineResult<Amount> {
        self.pool_state(&pool)?;
        if share == 0 {
            return Err(CoreError::ZeroAmount.into());
        }
        let level = LevelKey::quantized(pool, desired_tick, direction)?;
        let order_id = level.order_id();

        let balance = self.shares.balance_of(owner, order_id);
        if balance == 0 {
            return Err(EngineError::InvalidOrder {
                owner,
                order: order_id,
            });
        }
        if share > balance {
            return Err(EngineError::InsufficientShare {
                owner,
                order: order_id,
                balance,
                requested: share,
            });
        }
        let claim = self.book.claim(&order_id);
        if claim.claim_supply == 0 || claim.claimable_output == 0 {
            return Err(EngineError::NothingToClaim(order_id));
        }
        let output = self.book.preview_redeem(&order_id, share)?;

        if output > 0 {
            self.venue
                .transfer_out(pool.output_asset(direction), owner, output)?;
        }
        self.shares.burn(owner, order_id, share)?;
        self.book.redeem(order_id, share)?;

        Metrics::order_redeemed(&pool.to_string(), &direction.to_string());
        info!(%owner, %pool, tick = %level.tick, %direction, share, output, "claims redeemed");
        Ok(output)
    }
}
