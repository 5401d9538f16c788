//! Engine state: registered pools, watermarks and the order book.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tpo_book::{ClaimEntry, ClaimShareLedger, InMemoryShareLedger, OrderBook};
use tpo_core::{AccountId, Amount, Direction, LevelKey, PoolKey, Tick};
use tracing::info;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::venue::Venue;

/// Crossing-detection state of one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolPhase {
    /// No crossing pass in progress.
    #[default]
    Idle,
    /// Walking levels inside one external-trade invocation.
    Scanning,
}

/// Per-pool engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    /// Last tick observed by the engine. Bounds the next scan window only;
    /// the live tick is always re-read from the pool.
    pub watermark: Tick,
    pub phase: PoolPhase,
}

/// Take-profit order engine.
///
/// Single-writer: every method runs to completion synchronously, and the
/// only reentry path (the engine's own trades notifying it) is cut by the
/// initiator check in `after_trade`.
pub struct TakeProfitEngine<V, S = InMemoryShareLedger> {
    pub(crate) config: EngineConfig,
    /// Identity the engine trades under.
    pub(crate) identity: AccountId,
    pub(crate) venue: V,
    pub(crate) shares: S,
    pub(crate) book: OrderBook,
    pub(crate) pools: HashMap<PoolKey, PoolState>,
}

impl<V: Venue, S: ClaimShareLedger> TakeProfitEngine<V, S> {
    pub fn new(config: EngineConfig, identity: AccountId, venue: V, shares: S) -> EngineResult<Self> {
        config.validate().map_err(EngineError::InvalidConfig)?;
        Ok(Self {
            config,
            identity,
            venue,
            shares,
            book: OrderBook::new(),
            pools: HashMap::new(),
        })
    }

    /// Register `pool` and seed its watermark with the pool's initial tick.
    pub fn initialize_pool(&mut self, pool: PoolKey, tick: Tick) -> EngineResult<()> {
        tick.ensure_in_range()?;
        if self.pools.contains_key(&pool) {
            return Err(EngineError::PoolAlreadyInitialized(pool));
        }
        self.pools.insert(
            pool,
            PoolState {
                watermark: tick,
                phase: PoolPhase::Idle,
            },
        );
        info!(%pool, %tick, "pool initialized");
        Ok(())
    }

    pub(crate) fn pool_state(&self, pool: &PoolKey) -> EngineResult<&PoolState> {
        self.pools.get(pool).ok_or(EngineError::UnknownPool(*pool))
    }

    pub(crate) fn pool_state_mut(&mut self, pool: &PoolKey) -> EngineResult<&mut PoolState> {
        self.pools.get_mut(pool).ok_or(EngineError::UnknownPool(*pool))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn identity(&self) -> AccountId {
        self.identity
    }

    pub fn venue(&self) -> &V {
        &self.venue
    }

    /// Host-side access to the venue, e.g. to perform external trades.
    pub fn venue_mut(&mut self) -> &mut V {
        &mut self.venue
    }

    pub fn shares(&self) -> &S {
        &self.shares
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn watermark(&self, pool: &PoolKey) -> Option<Tick> {
        self.pools.get(pool).map(|s| s.watermark)
    }

    pub fn phase(&self, pool: &PoolKey) -> Option<PoolPhase> {
        self.pools.get(pool).map(|s| s.phase)
    }

    /// Pending amount at the level `tick` quantizes to. Zero for ticks
    /// outside the valid range.
    pub fn pending_amount(&self, pool: PoolKey, tick: Tick, direction: Direction) -> Amount {
        LevelKey::quantized(pool, tick, direction).map_or(0, |level| self.book.pending(&level))
    }

    /// Claim aggregates of the order at the level `tick` quantizes to.
    pub fn claim(&self, pool: PoolKey, tick: Tick, direction: Direction) -> ClaimEntry {
        LevelKey::quantized(pool, tick, direction)
            .map(|level| self.book.claim(&level.order_id()))
            .unwrap_or_default()
    }

    pub fn share_balance(
        &self,
        owner: AccountId,
        pool: PoolKey,
        tick: Tick,
        direction: Direction,
    ) -> Amount {
        LevelKey::quantized(pool, tick, direction)
            .map_or(0, |level| self.shares.balance_of(owner, level.order_id()))
    }
}
