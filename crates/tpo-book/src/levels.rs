//! Price-level index.
//!
//! Maps (pool, quantized tick, direction) to the aggregate amount of the
//! sell-side asset still waiting to be sold. Pure data: no knowledge of
//! depositors, fills or pool prices.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tpo_core::{Amount, Direction, LevelKey, PoolKey, Tick};
use tracing::trace;

use crate::error::{BookError, BookResult};

/// Pending-amount table keyed by price level.
///
/// Levels whose pending amount returns to zero are dropped from the map, so
/// `level_count` reflects live levels only.
#[derive(Debug, Default, Clone)]
pub struct PriceLevelIndex {
    pending: HashMap<LevelKey, Amount>,
    /// Live level count per pool.
    live: HashMap<PoolKey, usize>,
}

impl PriceLevelIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` at the level `tick` quantizes to.
    ///
    /// Returns the quantized tick actually used; callers key everything
    /// else off this value rather than quantizing on their own.
    pub fn place(
        &mut self,
        pool: PoolKey,
        tick: Tick,
        direction: Direction,
        amount: Amount,
    ) -> BookResult<Tick> {
        let key = LevelKey::quantized(pool, tick, direction)?;
        self.add(key, amount)?;
        Ok(key.tick)
    }

    /// Subtract `amount` from the level `tick` quantizes to.
    pub fn remove(
        &mut self,
        pool: PoolKey,
        tick: Tick,
        direction: Direction,
        amount: Amount,
    ) -> BookResult<()> {
        self.subtract(LevelKey::quantized(pool, tick, direction)?, amount)
    }

    /// Pending amount at the level `tick` quantizes to. Out-of-range ticks
    /// hold nothing.
    #[must_use]
    pub fn peek(&self, pool: PoolKey, tick: Tick, direction: Direction) -> Amount {
        LevelKey::quantized(pool, tick, direction).map_or(0, |key| self.peek_level(&key))
    }

    #[must_use]
    pub fn peek_level(&self, key: &LevelKey) -> Amount {
        self.pending.get(key).copied().unwrap_or(0)
    }

    pub(crate) fn add(&mut self, key: LevelKey, amount: Amount) -> BookResult<()> {
        let current = self.peek_level(&key);
        let next = current
            .checked_add(amount)
            .ok_or(BookError::Overflow("pending amount"))?;
        if next > 0 && self.pending.insert(key, next).is_none() {
            *self.live.entry(key.pool).or_insert(0) += 1;
        }
        trace!(level = %key, pending = next, "level increased");
        Ok(())
    }

    pub(crate) fn subtract(&mut self, key: LevelKey, amount: Amount) -> BookResult<()> {
        let current = self.peek_level(&key);
        let next = current.checked_sub(amount).ok_or(BookError::Underflow {
            what: "pending amount",
            available: current,
            requested: amount,
        })?;
        if next == 0 {
            if self.pending.remove(&key).is_some() {
                self.release(key.pool);
            }
        } else {
            self.pending.insert(key, next);
        }
        trace!(level = %key, pending = next, "level decreased");
        Ok(())
    }

    /// Number of levels with a non-zero pending amount.
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.pending.len()
    }

    /// Number of live levels in `pool`.
    #[must_use]
    pub fn level_count_for(&self, pool: &PoolKey) -> usize {
        self.live.get(pool).copied().unwrap_or(0)
    }

    fn release(&mut self, pool: PoolKey) {
        if let Entry::Occupied(mut count) = self.live.entry(pool) {
            *count.get_mut() -= 1;
            if *count.get() == 0 {
                count.remove();
            }
        }
    }

    /// Live levels of one pool, sorted by tick then direction.
    #[must_use]
    pub fn levels_for(&self, pool: &PoolKey) -> Vec<(LevelKey, Amount)> {
        let mut levels: Vec<_> = self
            .pending
            .iter()
            .filter(|(key, _)| key.pool == *pool)
            .map(|(key, amount)| (*key, *amount))
            .collect();
        levels.sort_by_key(|(key, _)| (key.tick, key.direction));
        levels
    }
}
