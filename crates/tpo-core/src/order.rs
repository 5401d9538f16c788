//! Order direction and price-level keys.

use crate::error::{CoreError, Result};
use crate::pool::PoolKey;
use crate::tick::{Tick, MAX_TICK, MIN_TICK};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the pool's two assets is being sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Sell token0 for token1. Pushes the pool tick down.
    ZeroForOne,
    /// Sell token1 for token0. Pushes the pool tick up.
    OneForZero,
}

impl Direction {
    pub fn from_zero_for_one(zero_for_one: bool) -> Self {
        if zero_for_one {
            Self::ZeroForOne
        } else {
            Self::OneForZero
        }
    }

    pub fn is_zero_for_one(&self) -> bool {
        matches!(self, Self::ZeroForOne)
    }

    /// Returns the opposite direction.
    pub fn opposite(&self) -> Self {
        match self {
            Self::ZeroForOne => Self::OneForZero,
            Self::OneForZero => Self::ZeroForOne,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroForOne => write!(f, "zero_for_one"),
            Self::OneForZero => write!(f, "one_for_zero"),
        }
    }
}

/// Key of one resting price level: pool, quantized tick and direction.
///
/// Callers must build it from an already quantized tick; `LevelKey::quantized`
/// does that with the pool's own spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LevelKey {
    pub pool: PoolKey,
    pub tick: Tick,
    pub direction: Direction,
}

impl LevelKey {
    pub fn new(pool: PoolKey, tick: Tick, direction: Direction) -> Self {
        Self {
            pool,
            tick,
            direction,
        }
    }

    /// Build a key from a desired tick, flooring it to the pool's spacing.
    ///
    /// Both the desired tick and the level it floors to must lie within
    /// `[MIN_TICK, MAX_TICK]`.
    pub fn quantized(pool: PoolKey, desired_tick: Tick, direction: Direction) -> Result<Self> {
        desired_tick.ensure_in_range()?;
        let tick = pool
            .quantize(desired_tick)
            .ok_or(CoreError::TickOutOfRange {
                tick: desired_tick.0,
                min: MIN_TICK,
                max: MAX_TICK,
            })?
            .ensure_in_range()?;
        Ok(Self::new(pool, tick, direction))
    }

    /// Order identifier shared by every depositor at this level.
    pub fn order_id(&self) -> OrderId {
        OrderId(*self)
    }
}

impl fmt::Display for LevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.pool, self.tick, self.direction)
    }
}

/// Deterministic order identifier.
///
/// Derived only from the level (pool, quantized tick, direction), never from
/// depositor identity, so everyone placing at the same level shares one
/// order and one fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub LevelKey);

impl OrderId {
    pub fn level(&self) -> &LevelKey {
        &self.0
    }
}

impl From<LevelKey> for OrderId {
    fn from(level: LevelKey) -> Self {
        Self(level)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order[{}]", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::AssetId;
    use crate::tick::TickSpacing;

    fn pool() -> PoolKey {
        PoolKey::new(AssetId(1), AssetId(2), 30, TickSpacing::new(60).unwrap()).unwrap()
    }

    #[test]
    fn test_direction_opposite() {
        assert_eq!(Direction::ZeroForOne.opposite(), Direction::OneForZero);
        assert_eq!(Direction::OneForZero.opposite(), Direction::ZeroForOne);
    }

    #[test]
    fn test_direction_from_bool() {
        assert!(Direction::from_zero_for_one(true).is_zero_for_one());
        assert!(!Direction::from_zero_for_one(false).is_zero_for_one());
    }

    #[test]
    fn test_level_key_quantizes() {
        let key = LevelKey::quantized(pool(), Tick(-75), Direction::ZeroForOne).unwrap();
        assert_eq!(key.tick, Tick(-120));
    }

    #[test]
    fn test_level_key_rejects_out_of_range_ticks() {
        for tick in [i32::MIN, i32::MAX, MIN_TICK - 1, MAX_TICK + 1] {
            assert!(matches!(
                LevelKey::quantized(pool(), Tick(tick), Direction::ZeroForOne),
                Err(CoreError::TickOutOfRange { tick: t, .. }) if t == tick
            ));
        }
        // In range, but floors below MIN_TICK with spacing 60.
        assert!(matches!(
            LevelKey::quantized(pool(), Tick(MIN_TICK), Direction::OneForZero),
            Err(CoreError::TickOutOfRange { tick: -887_280, .. })
        ));
        assert_eq!(
            LevelKey::quantized(pool(), Tick(MAX_TICK), Direction::OneForZero)
                .unwrap()
                .tick,
            Tick(887_220)
        );
    }

    #[test]
    fn test_order_id_is_shared_per_level() {
        let a = LevelKey::quantized(pool(), Tick(61), Direction::ZeroForOne).unwrap().order_id();
        let b = LevelKey::quantized(pool(), Tick(119), Direction::ZeroForOne).unwrap().order_id();
        let c = LevelKey::quantized(pool(), Tick(119), Direction::OneForZero).unwrap().order_id();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
