//! Discretised price ticks and tick-spacing quantization.
//!
//! Pools only accept liquidity and orders at multiples of their tick
//! spacing. Every tick used as a key must first be quantized with a true
//! floor (toward negative infinity), so `-75` with spacing `60` lands on
//! `-120`, never on `-60`.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest tick a pool can reach.
pub const MIN_TICK: i32 = -887_272;

/// Highest tick a pool can reach.
pub const MAX_TICK: i32 = 887_272;

/// A discretised unit of price. Higher tick means token0 is worth more
/// token1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tick(pub i32);

impl Tick {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    #[inline]
    pub fn value(&self) -> i32 {
        self.0
    }

    /// Floor this tick to the nearest multiple of `spacing`, or `None` when
    /// that multiple is below `i32::MIN`.
    #[inline]
    pub fn quantize(&self, spacing: TickSpacing) -> Option<Self> {
        self.0.div_euclid(spacing.0).checked_mul(spacing.0).map(Self)
    }

    /// Smallest multiple of `spacing` that is `>= self`, or `None` past
    /// either end of `i32`.
    #[inline]
    pub fn quantize_up(&self, spacing: TickSpacing) -> Option<Self> {
        let floor = self.quantize(spacing)?;
        if floor == *self {
            Some(floor)
        } else {
            floor.checked_step_up(spacing)
        }
    }

    /// Whether this tick lies within `[MIN_TICK, MAX_TICK]`.
    #[inline]
    pub fn is_in_range(&self) -> bool {
        (MIN_TICK..=MAX_TICK).contains(&self.0)
    }

    /// Reject ticks outside `[MIN_TICK, MAX_TICK]`.
    pub fn ensure_in_range(&self) -> Result<Self> {
        if self.is_in_range() {
            Ok(*self)
        } else {
            Err(CoreError::TickOutOfRange {
                tick: self.0,
                min: MIN_TICK,
                max: MAX_TICK,
            })
        }
    }

    /// Next level above this one, or `None` past `i32::MAX`.
    #[inline]
    pub fn checked_step_up(&self, spacing: TickSpacing) -> Option<Self> {
        self.0.checked_add(spacing.0).map(Self)
    }

    /// Next level below this one, or `None` past `i32::MIN`.
    #[inline]
    pub fn checked_step_down(&self, spacing: TickSpacing) -> Option<Self> {
        self.0.checked_sub(spacing.0).map(Self)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Tick {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// Minimum interval between usable ticks of a pool. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct TickSpacing(i32);

impl TickSpacing {
    pub fn new(spacing: i32) -> Result<Self> {
        if spacing <= 0 {
            return Err(CoreError::InvalidTickSpacing(spacing));
        }
        Ok(Self(spacing))
    }

    #[inline]
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for TickSpacing {
    type Error = CoreError;

    fn try_from(spacing: i32) -> Result<Self> {
        Self::new(spacing)
    }
}

impl From<TickSpacing> for i32 {
    fn from(spacing: TickSpacing) -> Self {
        spacing.0
    }
}

impl fmt::Display for TickSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
