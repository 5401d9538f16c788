//! Pool identification types.
//!
//! A pool is identified by its sorted asset pair, its fee tier and its
//! tick spacing. The key is a plain composite value and is used directly
//! as a map key everywhere.

use crate::error::{CoreError, Result};
use crate::order::Direction;
use crate::tick::{Tick, TickSpacing};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fungible asset identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub u32);

impl AssetId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset_{}", self.0)
    }
}

/// Unique pool identifier.
///
/// `currency0` must sort strictly before `currency1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    pub currency0: AssetId,
    pub currency1: AssetId,
    /// Swap fee in basis points.
    pub fee_bps: u32,
    pub tick_spacing: TickSpacing,
}

impl PoolKey {
    pub fn new(
        currency0: AssetId,
        currency1: AssetId,
        fee_bps: u32,
        tick_spacing: TickSpacing,
    ) -> Result<Self> {
        if currency0 >= currency1 {
            return Err(CoreError::InvalidPool(format!(
                "currency0 ({currency0}) must sort before currency1 ({currency1})"
            )));
        }
        Ok(Self {
            currency0,
            currency1,
            fee_bps,
            tick_spacing,
        })
    }

    /// Asset a trade in `direction` hands to the pool.
    pub fn input_asset(&self, direction: Direction) -> AssetId {
        match direction {
            Direction::ZeroForOne => self.currency0,
            Direction::OneForZero => self.currency1,
        }
    }

    /// Asset a trade in `direction` receives from the pool.
    pub fn output_asset(&self, direction: Direction) -> AssetId {
        self.input_asset(direction.opposite())
    }

    /// Quantize `tick` with this pool's spacing.
    #[inline]
    pub fn quantize(&self, tick: Tick) -> Option<Tick> {
        tick.quantize(self.tick_spacing)
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}:{}bps:{}",
            self.currency0.0, self.currency1.0, self.fee_bps, self.tick_spacing
        )
    }
}
