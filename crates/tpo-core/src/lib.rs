//! Core domain types for the take-profit order hook.
//!
//! This crate provides the primitives shared by every other crate:
//! - `PoolKey`: Identity of an AMM pool (asset pair, fee, tick spacing)
//! - `Tick`, `TickSpacing`: Discretised price and its quantization
//! - `Direction`: Which pool asset is being sold
//! - `LevelKey`, `OrderId`: Composite key of a resting price level
//! - `AccountId`, `AssetId`, `Amount`: Ownership and custody primitives

pub mod account;
pub mod error;
pub mod order;
pub mod pool;
pub mod tick;

pub use account::{AccountId, Amount};
pub use error::{CoreError, Result};
pub use order::{Direction, LevelKey, OrderId};
pub use pool::{AssetId, PoolKey};
pub use tick::{Tick, TickSpacing, MAX_TICK, MIN_TICK};
