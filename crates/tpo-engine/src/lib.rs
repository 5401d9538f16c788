//! Take-profit order engine.
//!
//! Resting orders sit at (pool, quantized tick, direction) levels. After
//! every external trade the engine compares the pool's tick with the last
//! tick it observed, walks the levels in between, and executes eligible
//! orders against the pool one at a time, re-reading the live tick after
//! each fill. Depositors redeem their pro-rata share of the proceeds.
//!
//! The engine never talks to a pool directly; it drives the collaborator
//! traits in [`venue`] and the share ledger from `tpo-book`.

pub mod config;
pub mod crossing;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod venue;

pub use config::EngineConfig;
pub use crossing::{
    detect_crossing, CrossingReport, Detection, EligibleLevel, FillRecord, ScanLevels, ScanWindow,
};
pub use engine::{PoolPhase, PoolState, TakeProfitEngine};
pub use error::{EngineError, EngineResult, VenueError, VenueResult};
pub use lifecycle::PlacedOrder;
pub use venue::{AssetTransfer, PoolStateReader, TradeExecutor, Venue};

#[cfg(test)]
mod testing;
