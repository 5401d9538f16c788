//! In-memory host for the take-profit order engine.
//!
//! - `SimulatedVenue`: pools with a tick-indexed price and linear depth,
//!   per-account balances, a queue of post-trade notices
//! - `router::swap`: external trades that notify the engine, the same way a
//!   pool calls its hook after every swap
//! - `Simulation`: replays TOML scenarios step by step

pub mod app;
pub mod config;
pub mod error;
pub mod router;
pub mod venue;

pub use app::{Simulation, StepOutcome, Summary};
pub use config::{AccountConfig, BalanceConfig, PoolConfig, SimConfig, Step};
pub use error::{SimError, SimResult};
pub use router::{swap, SwapOutcome};
pub use venue::{SimPool, SimulatedVenue, TradeNotice};
