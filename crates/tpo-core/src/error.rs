//! Error types for tpo-core.

use thiserror::Error;

/// Core validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Invalid tick spacing: {0} (must be positive)")]
    InvalidTickSpacing(i32),

    #[error("Tick {tick} out of range [{min}, {max}]")]
    TickOutOfRange { tick: i32, min: i32, max: i32 },

    #[error("Amount must be non-zero")]
    ZeroAmount,

    #[error("Invalid pool: {0}")]
    InvalidPool(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
