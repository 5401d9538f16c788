//! Simulator error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine error: {0}")]
    Engine(#[from] tpo_engine::EngineError),

    #[error("Venue error: {0}")]
    Venue(#[from] tpo_engine::VenueError),

    #[error("Validation error: {0}")]
    Core(#[from] tpo_core::CoreError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] tpo_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
