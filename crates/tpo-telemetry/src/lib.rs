//! Prometheus metrics and structured logging.
//!
//! - Prometheus metrics for order lifecycle, fills and crossing passes
//! - tracing-subscriber setup with JSON, pretty or compact output

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, init_logging_with, LogFormat};
pub use metrics::Metrics;
