//! Log subscriber setup for the simulator and tests.
//!
//! Events go to stderr so that stdout carries only the run summary.

use crate::error::{TelemetryError, TelemetryResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,tpo=debug";

/// Output format of log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, fields flattened to the top level.
    Json,
    /// Multi-line human-readable events.
    Pretty,
    /// Single-line human-readable events.
    Compact,
}

impl LogFormat {
    /// Resolve from `TPO_LOG_FORMAT`, else `RUST_ENV=production` selects JSON.
    pub fn from_env() -> Self {
        let explicit = std::env::var("TPO_LOG_FORMAT").ok();
        let production = std::env::var("RUST_ENV").is_ok_and(|v| v == "production");
        Self::resolve(explicit.as_deref(), production)
    }

    fn resolve(explicit: Option<&str>, production: bool) -> Self {
        match explicit.map(str::to_ascii_lowercase).as_deref() {
            Some("json") => Self::Json,
            Some("pretty") => Self::Pretty,
            Some("compact") => Self::Compact,
            _ if production => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Install the global subscriber with the format from the environment.
///
/// The filter comes from `RUST_LOG`, defaulting to `info,tpo=debug`.
pub fn init_logging() -> TelemetryResult<()> {
    init_logging_with(LogFormat::from_env())
}

pub fn init_logging_with(format: LogFormat) -> TelemetryResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}
