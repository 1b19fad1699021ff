//! Structured logging initialization.

use crate::TelemetryConfig;
use tracing_subscriber::{fmt, EnvFilter};

/// Errors raised during telemetry setup.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(String),
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when present. Safe to call
/// once per process; a second call reports the conflict instead of
/// panicking.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| TelemetryError::Subscriber(e.to_string()))?;
    tracing::debug!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "telemetry initialized"
    );
    Ok(())
}
