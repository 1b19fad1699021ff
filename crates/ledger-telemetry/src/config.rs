//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for node logging.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name stamped on every log line.
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error); overridden by
    /// `RUST_LOG` when set.
    pub log_level: String,

    /// Whether to emit JSON formatted logs (for log shipping) instead of
    /// human-readable output.
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "mortgage-chain".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MC_SERVICE_NAME`: Service name (default: mortgage-chain)
    /// - `MC_LOG_LEVEL`: Log level (default: info)
    /// - `MC_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            service_name: env::var("MC_SERVICE_NAME").unwrap_or(defaults.service_name),
            log_level: env::var("MC_LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logs: env::var("MC_JSON_LOGS")
                .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.json_logs),
        }
    }
}
