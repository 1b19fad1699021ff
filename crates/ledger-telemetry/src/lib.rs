//! # Ledger Telemetry
//!
//! Structured logging setup shared by every node binary and integration
//! test. Log lines carry a `subsystem` field (`mc-01`..`mc-04`, `runtime`)
//! so a log pipeline can split them per subsystem.

pub mod config;
pub mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, TelemetryError};
