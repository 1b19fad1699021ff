//! # Block Production Subsystem
//!
//! Runs on a fixed timer tick. Each tick assembles a candidate block from
//! the pending-contract pool (dependency order, byte budget, block-level
//! admission), mines it with a bounded time-search, and submits it through
//! the consensus service exactly as an externally-received block would be
//! — self-produced and remote blocks are validated identically.
//!
//! Real block production is gated by proof-of-work difficulty, so most
//! ticks find nothing new to mine.

pub mod config;
pub mod domain;
pub mod error;
pub mod service;

pub use config::ProducerConfig;
pub use error::{ProductionError, ProductionResult};
pub use service::{BlockProducer, ProductionOutcome};
