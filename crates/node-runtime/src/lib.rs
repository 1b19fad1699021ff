//! # Mortgage-Chain Node Runtime
//!
//! Wires the subsystems into a single-threaded, event-driven node:
//!
//! - All ledger mutation (block/contract admission, reorganization, pool
//!   updates) happens on one logical task through [`LedgerContext`]; no
//!   internal locking, no hidden global state.
//! - Network I/O, timers and inbound message handling are the only
//!   suspension points; every ledger operation itself is synchronous.
//! - Timers: the 1 s block-production tick, the request-cache sweep, and
//!   the periodic store commit.
//!
//! The transport is an injected [`shared_types::MessageGateway`]; the
//! in-process channel gateway in [`adapters`] serves local clusters and
//! integration tests.

pub mod adapters;
pub mod config;
pub mod context;
pub mod node;

pub use adapters::{ChannelGateway, MemoryLedgerStore};
pub use config::NodeConfig;
pub use context::LedgerContext;
pub use node::LedgerNode;
