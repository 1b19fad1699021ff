//! # Mortgage-Chain Test Suite
//!
//! Unified test crate for cross-subsystem flows.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Cross-subsystem flows over in-process nodes
//!     ├── harness.rs    # Multi-node wiring helpers
//!     ├── agreement_flow.rs
//!     ├── chain_flow.rs
//!     └── traversal_flow.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mc-tests
//! cargo test -p mc-tests integration::
//! ```

#![allow(dead_code)]

pub mod integration;
