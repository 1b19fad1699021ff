//! # Shared Types Crate
//!
//! This crate contains the ledger entities, document payloads, wire message
//! types, the persistence contract and the protocol constants shared across
//! all Mortgage-Chain subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-subsystem types are defined here.
//! - **Canonical bytes**: contracts and blocks hash and sign over explicit
//!   field-by-field byte forms, never over serializer output, so any two
//!   implementations agree byte-for-byte.
//! - **Content addressing**: ids are SHA-256 over content fields only;
//!   signing never changes an id.

pub mod constants;
pub mod difficulty;
pub mod documents;
pub mod entities;
pub mod errors;
pub mod messages;
pub mod store;
pub mod time;

pub use constants::*;
pub use difficulty::{compact_from_target, difficulty_init, difficulty_min, target_from_compact};
pub use documents::{Document, Investment, Mortgage, Transfer};
pub use entities::*;
pub use errors::CodecError;
pub use messages::{GatewayError, LedgerMessage, MessageGateway};
pub use store::{LedgerStore, StoreError, StoreResult};
pub use time::{MockTimeSource, SystemTimeSource, TimeSource};
