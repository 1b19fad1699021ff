//! # Agreement Subsystem
//!
//! Turns an unsigned proposal into a fully signed, gossiped contract via a
//! two-phase signature exchange, tracks every outstanding request in a
//! timeout-bearing request cache, and answers/aggregates confirmation
//! depth queries.
//!
//! ## Request lifecycle
//!
//! `Proposed` (initiator signed, sent) -> `CounterSigned` (peer validated
//! and signed, returned) -> `Finalized` (both sides stored), or `TimedOut`
//! when no response arrives in the window. Retries after a timeout are the
//! caller's responsibility for signature and traversal requests; block
//! requests retry themselves.
//!
//! Failure semantics: an invalid signature, an unverifiable contract or an
//! admission rejection silently drops the message (logged) and leaves the
//! sender's request pending until it times out.

pub mod domain;
pub mod error;
pub mod service;

pub use domain::requests::{AgreementPhase, PendingRequest, RequestCache};
pub use error::{AgreementError, AgreementResult};
pub use service::{AgreementEvent, AgreementService};
