//! # Contract Pool Subsystem
//!
//! Holds finalized-but-unchained contracts awaiting block inclusion, and
//! enforces the market admission policy:
//!
//! - **Parent existence**: a contract referencing an unknown parent is
//!   rejected (optional for the preliminary pass).
//! - **Double-spend**: only one TRANSFER may descend from a given prior
//!   contract.
//! - **Overspend**: INVESTMENT contracts descending from one MORTGAGE may
//!   not collectively exceed its financeable portion.
//!
//! Policy checks run twice: a preliminary pass when a contract arrives
//! (pool + persisted state) and a block-admission pass when the producer
//! selects contracts (chain-confirmed state plus the block being built),
//! because two peers can race conflicting contracts before either chains.

pub mod domain;

pub use domain::admission::AdmissionPolicy;
pub use domain::errors::{AdmissionError, PoolError};
pub use domain::pool::PendingPool;
