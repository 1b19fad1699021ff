//! Protocol constants shared across subsystems.
//!
//! Difficulty-related ceilings live in [`crate::difficulty`]; everything
//! here is a plain scalar.

/// Target spacing between blocks, in seconds.
pub const TARGET_SPACING: u64 = 30;

/// Retarget window span, in seconds.
pub const TARGET_TIMESPAN: u64 = 300;

/// Number of ancestor links in a full retarget window.
pub const BLOCKSPAN: u64 = TARGET_TIMESPAN / TARGET_SPACING;

/// Wire budget: every message and every serialized block must fit.
///
/// Deliberately small; forces small blocks and frequent production.
pub const MAX_BLOCK_BYTES: usize = 1500;

/// Fixed parent marker of height-1 blocks (32 zero bytes).
pub const GENESIS_ID: [u8; 32] = [0u8; 32];

/// Upper bound on time-increment mining attempts per production tick.
pub const MAX_MINE_ATTEMPTS: u64 = 4096;

/// Maximum seconds a block time may run ahead of local time.
pub const MAX_CLOCK_DRIFT: u64 = 7200;

/// Number of ancestors in the median-time-past window.
pub const MEDIAN_TIME_SPAN: usize = 11;

/// Cap on buffered orphan blocks; the oldest is evicted beyond this.
pub const MAX_ORPHANS: usize = 1024;

/// Block production timer period, in seconds.
pub const PRODUCTION_TICK_SECS: u64 = 1;

/// Timeout for outstanding signature/block/traversal requests, in millis.
pub const REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Periodic persistence commit interval, in seconds.
pub const COMMIT_INTERVAL_SECS: u64 = 60;
