//! Consensus configuration.
//!
//! Defaults are the protocol constants; tests substitute easier targets so
//! real mining stays fast.

use shared_types::difficulty::{difficulty_init, difficulty_min};
use shared_types::entities::U256;
use shared_types::{
    BLOCKSPAN, MAX_CLOCK_DRIFT, MAX_ORPHANS, MEDIAN_TIME_SPAN, TARGET_TIMESPAN,
};

/// Tunables for proof-of-work validation and chain selection.
#[derive(Clone, Debug)]
pub struct ConsensusConfig {
    /// Initial proof-of-work ceiling for a chain with no history.
    pub initial_target: U256,

    /// Easiest allowed ceiling; retargeting caps here. There is no floor.
    pub easiest_target: U256,

    /// Retarget window span in seconds.
    pub target_timespan: u64,

    /// Ancestor links in a full retarget window.
    pub blockspan: u64,

    /// Max seconds a block time may run ahead of the local clock.
    pub max_clock_drift: u64,

    /// Ancestors in the median-time-past window.
    pub median_time_span: usize,

    /// Cap on buffered orphan blocks.
    pub max_orphans: usize,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            initial_target: difficulty_init(),
            easiest_target: difficulty_min(),
            target_timespan: TARGET_TIMESPAN,
            blockspan: BLOCKSPAN,
            max_clock_drift: MAX_CLOCK_DRIFT,
            median_time_span: MEDIAN_TIME_SPAN,
            max_orphans: MAX_ORPHANS,
        }
    }
}

impl ConsensusConfig {
    /// Targets easy enough for real mining inside tests: roughly one hash
    /// in 256 satisfies the initial target.
    pub fn for_tests() -> Self {
        Self {
            initial_target: U256::from(0xffff) << (8 * 29),
            easiest_target: U256::from(0xffff) << (8 * 30),
            ..Self::default()
        }
    }
}
