//! Block production configuration.

use shared_types::{MAX_BLOCK_BYTES, MAX_MINE_ATTEMPTS};

/// Tunables for candidate assembly and mining.
#[derive(Clone, Debug)]
pub struct ProducerConfig {
    /// Byte budget a serialized candidate must fit, signature included.
    pub max_block_bytes: usize,

    /// Upper bound on time-increment mining attempts per tick; unsolved
    /// candidates are abandoned and rebuilt next tick.
    pub max_mine_attempts: u64,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            max_block_bytes: MAX_BLOCK_BYTES,
            max_mine_attempts: MAX_MINE_ATTEMPTS,
        }
    }
}
