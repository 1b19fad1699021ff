//! Proof-of-work check and difficulty retargeting.
//!
//! **IMPORTANT**: the difficulty target is a CEILING:
//! - HIGHER target number = EASIER (more valid hashes below it)
//! - LOWER target number = HARDER (fewer valid hashes below it)
//!
//! Retargeting is linear over a fixed ancestor window and only ever capped
//! from above (at the easiest allowed target); there is no floor.

use crate::config::ConsensusConfig;
use crate::error::{ConsensusError, ConsensusResult};
use shared_crypto::sha256;
use shared_types::difficulty::compact_round_trip;
use shared_types::entities::{Block, U256};
use shared_types::LedgerStore;

/// Proof-of-work check: the block's full serialized form must hash
/// strictly below its target.
pub fn check_proof(block: &Block) -> bool {
    let hash = sha256(&block.full_bytes());
    U256::from_big_endian(&hash) < block.target_difficulty
}

/// Compute the target the child of `prev` must carry.
///
/// - No previous block: the fixed initial ceiling.
/// - Fewer than `config.blockspan` ancestors behind `prev`: reuse
///   `prev.target_difficulty` unchanged.
/// - Full window: scale `prev.target_difficulty` linearly by
///   `(prev.time - tail.time) / target_timespan`, cap at the easiest
///   allowed target, then round through the compact encoding so every
///   node lands on the same integer.
pub fn next_difficulty(
    store: &dyn LedgerStore,
    prev: Option<&Block>,
    config: &ConsensusConfig,
) -> ConsensusResult<U256> {
    let Some(prev) = prev else {
        return Ok(config.initial_target);
    };

    // Walk blockspan parent links back from prev to the window tail.
    let mut cursor = prev.clone();
    for _ in 0..config.blockspan {
        if cursor.extends_genesis() {
            // Window incomplete: skip retargeting.
            return Ok(prev.target_difficulty);
        }
        cursor = store
            .get_block(&cursor.previous_hash)?
            .ok_or(ConsensusError::BrokenLineage(cursor.previous_hash))?;
    }

    let elapsed = U256::from(prev.time.saturating_sub(cursor.time).max(1));
    let timespan = U256::from(config.target_timespan);

    // target * elapsed / timespan, split to avoid 256-bit overflow.
    let quotient = prev.target_difficulty / timespan;
    let remainder = prev.target_difficulty % timespan;
    let mut next = quotient
        .saturating_mul(elapsed)
        .saturating_add(remainder.saturating_mul(elapsed) / timespan);

    if next > config.easiest_target {
        next = config.easiest_target;
    }

    Ok(compact_round_trip(next))
}
