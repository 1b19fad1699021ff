//! Bounded proof-of-work search.
//!
//! The block content carries no nonce, so the search variable is the
//! block time: each attempt advances `time` by one second, re-signs (the
//! creator signature covers the canonical bytes, and the proof hash
//! covers the signature), and tests the proof. The bound keeps a tick
//! from stalling the event loop; an unsolved candidate is rebuilt on the
//! next tick.

use mc_01_consensus::check_proof;
use shared_crypto::Ed25519KeyPair;
use shared_types::entities::Block;

/// Mine `block` in place, advancing its time up to `max_attempts` steps.
///
/// Returns the solved, signed block, or `None` when the bound runs out.
pub fn mine(mut block: Block, identity: &Ed25519KeyPair, max_attempts: u64) -> Option<Block> {
    let base_time = block.time;
    for attempt in 0..max_attempts {
        block.time = base_time + attempt;
        block.sign(identity);
        if check_proof(&block) {
            return Some(block);
        }
    }
    None
}
