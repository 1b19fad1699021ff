//! Block validation.
//!
//! Split in two passes:
//! - [`validate_block`] needs no chain context and runs on every block the
//!   moment it arrives (signature, structure, proof-of-work, clock drift).
//! - [`validate_ancestry`] needs the parent lineage and runs just before a
//!   block is processed into the chain (median-time-past). The difficulty
//!   re-check also needs the parent and lives in
//!   [`super::chain::ChainManager::process_block`].

use crate::config::ConsensusConfig;
use crate::domain::proof::check_proof;
use crate::error::{ConsensusError, ConsensusResult};
use shared_types::entities::Block;
use shared_types::{LedgerStore, GENESIS_ID};

/// Context-free validation: creator signature, structural integrity,
/// contract signatures, proof-of-work, and local clock drift.
pub fn validate_block(
    block: &Block,
    now_secs: u64,
    config: &ConsensusConfig,
) -> ConsensusResult<()> {
    block
        .verify()
        .map_err(|_| ConsensusError::InvalidSignature)?;

    block.check_integrity()?;

    for contract in &block.contracts {
        if contract.verify_both().is_err() {
            return Err(ConsensusError::BadContractSignature(contract.id()));
        }
    }

    if !check_proof(block) {
        return Err(ConsensusError::InvalidProof);
    }

    if block.time > now_secs + config.max_clock_drift {
        return Err(ConsensusError::FutureTimestamp {
            time: block.time,
            now: now_secs,
        });
    }

    Ok(())
}

/// Contextual validation: the block's time must not be older than the
/// median time of its last `config.median_time_span` ancestors.
pub fn validate_ancestry(
    block: &Block,
    store: &dyn LedgerStore,
    config: &ConsensusConfig,
) -> ConsensusResult<()> {
    let mut times = Vec::with_capacity(config.median_time_span);
    let mut cursor = block.previous_hash;
    while times.len() < config.median_time_span {
        if cursor == GENESIS_ID {
            break;
        }
        let ancestor = store
            .get_block(&cursor)?
            .ok_or(ConsensusError::BrokenLineage(cursor))?;
        times.push(ancestor.time);
        cursor = ancestor.previous_hash;
    }

    if times.is_empty() {
        return Ok(());
    }

    times.sort_unstable();
    let median = times[times.len() / 2];
    if block.time < median {
        return Err(ConsensusError::TimeTooOld {
            time: block.time,
            median,
        });
    }

    Ok(())
}
