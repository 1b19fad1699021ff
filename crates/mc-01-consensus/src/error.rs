//! Error types for the consensus subsystem.

use shared_types::entities::{BlockFlaw, Hash, U256};
use shared_types::StoreError;

/// Consensus error types.
///
/// Every variant maps onto the rejection taxonomy: invalid blocks are
/// dropped and logged, never propagated past the service boundary.
#[derive(Debug, thiserror::Error)]
pub enum ConsensusError {
    #[error("Creator signature verification failed")]
    InvalidSignature,

    #[error("Block hash does not satisfy its difficulty target")]
    InvalidProof,

    #[error("Wrong difficulty: expected {expected}, got {actual}")]
    WrongDifficulty { expected: U256, actual: U256 },

    #[error("Structural flaw: {0}")]
    Flaw(#[from] BlockFlaw),

    #[error("Contract {0:?} in block carries an invalid signature")]
    BadContractSignature(Hash),

    #[error("Timestamp too far in future: {time}, local clock is {now}")]
    FutureTimestamp { time: u64, now: u64 },

    #[error("Timestamp {time} is older than ancestor median {median}")]
    TimeTooOld { time: u64, median: u64 },

    #[error("Ancestor {0:?} missing; process_block requires full lineage")]
    BrokenLineage(Hash),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for consensus operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;
