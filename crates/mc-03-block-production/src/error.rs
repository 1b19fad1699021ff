//! Error types for block production.

use shared_types::entities::Hash;
use shared_types::StoreError;

/// Block production error types.
#[derive(Debug, thiserror::Error)]
pub enum ProductionError {
    #[error("Best-chain tip {0:?} is missing from storage")]
    MissingTip(Hash),

    #[error(transparent)]
    Consensus(#[from] mc_01_consensus::ConsensusError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for production operations.
pub type ProductionResult<T> = Result<T, ProductionError>;
