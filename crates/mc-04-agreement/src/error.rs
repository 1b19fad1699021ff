//! Error types for the agreement subsystem.

use mc_02_contract_pool::{AdmissionError, PoolError};
use shared_crypto::CryptoError;
use shared_types::StoreError;

/// Agreement protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum AgreementError {
    #[error("Caller is neither party of the proposed contract")]
    NotAParty,

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Admission(#[from] AdmissionError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for agreement operations.
pub type AgreementResult<T> = Result<T, AgreementError>;
