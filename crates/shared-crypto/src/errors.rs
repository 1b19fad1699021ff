//! Error types for cryptographic operations.

/// Errors raised by signature and key handling.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid public key bytes")]
    InvalidPublicKey,

    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    #[error("Signature is empty (party has not signed)")]
    EmptySignature,

    #[error("Identity matches neither party of the contract")]
    NotAParty,
}

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
