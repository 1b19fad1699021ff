//! Shared codec error types.
//!
//! A failed decode is never fatal: callers drop the object, log, and
//! continue (see the error taxonomy in the runtime crate).

/// Errors raised while encoding or decoding ledger objects.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Failed to decode {what}: {detail}")]
    Decode { what: &'static str, detail: String },

    #[error("Failed to encode {what}: {detail}")]
    Encode { what: &'static str, detail: String },

    #[error("Encoded {what} is {size} bytes, exceeds wire limit {limit}")]
    Oversize {
        what: &'static str,
        size: usize,
        limit: usize,
    },

    #[error("previous_hash must be empty or 32 bytes, got {0}")]
    BadPreviousHash(usize),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
