//! Error types for the contract pool subsystem.

use shared_types::entities::Hash;
use shared_types::{CodecError, StoreError};

/// Pool bookkeeping errors.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("Contract {0:?} already pending")]
    Duplicate(Hash),
}

/// Admission policy rejections.
///
/// Every variant is a Conflict in the rejection taxonomy: the object is
/// dropped and logged, and the sender's pending request times out.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("Parent contract {0:?} is unknown")]
    UnknownParent(Hash),

    #[error("Transfer double-spends parent {0:?}: a sibling transfer already exists")]
    DoubleSpend(Hash),

    #[error("Investments totaling {total} exceed financeable {financeable} on mortgage {mortgage:?}")]
    Overspend {
        mortgage: Hash,
        total: u64,
        financeable: u64,
    },

    #[error("Investment contract has no mortgage parent")]
    MissingMortgageParent,

    #[error("Parent {0:?} of investment is not a mortgage")]
    NotAMortgage(Hash),

    #[error("Undecodable document payload")]
    BadDocument,

    #[error(transparent)]
    BadParentRef(#[from] CodecError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
