//! # Persistence Contract
//!
//! The small CRUD-style interface the ledger engine requires from its
//! storage collaborator. Storage mechanics (files, databases, schemas) are
//! out of scope; an in-memory adapter lives in the node runtime.
//!
//! Blocks are persisted unconditionally once they pass validation — forks
//! included. Only the best chain carries `BlockIndex` entries.

use crate::entities::{Block, BlockIndex, Contract, Hash};

/// Errors surfaced by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage backend failure: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations required by the ledger engine.
///
/// Calls must not block the event loop for long; a production adapter
/// should buffer writes and flush on [`LedgerStore::commit`].
pub trait LedgerStore {
    /// Persist a block, keyed by its id. Idempotent.
    fn add_block(&mut self, block: &Block) -> StoreResult<()>;

    /// Fetch a block by id.
    fn get_block(&self, id: &Hash) -> StoreResult<Option<Block>>;

    /// Best-chain index entries, descending by height. `limit` bounds the
    /// number returned from the tip downward.
    fn get_block_indexes(&self, limit: Option<usize>) -> StoreResult<Vec<BlockIndex>>;

    /// Append a best-chain index entry.
    fn add_block_index(&mut self, index: BlockIndex) -> StoreResult<()>;

    /// Remove every index entry with `height >= from_height`.
    fn remove_block_indexes(&mut self, from_height: u64) -> StoreResult<()>;

    /// Persist a contract, keyed by its id. Idempotent.
    fn add_contract(&mut self, contract: &Contract) -> StoreResult<()>;

    /// Fetch a contract by id.
    fn get_contract(&self, id: &Hash) -> StoreResult<Option<Contract>>;

    /// All persisted contracts matching the predicate.
    fn find_contracts(&self, predicate: &dyn Fn(&Contract) -> bool) -> StoreResult<Vec<Contract>>;

    /// Whether the contract appears in a block on the best chain.
    fn contract_on_blockchain(&self, id: &Hash) -> StoreResult<bool>;

    /// Flush buffered writes. Driven by a periodic timer.
    fn commit(&mut self) -> StoreResult<()>;
}
