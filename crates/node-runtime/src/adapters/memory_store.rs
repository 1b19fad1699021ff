//! In-memory implementation of the persistence contract.
//!
//! Blocks and contracts live in hash maps keyed by content id; the
//! best-chain index is a plain vector queried in height order. `commit` is
//! a no-op flush point, kept so the runtime exercises the same timer a
//! durable adapter would.

use shared_types::entities::{Block, BlockIndex, Contract, Hash};
use shared_types::{LedgerStore, StoreResult};
use std::collections::HashMap;
use tracing::debug;

/// Volatile ledger storage.
#[derive(Default)]
pub struct MemoryLedgerStore {
    blocks: HashMap<Hash, Block>,
    contracts: HashMap<Hash, Contract>,
    indexes: Vec<BlockIndex>,
}

impl MemoryLedgerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blocks, forks included.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn add_block(&mut self, block: &Block) -> StoreResult<()> {
        self.blocks.insert(block.id(), block.clone());
        Ok(())
    }

    fn get_block(&self, id: &Hash) -> StoreResult<Option<Block>> {
        Ok(self.blocks.get(id).cloned())
    }

    fn get_block_indexes(&self, limit: Option<usize>) -> StoreResult<Vec<BlockIndex>> {
        let mut indexes = self.indexes.clone();
        indexes.sort_by(|a, b| b.height.cmp(&a.height));
        if let Some(limit) = limit {
            indexes.truncate(limit);
        }
        Ok(indexes)
    }

    fn add_block_index(&mut self, index: BlockIndex) -> StoreResult<()> {
        self.indexes.push(index);
        Ok(())
    }

    fn remove_block_indexes(&mut self, from_height: u64) -> StoreResult<()> {
        self.indexes.retain(|entry| entry.height < from_height);
        Ok(())
    }

    fn add_contract(&mut self, contract: &Contract) -> StoreResult<()> {
        self.contracts.insert(contract.id(), contract.clone());
        Ok(())
    }

    fn get_contract(&self, id: &Hash) -> StoreResult<Option<Contract>> {
        Ok(self.contracts.get(id).cloned())
    }

    fn find_contracts(&self, predicate: &dyn Fn(&Contract) -> bool) -> StoreResult<Vec<Contract>> {
        Ok(self
            .contracts
            .values()
            .filter(|contract| predicate(contract))
            .cloned()
            .collect())
    }

    fn contract_on_blockchain(&self, id: &Hash) -> StoreResult<bool> {
        for entry in &self.indexes {
            if let Some(block) = self.blocks.get(&entry.block_id) {
                if block.contracts.iter().any(|c| c.id() == *id) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn commit(&mut self) -> StoreResult<()> {
        debug!(
            blocks = self.blocks.len(),
            contracts = self.contracts.len(),
            "memory store commit"
        );
        Ok(())
    }
}
