//! Test fixtures shared by the consensus unit tests.

use shared_crypto::Ed25519KeyPair;
use shared_types::entities::{Block, BlockIndex, Contract, Hash, U256};
use shared_types::{LedgerStore, StoreResult, GENESIS_ID};
use std::collections::HashMap;

/// In-memory store mirroring the runtime adapter, trimmed to what the
/// consensus tests exercise.
#[derive(Default)]
pub struct TestStore {
    blocks: HashMap<Hash, Block>,
    contracts: HashMap<Hash, Contract>,
    indexes: Vec<BlockIndex>,
}

impl TestStore {
    pub fn with_blocks(blocks: &[Block]) -> Self {
        let mut store = Self::default();
        for block in blocks {
            store.blocks.insert(block.id(), block.clone());
        }
        store
    }
}

impl LedgerStore for TestStore {
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
            .filter(|c| predicate(c))
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
        Ok(())
    }
}

/// Deterministic creator identity used across fixtures.
pub fn creator() -> Ed25519KeyPair {
    Ed25519KeyPair::from_seed([9u8; 32])
}

/// Build an unsigned chain of empty blocks with the given times, linked
/// from the genesis marker, all carrying `target`.
pub fn chain_of(times: &[u64], target: U256) -> Vec<Block> {
    let creator = creator();
    let mut blocks: Vec<Block> = Vec::new();
    let mut parent = GENESIS_ID;
    for &time in times {
        let block = Block::new(creator.public_key_bytes(), parent, Vec::new(), target, time);
        parent = block.id();
        blocks.push(block);
    }
    blocks
}

/// Build a signed child of `parent` (or genesis) with the given time.
pub fn signed_child(parent: Option<&Block>, target: U256, time: u64) -> Block {
    let creator = creator();
    let previous = parent.map(|p| p.id()).unwrap_or(GENESIS_ID);
    let mut block = Block::new(creator.public_key_bytes(), previous, Vec::new(), target, time);
    block.sign(&creator);
    block
}
