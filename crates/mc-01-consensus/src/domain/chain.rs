//! Best-chain state and reorganization.
//!
//! The manager mirrors the persisted `BlockIndex` entries in memory for
//! O(1) id-to-height lookups. Only the best chain is indexed; losing forks
//! stay in storage without an index entry until a reorganization pulls
//! them in.

use crate::config::ConsensusConfig;
use crate::domain::proof::next_difficulty;
use crate::error::{ConsensusError, ConsensusResult};
use shared_types::entities::{Block, BlockIndex, Hash};
use shared_types::{LedgerStore, GENESIS_ID};
use std::collections::HashMap;
use tracing::{debug, info};

/// Tracks the best (highest) chain and performs reorganization.
pub struct ChainManager {
    config: ConsensusConfig,
    /// Best-chain membership: block id to height.
    index: HashMap<Hash, u64>,
    /// Current best tip.
    tip: BlockIndex,
}

impl ChainManager {
    /// Rebuild the in-memory index from storage, anchoring the genesis
    /// marker at height 0 on first start.
    pub fn bootstrap(store: &mut dyn LedgerStore, config: ConsensusConfig) -> ConsensusResult<Self> {
        let entries = store.get_block_indexes(None)?;
        if entries.is_empty() {
            let anchor = BlockIndex {
                block_id: GENESIS_ID,
                height: 0,
            };
            store.add_block_index(anchor)?;
            return Ok(Self {
                config,
                index: HashMap::from([(GENESIS_ID, 0)]),
                tip: anchor,
            });
        }

        let tip = entries[0];
        let index = entries
            .iter()
            .map(|entry| (entry.block_id, entry.height))
            .collect();
        Ok(Self { config, index, tip })
    }

    /// The configuration this chain validates against.
    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Current best tip entry.
    pub fn best_tip(&self) -> BlockIndex {
        self.tip
    }

    /// Current best height.
    pub fn best_height(&self) -> u64 {
        self.tip.height
    }

    /// Height of a block on the best chain, if indexed.
    pub fn height_of(&self, id: &Hash) -> Option<u64> {
        self.index.get(id).copied()
    }

    /// Process a block whose full lineage is present in storage.
    ///
    /// Re-derives the expected difficulty against the actual parent (this
    /// cannot happen at initial validation because the parent may be
    /// unknown then), persists the block, walks back to the fork point and
    /// reorganizes when — and only when — the candidate chain is strictly
    /// higher than the current best.
    ///
    /// Returns `true` when the best chain changed.
    pub fn process_block(
        &mut self,
        store: &mut dyn LedgerStore,
        block: &Block,
    ) -> ConsensusResult<bool> {
        let id = block.id();
        if self.index.contains_key(&id) {
            debug!("block already indexed, ignoring");
            return Ok(false);
        }

        let parent = if block.extends_genesis() {
            None
        } else {
            Some(
                store
                    .get_block(&block.previous_hash)?
                    .ok_or(ConsensusError::BrokenLineage(block.previous_hash))?,
            )
        };

        let expected = next_difficulty(store, parent.as_ref(), &self.config)?;
        if expected != block.target_difficulty {
            return Err(ConsensusError::WrongDifficulty {
                expected,
                actual: block.target_difficulty,
            });
        }

        store.add_block(block)?;

        // Walk back until the candidate connects to the indexed chain or
        // bottoms out at the genesis marker. Tip-to-root order.
        let mut segment: Vec<Hash> = vec![id];
        let mut cursor = block.previous_hash;
        let fork_height = loop {
            if let Some(height) = self.index.get(&cursor) {
                break *height;
            }
            if cursor == GENESIS_ID {
                break 0;
            }
            let ancestor = store
                .get_block(&cursor)?
                .ok_or(ConsensusError::BrokenLineage(cursor))?;
            segment.push(ancestor.id());
            cursor = ancestor.previous_hash;
        };

        let candidate_height = fork_height + segment.len() as u64;
        if candidate_height <= self.tip.height {
            // Equal height keeps the incumbent: reorganization only on
            // strict improvement.
            debug!(
                candidate_height,
                best_height = self.tip.height,
                "stored fork block without reorganization"
            );
            return Ok(false);
        }

        if fork_height < self.tip.height {
            info!(
                fork_height,
                old_height = self.tip.height,
                new_height = candidate_height,
                "reorganizing best chain"
            );
        }

        store.remove_block_indexes(fork_height + 1)?;
        self.index.retain(|_, height| *height <= fork_height);

        for (offset, block_id) in segment.iter().rev().enumerate() {
            let height = fork_height + 1 + offset as u64;
            let entry = BlockIndex {
                block_id: *block_id,
                height,
            };
            store.add_block_index(entry)?;
            self.index.insert(*block_id, height);
        }

        self.tip = BlockIndex {
            block_id: id,
            height: candidate_height,
        };
        debug!(height = candidate_height, "best chain extended");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{signed_child, TestStore};
    use shared_types::difficulty::difficulty_init;

    fn manager(store: &mut TestStore) -> ChainManager {
        ChainManager::bootstrap(store, ConsensusConfig::default()).unwrap()
    }

    #[test]
    fn test_bootstrap_anchors_genesis() {
        let mut store = TestStore::default();
        let chain = manager(&mut store);

        assert_eq!(chain.best_height(), 0);
        assert_eq!(chain.height_of(&GENESIS_ID), Some(0));
        assert_eq!(store.get_block_indexes(None).unwrap().len(), 1);
    }

    #[test]
    fn test_extend_chain() {
        let mut store = TestStore::default();
        let mut chain = manager(&mut store);

        let b1 = signed_child(None, difficulty_init(), 1000);
        assert!(chain.process_block(&mut store, &b1).unwrap());
        assert_eq!(chain.best_height(), 1);
        assert_eq!(chain.height_of(&b1.id()), Some(1));

        let b2 = signed_child(Some(&b1), difficulty_init(), 1030);
        assert!(chain.process_block(&mut store, &b2).unwrap());
        assert_eq!(chain.best_height(), 2);
        assert_eq!(chain.best_tip().block_id, b2.id());
    }

    #[test]
    fn test_wrong_difficulty_rejected() {
        let mut store = TestStore::default();
        let mut chain = manager(&mut store);

        let bad = signed_child(None, difficulty_init() - 1, 1000);
        assert!(matches!(
            chain.process_block(&mut store, &bad),
            Err(ConsensusError::WrongDifficulty { .. })
        ));
    }

    #[test]
    fn test_longer_fork_wins() {
        let mut store = TestStore::default();
        let mut chain = manager(&mut store);

        // Incumbent: three blocks.
        let a1 = signed_child(None, difficulty_init(), 1000);
        let a2 = signed_child(Some(&a1), difficulty_init(), 1030);
        let a3 = signed_child(Some(&a2), difficulty_init(), 1060);
        for block in [&a1, &a2, &a3] {
            chain.process_block(&mut store, block).unwrap();
        }
        assert_eq!(chain.best_height(), 3);

        // Competing fork from the same root, one block longer, presented
        // after the incumbent.
        let b1 = signed_child(None, difficulty_init(), 1001);
        let b2 = signed_child(Some(&b1), difficulty_init(), 1031);
        let b3 = signed_child(Some(&b2), difficulty_init(), 1061);
        let b4 = signed_child(Some(&b3), difficulty_init(), 1091);
        for block in [&b1, &b2, &b3] {
            store.add_block(block).unwrap();
        }
        assert!(chain.process_block(&mut store, &b4).unwrap());

        assert_eq!(chain.best_height(), 4);
        assert_eq!(chain.best_tip().block_id, b4.id());
        // Losing branch dropped from the index, winners inserted.
        assert_eq!(chain.height_of(&a1.id()), None);
        assert_eq!(chain.height_of(&a3.id()), None);
        assert_eq!(chain.height_of(&b1.id()), Some(1));
        assert_eq!(chain.height_of(&b4.id()), Some(4));

        let indexes = store.get_block_indexes(None).unwrap();
        assert_eq!(indexes.len(), 5); // genesis anchor + 4 fork blocks
        assert_eq!(indexes[0].block_id, b4.id());
    }

    #[test]
    fn test_equal_height_keeps_incumbent() {
        let mut store = TestStore::default();
        let mut chain = manager(&mut store);

        let a1 = signed_child(None, difficulty_init(), 1000);
        chain.process_block(&mut store, &a1).unwrap();

        let b1 = signed_child(None, difficulty_init(), 1001);
        assert!(!chain.process_block(&mut store, &b1).unwrap());
        assert_eq!(chain.best_tip().block_id, a1.id());
        // The fork block is persisted even though it is not indexed.
        assert!(store.get_block(&b1.id()).unwrap().is_some());
        assert_eq!(chain.height_of(&b1.id()), None);
    }

    #[test]
    fn test_broken_lineage_is_caller_error() {
        let mut store = TestStore::default();
        let mut chain = manager(&mut store);

        let a1 = signed_child(None, difficulty_init(), 1000);
        let a2 = signed_child(Some(&a1), difficulty_init(), 1030);
        // a1 never stored: the parent lookup must fail loudly.
        assert!(matches!(
            chain.process_block(&mut store, &a2),
            Err(ConsensusError::BrokenLineage(_))
        ));
    }

    #[test]
    fn test_duplicate_block_is_noop() {
        let mut store = TestStore::default();
        let mut chain = manager(&mut store);

        let b1 = signed_child(None, difficulty_init(), 1000);
        assert!(chain.process_block(&mut store, &b1).unwrap());
        assert!(!chain.process_block(&mut store, &b1).unwrap());
        assert_eq!(chain.best_height(), 1);
    }
}
