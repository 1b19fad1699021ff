//! Orphan block buffering.
//!
//! A structurally valid block whose parent is not yet known locally is not
//! an error: it is buffered here while the missing ancestor is requested
//! from a verifier. Whenever a block is accepted, its buffered children
//! are drained and re-submitted, cascading until the buffer yields nothing
//! new. Acceptance strictly shrinks the buffer, so the cascade terminates.
//!
//! The buffer is capped: under sustained partition it would otherwise grow
//! without bound, so the oldest entry is evicted once the cap is reached.

use shared_types::entities::{Block, Hash};
use shared_types::MAX_ORPHANS;
use std::collections::{HashMap, VecDeque};
use tracing::warn;

/// Buffer of blocks awaiting their parent, keyed by block id.
pub struct OrphanBuffer {
    cap: usize,
    blocks: HashMap<Hash, Block>,
    /// Insertion order, oldest first, for eviction.
    order: VecDeque<Hash>,
}

impl Default for OrphanBuffer {
    fn default() -> Self {
        Self::with_cap(MAX_ORPHANS)
    }
}

impl OrphanBuffer {
    /// Create an empty buffer with the protocol cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with an explicit cap.
    pub fn with_cap(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            blocks: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Number of buffered orphans.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Whether a block id is already buffered.
    pub fn contains(&self, id: &Hash) -> bool {
        self.blocks.contains_key(id)
    }

    /// Buffer an orphan. Returns the evicted oldest entry when the cap is
    /// hit. Re-inserting a known id is a no-op.
    pub fn insert(&mut self, block: Block) -> Option<Block> {
        let id = block.id();
        if self.blocks.contains_key(&id) {
            return None;
        }

        let mut evicted = None;
        if self.blocks.len() >= self.cap {
            if let Some(oldest) = self.order.pop_front() {
                evicted = self.blocks.remove(&oldest);
                warn!(
                    buffered = self.blocks.len(),
                    "orphan buffer full, evicted oldest entry"
                );
            }
        }

        self.order.push_back(id);
        self.blocks.insert(id, block);
        evicted
    }

    /// Remove and return every buffered child of `parent_id`.
    pub fn take_children(&mut self, parent_id: &Hash) -> Vec<Block> {
        let ids: Vec<Hash> = self
            .blocks
            .iter()
            .filter(|(_, block)| block.previous_hash == *parent_id)
            .map(|(id, _)| *id)
            .collect();

        ids.iter()
            .filter_map(|id| {
                self.order.retain(|entry| entry != id);
                self.blocks.remove(id)
            })
            .collect()
    }
}
