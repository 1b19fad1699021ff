//! # Pending-Contract Pool
//!
//! Finalized contracts waiting to be mined into a block.
//!
//! ## Data Structures
//!
//! - `by_id`: O(1) lookup by contract id
//! - `order`: insertion order, the candidate queue for block building
//!
//! ## Invariants Enforced
//!
//! - No duplicate contract ids (checked in `add()`)
//! - Block selection honors dependency order: a contract whose parent is
//!   itself pending is never selected before that parent
//! - Selection never exceeds the block byte budget; contracts that do not
//!   fit stay pending for the next attempt

use super::errors::PoolError;
use shared_types::entities::{Contract, Hash};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Pool of finalized, not-yet-chained contracts.
#[derive(Default)]
pub struct PendingPool {
    by_id: HashMap<Hash, Contract>,
    /// Insertion order; the front of the candidate queue mines first.
    order: Vec<Hash>,
}

impl PendingPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pending contracts.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Whether a contract id is pending.
    pub fn contains(&self, id: &Hash) -> bool {
        self.by_id.contains_key(id)
    }

    /// Get a pending contract by id.
    pub fn get(&self, id: &Hash) -> Option<&Contract> {
        self.by_id.get(id)
    }

    /// Pending contracts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Contract> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    /// Add a finalized contract.
    pub fn add(&mut self, contract: Contract) -> Result<(), PoolError> {
        let id = contract.id();
        if self.by_id.contains_key(&id) {
            return Err(PoolError::Duplicate(id));
        }
        self.order.push(id);
        self.by_id.insert(id, contract);
        Ok(())
    }

    /// Remove a pending contract.
    pub fn remove(&mut self, id: &Hash) -> Option<Contract> {
        let removed = self.by_id.remove(id);
        if removed.is_some() {
            self.order.retain(|entry| entry != id);
        }
        removed
    }

    /// Drop every contract settled by an accepted block; they must not be
    /// re-proposed.
    pub fn purge_settled<'a>(&mut self, settled: impl Iterator<Item = &'a Contract>) {
        for contract in settled {
            if self.remove(&contract.id()).is_some() {
                debug!(contract_id = ?contract.id(), "purged settled contract from pool");
            }
        }
    }

    /// Select contracts for a candidate block.
    ///
    /// Walks the queue in insertion order, pulling pending dependencies to
    /// the front, and stops adding once `base_size` plus the selected
    /// contracts would exceed `max_size`. A contract whose pending parent
    /// did not fit is held back too.
    pub fn select_for_block(&self, base_size: usize, max_size: usize) -> Vec<Contract> {
        let mut selected = Vec::new();
        let mut chosen: HashSet<Hash> = HashSet::new();
        let mut held_back: HashSet<Hash> = HashSet::new();
        let mut used = base_size;

        for id in &self.order {
            if chosen.contains(id) || held_back.contains(id) {
                continue;
            }

            // Pull not-yet-chosen pending ancestors to the front.
            let mut lineage = vec![*id];
            let mut cursor = *id;
            while let Some(parent) = self.pending_parent_of(&cursor) {
                if chosen.contains(&parent) {
                    break;
                }
                lineage.push(parent);
                cursor = parent;
            }

            for candidate_id in lineage.into_iter().rev() {
                if chosen.contains(&candidate_id) {
                    continue;
                }
                let contract = &self.by_id[&candidate_id];

                // A held-back parent holds back the whole descent.
                if let Ok(Some(parent)) = contract.previous_id() {
                    if held_back.contains(&parent) {
                        held_back.insert(candidate_id);
                        continue;
                    }
                }

                let size = contract.serialized_size();
                if used + size > max_size {
                    held_back.insert(candidate_id);
                    continue;
                }

                used += size;
                chosen.insert(candidate_id);
                selected.push(contract.clone());
            }
        }

        selected
    }

    fn pending_parent_of(&self, id: &Hash) -> Option<Hash> {
        self.by_id
            .get(id)?
            .previous_id()
            .ok()
            .flatten()
            .filter(|parent| self.by_id.contains_key(parent))
    }
}
