//! Confirmation depth queries.
//!
//! The verifier side walks the best chain from the tip down looking for
//! the queried contract; confirmation depth is the height difference
//! between the best tip and the containing block. The requester side
//! accumulates verifier answers until the most common one reaches the
//! quorum, or fails on timeout.

use shared_types::entities::{Contract, ContractType, Hash, PeerId};
use shared_types::{LedgerStore, StoreResult, GENESIS_ID};
use std::collections::{HashMap, HashSet};

/// A verifier's answer to one confirmation query.
pub type TraversalAnswer = (Option<Contract>, Option<u64>);

/// Verifier side: depth of `contract_id` in the best chain, or the latest
/// chained descendant of `contract_id` with the given type.
pub fn answer_traversal(
    store: &dyn LedgerStore,
    contract_id: &Hash,
    contract_type: Option<ContractType>,
) -> StoreResult<TraversalAnswer> {
    match contract_type {
        None => confirmation_depth(store, contract_id),
        Some(wanted) => latest_descendant_of_type(store, contract_id, wanted),
    }
}

/// Depth of the block containing `contract_id`, tip-relative.
fn confirmation_depth(store: &dyn LedgerStore, contract_id: &Hash) -> StoreResult<TraversalAnswer> {
    let indexes = store.get_block_indexes(None)?;
    let best_height = indexes.first().map(|entry| entry.height).unwrap_or(0);

    for entry in &indexes {
        if entry.block_id == GENESIS_ID {
            continue;
        }
        if let Some(block) = store.get_block(&entry.block_id)? {
            if let Some(contract) = block.contracts.iter().find(|c| c.id() == *contract_id) {
                return Ok((Some(contract.clone()), Some(best_height - entry.height)));
            }
        }
    }
    Ok((None, None))
}

/// Tip-most chained contract of `wanted` type descending from `root_id`.
fn latest_descendant_of_type(
    store: &dyn LedgerStore,
    root_id: &Hash,
    wanted: ContractType,
) -> StoreResult<TraversalAnswer> {
    let indexes = store.get_block_indexes(None)?;
    let best_height = indexes.first().map(|entry| entry.height).unwrap_or(0);

    for entry in &indexes {
        if entry.block_id == GENESIS_ID {
            continue;
        }
        if let Some(block) = store.get_block(&entry.block_id)? {
            for contract in &block.contracts {
                if contract.contract_type == wanted && descends_from(store, contract, root_id)? {
                    return Ok((Some(contract.clone()), Some(best_height - entry.height)));
                }
            }
        }
    }
    Ok((None, None))
}

/// Follow `previous_hash` links up from `contract` looking for `root_id`.
fn descends_from(
    store: &dyn LedgerStore,
    contract: &Contract,
    root_id: &Hash,
) -> StoreResult<bool> {
    if contract.id() == *root_id {
        return Ok(true);
    }
    let mut cursor = match contract.previous_id() {
        Ok(parent) => parent,
        Err(_) => None,
    };
    while let Some(parent_id) = cursor {
        if parent_id == *root_id {
            return Ok(true);
        }
        cursor = match store.get_contract(&parent_id)? {
            Some(parent) => parent.previous_id().unwrap_or(None),
            None => None,
        };
    }
    Ok(false)
}

/// How an outstanding traversal request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TraversalResolution {
    /// The most common answer reached the quorum.
    Resolved {
        contract: Option<Contract>,
        confirmations: Option<u64>,
    },
    /// Every queried verifier answered without any answer reaching the
    /// quorum.
    Failed,
}

/// Requester side: vote accumulation for one traversal request.
#[derive(Clone, Debug)]
pub struct TraversalState {
    /// Queried contract id (for logging and retry decisions).
    pub contract_id: Hash,
    /// Optional latest-of-type filter echoed in the request.
    pub contract_type: Option<ContractType>,
    /// Minimum matching responses for success.
    pub min_responses: usize,
    /// Number of verifiers queried; also the maximum responses.
    pub max_responses: usize,
    responded: HashSet<PeerId>,
    votes: HashMap<(Option<Hash>, Option<u64>), (usize, Option<Contract>)>,
}

impl TraversalState {
    /// Start tracking a query fanned out to `max_responses` verifiers.
    pub fn new(
        contract_id: Hash,
        contract_type: Option<ContractType>,
        min_responses: usize,
        max_responses: usize,
    ) -> Self {
        Self {
            contract_id,
            contract_type,
            min_responses,
            max_responses,
            responded: HashSet::new(),
            votes: HashMap::new(),
        }
    }

    /// Record one verifier's answer. Duplicate answers from the same peer
    /// are ignored. Returns a resolution once one is reached.
    pub fn record(
        &mut self,
        peer: PeerId,
        contract: Option<Contract>,
        confirmations: Option<u64>,
    ) -> Option<TraversalResolution> {
        if !self.responded.insert(peer) {
            return None;
        }

        let key = (contract.as_ref().map(Contract::id), confirmations);
        let slot = self.votes.entry(key).or_insert((0, contract));
        slot.0 += 1;

        if slot.0 >= self.min_responses {
            return Some(TraversalResolution::Resolved {
                contract: slot.1.clone(),
                confirmations,
            });
        }

        if self.responded.len() >= self.max_responses {
            return Some(TraversalResolution::Failed);
        }
        None
    }
}
