//! Candidate assembly.
//!
//! Pulls contracts out of the pending pool in dependency order under the
//! byte budget, then re-runs the admission policy against chain-confirmed
//! state plus the growing candidate list — the preliminary pass at arrival
//! time is not enough, because two peers can race conflicting contracts
//! before either chains.

use mc_02_contract_pool::{AdmissionError, AdmissionPolicy, PendingPool};
use shared_types::entities::{Block, Contract, Hash, PublicKey, U256};
use shared_types::LedgerStore;
use tracing::{debug, warn};

/// Outcome of one assembly pass.
pub struct Assembly {
    /// Contracts admitted into the candidate, dependency-ordered.
    pub admitted: Vec<Contract>,
    /// Contract ids found permanently inadmissible; the caller must drop
    /// them from the pool.
    pub inadmissible: Vec<Hash>,
}

/// Serialized size of a block carrying no contracts.
pub fn base_block_size(creator: PublicKey, previous: Hash, target: U256) -> usize {
    Block::new(creator, previous, Vec::new(), target, 0).serialized_size()
}

/// Select and admit contracts for a candidate block.
pub fn assemble(
    pool: &PendingPool,
    store: &dyn LedgerStore,
    policy: &AdmissionPolicy,
    base_size: usize,
    max_size: usize,
) -> Assembly {
    let selection = pool.select_for_block(base_size, max_size);

    let mut admitted: Vec<Contract> = Vec::new();
    let mut inadmissible = Vec::new();
    for contract in selection {
        match policy.admit_for_block(&contract, &admitted, store) {
            Ok(()) => admitted.push(contract),
            // An unknown parent may simply not have chained yet; the
            // contract stays pending for a later block.
            Err(AdmissionError::UnknownParent(parent)) => {
                debug!(
                    contract_id = ?contract.id(),
                    parent = ?parent,
                    "holding contract back until its parent chains"
                );
            }
            Err(e) => {
                warn!(contract_id = ?contract.id(), error = %e, "dropping inadmissible contract");
                inadmissible.push(contract.id());
            }
        }
    }

    Assembly {
        admitted,
        inadmissible,
    }
}
