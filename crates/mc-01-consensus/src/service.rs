//! Consensus service: the single entry point for every block.
//!
//! Self-produced and externally-received blocks flow through
//! [`ConsensusService::handle_block`] identically; there is no shortcut
//! path. Cascading orphan acceptance runs over an explicit work list, so
//! the admission path is never re-entered recursively.

use crate::config::ConsensusConfig;
use crate::domain::chain::ChainManager;
use crate::domain::orphans::OrphanBuffer;
use crate::domain::validation::{validate_ancestry, validate_block};
use crate::error::ConsensusResult;
use shared_types::entities::{Block, Hash};
use shared_types::LedgerStore;
use std::collections::VecDeque;
use tracing::{debug, error, warn};

/// Where a block came from; only changes log severity on rejection.
/// A locally-produced block failing its own just-computed checks is an
/// implementation bug, not remote junk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockOrigin {
    /// Produced by this node's block producer.
    Local,
    /// Received from a peer.
    Remote,
}

/// Result of handling one incoming block.
#[derive(Debug)]
pub enum BlockOutcome {
    /// Persisted, possibly with cascaded orphans, in acceptance order.
    /// `extended` is true when the best chain changed.
    Accepted { blocks: Vec<Block>, extended: bool },
    /// Already stored, indexed or buffered; nothing to do.
    AlreadyKnown,
    /// Structurally valid but the parent is unknown; buffered. The caller
    /// should request `missing_parent` from a verifier.
    Orphaned { missing_parent: Hash },
    /// Dropped and logged.
    Rejected,
}

/// Orchestrates validation, chain selection and orphan resolution.
pub struct ConsensusService {
    chain: ChainManager,
    orphans: OrphanBuffer,
}

impl ConsensusService {
    /// Bootstrap from storage.
    pub fn bootstrap(
        store: &mut dyn LedgerStore,
        config: ConsensusConfig,
    ) -> ConsensusResult<Self> {
        let orphans = OrphanBuffer::with_cap(config.max_orphans);
        let chain = ChainManager::bootstrap(store, config)?;
        Ok(Self { chain, orphans })
    }

    /// Read access to the best-chain state.
    pub fn chain(&self) -> &ChainManager {
        &self.chain
    }

    /// Number of buffered orphans.
    pub fn orphan_count(&self) -> usize {
        self.orphans.len()
    }

    /// Validate and process one block, cascading buffered orphans on
    /// success.
    pub fn handle_block(
        &mut self,
        store: &mut dyn LedgerStore,
        block: Block,
        origin: BlockOrigin,
        now_secs: u64,
    ) -> BlockOutcome {
        let id = block.id();

        if self.chain.height_of(&id).is_some() || self.orphans.contains(&id) {
            debug!(block_id = %hex_id(&id), "block already known");
            return BlockOutcome::AlreadyKnown;
        }
        match store.get_block(&id) {
            Ok(Some(_)) => {
                debug!(block_id = %hex_id(&id), "block already stored");
                return BlockOutcome::AlreadyKnown;
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "store lookup failed while handling block");
                return BlockOutcome::Rejected;
            }
        }

        if let Err(e) = validate_block(&block, now_secs, self.chain.config()) {
            match origin {
                BlockOrigin::Local => {
                    error!(block_id = %hex_id(&id), error = %e, "own block failed validation")
                }
                BlockOrigin::Remote => {
                    warn!(block_id = %hex_id(&id), error = %e, "rejecting invalid block")
                }
            }
            return BlockOutcome::Rejected;
        }

        // Orphan check: parent neither genesis nor stored.
        if !block.extends_genesis() {
            match store.get_block(&block.previous_hash) {
                Ok(Some(_)) => {}
                Ok(None) => {
                    let missing_parent = block.previous_hash;
                    debug!(
                        block_id = %hex_id(&id),
                        parent = %hex_id(&missing_parent),
                        "buffering orphan block"
                    );
                    self.orphans.insert(block);
                    return BlockOutcome::Orphaned { missing_parent };
                }
                Err(e) => {
                    error!(error = %e, "store lookup failed while handling block");
                    return BlockOutcome::Rejected;
                }
            }
        }

        // Accept, then drain buffered children breadth-first. Children
        // were structurally validated on arrival; they are not re-treated
        // as roots.
        let mut accepted = Vec::new();
        let mut extended = false;
        let mut work = VecDeque::from([block]);
        while let Some(candidate) = work.pop_front() {
            let candidate_id = candidate.id();

            if let Err(e) = validate_ancestry(&candidate, store, self.chain.config()) {
                warn!(block_id = %hex_id(&candidate_id), error = %e, "rejecting block on ancestry");
                continue;
            }

            match self.chain.process_block(store, &candidate) {
                Ok(improved) => {
                    extended |= improved;
                    for child in self.orphans.take_children(&candidate_id) {
                        work.push_back(child);
                    }
                    accepted.push(candidate);
                }
                Err(e) => match origin {
                    BlockOrigin::Local => {
                        error!(block_id = %hex_id(&candidate_id), error = %e, "own block rejected by chain")
                    }
                    BlockOrigin::Remote => {
                        warn!(block_id = %hex_id(&candidate_id), error = %e, "chain rejected block")
                    }
                },
            }
        }

        if accepted.is_empty() {
            BlockOutcome::Rejected
        } else {
            BlockOutcome::Accepted {
                blocks: accepted,
                extended,
            }
        }
    }
}

fn hex_id(id: &Hash) -> String {
    id.iter().take(8).map(|b| format!("{b:02x}")).collect()
}
