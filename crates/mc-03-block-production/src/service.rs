//! Block producer service.
//!
//! One tick: read the best tip, derive the next target, assemble a
//! candidate from the pool, mine it within the attempt bound, and submit
//! it through the consensus service on the same path a remote block takes.

use crate::config::ProducerConfig;
use crate::domain::{assembler, miner};
use crate::error::{ProductionError, ProductionResult};
use mc_01_consensus::{next_difficulty, BlockOrigin, BlockOutcome, ConsensusService};
use mc_02_contract_pool::{AdmissionPolicy, PendingPool};
use shared_crypto::Ed25519KeyPair;
use shared_types::entities::Block;
use shared_types::{LedgerStore, GENESIS_ID};
use std::sync::Arc;
use tracing::{debug, error, info};

/// What one production tick achieved.
#[derive(Debug)]
pub enum ProductionOutcome {
    /// Nothing admissible to mine.
    Idle,
    /// A candidate was built but the attempt bound ran out; the contracts
    /// stay pending and the next tick rebuilds against fresh state.
    Unsolved,
    /// A block was mined and accepted; the caller should broadcast it.
    Produced { block: Block },
    /// Our own freshly-mined block failed validation: an implementation
    /// bug, logged at error severity, never broadcast.
    SelfRejected,
}

/// Periodic block producer for a verifier node.
pub struct BlockProducer {
    config: ProducerConfig,
    identity: Arc<Ed25519KeyPair>,
    policy: AdmissionPolicy,
}

impl BlockProducer {
    /// Create a producer mining under the given identity.
    pub fn new(config: ProducerConfig, identity: Arc<Ed25519KeyPair>) -> Self {
        info!(
            max_block_bytes = config.max_block_bytes,
            max_mine_attempts = config.max_mine_attempts,
            "[mc-03] initializing block producer"
        );
        Self {
            config,
            identity,
            policy: AdmissionPolicy,
        }
    }

    /// Run one production tick.
    pub fn tick(
        &self,
        store: &mut dyn LedgerStore,
        consensus: &mut ConsensusService,
        pool: &mut PendingPool,
        now_secs: u64,
    ) -> ProductionResult<ProductionOutcome> {
        if pool.is_empty() {
            return Ok(ProductionOutcome::Idle);
        }

        let tip = consensus.chain().best_tip();
        let parent = if tip.height == 0 {
            None
        } else {
            Some(
                store
                    .get_block(&tip.block_id)?
                    .ok_or(ProductionError::MissingTip(tip.block_id))?,
            )
        };
        let previous = parent.as_ref().map(|p| p.id()).unwrap_or(GENESIS_ID);
        let target = next_difficulty(store, parent.as_ref(), consensus.chain().config())?;

        let creator = self.identity.public_key_bytes();
        let base_size = assembler::base_block_size(creator, previous, target);
        let assembly = assembler::assemble(
            pool,
            store,
            &self.policy,
            base_size,
            self.config.max_block_bytes,
        );
        for id in &assembly.inadmissible {
            pool.remove(id);
        }
        if assembly.admitted.is_empty() {
            return Ok(ProductionOutcome::Idle);
        }

        let candidate = Block::new(creator, previous, assembly.admitted, target, now_secs);
        let Some(mined) = miner::mine(candidate, &self.identity, self.config.max_mine_attempts)
        else {
            debug!("mining attempt bound exhausted, retrying next tick");
            return Ok(ProductionOutcome::Unsolved);
        };

        // Same path as an externally-received block; no shortcut.
        match consensus.handle_block(store, mined.clone(), BlockOrigin::Local, now_secs) {
            BlockOutcome::Accepted { blocks, .. } => {
                for block in &blocks {
                    pool.purge_settled(block.contracts.iter());
                }
                info!(
                    height = consensus.chain().best_height(),
                    contracts = mined.contracts.len(),
                    "[mc-03] produced block"
                );
                Ok(ProductionOutcome::Produced { block: mined })
            }
            other => {
                error!(outcome = ?other, "own block did not chain");
                Ok(ProductionOutcome::SelfRejected)
            }
        }
    }
}
