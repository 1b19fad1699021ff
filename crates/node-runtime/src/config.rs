//! Node configuration.

use mc_01_consensus::ConsensusConfig;
use mc_03_block_production::ProducerConfig;
use shared_types::entities::PeerId;
use shared_types::{COMMIT_INTERVAL_SECS, PRODUCTION_TICK_SECS};

/// Aggregated configuration for one node.
#[derive(Clone, Debug)]
pub struct NodeConfig {
    /// Consensus tunables shared with every peer.
    pub consensus: ConsensusConfig,

    /// Block production tunables.
    pub producer: ProducerConfig,

    /// Whether this node mines blocks and answers chain queries.
    pub verifier: bool,

    /// Known verifier peers for broadcast and queries.
    pub verifiers: Vec<PeerId>,

    /// Quorum for confirmation queries.
    pub min_traversal_responses: usize,

    /// Block production timer period, in seconds.
    pub production_tick_secs: u64,

    /// Store commit timer period, in seconds.
    pub commit_interval_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            consensus: ConsensusConfig::default(),
            producer: ProducerConfig::default(),
            verifier: true,
            verifiers: Vec::new(),
            min_traversal_responses: 1,
            production_tick_secs: PRODUCTION_TICK_SECS,
            commit_interval_secs: COMMIT_INTERVAL_SECS,
        }
    }
}
