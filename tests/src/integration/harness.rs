//! Multi-node wiring helpers.
//!
//! Builds a cluster of in-process nodes over channel gateways and a shared
//! deterministic clock, and drives message delivery synchronously so flows
//! are reproducible without timers.

use mc_01_consensus::ConsensusConfig;
use node_runtime::{ChannelGateway, LedgerContext, MemoryLedgerStore, NodeConfig};
use shared_crypto::Ed25519KeyPair;
use shared_types::entities::PeerId;
use shared_types::{LedgerMessage, MockTimeSource};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Start-of-history clock for every test cluster.
pub const T0: u64 = 1_700_000_000;

/// One in-process node.
pub struct TestNode {
    pub id: PeerId,
    pub ctx: LedgerContext,
    inbox: UnboundedReceiver<(PeerId, LedgerMessage)>,
    outbox: UnboundedSender<(PeerId, LedgerMessage)>,
    gateway: Arc<ChannelGateway>,
}

impl TestNode {
    /// Deliver a message directly into this node, as `from` would.
    pub fn deliver(&mut self, from: PeerId, message: LedgerMessage) {
        self.ctx.handle_message(from, message);
    }
}

/// A cluster of nodes sharing one mock clock.
pub struct TestNet {
    pub time: Arc<MockTimeSource>,
    pub nodes: Vec<TestNode>,
}

impl TestNet {
    /// Build a fully meshed cluster. Each spec is `(seed, is_verifier)`;
    /// every node knows every other node as a broadcast/query peer.
    pub fn new(specs: &[(u8, bool)]) -> Self {
        let time = Arc::new(MockTimeSource::at_secs(T0));

        let identities: Vec<Arc<Ed25519KeyPair>> = specs
            .iter()
            .map(|(seed, _)| Arc::new(Ed25519KeyPair::from_seed([*seed; 32])))
            .collect();
        let ids: Vec<PeerId> = identities
            .iter()
            .map(|identity| identity.public_key_bytes())
            .collect();

        let mut nodes = Vec::with_capacity(specs.len());
        for (index, (_, verifier)) in specs.iter().enumerate() {
            let id = ids[index];
            let (outbox, inbox) = unbounded_channel();
            let gateway = Arc::new(ChannelGateway::new(id));

            let config = NodeConfig {
                consensus: ConsensusConfig::for_tests(),
                verifier: *verifier,
                verifiers: ids
                    .iter()
                    .copied()
                    .filter(|peer| *peer != id)
                    .collect(),
                min_traversal_responses: 1,
                ..NodeConfig::default()
            };

            let ctx = LedgerContext::new(
                config,
                identities[index].clone(),
                Box::new(MemoryLedgerStore::new()),
                gateway.clone(),
                time.clone(),
            )
            .expect("context wiring cannot fail over fresh storage");

            nodes.push(TestNode {
                id,
                ctx,
                inbox,
                outbox,
                gateway,
            });
        }

        // Full mesh: every gateway can reach every other inbox.
        for i in 0..nodes.len() {
            for j in 0..nodes.len() {
                if i != j {
                    let peer = nodes[j].id;
                    let outbox = nodes[j].outbox.clone();
                    nodes[i].gateway.connect(peer, outbox);
                }
            }
        }

        Self { time, nodes }
    }

    /// Attach a late joiner to the mesh.
    pub fn join(&mut self, seed: u8, verifier: bool) -> usize {
        let identity = Arc::new(Ed25519KeyPair::from_seed([seed; 32]));
        let id = identity.public_key_bytes();
        let (outbox, inbox) = unbounded_channel();
        let gateway = Arc::new(ChannelGateway::new(id));

        let config = NodeConfig {
            consensus: ConsensusConfig::for_tests(),
            verifier,
            verifiers: self.nodes.iter().map(|node| node.id).collect(),
            min_traversal_responses: 1,
            ..NodeConfig::default()
        };
        let ctx = LedgerContext::new(
            config,
            identity,
            Box::new(MemoryLedgerStore::new()),
            gateway.clone(),
            self.time.clone(),
        )
        .expect("context wiring cannot fail over fresh storage");

        for existing in &self.nodes {
            gateway.connect(existing.id, existing.outbox.clone());
            existing.gateway.connect(id, outbox.clone());
        }

        self.nodes.push(TestNode {
            id,
            ctx,
            inbox,
            outbox,
            gateway,
        });
        self.nodes.len() - 1
    }

    /// Drain every inbox until the cluster is quiescent.
    pub fn pump(&mut self) {
        loop {
            let mut delivered = false;
            for node in &mut self.nodes {
                while let Ok((peer, message)) = node.inbox.try_recv() {
                    node.ctx.handle_message(peer, message);
                    delivered = true;
                }
            }
            if !delivered {
                break;
            }
        }
    }

    /// Advance the shared clock past any mined block time, so the next
    /// candidate clears the median-time-past rule.
    pub fn advance_epoch(&self) {
        self.time.advance_secs(5_000);
    }
}
