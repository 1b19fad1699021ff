//! Ledger context: all mutable ledger state behind one owner.
//!
//! Replaces any notion of process-wide singletons: the pending pool, the
//! request cache, the orphan buffer, the chain manager and the persistence
//! handle are all owned here, and only the event loop touches them.

use crate::config::NodeConfig;
use mc_01_consensus::{BlockOrigin, BlockOutcome, ConsensusService};
use mc_02_contract_pool::PendingPool;
use mc_03_block_production::{BlockProducer, ProductionOutcome};
use mc_04_agreement::{AgreementEvent, AgreementService};
use shared_crypto::Ed25519KeyPair;
use shared_types::documents::Document;
use shared_types::entities::{ContractType, Hash, PeerId};
use shared_types::{LedgerMessage, LedgerStore, MessageGateway, TimeSource};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Owner of every piece of mutable ledger state on this node.
pub struct LedgerContext {
    config: NodeConfig,
    identity: Arc<Ed25519KeyPair>,
    store: Box<dyn LedgerStore + Send>,
    consensus: ConsensusService,
    pool: PendingPool,
    agreement: AgreementService,
    producer: BlockProducer,
    gateway: Arc<dyn MessageGateway>,
    time: Arc<dyn TimeSource>,
    /// Agreement outcomes not yet drained by the embedding application.
    events: Vec<AgreementEvent>,
}

impl LedgerContext {
    /// Wire a context over the given storage, transport and clock.
    pub fn new(
        config: NodeConfig,
        identity: Arc<Ed25519KeyPair>,
        mut store: Box<dyn LedgerStore + Send>,
        gateway: Arc<dyn MessageGateway>,
        time: Arc<dyn TimeSource>,
    ) -> anyhow::Result<Self> {
        let consensus = ConsensusService::bootstrap(store.as_mut(), config.consensus.clone())?;
        let producer = BlockProducer::new(config.producer.clone(), identity.clone());
        let agreement = AgreementService::new(identity.clone());
        info!(
            peer = %hex::encode(identity.public_key_bytes()),
            verifier = config.verifier,
            height = consensus.chain().best_height(),
            "[runtime] ledger context ready"
        );
        Ok(Self {
            config,
            identity,
            store,
            consensus,
            pool: PendingPool::new(),
            agreement,
            producer,
            gateway,
            time,
            events: Vec::new(),
        })
    }

    /// This node's peer id.
    pub fn peer_id(&self) -> PeerId {
        self.identity.public_key_bytes()
    }

    /// Block production timer period, in seconds.
    pub fn production_tick_secs(&self) -> u64 {
        self.config.production_tick_secs
    }

    /// Store commit timer period, in seconds.
    pub fn commit_interval_secs(&self) -> u64 {
        self.config.commit_interval_secs
    }

    /// Current best-chain height.
    pub fn best_height(&self) -> u64 {
        self.consensus.chain().best_height()
    }

    /// Current best tip block id.
    pub fn best_tip(&self) -> Hash {
        self.consensus.chain().best_tip().block_id
    }

    /// Best-chain height of a block, if indexed.
    pub fn height_of(&self, block_id: &Hash) -> Option<u64> {
        self.consensus.chain().height_of(block_id)
    }

    /// Number of contracts waiting to be mined.
    pub fn pending_contracts(&self) -> usize {
        self.pool.len()
    }

    /// Whether the pending pool holds the contract.
    pub fn pool_contains(&self, contract_id: &Hash) -> bool {
        self.pool.contains(contract_id)
    }

    /// Fetch a stored block (forks included).
    pub fn get_block(&self, block_id: &Hash) -> Option<shared_types::entities::Block> {
        self.store.get_block(block_id).unwrap_or(None)
    }

    /// Whether a contract is settled on the best chain.
    pub fn contract_on_chain(&self, contract_id: &Hash) -> bool {
        self.store
            .contract_on_blockchain(contract_id)
            .unwrap_or(false)
    }

    /// Number of outstanding requests in the cache.
    pub fn pending_requests(&self) -> usize {
        self.agreement.pending_requests()
    }

    /// Propose a contract to the counterparty (phase one of the
    /// agreement exchange).
    pub fn propose_contract(
        &mut self,
        document: Document,
        previous_hash: Vec<u8>,
        from_id: PeerId,
        to_id: PeerId,
    ) -> anyhow::Result<Uuid> {
        let id = self.agreement.begin(
            document,
            previous_hash,
            from_id,
            to_id,
            self.gateway.as_ref(),
            self.time.now_secs(),
            self.time.now_millis(),
        )?;
        Ok(id)
    }

    /// Ask the verifiers how deep a contract is buried.
    pub fn query_confirmations(
        &mut self,
        contract_id: Hash,
        contract_type: Option<ContractType>,
    ) -> Uuid {
        self.agreement.begin_traversal(
            contract_id,
            contract_type,
            &self.config.verifiers,
            self.config.min_traversal_responses,
            self.gateway.as_ref(),
            self.time.now_millis(),
        )
    }

    /// Dispatch one inbound message. Never panics; rejected objects are
    /// dropped and logged.
    pub fn handle_message(&mut self, peer: PeerId, message: LedgerMessage) {
        debug!(kind = message.kind(), "[runtime] inbound message");
        match message {
            LedgerMessage::SignatureRequest { id, contract } => {
                let event = self.agreement.handle_signature_request(
                    &peer,
                    id,
                    contract,
                    &mut self.pool,
                    self.store.as_mut(),
                    self.gateway.as_ref(),
                    &self.config.verifiers,
                );
                self.log_event(event);
            }
            LedgerMessage::SignatureResponse { id, contract } => {
                let event = self.agreement.handle_signature_response(
                    &peer,
                    id,
                    contract,
                    &mut self.pool,
                    self.store.as_mut(),
                    self.gateway.as_ref(),
                    &self.config.verifiers,
                );
                self.log_event(event);
            }
            LedgerMessage::Contract { contract } => {
                let event =
                    self.agreement
                        .handle_contract(contract, &mut self.pool, self.store.as_mut());
                self.log_event(event);
            }
            LedgerMessage::BlockRequest { block_id } => match self.store.get_block(&block_id) {
                Ok(Some(block)) => {
                    if let Err(e) = self
                        .gateway
                        .send(&peer, &LedgerMessage::Block { block })
                    {
                        warn!(error = %e, "failed to answer block-request");
                    }
                }
                Ok(None) => debug!(block_id = ?block_id, "block-request for unknown block"),
                Err(e) => warn!(error = %e, "store failure answering block-request"),
            },
            LedgerMessage::Block { block } => self.handle_block(peer, block),
            LedgerMessage::TraversalRequest {
                id,
                contract_id,
                contract_type,
            } => {
                self.agreement.handle_traversal_request(
                    &peer,
                    id,
                    contract_id,
                    contract_type,
                    self.store.as_ref(),
                    self.gateway.as_ref(),
                );
            }
            LedgerMessage::TraversalResponse {
                id,
                contract,
                confirmations,
            } => {
                let event = self
                    .agreement
                    .handle_traversal_response(&peer, id, contract, confirmations);
                self.log_event(event);
            }
        }
    }

    /// One block-production timer tick.
    pub fn production_tick(&mut self) {
        if !self.config.verifier {
            return;
        }
        match self.producer.tick(
            self.store.as_mut(),
            &mut self.consensus,
            &mut self.pool,
            self.time.now_secs(),
        ) {
            Ok(ProductionOutcome::Produced { block }) => {
                self.broadcast(&LedgerMessage::Block { block });
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "[runtime] production tick failed"),
        }
    }

    /// Drain expired requests from the cache.
    pub fn sweep_requests(&mut self) {
        for event in self
            .agreement
            .sweep(self.gateway.as_ref(), self.time.now_millis())
        {
            self.log_event(Some(event));
        }
    }

    /// Periodic persistence flush.
    pub fn commit_store(&mut self) {
        if let Err(e) = self.store.commit() {
            warn!(error = %e, "[runtime] store commit failed");
        }
    }

    fn handle_block(&mut self, peer: PeerId, block: shared_types::entities::Block) {
        let block_id = block.id();
        self.agreement.resolve_block_request(&block_id);

        let outcome = self.consensus.handle_block(
            self.store.as_mut(),
            block,
            BlockOrigin::Remote,
            self.time.now_secs(),
        );
        match outcome {
            BlockOutcome::Accepted { blocks, .. } => {
                for accepted in &blocks {
                    self.pool.purge_settled(accepted.contracts.iter());
                }
                info!(
                    height = self.best_height(),
                    accepted = blocks.len(),
                    "[runtime] chain advanced"
                );
            }
            BlockOutcome::Orphaned { missing_parent } => {
                self.agreement.request_block(
                    missing_parent,
                    peer,
                    self.gateway.as_ref(),
                    self.time.now_millis(),
                );
            }
            BlockOutcome::AlreadyKnown | BlockOutcome::Rejected => {}
        }
    }

    fn broadcast(&self, message: &LedgerMessage) {
        let recipients: Vec<PeerId> = self
            .config
            .verifiers
            .iter()
            .filter(|peer| **peer != self.peer_id())
            .copied()
            .collect();
        if recipients.is_empty() {
            return;
        }
        if let Err(e) = self.gateway.multicast(&recipients, message) {
            warn!(kind = message.kind(), error = %e, "[runtime] broadcast failed");
        }
    }

    /// Drain agreement outcomes accumulated since the last call.
    pub fn drain_events(&mut self) -> Vec<AgreementEvent> {
        std::mem::take(&mut self.events)
    }

    fn log_event(&mut self, event: Option<AgreementEvent>) {
        let Some(event) = event else {
            return;
        };
        match &event {
            AgreementEvent::ContractFinalized { contract } => {
                info!(contract_id = ?contract.id(), "[runtime] contract finalized");
            }
            AgreementEvent::ContractRecorded { contract } => {
                info!(contract_id = ?contract.id(), "[runtime] contract recorded");
            }
            AgreementEvent::TraversalResolved {
                id, confirmations, ..
            } => {
                info!(correlation = %id, confirmations = ?confirmations, "[runtime] traversal resolved");
            }
            AgreementEvent::TraversalFailed { id } => {
                warn!(correlation = %id, "[runtime] traversal failed");
            }
            AgreementEvent::SignatureTimedOut { id, contract_id } => {
                warn!(correlation = %id, contract_id = ?contract_id, "[runtime] signature request timed out");
            }
        }
        self.events.push(event);
    }
}
