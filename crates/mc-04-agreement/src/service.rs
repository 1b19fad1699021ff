//! Agreement service: message handlers and request tracking.
//!
//! All handlers follow the same failure discipline: an invalid signature,
//! an unverifiable contract or an admission rejection drops the message
//! with a log line and returns `None`, leaving the sender's pending
//! request to time out. Nothing here panics or retries silently.

use crate::domain::requests::{AgreementPhase, PendingRequest, RequestCache};
use crate::domain::traversal::{answer_traversal, TraversalResolution, TraversalState};
use crate::error::{AgreementError, AgreementResult};
use mc_02_contract_pool::{AdmissionPolicy, PendingPool};
use shared_crypto::Ed25519KeyPair;
use shared_types::documents::Document;
use shared_types::entities::{Contract, ContractType, Hash, PeerId};
use shared_types::{LedgerMessage, LedgerStore, MessageGateway, REQUEST_TIMEOUT_MS};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Notable outcomes handed back to the runtime.
#[derive(Debug)]
pub enum AgreementEvent {
    /// A contract we took part in signing is fully signed and stored.
    ContractFinalized { contract: Contract },
    /// A gossiped third-party contract was verified and stored.
    ContractRecorded { contract: Contract },
    /// A confirmation query reached its quorum.
    TraversalResolved {
        id: Uuid,
        contract: Option<Contract>,
        confirmations: Option<u64>,
    },
    /// A confirmation query failed (disagreement or timeout).
    TraversalFailed { id: Uuid },
    /// A signature request got no response within the window.
    SignatureTimedOut { id: Uuid, contract_id: Hash },
}

/// Two-phase signing, gossip handling and confirmation queries.
pub struct AgreementService {
    identity: Arc<Ed25519KeyPair>,
    policy: AdmissionPolicy,
    cache: RequestCache,
}

impl AgreementService {
    /// Create a service signing under `identity`.
    pub fn new(identity: Arc<Ed25519KeyPair>) -> Self {
        Self {
            identity,
            policy: AdmissionPolicy,
            cache: RequestCache::new(REQUEST_TIMEOUT_MS),
        }
    }

    /// Number of outstanding requests.
    pub fn pending_requests(&self) -> usize {
        self.cache.len()
    }

    /// Begin a two-phase exchange: build the contract, sign as initiator,
    /// and send a signature-request to the counterparty.
    ///
    /// The caller must be one of the two parties.
    #[allow(clippy::too_many_arguments)]
    pub fn begin(
        &mut self,
        document: Document,
        previous_hash: Vec<u8>,
        from_id: PeerId,
        to_id: PeerId,
        gateway: &dyn MessageGateway,
        now_secs: u64,
        now_ms: u64,
    ) -> AgreementResult<Uuid> {
        let our_key = self.identity.public_key_bytes();
        let counterparty = if our_key == from_id {
            to_id
        } else if our_key == to_id {
            from_id
        } else {
            return Err(AgreementError::NotAParty);
        };

        let mut contract = Contract::new(
            previous_hash,
            from_id,
            to_id,
            document.encode(),
            document.contract_type(),
            now_secs,
        );
        contract.sign(&self.identity)?;

        let id = Uuid::new_v4();
        self.cache.insert(
            id,
            PendingRequest::Signature {
                contract_id: contract.id(),
                counterparty,
                phase: AgreementPhase::Proposed,
            },
            now_ms,
        );

        info!(correlation = %id, contract_id = ?contract.id(), "proposing contract");
        send(gateway, &counterparty, &LedgerMessage::SignatureRequest { id, contract });
        Ok(id)
    }

    /// Handle an incoming signature-request: verify the initiator's
    /// signature, run the admission policy, counter-sign, persist, reply,
    /// and multicast the finalized contract to the other verifiers.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_signature_request(
        &mut self,
        peer: &PeerId,
        id: Uuid,
        mut contract: Contract,
        pool: &mut PendingPool,
        store: &mut dyn LedgerStore,
        gateway: &dyn MessageGateway,
        verifiers: &[PeerId],
    ) -> Option<AgreementEvent> {
        let our_key = self.identity.public_key_bytes();

        // The initiator is whichever party already signed; we must be the
        // other one.
        let initiator = if contract.signed_by(&contract.from_id) {
            contract.from_id
        } else if contract.signed_by(&contract.to_id) {
            contract.to_id
        } else {
            warn!(correlation = %id, "signature-request carries no signature");
            return None;
        };
        if initiator == our_key || (contract.from_id != our_key && contract.to_id != our_key) {
            warn!(correlation = %id, "signature-request is not addressed to us");
            return None;
        }

        if let Err(e) = contract.verify(&initiator) {
            warn!(correlation = %id, error = %e, "invalid initiator signature");
            return None;
        }

        if let Err(e) = self.policy.admit_pending(&contract, pool, store, true) {
            warn!(correlation = %id, error = %e, "admission rejected proposed contract");
            return None;
        }

        if let Err(e) = contract.sign(&self.identity) {
            warn!(correlation = %id, error = %e, "failed to counter-sign");
            return None;
        }

        if let Err(e) = store.add_contract(&contract) {
            warn!(correlation = %id, error = %e, "failed to persist contract");
            return None;
        }
        let _ = pool.add(contract.clone());

        send(
            gateway,
            peer,
            &LedgerMessage::SignatureResponse {
                id,
                contract: contract.clone(),
            },
        );
        // Non-participant verifiers learn of the finalized contract.
        multicast_except(
            gateway,
            verifiers,
            &[*peer, our_key],
            &LedgerMessage::Contract {
                contract: contract.clone(),
            },
        );

        info!(correlation = %id, contract_id = ?contract.id(), "counter-signed contract");
        Some(AgreementEvent::ContractFinalized { contract })
    }

    /// Handle a signature-response matching one of our pending requests.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_signature_response(
        &mut self,
        peer: &PeerId,
        id: Uuid,
        contract: Contract,
        pool: &mut PendingPool,
        store: &mut dyn LedgerStore,
        gateway: &dyn MessageGateway,
        verifiers: &[PeerId],
    ) -> Option<AgreementEvent> {
        match self.cache.get_mut(&id) {
            Some(PendingRequest::Signature {
                contract_id, phase, ..
            }) if *contract_id == contract.id() => {
                *phase = AgreementPhase::CounterSigned;
            }
            _ => {
                debug!(correlation = %id, "unmatched signature-response, dropping");
                return None;
            }
        }

        if let Err(e) = contract.verify_both() {
            warn!(correlation = %id, error = %e, "signature-response fails verification");
            return None;
        }
        if let Err(e) = self.policy.admit_pending(&contract, pool, store, true) {
            warn!(correlation = %id, error = %e, "admission rejected counter-signed contract");
            return None;
        }

        if let Err(e) = store.add_contract(&contract) {
            warn!(correlation = %id, error = %e, "failed to persist contract");
            return None;
        }
        let _ = pool.add(contract.clone());

        // Resolved: the response arrived, so the entry leaves the cache.
        self.cache.remove(&id);

        multicast_except(
            gateway,
            verifiers,
            &[*peer, self.identity.public_key_bytes()],
            &LedgerMessage::Contract {
                contract: contract.clone(),
            },
        );

        info!(correlation = %id, contract_id = ?contract.id(), "contract finalized");
        Some(AgreementEvent::ContractFinalized { contract })
    }

    /// Handle a gossiped finalized contract from a third party.
    pub fn handle_contract(
        &mut self,
        contract: Contract,
        pool: &mut PendingPool,
        store: &mut dyn LedgerStore,
    ) -> Option<AgreementEvent> {
        let id = contract.id();
        match store.get_contract(&id) {
            Ok(Some(_)) => {
                debug!(contract_id = ?id, "gossiped contract already known");
                return None;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "store lookup failed for gossiped contract");
                return None;
            }
        }

        if let Err(e) = contract.verify_both() {
            warn!(contract_id = ?id, error = %e, "gossiped contract fails verification");
            return None;
        }
        if let Err(e) = self.policy.admit_pending(&contract, pool, store, true) {
            warn!(contract_id = ?id, error = %e, "admission rejected gossiped contract");
            return None;
        }

        if let Err(e) = store.add_contract(&contract) {
            warn!(contract_id = ?id, error = %e, "failed to persist gossiped contract");
            return None;
        }
        let _ = pool.add(contract.clone());

        Some(AgreementEvent::ContractRecorded { contract })
    }

    /// Ask `peer` for a missing block, deduplicating outstanding fetches.
    pub fn request_block(
        &mut self,
        block_id: Hash,
        peer: PeerId,
        gateway: &dyn MessageGateway,
        now_ms: u64,
    ) {
        if self.cache.has_block_fetch(&block_id) {
            return;
        }
        let id = Uuid::new_v4();
        self.cache
            .insert(id, PendingRequest::BlockFetch { block_id, peer }, now_ms);
        debug!(correlation = %id, block_id = ?block_id, "requesting missing block");
        send(gateway, &peer, &LedgerMessage::BlockRequest { block_id });
    }

    /// Cancel the pending fetch for a block that arrived.
    pub fn resolve_block_request(&mut self, block_id: &Hash) {
        if self.cache.resolve_block_fetch(block_id) {
            debug!(block_id = ?block_id, "block request resolved");
        }
    }

    /// Fan a confirmation query out to the verifiers.
    pub fn begin_traversal(
        &mut self,
        contract_id: Hash,
        contract_type: Option<ContractType>,
        verifiers: &[PeerId],
        min_responses: usize,
        gateway: &dyn MessageGateway,
        now_ms: u64,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let state = TraversalState::new(
            contract_id,
            contract_type,
            min_responses,
            verifiers.len(),
        );
        self.cache
            .insert(id, PendingRequest::Traversal(state), now_ms);

        let request = LedgerMessage::TraversalRequest {
            id,
            contract_id,
            contract_type,
        };
        for verifier in verifiers {
            send(gateway, verifier, &request);
        }
        id
    }

    /// Verifier side: answer a confirmation query from chain state.
    pub fn handle_traversal_request(
        &self,
        peer: &PeerId,
        id: Uuid,
        contract_id: Hash,
        contract_type: Option<ContractType>,
        store: &dyn LedgerStore,
        gateway: &dyn MessageGateway,
    ) {
        let (contract, confirmations) = match answer_traversal(store, &contract_id, contract_type)
        {
            Ok(answer) => answer,
            Err(e) => {
                warn!(correlation = %id, error = %e, "traversal lookup failed");
                return;
            }
        };
        send(
            gateway,
            peer,
            &LedgerMessage::TraversalResponse {
                id,
                contract,
                confirmations,
            },
        );
    }

    /// Requester side: accumulate one verifier's answer.
    pub fn handle_traversal_response(
        &mut self,
        peer: &PeerId,
        id: Uuid,
        contract: Option<Contract>,
        confirmations: Option<u64>,
    ) -> Option<AgreementEvent> {
        let resolution = match self.cache.get_mut(&id) {
            Some(PendingRequest::Traversal(state)) => {
                state.record(*peer, contract, confirmations)?
            }
            _ => {
                debug!(correlation = %id, "unmatched traversal-response, dropping");
                return None;
            }
        };

        self.cache.remove(&id);
        match resolution {
            TraversalResolution::Resolved {
                contract,
                confirmations,
            } => Some(AgreementEvent::TraversalResolved {
                id,
                contract,
                confirmations,
            }),
            TraversalResolution::Failed => Some(AgreementEvent::TraversalFailed { id }),
        }
    }

    /// Drain expired requests: block fetches retry, signature and
    /// traversal requests fail back to the caller.
    pub fn sweep(&mut self, gateway: &dyn MessageGateway, now_ms: u64) -> Vec<AgreementEvent> {
        let mut events = Vec::new();
        for (id, request) in self.cache.expired(now_ms) {
            match request {
                PendingRequest::BlockFetch { block_id, peer } => {
                    debug!(correlation = %id, block_id = ?block_id, "block request timed out, retrying");
                    self.cache
                        .insert(id, PendingRequest::BlockFetch { block_id, peer }, now_ms);
                    send(gateway, &peer, &LedgerMessage::BlockRequest { block_id });
                }
                PendingRequest::Signature { contract_id, .. } => {
                    warn!(correlation = %id, contract_id = ?contract_id, "signature request timed out");
                    events.push(AgreementEvent::SignatureTimedOut { id, contract_id });
                }
                PendingRequest::Traversal(_) => {
                    warn!(correlation = %id, "traversal request timed out");
                    events.push(AgreementEvent::TraversalFailed { id });
                }
            }
        }
        events
    }
}

fn send(gateway: &dyn MessageGateway, peer: &PeerId, message: &LedgerMessage) {
    if let Err(e) = gateway.send(peer, message) {
        warn!(kind = message.kind(), error = %e, "gateway send failed");
    }
}

fn multicast_except(
    gateway: &dyn MessageGateway,
    peers: &[PeerId],
    excluded: &[PeerId],
    message: &LedgerMessage,
) {
    let recipients: Vec<PeerId> = peers
        .iter()
        .filter(|peer| !excluded.contains(peer))
        .copied()
        .collect();
    if recipients.is_empty() {
        return;
    }
    if let Err(e) = gateway.multicast(&recipients, message) {
        warn!(kind = message.kind(), error = %e, "gateway multicast failed");
    }
}
