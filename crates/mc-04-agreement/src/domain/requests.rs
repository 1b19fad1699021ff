//! Request cache: the only cross-message state in the engine.
//!
//! Every outstanding request (signature, block fetch, traversal) lives
//! here under a correlation id with an explicit deadline. Removing an
//! entry early — because the awaited response arrived — is the only
//! cancellation primitive. Expiry handling is idempotent: an entry drains
//! exactly once.

use crate::domain::traversal::TraversalState;
use shared_types::entities::{Hash, PeerId};
use std::collections::HashMap;
use uuid::Uuid;

/// Phase of a two-phase signature exchange, for observability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgreementPhase {
    /// Initiator signed and sent; awaiting the counter-signature.
    Proposed,
    /// Counterparty validated and signed; awaiting local storage.
    CounterSigned,
    /// Both sides stored the contract. Terminal.
    Finalized,
    /// No response within the window. Terminal.
    TimedOut,
}

/// A pending cross-message request.
#[derive(Clone, Debug)]
pub enum PendingRequest {
    /// An outstanding signature-request we initiated.
    Signature {
        contract_id: Hash,
        counterparty: PeerId,
        phase: AgreementPhase,
    },
    /// An outstanding block-request; retried on timeout.
    BlockFetch { block_id: Hash, peer: PeerId },
    /// An outstanding confirmation query.
    Traversal(TraversalState),
}

struct Entry {
    request: PendingRequest,
    deadline_ms: u64,
}

/// Timeout-bearing table of outstanding requests, keyed by correlation id.
pub struct RequestCache {
    timeout_ms: u64,
    entries: HashMap<Uuid, Entry>,
}

impl RequestCache {
    /// Create a cache with the given per-entry timeout.
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            entries: HashMap::new(),
        }
    }

    /// Number of outstanding requests.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no requests are outstanding.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a correlation id is outstanding.
    pub fn contains(&self, id: &Uuid) -> bool {
        self.entries.contains_key(id)
    }

    /// Track a new request, stamping its deadline from `now_ms`.
    pub fn insert(&mut self, id: Uuid, request: PendingRequest, now_ms: u64) {
        self.entries.insert(
            id,
            Entry {
                request,
                deadline_ms: now_ms + self.timeout_ms,
            },
        );
    }

    /// Mutable access to an outstanding request.
    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut PendingRequest> {
        self.entries.get_mut(id).map(|entry| &mut entry.request)
    }

    /// Remove an entry early: the cancellation primitive.
    pub fn remove(&mut self, id: &Uuid) -> Option<PendingRequest> {
        self.entries.remove(id).map(|entry| entry.request)
    }

    /// Find and remove the block-fetch entry for `block_id`, if any.
    /// Used when the awaited block arrives through any path.
    pub fn resolve_block_fetch(&mut self, block_id: &Hash) -> bool {
        let found = self.entries.iter().find_map(|(id, entry)| {
            matches!(&entry.request, PendingRequest::BlockFetch { block_id: wanted, .. } if wanted == block_id)
                .then_some(*id)
        });
        match found {
            Some(id) => {
                self.entries.remove(&id);
                true
            }
            None => false,
        }
    }

    /// Whether a block-fetch for `block_id` is already outstanding.
    pub fn has_block_fetch(&self, block_id: &Hash) -> bool {
        self.entries.values().any(|entry| {
            matches!(&entry.request, PendingRequest::BlockFetch { block_id: wanted, .. } if wanted == block_id)
        })
    }

    /// Drain every entry whose deadline passed.
    pub fn expired(&mut self, now_ms: u64) -> Vec<(Uuid, PendingRequest)> {
        let ids: Vec<Uuid> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.deadline_ms <= now_ms)
            .map(|(id, _)| *id)
            .collect();
        ids.into_iter()
            .filter_map(|id| self.entries.remove(&id).map(|entry| (id, entry.request)))
            .collect()
    }
}
