//! In-process transport over tokio channels.
//!
//! Serves local clusters and integration tests. Every send round-trips
//! the message through the wire codec, so the byte budget and decode
//! behavior are exercised exactly as a network transport would.

use shared_types::entities::PeerId;
use shared_types::{GatewayError, LedgerMessage, MessageGateway};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

/// Channel-backed gateway between in-process nodes.
pub struct ChannelGateway {
    self_id: PeerId,
    routes: Mutex<HashMap<PeerId, UnboundedSender<(PeerId, LedgerMessage)>>>,
}

impl ChannelGateway {
    /// Create a gateway sending on behalf of `self_id`.
    pub fn new(self_id: PeerId) -> Self {
        Self {
            self_id,
            routes: Mutex::new(HashMap::new()),
        }
    }

    /// Register a peer's inbound channel.
    pub fn connect(&self, peer: PeerId, inbox: UnboundedSender<(PeerId, LedgerMessage)>) {
        self.routes.lock().unwrap().insert(peer, inbox);
    }
}

impl MessageGateway for ChannelGateway {
    fn send(&self, peer: &PeerId, message: &LedgerMessage) -> Result<(), GatewayError> {
        // Round-trip through the codec: enforces the wire budget and
        // delivers exactly what a remote peer would decode.
        let bytes = message
            .encode()
            .map_err(|e| GatewayError(e.to_string()))?;
        let decoded = LedgerMessage::decode(&bytes).map_err(|e| GatewayError(e.to_string()))?;

        let routes = self.routes.lock().unwrap();
        let inbox = routes
            .get(peer)
            .ok_or_else(|| GatewayError("unknown peer".into()))?;
        trace!(kind = message.kind(), bytes = bytes.len(), "gateway send");
        inbox
            .send((self.self_id, decoded))
            .map_err(|_| GatewayError("peer inbox closed".into()))
    }
}
