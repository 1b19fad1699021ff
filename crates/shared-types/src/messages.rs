//! # Wire Messages
//!
//! The closed set of point-to-point/multicast messages exchanged between
//! peers. Transport (peer discovery, framing, authentication) is external;
//! the engine only sees decoded messages and an outbound gateway port.
//!
//! Every encoded message must fit the wire budget
//! ([`crate::constants::MAX_BLOCK_BYTES`]); a block that would exceed it
//! must shed contracts before mining.

use crate::constants::MAX_BLOCK_BYTES;
use crate::entities::{Block, Contract, ContractType, Hash, PeerId};
use crate::errors::CodecError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// All messages the ledger engine sends or receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerMessage {
    /// Propose a contract for counter-signature.
    SignatureRequest { id: Uuid, contract: Contract },
    /// Return a counter-signed contract.
    SignatureResponse { id: Uuid, contract: Contract },
    /// Gossip a finalized contract.
    Contract { contract: Contract },
    /// Ask a verifier for a specific block.
    BlockRequest { block_id: Hash },
    /// Deliver a block, solicited or broadcast.
    Block { block: Block },
    /// Ask verifiers for chain depth of a contract, or the latest
    /// descendant of a given type.
    TraversalRequest {
        id: Uuid,
        contract_id: Hash,
        contract_type: Option<ContractType>,
    },
    /// Reply to a traversal request; both fields are none when the
    /// contract is not chained.
    TraversalResponse {
        id: Uuid,
        contract: Option<Contract>,
        confirmations: Option<u64>,
    },
}

impl LedgerMessage {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SignatureRequest { .. } => "signature-request",
            Self::SignatureResponse { .. } => "signature-response",
            Self::Contract { .. } => "contract",
            Self::BlockRequest { .. } => "block-request",
            Self::Block { .. } => "block",
            Self::TraversalRequest { .. } => "traversal-request",
            Self::TraversalResponse { .. } => "traversal-response",
        }
    }

    /// Encode for the wire, enforcing the byte budget.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let bytes = bincode::serialize(self).map_err(|e| CodecError::Encode {
            what: "message",
            detail: e.to_string(),
        })?;
        if bytes.len() > MAX_BLOCK_BYTES {
            return Err(CodecError::Oversize {
                what: "message",
                size: bytes.len(),
                limit: MAX_BLOCK_BYTES,
            });
        }
        Ok(bytes)
    }

    /// Decode from the wire. A failed decode means "drop, log, continue".
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() > MAX_BLOCK_BYTES {
            return Err(CodecError::Oversize {
                what: "message",
                size: bytes.len(),
                limit: MAX_BLOCK_BYTES,
            });
        }
        bincode::deserialize(bytes).map_err(|e| CodecError::Decode {
            what: "message",
            detail: e.to_string(),
        })
    }
}

/// Transport failure surfaced by a gateway implementation.
#[derive(Debug, thiserror::Error)]
#[error("Message gateway failure: {0}")]
pub struct GatewayError(pub String);

/// Outbound port to the external transport.
///
/// Implementations own addressing, framing and authentication; the engine
/// treats delivery as best-effort and never retries at this layer.
pub trait MessageGateway: Send + Sync {
    /// Send to a single peer.
    fn send(&self, peer: &PeerId, message: &LedgerMessage) -> Result<(), GatewayError>;

    /// Send to every listed peer.
    fn multicast(&self, peers: &[PeerId], message: &LedgerMessage) -> Result<(), GatewayError> {
        for peer in peers {
            self.send(peer, message)?;
        }
        Ok(())
    }
}
