//! # Core Ledger Entities
//!
//! Defines the ledger entities shared across all subsystems.
//!
//! ## Clusters
//!
//! - **Agreements**: `ContractType`, `Contract`
//! - **Chain**: `Block`, `BlockIndex`
//!
//! ## Canonical bytes and ids
//!
//! Contracts and blocks hash and sign over explicit field-by-field byte
//! concatenations in a fixed order. Ids cover content fields only — never
//! signatures — so an id is stable before and after the parties sign.
//! Because ids are content-derived and the content fields never mutate
//! after creation, id stability holds by construction.

use crate::constants::{GENESIS_ID, MAX_BLOCK_BYTES};
use crate::errors::CodecError;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_crypto::signatures::{verify_raw, EMPTY_SIGNATURE};
use shared_crypto::{merkle_root, sha256, CryptoError, Ed25519KeyPair};

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

/// A 32-byte SHA-256 hash.
pub type Hash = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// Peers are addressed by their public key.
pub type PeerId = PublicKey;

// =============================================================================
// CLUSTER A: AGREEMENTS
// =============================================================================

/// The kind of agreement a contract records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractType {
    /// A bank financing a house purchase for a borrower.
    Mortgage,
    /// An investor taking over part of a mortgage.
    Investment,
    /// An ownership transfer descending from a prior contract.
    Transfer,
}

/// A bilateral, signed agreement.
///
/// Created unsigned by the initiating party, signed by the initiator, then
/// counter-signed by the other party during the two-phase agreement
/// exchange. Signature slots hold [`EMPTY_SIGNATURE`] until the owning
/// party signs.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Id of the contract this one descends from; empty marks a root.
    pub previous_hash: Vec<u8>,
    /// Public key of the initiating party.
    pub from_id: PublicKey,
    /// Public key of the counterparty.
    pub to_id: PublicKey,
    /// Initiator's signature over the canonical bytes.
    #[serde_as(as = "Bytes")]
    pub from_signature: Signature,
    /// Counterparty's signature over the canonical bytes.
    #[serde_as(as = "Bytes")]
    pub to_signature: Signature,
    /// Opaque payload; a bincode-encoded document matching `contract_type`.
    pub document: Vec<u8>,
    /// The kind of agreement.
    pub contract_type: ContractType,
    /// Unix seconds at creation.
    pub time: u64,
    /// Whether ownership under this contract has not yet been passed on.
    /// Tracked by the application layer, not by chain validation.
    pub untransferred: bool,
}

impl Contract {
    /// Create a new unsigned contract.
    pub fn new(
        previous_hash: Vec<u8>,
        from_id: PublicKey,
        to_id: PublicKey,
        document: Vec<u8>,
        contract_type: ContractType,
        time: u64,
    ) -> Self {
        Self {
            previous_hash,
            from_id,
            to_id,
            from_signature: EMPTY_SIGNATURE,
            to_signature: EMPTY_SIGNATURE,
            document,
            contract_type,
            time,
            untransferred: true,
        }
    }

    /// Canonical content bytes: `from_id || to_id || time || previous_hash
    /// || document`. Signatures are never included, so both parties sign
    /// identical bytes and the id is stable across signing.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes =
            Vec::with_capacity(32 + 32 + 8 + self.previous_hash.len() + self.document.len());
        bytes.extend_from_slice(&self.from_id);
        bytes.extend_from_slice(&self.to_id);
        bytes.extend_from_slice(&self.time.to_be_bytes());
        bytes.extend_from_slice(&self.previous_hash);
        bytes.extend_from_slice(&self.document);
        bytes
    }

    /// Content-derived id.
    pub fn id(&self) -> Hash {
        sha256(&self.canonical_bytes())
    }

    /// Canonical bytes plus both signature slots; the form hashed for
    /// proof-of-work as part of the enclosing block.
    pub fn full_bytes(&self) -> Vec<u8> {
        let mut bytes = self.canonical_bytes();
        bytes.extend_from_slice(&self.from_signature);
        bytes.extend_from_slice(&self.to_signature);
        bytes
    }

    /// Wire-encoded size, counted against the block byte budget. Wire
    /// list elements encode independently, so block sizes are additive in
    /// contract sizes.
    pub fn serialized_size(&self) -> usize {
        // Serialization of these flat fields cannot fail; an unencodable
        // contract would be rejected as oversized anyway.
        bincode::serialized_size(self)
            .map(|size| size as usize)
            .unwrap_or(usize::MAX)
    }

    /// The parent contract id, if any.
    ///
    /// Errors when `previous_hash` is neither empty nor 32 bytes.
    pub fn previous_id(&self) -> Result<Option<Hash>, CodecError> {
        match self.previous_hash.len() {
            0 => Ok(None),
            32 => {
                let mut id = [0u8; 32];
                id.copy_from_slice(&self.previous_hash);
                Ok(Some(id))
            }
            n => Err(CodecError::BadPreviousHash(n)),
        }
    }

    /// Sign the canonical bytes with `identity`, filling the slot matching
    /// its public key. Fails when the identity is neither party.
    pub fn sign(&mut self, identity: &Ed25519KeyPair) -> Result<(), CryptoError> {
        let public = identity.public_key_bytes();
        let signature = identity.sign(&self.canonical_bytes());
        if public == self.from_id {
            self.from_signature = *signature.as_bytes();
            Ok(())
        } else if public == self.to_id {
            self.to_signature = *signature.as_bytes();
            Ok(())
        } else {
            Err(CryptoError::NotAParty)
        }
    }

    /// Verify the signature belonging to `identity`'s role.
    pub fn verify(&self, identity: &PublicKey) -> Result<(), CryptoError> {
        let message = self.canonical_bytes();
        if *identity == self.from_id {
            verify_raw(&self.from_id, &message, &self.from_signature)
        } else if *identity == self.to_id {
            verify_raw(&self.to_id, &message, &self.to_signature)
        } else {
            Err(CryptoError::NotAParty)
        }
    }

    /// Verify both parties' signatures; a finalized contract must pass.
    pub fn verify_both(&self) -> Result<(), CryptoError> {
        self.verify(&self.from_id)?;
        self.verify(&self.to_id)
    }

    /// Whether the given party has filled its signature slot.
    pub fn signed_by(&self, identity: &PublicKey) -> bool {
        if *identity == self.from_id {
            self.from_signature != EMPTY_SIGNATURE
        } else if *identity == self.to_id {
            self.to_signature != EMPTY_SIGNATURE
        } else {
            false
        }
    }
}

// =============================================================================
// CLUSTER B: THE CHAIN
// =============================================================================

/// Wire-envelope overhead of a block: the enum tag of the enclosing
/// message. A block within the budget is guaranteed to gossip.
const WIRE_ENVELOPE_BYTES: usize = 4;

/// A proof-of-work-sealed batch of contracts extending a previous block.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Public key of the producing verifier.
    pub creator: PublicKey,
    /// Creator's signature over the canonical block bytes.
    #[serde_as(as = "Bytes")]
    pub creator_signature: Signature,
    /// Id of the parent block, or [`GENESIS_ID`].
    pub previous_hash: Hash,
    /// Ordered contracts; ids must be unique within the block.
    pub contracts: Vec<Contract>,
    /// Merkle root over the contract ids.
    pub merkle_root_hash: Hash,
    /// Proof-of-work ceiling this block must hash below.
    pub target_difficulty: U256,
    /// Unix seconds; advanced during mining.
    pub time: u64,
}

impl Block {
    /// Create a new unsigned block.
    pub fn new(
        creator: PublicKey,
        previous_hash: Hash,
        contracts: Vec<Contract>,
        target_difficulty: U256,
        time: u64,
    ) -> Self {
        let merkle_root_hash = merkle_over(&contracts);
        Self {
            creator,
            creator_signature: EMPTY_SIGNATURE,
            previous_hash,
            contracts,
            merkle_root_hash,
            target_difficulty,
            time,
        }
    }

    /// Canonical content bytes: `creator || previous_hash || merkle_root ||
    /// target || time`. Contracts are committed through the Merkle root.
    /// Signed by the creator; also the id preimage.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(32 + 32 + 32 + 32 + 8);
        bytes.extend_from_slice(&self.creator);
        bytes.extend_from_slice(&self.previous_hash);
        bytes.extend_from_slice(&self.merkle_root_hash);
        let mut target = [0u8; 32];
        self.target_difficulty.to_big_endian(&mut target);
        bytes.extend_from_slice(&target);
        bytes.extend_from_slice(&self.time.to_be_bytes());
        bytes
    }

    /// Content-derived id; stable because nothing it covers changes after
    /// creation.
    pub fn id(&self) -> Hash {
        sha256(&self.canonical_bytes())
    }

    /// Full serialized form: canonical bytes, creator signature, then each
    /// contract's full bytes. The proof-of-work hash is computed over
    /// this, so the proof covers the signature.
    pub fn full_bytes(&self) -> Vec<u8> {
        let mut bytes = self.canonical_bytes();
        bytes.extend_from_slice(&self.creator_signature);
        bytes.extend_from_slice(&(self.contracts.len() as u32).to_be_bytes());
        for contract in &self.contracts {
            bytes.extend_from_slice(&contract.full_bytes());
        }
        bytes
    }

    /// Wire-encoded size including the enclosing message tag, counted
    /// against the wire budget.
    pub fn serialized_size(&self) -> usize {
        bincode::serialized_size(self)
            .map(|size| size as usize + WIRE_ENVELOPE_BYTES)
            .unwrap_or(usize::MAX)
    }

    /// Sign the canonical bytes as the creator.
    pub fn sign(&mut self, identity: &Ed25519KeyPair) {
        self.creator_signature = *identity.sign(&self.canonical_bytes()).as_bytes();
    }

    /// Verify the creator's signature against the canonical bytes.
    pub fn verify(&self) -> Result<(), CryptoError> {
        verify_raw(
            &self.creator,
            &self.canonical_bytes(),
            &self.creator_signature,
        )
    }

    /// Recompute the Merkle root from the contract list.
    pub fn compute_merkle_root(&self) -> Hash {
        merkle_over(&self.contracts)
    }

    /// Structural integrity: Merkle root matches, contract ids unique,
    /// serialized size within the wire budget.
    pub fn check_integrity(&self) -> Result<(), BlockFlaw> {
        if self.compute_merkle_root() != self.merkle_root_hash {
            return Err(BlockFlaw::MerkleMismatch);
        }

        let mut seen = std::collections::HashSet::with_capacity(self.contracts.len());
        for contract in &self.contracts {
            if !seen.insert(contract.id()) {
                return Err(BlockFlaw::DuplicateContract(contract.id()));
            }
        }

        let size = self.serialized_size();
        if size > MAX_BLOCK_BYTES {
            return Err(BlockFlaw::Oversize {
                size,
                limit: MAX_BLOCK_BYTES,
            });
        }

        Ok(())
    }

    /// Whether this block extends the genesis marker directly.
    pub fn extends_genesis(&self) -> bool {
        self.previous_hash == GENESIS_ID
    }
}

/// Structural defects detectable without chain context.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BlockFlaw {
    #[error("Merkle root does not match contract list")]
    MerkleMismatch,

    #[error("Duplicate contract id in block: {0:?}")]
    DuplicateContract(Hash),

    #[error("Block is {size} bytes, exceeds wire limit {limit}")]
    Oversize { size: usize, limit: usize },
}

fn merkle_over(contracts: &[Contract]) -> Hash {
    let leaves: Vec<Hash> = contracts.iter().map(Contract::id).collect();
    merkle_root(&leaves)
}

/// A block's position in the best chain. Only the winning path is indexed;
/// forks exist in storage without an index entry. Height 0 anchors the
/// genesis parent marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockIndex {
    /// Id of the indexed block.
    pub block_id: Hash,
    /// Height in the best chain.
    pub height: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::difficulty_init;

    fn keypair(seed: u8) -> Ed25519KeyPair {
        Ed25519KeyPair::from_seed([seed; 32])
    }

    fn sample_contract(from: &Ed25519KeyPair, to: &Ed25519KeyPair) -> Contract {
        Contract::new(
            Vec::new(),
            from.public_key_bytes(),
            to.public_key_bytes(),
            vec![1, 2, 3, 4],
            ContractType::Mortgage,
            1_700_000_000,
        )
    }

    #[test]
    fn test_contract_id_stable_across_signing() {
        let from = keypair(1);
        let to = keypair(2);
        let mut contract = sample_contract(&from, &to);

        let unsigned_id = contract.id();
        contract.sign(&from).unwrap();
        contract.sign(&to).unwrap();
        assert_eq!(contract.id(), unsigned_id);
    }

    #[test]
    fn test_contract_sign_requires_party() {
        let from = keypair(1);
        let to = keypair(2);
        let stranger = keypair(3);
        let mut contract = sample_contract(&from, &to);

        assert_eq!(contract.sign(&stranger), Err(CryptoError::NotAParty));
        assert!(contract.sign(&from).is_ok());
        assert!(contract.verify(&from.public_key_bytes()).is_ok());
        // Counterparty has not signed yet
        assert!(contract.verify(&to.public_key_bytes()).is_err());
    }

    #[test]
    fn test_contract_roundtrip() {
        let from = keypair(1);
        let to = keypair(2);
        let mut contract = sample_contract(&from, &to);
        contract.sign(&from).unwrap();

        let bytes = bincode::serialize(&contract).unwrap();
        let decoded: Contract = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, contract);
        assert_eq!(decoded.id(), contract.id());
    }

    #[test]
    fn test_previous_id_validation() {
        let from = keypair(1);
        let to = keypair(2);
        let mut contract = sample_contract(&from, &to);

        assert_eq!(contract.previous_id().unwrap(), None);
        contract.previous_hash = vec![7u8; 32];
        assert_eq!(contract.previous_id().unwrap(), Some([7u8; 32]));
        contract.previous_hash = vec![7u8; 5];
        assert!(contract.previous_id().is_err());
    }

    #[test]
    fn test_block_id_stable_across_signing() {
        let creator = keypair(9);
        let mut block = Block::new(
            creator.public_key_bytes(),
            GENESIS_ID,
            Vec::new(),
            difficulty_init(),
            1_700_000_100,
        );

        let unsigned_id = block.id();
        block.sign(&creator);
        assert_eq!(block.id(), unsigned_id);
        assert!(block.verify().is_ok());
    }

    #[test]
    fn test_block_integrity_checks() {
        let creator = keypair(9);
        let from = keypair(1);
        let to = keypair(2);
        let contract = sample_contract(&from, &to);

        let mut block = Block::new(
            creator.public_key_bytes(),
            GENESIS_ID,
            vec![contract.clone()],
            difficulty_init(),
            1_700_000_100,
        );
        assert_eq!(block.check_integrity(), Ok(()));

        // Tampered merkle root
        block.merkle_root_hash = [0xFF; 32];
        assert_eq!(block.check_integrity(), Err(BlockFlaw::MerkleMismatch));
        block.merkle_root_hash = block.compute_merkle_root();

        // Duplicate contract ids
        block.contracts = vec![contract.clone(), contract.clone()];
        block.merkle_root_hash = block.compute_merkle_root();
        assert_eq!(
            block.check_integrity(),
            Err(BlockFlaw::DuplicateContract(contract.id()))
        );
    }

    #[test]
    fn test_block_size_budget() {
        let creator = keypair(9);
        let from = keypair(1);
        let to = keypair(2);

        let mut oversized = sample_contract(&from, &to);
        oversized.document = vec![0u8; MAX_BLOCK_BYTES];
        let block = Block::new(
            creator.public_key_bytes(),
            GENESIS_ID,
            vec![oversized],
            difficulty_init(),
            1_700_000_100,
        );

        assert!(matches!(
            block.check_integrity(),
            Err(BlockFlaw::Oversize { .. })
        ));
    }

    #[test]
    fn test_block_within_budget_gossips() {
        let creator = keypair(9);
        let from = keypair(1);
        let to = keypair(2);
        let mut block = Block::new(
            creator.public_key_bytes(),
            GENESIS_ID,
            vec![sample_contract(&from, &to)],
            difficulty_init(),
            1_700_000_100,
        );
        block.sign(&creator);
        assert_eq!(block.check_integrity(), Ok(()));

        // A block passing the size check must fit the wire as a message.
        let message = crate::messages::LedgerMessage::Block { block };
        assert!(message.encode().unwrap().len() <= MAX_BLOCK_BYTES);
    }
}
