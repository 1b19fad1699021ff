//! # Shared Crypto Crate
//!
//! Cryptographic primitives used across the Mortgage-Chain subsystems.
//!
//! ## Contents
//!
//! - **Signatures**: Ed25519 keypair, public key and signature wrappers
//! - **Hashing**: SHA-256 helpers over canonical byte forms
//! - **Merkle**: Merkle root computation over contract ids
//!
//! Every ledger object (contract, block) is identified and signed over an
//! explicit canonical byte form produced by the owning type; this crate
//! only ever sees opaque byte slices.

pub mod errors;
pub mod hashing;
pub mod merkle;
pub mod signatures;

pub use errors::CryptoError;
pub use hashing::{sha256, sha256_many};
pub use merkle::merkle_root;
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
