//! # SHA-256 Hashing
//!
//! All ledger identifiers (contract ids, block ids, proof-of-work hashes,
//! Merkle nodes) are SHA-256 over canonical byte forms.

use sha2::{Digest, Sha256};

/// A 32-byte SHA-256 digest.
pub type Digest32 = [u8; 32];

/// Hash data with SHA-256 (one-shot).
#[inline]
pub fn sha256(data: &[u8]) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash multiple inputs as one concatenated message.
pub fn sha256_many(inputs: &[&[u8]]) -> Digest32 {
    let mut hasher = Sha256::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let h1 = sha256(b"test");
        let h2 = sha256(b"test");
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_different_inputs() {
        let h1 = sha256(b"input1");
        let h2 = sha256(b"input2");
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_many_equals_concat() {
        let joined = sha256(b"hello world");
        let parts = sha256_many(&[b"hello ", b"world"]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn test_known_vector() {
        // SHA-256("abc")
        let hash = sha256(b"abc");
        assert_eq!(
            hex::encode(hash),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
