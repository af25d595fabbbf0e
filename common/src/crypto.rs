//! Common cryptography helper functions for Arbor

use crate::hash::Hash;
use blake2::{digest::consts::U32, Blake2b, Digest};

/// Get a Blake2b-256 hash of some bytes
pub fn blake2b_256(data: &[u8]) -> Hash<32> {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hasher.finalize());
    Hash::new(bytes)
}
