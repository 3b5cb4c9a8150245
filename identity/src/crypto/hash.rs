//! # Hashing Utilities
//!
//! SHA-256 is the only hash function used for identity binding. It is what
//! the salt canonicalization has always used, and any reimplementation that
//! has to agree on derived addresses must use the same digest.
//!
//! ## hash_to_field
//!
//! `hash_to_field` maps arbitrary data to a BN254 scalar field element:
//! SHA-256, read the digest as a big-endian integer, reduce modulo the
//! field order. The address seed lives in this field.

use ark_bn254::Fr;
use ark_ff::PrimeField;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use locus_identity::crypto::sha256;
///
/// let hash = sha256(b"locus");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Same as [`sha256`] but returns a fixed-size array.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// SHA-256 as 64 lower-case hex characters.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256_array(data))
}

/// Hash a sequence of byte slices as if they were concatenated.
pub(crate) fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Hash arbitrary data to a BN254 scalar field element.
///
/// 1. SHA-256 the input.
/// 2. Interpret the digest as a big-endian integer.
/// 3. Reduce modulo the scalar field order `r`.
///
/// ```
/// use locus_identity::crypto::hash::hash_to_field;
///
/// assert_eq!(hash_to_field(b"seed"), hash_to_field(b"seed"));
/// ```
pub fn hash_to_field(data: &[u8]) -> Fr {
    Fr::from_be_bytes_mod_order(&sha256_array(data))
}
