//! # Hashing Primitives
//!
//! SHA-256 and a hash-to-field helper over the BN254 scalar field. The
//! salt canonicalization and the default address derivation are both built
//! on these; nothing in the crate hashes any other way.

pub mod hash;

pub use hash::{hash_to_field, sha256, sha256_array, sha256_hex};
