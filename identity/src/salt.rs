//! # Salt Canonicalization
//!
//! The derivation consumes the salt as a non-negative integer, while the
//! deployment configures it as an arbitrary string. The bridge is fixed:
//!
//! ```text
//! salt string -> SHA-256 -> 64 hex chars -> base-16 integer (256 bits)
//! ```
//!
//! Any implementation that must agree on derived addresses has to use this
//! exact mapping. A different canonicalization still yields valid-looking
//! addresses, just different ones, with no error to flag it.

use std::fmt;

use ark_ff::{BigInteger, BigInteger256};

use crate::config::Salt;
use crate::crypto::sha256_hex;
use crate::error::IdentityError;

/// Maximum number of hex digits in a canonical salt (256 bits).
const MAX_HEX_DIGITS: usize = 64;

/// A salt in the numeric form the derivation expects.
///
/// `Display` prints the decimal value.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CanonicalSalt(BigInteger256);

impl CanonicalSalt {
    /// Canonicalize a configured salt. Total over all strings.
    pub fn from_secret(salt: &Salt) -> Self {
        Self::from_secret_str(salt.expose())
    }

    pub fn from_secret_str(salt: &str) -> Self {
        let bytes = crate::crypto::sha256_array(salt.as_bytes());
        Self::from_be_bytes(bytes)
    }

    /// Parse a base-16 digest. Up to 64 hex digits, either case, no prefix.
    pub fn from_hex_digest(digest: &str) -> Result<Self, IdentityError> {
        if digest.is_empty() {
            return Err(IdentityError::InvalidSalt("empty digest".to_string()));
        }
        if digest.len() > MAX_HEX_DIGITS {
            return Err(IdentityError::InvalidSalt(format!(
                "digest has {} hex digits, at most {} allowed",
                digest.len(),
                MAX_HEX_DIGITS
            )));
        }

        let padded = format!("{:0>width$}", digest, width = MAX_HEX_DIGITS);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(&padded, &mut bytes)
            .map_err(|e| IdentityError::InvalidSalt(e.to_string()))?;
        Ok(Self::from_be_bytes(bytes))
    }

    fn from_be_bytes(bytes: [u8; 32]) -> Self {
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let end = 32 - 8 * i;
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[end - 8..end]);
            *limb = u64::from_be_bytes(chunk);
        }
        Self(BigInteger256::new(limbs))
    }

    /// Big-endian, always 32 bytes.
    pub fn to_bytes_be(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.0.to_bytes_be());
        out
    }

    /// 64 lower-case hex digits, zero-padded.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes_be())
    }

    pub fn as_bigint(&self) -> &BigInteger256 {
        &self.0
    }
}

impl fmt::Display for CanonicalSalt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// The numeric salt is as sensitive as the string it came from.
impl fmt::Debug for CanonicalSalt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CanonicalSalt(<redacted>)")
    }
}

/// Hex digest of a salt string, the intermediate step of canonicalization.
pub fn salt_digest(salt: &Salt) -> String {
    sha256_hex(salt.expose().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MYSECRET_DIGEST: &str =
        "652c7dc687d98c9889304ed2e408c74b611e86a40caa51c4b43f1dd5913c5cd0";
    const MYSECRET_DECIMAL: &str =
        "45762207048429596978806926830895763980942677865884805517270515452561984347344";

    #[test]
    fn test_mysecret_canonical_value() {
        let salt = CanonicalSalt::from_secret(&Salt::new("mysecret"));
        assert_eq!(salt.to_hex(), MYSECRET_DIGEST);
        assert_eq!(salt.to_string(), MYSECRET_DECIMAL);
        assert_eq!(salt_digest(&Salt::new("mysecret")), MYSECRET_DIGEST);
    }

    #[test]
    fn test_from_secret_matches_hex_parse() {
        let direct = CanonicalSalt::from_secret_str("mysecret");
        let parsed = CanonicalSalt::from_hex_digest(MYSECRET_DIGEST).unwrap();
        assert_eq!(direct, parsed);
    }

    #[test]
    fn test_hex_parse_is_case_insensitive() {
        let lower = CanonicalSalt::from_hex_digest(MYSECRET_DIGEST).unwrap();
        let upper = CanonicalSalt::from_hex_digest(&MYSECRET_DIGEST.to_uppercase()).unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_short_digest_is_left_padded() {
        let salt = CanonicalSalt::from_hex_digest("ff").unwrap();
        assert_eq!(salt.to_string(), "255");
        assert_eq!(salt.to_bytes_be()[31], 0xff);
        assert!(salt.to_bytes_be()[..31].iter().all(|b| *b == 0));

        // Odd digit counts are fine once padded.
        assert_eq!(CanonicalSalt::from_hex_digest("abc").unwrap().to_string(), "2748");
    }

    #[test]
    fn test_invalid_digests() {
        assert!(matches!(
            CanonicalSalt::from_hex_digest(""),
            Err(IdentityError::InvalidSalt(_))
        ));
        assert!(matches!(
            CanonicalSalt::from_hex_digest("xyz"),
            Err(IdentityError::InvalidSalt(_))
        ));
        let too_long = "0".repeat(65);
        assert!(matches!(
            CanonicalSalt::from_hex_digest(&too_long),
            Err(IdentityError::InvalidSalt(_))
        ));
    }

    #[test]
    fn test_distinct_salts_distinct_values() {
        let a = CanonicalSalt::from_secret_str("mysecret");
        let b = CanonicalSalt::from_secret_str("other-secret");
        assert_ne!(a, b);
        assert_eq!(
            b.to_hex(),
            "9c0ee26e4a1fbb028187486a7ea91f81f8ab81fcf467cba75107dbd3a64244d7"
        );
    }

    #[test]
    fn test_empty_string_still_canonicalizes() {
        let salt = CanonicalSalt::from_secret_str("");
        assert_eq!(
            salt.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_debug_is_redacted() {
        let salt = CanonicalSalt::from_secret_str("mysecret");
        assert!(!format!("{:?}", salt).contains("652c"));
    }
}
