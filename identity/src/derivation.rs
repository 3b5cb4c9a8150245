//! # Address Derivation
//!
//! [`AddressDerivation`] is the seam between the binder and the algorithm
//! that turns `(identity token, numeric salt)` into an address. The binder
//! never looks inside; tests swap in their own implementation.
//!
//! [`SeededDerivation`] is the default:
//!
//! ```text
//! claims   = decode(token)                      -> iss, sub, aud
//! seed     = hash_to_field(len(sub) || sub || len(aud) || aud || salt_be32)
//! address  = SHA-256(0x05 || len(iss) || iss || seed_be32)
//! ```
//!
//! Lengths of `sub` and `aud` are 4-byte big-endian; the issuer length is a
//! single byte. The seed binds the user (`sub`) to the app (`aud`) under the
//! salt; the issuer is mixed in last so the same subject at two providers
//! never collides.

use std::fmt;
use std::str::FromStr;

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};

use crate::assertion::{IdTokenClaims, IdentityAssertion};
use crate::config::{ADDRESS_FLAG, ADDRESS_LENGTH, MAX_ISSUER_LENGTH};
use crate::crypto::hash::{hash_to_field, sha256_multi};
use crate::error::IdentityError;
use crate::salt::CanonicalSalt;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 32-byte account address, written `0x` + 64 lower-case hex digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    pub fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

/// Error returned when parsing an [`Address`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address '{0}': expected 0x followed by 64 hex digits")]
pub struct AddressParseError(pub String);

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| AddressParseError(s.to_string()))?;
        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| AddressParseError(s.to_string()))?;
        Ok(Self(bytes))
    }
}

// ---------------------------------------------------------------------------
// AddressSeed
// ---------------------------------------------------------------------------

/// The intermediate seed binding `(sub, aud, salt)`, a BN254 scalar.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AddressSeed(Fr);

impl AddressSeed {
    pub fn compute(sub: &str, aud: &str, salt: &CanonicalSalt) -> Self {
        let mut preimage = Vec::with_capacity(8 + sub.len() + aud.len() + 32);
        preimage.extend_from_slice(&(sub.len() as u32).to_be_bytes());
        preimage.extend_from_slice(sub.as_bytes());
        preimage.extend_from_slice(&(aud.len() as u32).to_be_bytes());
        preimage.extend_from_slice(aud.as_bytes());
        preimage.extend_from_slice(&salt.to_bytes_be());
        Self(hash_to_field(&preimage))
    }

    pub fn to_bytes_be(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.0.into_bigint().to_bytes_be());
        out
    }
}

impl fmt::Display for AddressSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.into_bigint())
    }
}

impl fmt::Debug for AddressSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AddressSeed({})", self)
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Turns an identity token and a numeric salt into an address.
///
/// Implementations must be deterministic and must report tokens they
/// cannot decode as [`IdentityError::MalformedAssertion`].
pub trait AddressDerivation: Send + Sync {
    fn derive(
        &self,
        assertion: &IdentityAssertion,
        salt: &CanonicalSalt,
    ) -> Result<Address, IdentityError>;
}

impl<T: AddressDerivation + ?Sized> AddressDerivation for Box<T> {
    fn derive(
        &self,
        assertion: &IdentityAssertion,
        salt: &CanonicalSalt,
    ) -> Result<Address, IdentityError> {
        (**self).derive(assertion, salt)
    }
}

/// The default derivation: salted seed over `(sub, aud)`, hashed with the
/// issuer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeededDerivation;

impl SeededDerivation {
    /// The seed for `assertion`, without the final issuer hash.
    pub fn seed(
        &self,
        assertion: &IdentityAssertion,
        salt: &CanonicalSalt,
    ) -> Result<AddressSeed, IdentityError> {
        let claims = assertion.decode_claims()?;
        Self::seed_from_claims(&claims, salt)
    }

    /// The seed for already-decoded claims.
    pub fn seed_from_claims(
        claims: &IdTokenClaims,
        salt: &CanonicalSalt,
    ) -> Result<AddressSeed, IdentityError> {
        let aud = claims.audience().ok_or_else(|| {
            IdentityError::MalformedAssertion("aud claim is empty".to_string())
        })?;
        Ok(AddressSeed::compute(&claims.sub, aud, salt))
    }

    /// Hash a seed under an issuer into the final address.
    pub fn address_from_seed(iss: &str, seed: &AddressSeed) -> Result<Address, IdentityError> {
        if iss.len() > MAX_ISSUER_LENGTH {
            return Err(IdentityError::MalformedAssertion(format!(
                "issuer is {} bytes, at most {} allowed",
                iss.len(),
                MAX_ISSUER_LENGTH
            )));
        }
        let seed_bytes = seed.to_bytes_be();
        let digest = sha256_multi(&[
            &[ADDRESS_FLAG],
            &[iss.len() as u8],
            iss.as_bytes(),
            &seed_bytes,
        ]);
        Ok(Address(digest))
    }
}

impl AddressDerivation for SeededDerivation {
    fn derive(
        &self,
        assertion: &IdentityAssertion,
        salt: &CanonicalSalt,
    ) -> Result<Address, IdentityError> {
        let claims = assertion.decode_claims()?;
        let seed = Self::seed_from_claims(&claims, salt)?;
        Self::address_from_seed(&claims.iss, &seed)
    }
}
