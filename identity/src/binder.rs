//! # Identity Binder
//!
//! [`IdentityBinder`] ties the OAuth round trip to address derivation:
//!
//! 1. [`build_authorization_url`](IdentityBinder::build_authorization_url)
//!    sends the user to the provider with a fresh nonce.
//! 2. The provider redirects back with `#id_token=...`.
//! 3. [`complete_login`](IdentityBinder::complete_login) extracts the token,
//!    checks its nonce and expiry, and derives the address.
//!
//! The binder holds no mutable state. The salt is canonicalized once at
//! construction, and every call is independent, so a binder can be shared
//! across threads freely.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::assertion::{IdTokenClaims, IdentityAssertion};
use crate::authorization::{build_authorization_url, AuthorizationRequest, Nonce};
use crate::config::{BinderConfig, Salt};
use crate::derivation::{Address, AddressDerivation, SeededDerivation};
use crate::error::IdentityError;
use crate::fragment::{extract_assertion, provider_error};
use crate::salt::CanonicalSalt;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub assertion: IdentityAssertion,
    pub claims: IdTokenClaims,
    pub address: Address,
}

/// Binds OAuth identity tokens to derived addresses.
pub struct IdentityBinder<D: AddressDerivation = SeededDerivation> {
    config: BinderConfig,
    salt: CanonicalSalt,
    derivation: D,
}

impl IdentityBinder<SeededDerivation> {
    pub fn new(config: BinderConfig) -> Self {
        Self::with_derivation(config, SeededDerivation)
    }
}

impl<D: AddressDerivation> IdentityBinder<D> {
    /// Build a binder around a specific derivation.
    pub fn with_derivation(config: BinderConfig, derivation: D) -> Self {
        let salt = CanonicalSalt::from_secret(config.salt());
        Self {
            config,
            salt,
            derivation,
        }
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// The configured salt in numeric form.
    pub fn canonical_salt(&self) -> &CanonicalSalt {
        &self.salt
    }

    /// Provider redirect with a nonce from the thread-local RNG.
    pub fn build_authorization_url(&self) -> AuthorizationRequest {
        self.build_authorization_url_with(&mut rand::thread_rng())
    }

    pub fn build_authorization_url_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> AuthorizationRequest {
        build_authorization_url(&self.config, rng)
    }

    pub fn extract_assertion(&self, fragment: &str) -> Option<IdentityAssertion> {
        extract_assertion(fragment)
    }

    /// Derive the address for `assertion` under the configured salt.
    pub fn derive_address(&self, assertion: &IdentityAssertion) -> Result<Address, IdentityError> {
        self.derivation.derive(assertion, &self.salt)
    }

    /// Derive under an explicit salt instead of the configured one.
    pub fn derive_address_with_salt(
        &self,
        assertion: &IdentityAssertion,
        salt: &Salt,
    ) -> Result<Address, IdentityError> {
        self.derivation
            .derive(assertion, &CanonicalSalt::from_secret(salt))
    }

    /// Finish a login from the redirect fragment.
    ///
    /// When `expected_nonce` is given, the token's `nonce` claim must equal
    /// it. Without it the nonce is not checked.
    pub fn complete_login(
        &self,
        fragment: &str,
        expected_nonce: Option<&Nonce>,
    ) -> Result<LoginOutcome, IdentityError> {
        self.complete_login_at(fragment, expected_nonce, Utc::now())
    }

    /// [`complete_login`](Self::complete_login) against a fixed clock.
    pub fn complete_login_at(
        &self,
        fragment: &str,
        expected_nonce: Option<&Nonce>,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, IdentityError> {
        if let Some(err) = provider_error(fragment) {
            tracing::warn!(error = %err, "identity provider returned an error");
            return Err(IdentityError::ProviderRejected(err.to_string()));
        }

        let assertion = match extract_assertion(fragment) {
            Some(assertion) => assertion,
            None => {
                tracing::debug!("no id_token in redirect fragment");
                return Err(IdentityError::MissingToken);
            }
        };

        let claims = assertion.decode_claims()?;

        match expected_nonce {
            Some(expected) => verify_nonce(&claims, expected)?,
            None => tracing::debug!("nonce check skipped: no issued nonce supplied"),
        }
        claims.check_expiry(now)?;

        let address = self.derive_address(&assertion)?;
        tracing::info!(
            issuer = %claims.iss,
            address = %address,
            "identity bound to address"
        );

        Ok(LoginOutcome {
            assertion,
            claims,
            address,
        })
    }
}

fn verify_nonce(claims: &IdTokenClaims, expected: &Nonce) -> Result<(), IdentityError> {
    match claims.nonce.as_deref() {
        Some(got) if got == expected.as_str() => Ok(()),
        Some(got) => {
            tracing::warn!("nonce claim does not match the issued nonce");
            Err(IdentityError::NonceMismatch {
                expected: expected.to_string(),
                got: got.to_string(),
            })
        }
        None => Err(IdentityError::MissingNonce),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::tests::{encode_token, HEADER};
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn config(salt: &str) -> BinderConfig {
        BinderConfig::new("client", Salt::new(salt), "http://localhost:5173").unwrap()
    }

    fn token(nonce: Option<&str>, exp: i64) -> String {
        let nonce = nonce
            .map(|n| format!(r#","nonce":"{}""#, n))
            .unwrap_or_default();
        encode_token(
            HEADER,
            &format!(
                r#"{{"iss":"https://accounts.google.com","sub":"7","aud":"client","exp":{}{}}}"#,
                exp, nonce
            ),
            b"sig",
        )
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    /// Counts calls and returns a fixed address.
    struct FixedDerivation {
        calls: Arc<AtomicUsize>,
    }

    impl AddressDerivation for FixedDerivation {
        fn derive(
            &self,
            _assertion: &IdentityAssertion,
            _salt: &CanonicalSalt,
        ) -> Result<Address, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Address::from_bytes([7u8; 32]))
        }
    }

    #[test]
    fn test_derive_is_deterministic() {
        let binder = IdentityBinder::new(config("mysecret"));
        let assertion = IdentityAssertion::new(token(None, 100));
        let a = binder.derive_address(&assertion).unwrap();
        let b = binder.derive_address(&assertion).unwrap();
        assert_eq!(a, b);

        // A fresh binder with the same config agrees.
        let other = IdentityBinder::new(config("mysecret"));
        assert_eq!(other.derive_address(&assertion).unwrap(), a);
    }

    #[test]
    fn test_salt_changes_address() {
        let binder = IdentityBinder::new(config("mysecret"));
        let assertion = IdentityAssertion::new(token(None, 100));
        let a = binder.derive_address(&assertion).unwrap();
        let b = binder
            .derive_address_with_salt(&assertion, &Salt::new("other-secret"))
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(
            binder
                .derive_address_with_salt(&assertion, &Salt::new("mysecret"))
                .unwrap(),
            a
        );
    }

    #[test]
    fn test_complete_login_with_matching_nonce() {
        let binder = IdentityBinder::new(config("mysecret"));
        let request = binder.build_authorization_url();
        let fragment = format!(
            "#id_token={}&authuser=0",
            token(Some(request.nonce.as_str()), 2_000)
        );

        let outcome = binder
            .complete_login_at(&fragment, Some(&request.nonce), at(1_000))
            .unwrap();
        assert_eq!(outcome.claims.sub, "7");
        assert_eq!(
            outcome.address,
            binder.derive_address(&outcome.assertion).unwrap()
        );
    }

    #[test]
    fn test_complete_login_nonce_mismatch() {
        let binder = IdentityBinder::new(config("mysecret"));
        let fragment = format!("#id_token={}", token(Some("test_nonce_aaaa"), 2_000));
        let err = binder
            .complete_login_at(&fragment, Some(&Nonce::new("test_nonce_bbbb")), at(1_000))
            .unwrap_err();
        assert_eq!(
            err,
            IdentityError::NonceMismatch {
                expected: "test_nonce_bbbb".to_string(),
                got: "test_nonce_aaaa".to_string(),
            }
        );
    }

    #[test]
    fn test_complete_login_missing_nonce_claim() {
        let binder = IdentityBinder::new(config("mysecret"));
        let fragment = format!("#id_token={}", token(None, 2_000));
        let err = binder
            .complete_login_at(&fragment, Some(&Nonce::new("test_nonce_x")), at(1_000))
            .unwrap_err();
        assert_eq!(err, IdentityError::MissingNonce);

        // Without an issued nonce the same token is accepted.
        assert!(binder.complete_login_at(&fragment, None, at(1_000)).is_ok());
    }

    #[test]
    fn test_complete_login_expired() {
        let binder = IdentityBinder::new(config("mysecret"));
        let fragment = format!("#id_token={}", token(None, 2_000));
        let err = binder
            .complete_login_at(&fragment, None, at(3_000))
            .unwrap_err();
        assert!(matches!(err, IdentityError::Expired { exp: 2_000, .. }));
    }

    #[test]
    fn test_complete_login_without_token() {
        let binder = IdentityBinder::new(config("mysecret"));
        assert_eq!(
            binder.complete_login("#state=abc", None).unwrap_err(),
            IdentityError::MissingToken
        );
        assert_eq!(
            binder.complete_login("", None).unwrap_err(),
            IdentityError::MissingToken
        );
    }

    #[test]
    fn test_complete_login_provider_error() {
        let binder = IdentityBinder::new(config("mysecret"));
        let err = binder
            .complete_login("#error=access_denied", None)
            .unwrap_err();
        assert_eq!(
            err,
            IdentityError::ProviderRejected("access_denied".to_string())
        );
    }

    #[test]
    fn test_malformed_token_skips_derivation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let binder = IdentityBinder::with_derivation(
            config("mysecret"),
            FixedDerivation {
                calls: Arc::clone(&calls),
            },
        );
        let err = binder
            .complete_login("#id_token=not.a-token", None)
            .unwrap_err();
        assert!(matches!(err, IdentityError::MalformedAssertion(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_custom_derivation_is_used() {
        let calls = Arc::new(AtomicUsize::new(0));
        let binder = IdentityBinder::with_derivation(
            config("mysecret"),
            FixedDerivation {
                calls: Arc::clone(&calls),
            },
        );
        let address = binder
            .derive_address(&IdentityAssertion::new("opaque"))
            .unwrap();
        assert_eq!(address, Address::from_bytes([7u8; 32]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_binder_is_shareable_across_threads() {
        let binder = Arc::new(IdentityBinder::new(config("mysecret")));
        let assertion = IdentityAssertion::new(token(None, 100));
        let expected = binder.derive_address(&assertion).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let binder = Arc::clone(&binder);
                let assertion = assertion.clone();
                std::thread::spawn(move || binder.derive_address(&assertion).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
