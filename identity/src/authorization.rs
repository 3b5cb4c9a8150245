//! # Authorization Request
//!
//! Builds the URL that sends the user to the identity provider. The request
//! uses the implicit flow (`response_type=id_token`), so the token comes
//! straight back in the redirect fragment with no server round trip.
//!
//! Exactly five query parameters are sent: `client_id`, `response_type`,
//! `redirect_uri`, `scope`, `nonce`.
//!
//! Every request carries a fresh single-use nonce. The caller keeps the
//! [`Nonce`] from the returned [`AuthorizationRequest`] and hands it back to
//! [`IdentityBinder::complete_login`](crate::IdentityBinder::complete_login)
//! so the token's `nonce` claim can be checked.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{
    BinderConfig, BASE36_ALPHABET, NONCE_PREFIX, NONCE_SUFFIX_LEN, RESPONSE_TYPE, SCOPE,
};

/// A single-use login nonce: `test_nonce_` followed by random base-36.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nonce(String);

impl Nonce {
    /// Generate a fresh nonce.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let suffix: String = (0..NONCE_SUFFIX_LEN)
            .map(|_| BASE36_ALPHABET[rng.gen_range(0..BASE36_ALPHABET.len())] as char)
            .collect();
        Self(format!("{}{}", NONCE_PREFIX, suffix))
    }

    /// Wrap a nonce the caller stored between redirect and callback.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix followed by a non-empty base-36 suffix.
    pub fn has_expected_format(&self) -> bool {
        match self.0.strip_prefix(NONCE_PREFIX) {
            Some(suffix) => {
                !suffix.is_empty()
                    && suffix
                        .bytes()
                        .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
            }
            None => false,
        }
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A ready-to-follow authorization URL and the nonce it carries.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: Url,
    pub nonce: Nonce,
}

impl AuthorizationRequest {
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

/// Build the provider redirect for `config` with a freshly drawn nonce.
pub fn build_authorization_url<R: Rng + ?Sized>(
    config: &BinderConfig,
    rng: &mut R,
) -> AuthorizationRequest {
    let nonce = Nonce::generate(rng);

    let mut url = config.auth_endpoint().clone();
    url.query_pairs_mut()
        .append_pair("client_id", config.client_id())
        .append_pair("response_type", RESPONSE_TYPE)
        .append_pair("redirect_uri", config.redirect_uri())
        .append_pair("scope", SCOPE)
        .append_pair("nonce", nonce.as_str());

    tracing::debug!(
        endpoint = %config.auth_endpoint(),
        redirect_uri = config.redirect_uri(),
        "built authorization url"
    );

    AuthorizationRequest { url, nonce }
}
