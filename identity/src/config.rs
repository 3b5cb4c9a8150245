//! # Binder Configuration & Constants
//!
//! Every fixed value of the OAuth round trip lives here, next to the
//! [`BinderConfig`] that carries the two deployment secrets (client id and
//! salt) plus the redirect target.
//!
//! A `BinderConfig` is validated when it is built. An empty client id or
//! salt is rejected up front instead of producing a request the identity
//! provider will refuse later.

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// OAuth constants
// ---------------------------------------------------------------------------

/// Google's OAuth 2.0 authorization endpoint.
pub const DEFAULT_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Implicit flow: the provider returns the identity token in the fragment.
pub const RESPONSE_TYPE: &str = "id_token";

/// Permission scopes requested from the provider.
pub const SCOPE: &str = "openid email profile";

/// Fragment key carrying the identity token on the way back.
pub const ID_TOKEN_KEY: &str = "id_token";

/// Literal prefix of every generated nonce.
pub const NONCE_PREFIX: &str = "test_nonce_";

/// Number of random base-36 characters after [`NONCE_PREFIX`].
pub const NONCE_SUFFIX_LEN: usize = 11;

/// Alphabet for the nonce suffix.
pub const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// ---------------------------------------------------------------------------
// Address constants
// ---------------------------------------------------------------------------

/// Signature-scheme flag prefixed to the issuer when hashing an address.
pub const ADDRESS_FLAG: u8 = 0x05;

/// Length of a derived address in bytes.
pub const ADDRESS_LENGTH: usize = 32;

/// Issuers longer than this cannot be length-prefixed with a single byte.
pub const MAX_ISSUER_LENGTH: usize = u8::MAX as usize;

// ---------------------------------------------------------------------------
// Environment variables
// ---------------------------------------------------------------------------

pub const ENV_CLIENT_ID: &str = "LOCUS_GOOGLE_CLIENT_ID";
pub const ENV_SALT: &str = "LOCUS_ZKLOGIN_SALT";
pub const ENV_REDIRECT_URI: &str = "LOCUS_REDIRECT_URI";
pub const ENV_AUTH_ENDPOINT: &str = "LOCUS_AUTH_ENDPOINT";

// ---------------------------------------------------------------------------
// Salt
// ---------------------------------------------------------------------------

/// The deployment salt, as configured.
///
/// Kept as the raw string; [`CanonicalSalt`](crate::salt::CanonicalSalt)
/// turns it into the integer the derivation consumes. `Debug` never prints
/// the value.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Salt(String);

impl Salt {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw salt string. Do not log this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Salt(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// BinderConfig
// ---------------------------------------------------------------------------

/// Everything the identity binder needs from its deployment.
#[derive(Debug, Clone)]
pub struct BinderConfig {
    client_id: String,
    salt: Salt,
    redirect_uri: String,
    auth_endpoint: Url,
}

/// On-disk shape of a binder config file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    client_id: String,
    salt: Salt,
    redirect_uri: String,
    #[serde(default)]
    auth_endpoint: Option<String>,
}

impl BinderConfig {
    /// Build a config against Google's default authorization endpoint.
    pub fn new(
        client_id: impl Into<String>,
        salt: Salt,
        redirect_uri: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let client_id = client_id.into().trim().to_string();
        if client_id.is_empty() {
            return Err(ConfigError::MissingClientId);
        }
        if salt.is_empty() {
            return Err(ConfigError::MissingSalt);
        }

        let redirect_uri = redirect_uri.into().trim().to_string();
        validate_redirect_uri(&redirect_uri)?;

        let auth_endpoint = Url::parse(DEFAULT_AUTH_ENDPOINT)
            .map_err(|_| ConfigError::InvalidAuthEndpoint(DEFAULT_AUTH_ENDPOINT.to_string()))?;

        Ok(Self {
            client_id,
            salt,
            redirect_uri,
            auth_endpoint,
        })
    }

    /// Point the binder at a different authorization endpoint.
    ///
    /// The endpoint must not carry a query or fragment of its own; the
    /// sign-in URL owns the whole query string.
    pub fn with_auth_endpoint(mut self, endpoint: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(endpoint)
            .map_err(|_| ConfigError::InvalidAuthEndpoint(endpoint.to_string()))?;
        if !matches!(url.scheme(), "http" | "https")
            || url.host_str().is_none()
            || url.query().is_some()
            || url.fragment().is_some()
        {
            return Err(ConfigError::InvalidAuthEndpoint(endpoint.to_string()));
        }
        self.auth_endpoint = url;
        Ok(self)
    }

    /// Read the config from `LOCUS_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the config through an arbitrary key lookup. `from_env` is this
    /// with `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = lookup(ENV_CLIENT_ID).ok_or(ConfigError::MissingEnv(ENV_CLIENT_ID))?;
        let salt = lookup(ENV_SALT).ok_or(ConfigError::MissingEnv(ENV_SALT))?;
        let redirect_uri =
            lookup(ENV_REDIRECT_URI).ok_or(ConfigError::MissingEnv(ENV_REDIRECT_URI))?;

        let config = Self::new(client_id, Salt::new(salt), redirect_uri)?;
        match lookup(ENV_AUTH_ENDPOINT) {
            Some(endpoint) => config.with_auth_endpoint(&endpoint),
            None => Ok(config),
        }
    }

    /// Parse a TOML document with `client_id`, `salt`, `redirect_uri` and
    /// an optional `auth_endpoint`.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(s)?;
        let config = Self::new(raw.client_id, raw.salt, raw.redirect_uri)?;
        match raw.auth_endpoint {
            Some(endpoint) => config.with_auth_endpoint(&endpoint),
            None => Ok(config),
        }
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn salt(&self) -> &Salt {
        &self.salt
    }

    /// The callback target, exactly as configured (no trailing slash added).
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn auth_endpoint(&self) -> &Url {
        &self.auth_endpoint
    }
}

fn validate_redirect_uri(uri: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidRedirectUri {
        uri: uri.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(uri).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    if parsed.fragment().is_some() {
        return Err(invalid("must not carry a fragment"));
    }
    Ok(())
}
