//! Error types for the identity binder.
//!
//! [`IdentityError`] covers everything that can go wrong while turning a
//! redirect into an address. [`ConfigError`] is raised once, when a
//! [`BinderConfig`](crate::config::BinderConfig) is built.

use thiserror::Error;

/// Errors raised while extracting, checking, or deriving from an identity token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The redirect fragment carried no `id_token`. Callers should treat
    /// this as "no login happened", not as a failure.
    #[error("redirect fragment does not contain an id_token")]
    MissingToken,

    /// The token is not a well-formed three-segment JWT, or its claims
    /// could not be decoded.
    #[error("malformed identity assertion: {0}")]
    MalformedAssertion(String),

    /// The salt could not be canonicalized into an integer.
    #[error("invalid salt: {0}")]
    InvalidSalt(String),

    /// The token's `nonce` claim does not match the nonce that was issued
    /// with the authorization request.
    #[error("nonce mismatch: expected {expected}, got {got}")]
    NonceMismatch {
        /// The nonce sent to the provider.
        expected: String,
        /// The nonce found in the token.
        got: String,
    },

    /// The provider redirected back with an error instead of a token.
    #[error("identity provider rejected the login: {0}")]
    ProviderRejected(String),

    /// A nonce was issued but the token carries no `nonce` claim.
    #[error("identity assertion has no nonce claim")]
    MissingNonce,

    /// The token's `exp` claim is in the past.
    #[error("identity assertion expired at {exp} (now {now})")]
    Expired {
        /// Expiry from the token, seconds since the epoch.
        exp: i64,
        /// Current time, seconds since the epoch.
        now: i64,
    },
}

/// Errors raised while building or loading a binder configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The OAuth client id is empty.
    #[error("OAuth client id must not be empty")]
    MissingClientId,

    /// The salt is empty.
    #[error("salt must not be empty")]
    MissingSalt,

    /// The redirect target is not an absolute http(s) URL.
    #[error("invalid redirect uri '{uri}': {reason}")]
    InvalidRedirectUri {
        /// The value that was rejected.
        uri: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The authorization endpoint is not an absolute http(s) URL.
    #[error("invalid authorization endpoint '{0}'")]
    InvalidAuthEndpoint(String),

    /// A required environment variable is not set.
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for a binder config.
    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}
