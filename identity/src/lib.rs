// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Locus Identity - Identity-to-Address Binding
//!
//! Locus lets a user sign in with a Google identity token instead of a
//! browser wallet. The token never leaves the client as a credential; it is
//! only used, together with a secret salt, to derive a stable on-chain
//! address for that user.
//!
//! ## Architecture
//!
//! - **config** - Binder configuration (client id, salt, redirect target)
//!   and the protocol constants of the OAuth round trip.
//! - **authorization** - Builds the provider redirect URL and its nonce.
//! - **fragment** - Pulls the `id_token` back out of the redirect fragment.
//! - **assertion** - The opaque identity token and its decoded claims.
//! - **salt** - Canonicalizes the salt string into a 256-bit integer.
//! - **derivation** - The `AddressDerivation` seam and its default
//!   implementation.
//! - **binder** - `IdentityBinder`, which ties the pieces together.
//!
//! ## Determinism
//!
//! `derive(assertion, salt)` is a pure function. The only randomness in the
//! crate is the per-login nonce, and that nonce is not an input to the
//! derivation.

pub mod assertion;
pub mod authorization;
pub mod binder;
pub mod config;
pub mod crypto;
pub mod derivation;
pub mod error;
pub mod fragment;
pub mod salt;

pub use assertion::{Audience, IdTokenClaims, IdentityAssertion};
pub use authorization::{build_authorization_url, AuthorizationRequest, Nonce};
pub use binder::{IdentityBinder, LoginOutcome};
pub use config::{BinderConfig, Salt};
pub use derivation::{Address, AddressDerivation, AddressSeed, SeededDerivation};
pub use error::{ConfigError, IdentityError};
pub use fragment::{extract_assertion, require_assertion, ProviderError};
pub use salt::CanonicalSalt;
