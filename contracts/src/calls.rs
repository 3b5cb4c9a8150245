//! # Locus Call Descriptors
//!
//! The deployed module exposes two entry functions:
//!
//! - `check_in(location: String, clock: &Clock)` records a visit. The clock
//!   is the shared system object `0x6`.
//! - `create_proposal(description: String)` files a proposal.
//!
//! A [`MoveCall`] is the fully-qualified target plus its argument list,
//! serializable for whatever submitter carries it.

use std::fmt;
use std::str::FromStr;

use locus_identity::derivation::AddressParseError;
use locus_identity::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Package the Locus module is published under.
pub const DEFAULT_PACKAGE_ID: &str =
    "0x7fe284ce69c9bd0cbd43637b3a5bb961b71df27eb66ac40efe90b179bfa6df6c";

pub const MODULE_NAME: &str = "locus";

/// The shared on-chain clock object.
pub const CLOCK_OBJECT_ID: &str = "0x6";

/// Location used by the one-tap check-in.
pub const DEFAULT_LOCATION: &str = "Tokyo";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised before a call ever reaches a submitter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// No wallet account is connected.
    #[error("no account connected")]
    NotConnected,

    /// The proposal text is empty or whitespace.
    #[error("proposal description must not be empty")]
    EmptyProposal,

    /// The check-in location is empty or whitespace.
    #[error("check-in location must not be empty")]
    EmptyLocation,

    /// The package id is not a valid address.
    #[error(transparent)]
    InvalidPackage(#[from] AddressParseError),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Id of the published package holding the Locus module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageId(Address);

impl PackageId {
    pub fn new(address: Address) -> Self {
        Self(address)
    }
}

impl Default for PackageId {
    fn default() -> Self {
        DEFAULT_PACKAGE_ID
            .parse()
            .expect("DEFAULT_PACKAGE_ID is a valid address")
    }
}

impl FromStr for PackageId {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// One argument of a Move call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CallArgument {
    /// A pure value, here always a UTF-8 string.
    Pure(String),
    /// A reference to an on-chain object by id.
    Object(String),
}

/// A fully-qualified entry-function call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCall {
    /// `<package>::<module>::<function>`.
    pub target: String,
    pub arguments: Vec<CallArgument>,
}

impl MoveCall {
    pub fn function(&self) -> &str {
        self.target.rsplit("::").next().unwrap_or_default()
    }
}

/// The actions a Locus user can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocusCall {
    CheckIn { location: String },
    CreateProposal { description: String },
}

impl LocusCall {
    /// Check in at [`DEFAULT_LOCATION`].
    pub fn default_check_in() -> Self {
        LocusCall::CheckIn {
            location: DEFAULT_LOCATION.to_string(),
        }
    }

    pub fn function_name(&self) -> &'static str {
        match self {
            LocusCall::CheckIn { .. } => "check_in",
            LocusCall::CreateProposal { .. } => "create_proposal",
        }
    }

    /// Lower to a [`MoveCall`] against `package`.
    ///
    /// Proposal text is sent as typed; it is only rejected when blank.
    pub fn to_move_call(&self, package: &PackageId) -> Result<MoveCall, ContractError> {
        let arguments = match self {
            LocusCall::CheckIn { location } => {
                if location.trim().is_empty() {
                    return Err(ContractError::EmptyLocation);
                }
                vec![
                    CallArgument::Pure(location.clone()),
                    CallArgument::Object(CLOCK_OBJECT_ID.to_string()),
                ]
            }
            LocusCall::CreateProposal { description } => {
                if description.trim().is_empty() {
                    return Err(ContractError::EmptyProposal);
                }
                vec![CallArgument::Pure(description.clone())]
            }
        };

        Ok(MoveCall {
            target: format!("{}::{}::{}", package, MODULE_NAME, self.function_name()),
            arguments,
        })
    }
}
