//! # Locus On-Chain Calls
//!
//! The Locus on-chain module is a black box invoked by name and argument
//! list. This crate describes those invocations and the two collaborators
//! that carry them out:
//!
//! - **calls** - [`LocusCall`] and the [`MoveCall`] it lowers to
//!   (`check_in`, `create_proposal`).
//! - **collaborators** - [`WalletConnection`] (who is signed in) and
//!   [`TransactionSubmitter`] (who signs and executes).
//! - **runner** - [`ActionRunner`], which checks preconditions, submits a
//!   call, and reports the outcome as a [`StatusBanner`].
//!
//! Nothing here builds or signs transactions itself.

pub mod calls;
pub mod collaborators;
pub mod runner;

pub use calls::{CallArgument, ContractError, LocusCall, MoveCall, PackageId};
pub use collaborators::{SubmissionError, SubmissionReceipt, TransactionSubmitter, WalletConnection};
pub use runner::{ActionRunner, StatusBanner, StatusKind};
