//! # Action Runner
//!
//! Drives one user action end to end: require a connected account, lower
//! the action to a [`MoveCall`], hand it to the submitter, and turn the
//! outcome into the status banner the user sees.
//!
//! Precondition failures (no account, blank input) are returned as
//! [`ContractError`] and nothing is submitted. Submission failures are not
//! errors at this level; they become an error banner.

use locus_identity::Address;
use serde::{Deserialize, Serialize};

use crate::calls::{ContractError, LocusCall, PackageId};
use crate::collaborators::{SubmissionReceipt, TransactionSubmitter, WalletConnection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Success,
    Error,
}

/// The one-line outcome shown after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBanner {
    pub kind: StatusKind,
    pub message: String,
    /// Present on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<SubmissionReceipt>,
}

impl StatusBanner {
    pub fn is_success(&self) -> bool {
        self.kind == StatusKind::Success
    }
}

fn success_message(call: &LocusCall) -> String {
    match call {
        LocusCall::CheckIn { location } => format!("Checked in successfully at {}!", location),
        LocusCall::CreateProposal { .. } => "Proposal submitted successfully!".to_string(),
    }
}

fn failure_message(call: &LocusCall, reason: &str) -> String {
    match call {
        LocusCall::CheckIn { .. } => format!("Check-in failed: {}", reason),
        LocusCall::CreateProposal { .. } => format!("Submission failed: {}", reason),
    }
}

/// Runs Locus actions against a wallet and a submitter.
pub struct ActionRunner<W, S> {
    wallet: W,
    submitter: S,
    package: PackageId,
}

impl<W: WalletConnection, S: TransactionSubmitter> ActionRunner<W, S> {
    pub fn new(wallet: W, submitter: S) -> Self {
        Self::with_package(wallet, submitter, PackageId::default())
    }

    pub fn with_package(wallet: W, submitter: S, package: PackageId) -> Self {
        Self {
            wallet,
            submitter,
            package,
        }
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    pub fn account(&self) -> Option<Address> {
        self.wallet.current_account()
    }

    pub fn disconnect(&mut self) {
        self.wallet.disconnect();
        tracing::info!("wallet disconnected");
    }

    pub fn check_in(&self, location: impl Into<String>) -> Result<StatusBanner, ContractError> {
        self.run(&LocusCall::CheckIn {
            location: location.into(),
        })
    }

    pub fn submit_proposal(
        &self,
        description: impl Into<String>,
    ) -> Result<StatusBanner, ContractError> {
        self.run(&LocusCall::CreateProposal {
            description: description.into(),
        })
    }

    /// Submit `call` as the connected account.
    pub fn run(&self, call: &LocusCall) -> Result<StatusBanner, ContractError> {
        let sender = self
            .wallet
            .current_account()
            .ok_or(ContractError::NotConnected)?;
        let move_call = call.to_move_call(&self.package)?;

        tracing::debug!(target_fn = %move_call.target, sender = %sender, "submitting call");

        match self.submitter.submit(&sender, &move_call) {
            Ok(receipt) => {
                tracing::info!(
                    function = call.function_name(),
                    digest = %receipt.digest,
                    "call executed"
                );
                Ok(StatusBanner {
                    kind: StatusKind::Success,
                    message: success_message(call),
                    receipt: Some(receipt),
                })
            }
            Err(err) => {
                tracing::warn!(function = call.function_name(), error = %err, "call failed");
                Ok(StatusBanner {
                    kind: StatusKind::Error,
                    message: failure_message(call, &err.message),
                    receipt: None,
                })
            }
        }
    }
}
