//! # Collaborators
//!
//! The wallet and the transaction pipeline live outside Locus. They are
//! consumed through two narrow traits so the runner can be driven by a
//! browser wallet, a zkLogin signer, or a test double alike.

use locus_identity::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calls::MoveCall;

/// Read access to the connected account, plus the disconnect action.
pub trait WalletConnection {
    /// The connected account, if any.
    fn current_account(&self) -> Option<Address>;

    fn disconnect(&mut self);
}

/// What the chain hands back for an executed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Transaction digest as reported by the submitter.
    pub digest: String,
}

/// A submission that did not go through. The message is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SubmissionError {
    pub message: String,
}

impl SubmissionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Signs and executes a call on behalf of `sender`.
pub trait TransactionSubmitter {
    fn submit(
        &self,
        sender: &Address,
        call: &MoveCall,
    ) -> Result<SubmissionReceipt, SubmissionError>;
}

impl<T: WalletConnection + ?Sized> WalletConnection for Box<T> {
    fn current_account(&self) -> Option<Address> {
        (**self).current_account()
    }

    fn disconnect(&mut self) {
        (**self).disconnect()
    }
}

impl<T: TransactionSubmitter + ?Sized> TransactionSubmitter for Box<T> {
    fn submit(
        &self,
        sender: &Address,
        call: &MoveCall,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        (**self).submit(sender, call)
    }
}
