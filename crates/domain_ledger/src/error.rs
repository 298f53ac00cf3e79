//! Ledger domain errors

use core_kernel::MoneyError;
use thiserror::Error;

/// Errors that can occur while mutating or reading the ledger
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Concurrent writers kept invalidating our snapshot; the whole
    /// operation may be retried by the caller
    #[error("Balance write conflict persisted after {attempts} attempts")]
    Conflict { attempts: u32 },

    /// The operation's inputs are inconsistent with the ledger
    #[error("Validation error: {0}")]
    Validation(String),

    /// Monetary arithmetic failed
    #[error(transparent)]
    Money(#[from] MoneyError),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }
}
