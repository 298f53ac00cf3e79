//! Settlement domain errors

use core_kernel::SettlementId;
use domain_ledger::LedgerError;
use thiserror::Error;

use crate::settlement::SettlementStatus;

/// Errors that can occur while creating or transitioning settlements
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettlementError {
    /// No settlement with this id exists
    #[error("Settlement not found: {0}")]
    NotFound(SettlementId),

    /// The settlement is not in the state the operation requires
    #[error("Settlement {id} is {status}, expected pending")]
    InvalidState {
        id: SettlementId,
        status: SettlementStatus,
    },

    /// The settlement's parameters are invalid
    #[error("Validation error: {0}")]
    Validation(String),

    /// Applying the settlement to the ledger failed; the settlement
    /// stays pending
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
