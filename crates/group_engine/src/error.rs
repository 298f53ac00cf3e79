//! Engine error aggregation
//!
//! Domain errors bubble up typed; [`ErrorKind`] collapses them into the
//! classification a host needs for its transport boundary (validation vs
//! conflict vs not-found vs invalid-state vs invalid-rate). The engine
//! retries nothing except write conflicts, and those only inside the
//! ledger's bounded loop, so every error here is final from the engine's
//! point of view.

use core_kernel::{Currency, MemberIdError};
use domain_expense::ExpenseError;
use domain_ledger::LedgerError;
use domain_settlement::SettlementError;
use thiserror::Error;

/// Transport-agnostic classification of engine errors.
///
/// A host maps these at its boundary (validation -> 400, conflict -> 409,
/// not-found -> 404, ...); the mapping itself is out of engine scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input: splits that do not reconcile, bad percentages or
    /// weights, malformed member ids. Never retried.
    Validation,
    /// A non-positive, missing, or misapplied FX rate; the caller should
    /// re-fetch a rate.
    InvalidRate,
    /// Concurrent writes kept colliding past the retry bound; the whole
    /// request may be retried.
    Conflict,
    /// The referenced settlement does not exist.
    NotFound,
    /// The settlement is in a terminal state.
    InvalidState,
}

/// Unified error for all engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Expense(#[from] ExpenseError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    /// The rate source had no rate for this currency pair
    #[error("No exchange rate available from {from} to {to}")]
    MissingRate { from: Currency, to: Currency },

    /// Engine-level input validation
    #[error("Validation error: {0}")]
    Validation(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Expense(ExpenseError::InvalidRate(_)) => ErrorKind::InvalidRate,
            EngineError::Expense(_) => ErrorKind::Validation,

            EngineError::Ledger(e) => ledger_kind(e),

            EngineError::Settlement(SettlementError::NotFound(_)) => ErrorKind::NotFound,
            EngineError::Settlement(SettlementError::InvalidState { .. }) => {
                ErrorKind::InvalidState
            }
            EngineError::Settlement(SettlementError::Ledger(e)) => ledger_kind(e),
            EngineError::Settlement(SettlementError::Validation(_)) => ErrorKind::Validation,

            EngineError::MissingRate { .. } => ErrorKind::InvalidRate,
            EngineError::Validation(_) => ErrorKind::Validation,
        }
    }
}

fn ledger_kind(error: &LedgerError) -> ErrorKind {
    match error {
        LedgerError::Conflict { .. } => ErrorKind::Conflict,
        _ => ErrorKind::Validation,
    }
}

impl From<MemberIdError> for EngineError {
    fn from(error: MemberIdError) -> Self {
        EngineError::Validation(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{MemberId, SettlementId};
    use domain_settlement::SettlementStatus;
    use rust_decimal_macros::dec;

    #[test]
    fn kinds_follow_the_taxonomy() {
        let validation: EngineError =
            ExpenseError::Validation("percentages sum to 99".into()).into();
        assert_eq!(validation.kind(), ErrorKind::Validation);

        let rate: EngineError = ExpenseError::InvalidRate(dec!(-1)).into();
        assert_eq!(rate.kind(), ErrorKind::InvalidRate);

        let conflict: EngineError = LedgerError::Conflict { attempts: 3 }.into();
        assert_eq!(conflict.kind(), ErrorKind::Conflict);

        let not_found: EngineError = SettlementError::NotFound(SettlementId::new()).into();
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let state: EngineError = SettlementError::InvalidState {
            id: SettlementId::new(),
            status: SettlementStatus::Completed,
        }
        .into();
        assert_eq!(state.kind(), ErrorKind::InvalidState);

        let missing = EngineError::MissingRate {
            from: Currency::EUR,
            to: Currency::USD,
        };
        assert_eq!(missing.kind(), ErrorKind::InvalidRate);
    }

    #[test]
    fn conflicts_inside_settlement_completion_classify_as_conflict() {
        let nested: EngineError =
            SettlementError::Ledger(LedgerError::Conflict { attempts: 3 }).into();
        assert_eq!(nested.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn member_parse_failures_are_validation_errors() {
        let parse_err = "x_123".parse::<MemberId>().unwrap_err();
        let engine_err: EngineError = parse_err.into();
        assert_eq!(engine_err.kind(), ErrorKind::Validation);
    }
}
