//! Expense domain errors

use core_kernel::MoneyError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while building an expense
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpenseError {
    /// The split policy or participant set is invalid
    #[error("Validation error: {0}")]
    Validation(String),

    /// The exchange rate is non-positive, or not 1 for a same-currency
    /// expense
    #[error("Invalid exchange rate: {0}")]
    InvalidRate(Decimal),

    /// Monetary arithmetic failed
    #[error(transparent)]
    Money(#[from] MoneyError),
}

impl ExpenseError {
    pub fn validation(message: impl Into<String>) -> Self {
        ExpenseError::Validation(message.into())
    }
}
