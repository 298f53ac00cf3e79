//! Expense Domain - Splits and Currency Normalization
//!
//! This crate turns a raw expense (native-currency amount, split policy,
//! participant set) into a validated, base-currency [`Expense`] record:
//!
//! 1. the currency normalizer converts the native amount into the group's
//!    base currency using a caller-supplied [`FxRate`];
//! 2. the split calculator produces one [`ShareLine`] per participant;
//! 3. a hard reconciliation gate re-verifies that the share lines sum to
//!    the converted amount before the record is handed back.
//!
//! An expense that fails any of these steps is never produced, so every
//! `Expense` in existence is safe to apply to a ledger.

pub mod conversion;
pub mod error;
pub mod expense;
pub mod split;

pub use conversion::{normalize, FxRate};
pub use error::ExpenseError;
pub use expense::{Expense, NewExpense};
pub use split::{
    compute_split, CustomShare, PercentShare, ShareLine, SplitSpec, SplitType, WeightShare,
};
