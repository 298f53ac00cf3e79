//! Group Ledger & Settlement Engine
//!
//! The library facade an expense-group service embeds. It wires the
//! domain crates together and exposes the five service-level operations:
//! `add_expense`, `get_balances`, `suggest_settlements`,
//! `create_settlement`, and `complete_settlement` (plus explicit
//! `cancel_settlement` and `reverse_expense`).
//!
//! The engine owns no network or storage surface. The host supplies FX
//! rates through the [`RateSource`] port and persists the records the
//! engine returns. Group membership is likewise the host's concern: the
//! engine validates member id *shapes*, not group rosters.

pub mod config;
pub mod error;
pub mod rates;
pub mod service;

pub use config::EngineConfig;
pub use error::{EngineError, ErrorKind};
pub use rates::{FixedRates, RateSource};
pub use service::{GroupRef, LedgerEngine};

// The record types hosts persist and present.
pub use domain_expense::{Expense, NewExpense, ShareLine, SplitSpec, SplitType};
pub use domain_ledger::Balance;
pub use domain_settlement::{Settlement, SettlementStatus, SuggestedPayment};
