//! Ledger Domain - Who Owes Whom
//!
//! The balance ledger is the source of truth for a group's debts: one
//! signed base-currency balance per (group, member), maintained
//! incrementally as expenses and settlements are applied. Every mutation
//! is a pure additive delta committed atomically against a
//! version-stamped store, which makes two properties structural:
//!
//! - the final state of a group is independent of the order its history
//!   was applied in;
//! - a group's balances always sum to zero (within epsilon), because
//!   every credit to a payer is matched by equal debits to participants.

pub mod balance;
pub mod error;
pub mod ledger;
pub mod store;

pub use balance::Balance;
pub use error::LedgerError;
pub use ledger::BalanceLedger;
pub use store::BalanceStore;
