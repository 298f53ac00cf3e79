//! Settlement Domain - Proposing and Recording Debt Payments
//!
//! Two halves, deliberately separated:
//!
//! - the **suggester** is a pure function over a snapshot of balances: it
//!   pairs the largest creditors with the largest debtors greedily and
//!   proposes a small set of payments that would zero the group;
//! - the **recorder** owns settlement records and their state machine. A
//!   settlement is created `Pending` with no ledger effect at all; only
//!   completion applies the mirror-image balance adjustment, exactly
//!   once.
//!
//! True minimum-transaction debt simplification is NP-hard; the greedy
//! pairing is the accepted approximation and typically lands close to
//! `max(|creditors|, |debtors|) - 1` payments.

pub mod error;
pub mod recorder;
pub mod settlement;
pub mod suggest;

pub use error::SettlementError;
pub use recorder::SettlementRecorder;
pub use settlement::{Settlement, SettlementStatus};
pub use suggest::{suggest_settlements, SuggestedPayment};
