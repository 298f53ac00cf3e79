//! Core Kernel - Foundational types for the group ledger engine
//!
//! This crate provides the building blocks used across all domain modules:
//! - Money with precise decimal arithmetic at ledger (minor-unit) precision
//! - Strongly-typed identifiers for groups, expenses, and settlements
//! - The member identity union covering registered users and friend
//!   placeholders

pub mod identifiers;
pub mod member;
pub mod money;

pub use identifiers::{ExpenseId, FriendId, GroupId, SettlementId, UserId};
pub use member::{MemberId, MemberIdError};
pub use money::{Currency, Money, MoneyError};
