//! Expense records
//!
//! An [`Expense`] is created once, through the normalize → split →
//! reconcile pipeline, and is immutable afterwards apart from soft
//! deactivation. Deactivating an expense does not touch any ledger by
//! itself; reversing its balance effect is a separate, explicit ledger
//! operation.

use chrono::{DateTime, Utc};
use core_kernel::{Currency, ExpenseId, GroupId, MemberId, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conversion::{normalize, FxRate};
use crate::error::ExpenseError;
use crate::split::{compute_split, ShareLine, SplitSpec, SplitType};

/// Host-supplied draft for a new expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub group_id: GroupId,
    /// Who fronted the money; credited for the full converted amount.
    /// Need not be a participant.
    pub paid_by: MemberId,
    /// Amount in the expense's native currency
    pub amount: Money,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub participants: Vec<MemberId>,
    pub split: SplitSpec,
}

/// A validated, base-currency expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub group_id: GroupId,
    pub paid_by: MemberId,
    /// Native-currency amount as entered
    pub amount: Money,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub split_type: SplitType,
    pub participants: Vec<MemberId>,
    /// One line per participant, in participant order
    pub split: Vec<ShareLine>,
    /// The amount in the group's base currency; the value the ledger sees
    pub converted_amount: Money,
    /// The rate that produced `converted_amount`
    pub fx_rate: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Builds a validated expense from a draft.
    ///
    /// Normalizes into the base currency, computes the split, and then
    /// re-verifies reconciliation as a hard gate: an expense whose share
    /// lines do not sum to the converted amount (within `Money::EPSILON`)
    /// is never produced.
    pub fn create(
        new: NewExpense,
        base_currency: Currency,
        rate: FxRate,
    ) -> Result<Expense, ExpenseError> {
        if !new.amount.is_positive() {
            return Err(ExpenseError::Validation(format!(
                "expense amount must be positive, got {}",
                new.amount
            )));
        }

        let converted = normalize(new.amount, rate, base_currency)?;
        let split = compute_split(converted, &new.participants, &new.split)?;

        let mut share_total = Money::zero(base_currency);
        for line in &split {
            share_total = share_total.checked_add(&line.amount)?;
        }
        if !share_total.approx_eq(&converted) {
            return Err(ExpenseError::Validation(format!(
                "split does not reconcile: shares sum to {share_total}, converted amount is {converted}"
            )));
        }

        let expense = Expense {
            id: ExpenseId::new_v7(),
            group_id: new.group_id,
            paid_by: new.paid_by,
            amount: new.amount,
            category: new.category,
            description: new.description,
            date: new.date,
            split_type: new.split.split_type(),
            participants: new.participants,
            split,
            converted_amount: converted,
            fx_rate: rate.as_decimal(),
            is_active: true,
            created_at: Utc::now(),
        };
        debug!(expense_id = %expense.id, group_id = %expense.group_id, "expense reconciled");

        Ok(expense)
    }

    /// Soft-deactivates the expense. The ledger effect, if already
    /// applied, stays in place until explicitly reversed.
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}
