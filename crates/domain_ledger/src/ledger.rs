//! The balance ledger
//!
//! `BalanceLedger` is the single authority over balance mutation. Every
//! operation reduces to a merged set of per-member deltas handed to the
//! version-stamped store as one atomic unit:
//!
//! - applying an expense debits each participant their share and credits
//!   the payer the full converted amount;
//! - reversing an expense applies the exact inverse;
//! - recording a settlement credits the payer and debits the payee, the
//!   mirror image of an expense.
//!
//! Reads never recompute anything from history; balances are maintained
//! incrementally.

use std::collections::BTreeMap;

use core_kernel::{GroupId, MemberId, Money};
use domain_expense::Expense;
use rust_decimal::Decimal;
use tracing::debug;

use crate::balance::Balance;
use crate::error::LedgerError;
use crate::store::{BalanceStore, DEFAULT_MAX_RETRIES};

/// The per-group, per-member signed balance ledger.
#[derive(Debug, Default)]
pub struct BalanceLedger {
    store: BalanceStore,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::with_max_retries(DEFAULT_MAX_RETRIES)
    }

    /// Creates a ledger with a custom bound on optimistic-write retries.
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            store: BalanceStore::new(max_retries),
        }
    }

    /// Applies an expense's balance effect as one atomic unit.
    ///
    /// Participants are debited their shares; the payer is credited the
    /// full converted amount. A payer who also participates nets the two.
    pub fn apply_expense(&self, expense: &Expense) -> Result<(), LedgerError> {
        if !expense.is_active {
            return Err(LedgerError::Validation(format!(
                "expense {} is inactive; reversal is a separate operation",
                expense.id
            )));
        }

        let deltas = Self::expense_deltas(expense)?;
        self.store.apply_deltas(
            expense.group_id,
            expense.converted_amount.currency(),
            &deltas,
        )?;
        debug!(expense_id = %expense.id, group_id = %expense.group_id, "expense applied to ledger");
        Ok(())
    }

    /// Reverses a previously applied expense by applying the exact
    /// inverse deltas.
    ///
    /// This is the explicit balance-reversal operation for expenses that
    /// were soft-deactivated; deactivation alone never touches the
    /// ledger.
    pub fn reverse_expense(&self, expense: &Expense) -> Result<(), LedgerError> {
        let deltas: Vec<(MemberId, Decimal)> = Self::expense_deltas(expense)?
            .into_iter()
            .map(|(member, delta)| (member, -delta))
            .collect();

        self.store.apply_deltas(
            expense.group_id,
            expense.converted_amount.currency(),
            &deltas,
        )?;
        debug!(expense_id = %expense.id, group_id = %expense.group_id, "expense reversed on ledger");
        Ok(())
    }

    /// Records a completed settlement payment: the payer's debt shrinks,
    /// the payee's credit shrinks. Mirror image of an expense, so the
    /// group's zero-sum invariant is preserved.
    pub fn apply_settlement(
        &self,
        group: GroupId,
        from: MemberId,
        to: MemberId,
        amount: Money,
    ) -> Result<(), LedgerError> {
        if from == to {
            return Err(LedgerError::validation(
                "settlement payer and payee must differ",
            ));
        }
        if !amount.is_positive() {
            return Err(LedgerError::Validation(format!(
                "settlement amount must be positive, got {amount}"
            )));
        }

        let deltas = [(from, amount.amount()), (to, -amount.amount())];
        let mut deltas = deltas.to_vec();
        deltas.sort_by_key(|(member, _)| *member);

        self.store.apply_deltas(group, amount.currency(), &deltas)?;
        debug!(%group, %from, %to, %amount, "settlement applied to ledger");
        Ok(())
    }

    /// Returns every balance row of a group (every member ever
    /// referenced, zero balances included), sorted by member id.
    pub fn balances_for_group(&self, group: GroupId) -> Vec<Balance> {
        let currency = match self.store.group_currency(group) {
            Some(currency) => currency,
            None => return Vec::new(),
        };

        self.store
            .group_rows(group)
            .into_iter()
            .map(|(member, amount)| Balance {
                group_id: group,
                member,
                amount,
                currency,
            })
            .collect()
    }

    /// Returns one member's balance, if they were ever referenced.
    pub fn balance_of(&self, group: GroupId, member: MemberId) -> Option<Balance> {
        let currency = self.store.group_currency(group)?;
        self.store.get(group, member).map(|amount| Balance {
            group_id: group,
            member,
            amount,
            currency,
        })
    }

    /// Merges an expense's split debits and payer credit into one delta
    /// per member, re-checking reconciliation as defense in depth.
    fn expense_deltas(expense: &Expense) -> Result<Vec<(MemberId, Decimal)>, LedgerError> {
        let total = expense.converted_amount.amount();
        let share_sum: Decimal = expense.split.iter().map(|l| l.amount.amount()).sum();
        if (share_sum - total).abs() > Money::EPSILON {
            return Err(LedgerError::Validation(format!(
                "expense {} does not reconcile: shares {share_sum} vs total {total}",
                expense.id
            )));
        }

        let mut deltas: BTreeMap<MemberId, Decimal> = BTreeMap::new();
        for line in &expense.split {
            *deltas.entry(line.member).or_insert(Decimal::ZERO) -= line.amount.amount();
        }
        *deltas.entry(expense.paid_by).or_insert(Decimal::ZERO) += total;

        Ok(deltas.into_iter().collect())
    }
}
