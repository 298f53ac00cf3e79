//! The engine facade
//!
//! `LedgerEngine` composes the domain crates behind the method-level
//! contract the host service consumes. Every operation is synchronous and
//! completes in-memory; there is no I/O here. FX rates were the last
//! external dependency and they arrive through the [`RateSource`] port.

use std::sync::Arc;

use core_kernel::{Currency, GroupId, MemberId, Money, SettlementId};
use domain_expense::{Expense, FxRate, NewExpense};
use domain_ledger::{Balance, BalanceLedger};
use domain_settlement::{
    suggest_settlements, Settlement, SettlementRecorder, SuggestedPayment,
};
use tracing::instrument;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::rates::RateSource;

/// The read-only slice of an externally-owned group the engine needs.
///
/// The full Group (member roster included) lives with the host; the
/// engine only ever needs the id and the base currency, and it does not
/// enforce membership.
#[derive(Debug, Clone, Copy)]
pub struct GroupRef {
    pub id: GroupId,
    pub base_currency: Currency,
}

impl GroupRef {
    pub fn new(id: GroupId, base_currency: Currency) -> Self {
        Self { id, base_currency }
    }
}

/// The group ledger & settlement engine.
pub struct LedgerEngine {
    ledger: BalanceLedger,
    settlements: SettlementRecorder,
    rates: Arc<dyn RateSource>,
}

impl LedgerEngine {
    pub fn new(rates: Arc<dyn RateSource>) -> Self {
        Self::with_config(EngineConfig::default(), rates)
    }

    pub fn with_config(config: EngineConfig, rates: Arc<dyn RateSource>) -> Self {
        Self {
            ledger: BalanceLedger::with_max_retries(config.max_conflict_retries),
            settlements: SettlementRecorder::new(),
            rates,
        }
    }

    /// Creates an expense and applies it to the group's ledger.
    ///
    /// Resolves the FX rate through the port, normalizes and splits the
    /// amount, re-verifies reconciliation, and applies the balance deltas
    /// as one atomic unit. Returns the validated record for the host to
    /// persist; on any error nothing was applied.
    #[instrument(skip(self, new_expense), fields(group_id = %group.id))]
    pub fn add_expense(
        &self,
        group: &GroupRef,
        new_expense: NewExpense,
    ) -> Result<Expense, EngineError> {
        if new_expense.group_id != group.id {
            return Err(EngineError::Validation(format!(
                "expense targets group {}, operation is for group {}",
                new_expense.group_id, group.id
            )));
        }

        let rate = self.resolve_rate(new_expense.amount.currency(), group.base_currency)?;
        let expense = Expense::create(new_expense, group.base_currency, rate)?;
        self.ledger.apply_expense(&expense)?;
        Ok(expense)
    }

    /// Reverses a previously applied expense's balance effect.
    ///
    /// The explicit counterpart to soft deactivation: deactivating an
    /// expense never touches balances on its own.
    #[instrument(skip(self, expense), fields(expense_id = %expense.id))]
    pub fn reverse_expense(&self, expense: &Expense) -> Result<(), EngineError> {
        self.ledger.reverse_expense(expense)?;
        Ok(())
    }

    /// Returns every balance of the group, zero balances included,
    /// sorted by member id.
    pub fn get_balances(&self, group_id: GroupId) -> Vec<Balance> {
        self.ledger.balances_for_group(group_id)
    }

    /// Proposes payments that would zero the group's balances. Reads the
    /// ledger only; pending settlements have no influence.
    #[instrument(skip(self))]
    pub fn suggest_settlements(&self, group_id: GroupId) -> Vec<SuggestedPayment> {
        suggest_settlements(&self.ledger.balances_for_group(group_id))
    }

    /// Records a pending settlement. No ledger effect until completion.
    ///
    /// The amount must be in the group's base currency, because
    /// settlements adjust base-currency balances directly.
    #[instrument(skip(self), fields(group_id = %group.id))]
    pub fn create_settlement(
        &self,
        group: &GroupRef,
        from: MemberId,
        to: MemberId,
        amount: Money,
    ) -> Result<Settlement, EngineError> {
        if amount.currency() != group.base_currency {
            return Err(EngineError::Validation(format!(
                "settlement amount is in {}, group is denominated in {}",
                amount.currency(),
                group.base_currency
            )));
        }

        Ok(self.settlements.create(group.id, from, to, amount)?)
    }

    /// Completes a pending settlement, applying its balance adjustment
    /// exactly once.
    #[instrument(skip(self))]
    pub fn complete_settlement(&self, id: SettlementId) -> Result<Settlement, EngineError> {
        Ok(self.settlements.complete(id, &self.ledger)?)
    }

    /// Cancels a pending settlement. Never touches the ledger.
    #[instrument(skip(self))]
    pub fn cancel_settlement(&self, id: SettlementId) -> Result<Settlement, EngineError> {
        Ok(self.settlements.cancel(id)?)
    }

    /// Looks up a settlement record.
    pub fn settlement(&self, id: SettlementId) -> Option<Settlement> {
        self.settlements.get(id)
    }

    /// Returns a group's settlements, oldest first.
    pub fn settlements_for_group(&self, group_id: GroupId) -> Vec<Settlement> {
        self.settlements.for_group(group_id)
    }

    fn resolve_rate(&self, native: Currency, base: Currency) -> Result<FxRate, EngineError> {
        if native == base {
            return Ok(FxRate::IDENTITY);
        }
        let raw = self
            .rates
            .rate(native, base)
            .ok_or(EngineError::MissingRate {
                from: native,
                to: base,
            })?;
        Ok(FxRate::new(raw)?)
    }
}
