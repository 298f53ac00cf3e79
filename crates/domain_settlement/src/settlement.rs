//! Settlement records and their state machine

use chrono::{DateTime, Utc};
use core_kernel::{GroupId, MemberId, Money, SettlementId};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SettlementError;

/// Lifecycle of a settlement
///
/// `Pending` settlements have no ledger effect: recording the intent to
/// pay must not distort balances before money moves. `Completed` and
/// `Cancelled` are both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementStatus {
    Pending,
    Completed,
    Cancelled,
}

impl SettlementStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SettlementStatus::Pending)
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SettlementStatus::Pending => "pending",
            SettlementStatus::Completed => "completed",
            SettlementStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// A (proposed or executed) payment from one member to another
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub group_id: GroupId,
    /// Who pays
    pub from: MemberId,
    /// Who receives
    pub to: MemberId,
    pub amount: Money,
    pub status: SettlementStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Settlement {
    /// Creates a pending settlement. No ledger effect.
    pub fn new(
        group_id: GroupId,
        from: MemberId,
        to: MemberId,
        amount: Money,
    ) -> Result<Self, SettlementError> {
        if from == to {
            return Err(SettlementError::Validation(
                "settlement payer and payee must differ".to_string(),
            ));
        }
        if !amount.is_positive() {
            return Err(SettlementError::Validation(format!(
                "settlement amount must be positive, got {amount}"
            )));
        }

        Ok(Self {
            id: SettlementId::new_v7(),
            group_id,
            from,
            to,
            amount,
            status: SettlementStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        })
    }

    /// Transitions Pending -> Completed, stamping `completed_at`.
    pub fn complete(&mut self) -> Result<(), SettlementError> {
        if self.status != SettlementStatus::Pending {
            return Err(SettlementError::InvalidState {
                id: self.id,
                status: self.status,
            });
        }
        self.status = SettlementStatus::Completed;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Transitions Pending -> Cancelled. No ledger effect.
    pub fn cancel(&mut self) -> Result<(), SettlementError> {
        if self.status != SettlementStatus::Pending {
            return Err(SettlementError::InvalidState {
                id: self.id,
                status: self.status,
            });
        }
        self.status = SettlementStatus::Cancelled;
        Ok(())
    }
}
