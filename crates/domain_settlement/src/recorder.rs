//! Settlement recording
//!
//! The recorder owns the settlement records and is the only code that
//! transitions them. Completion is check -> apply-to-ledger -> mark, all
//! under the recorder's write lock, so the ledger adjustment for a given
//! settlement happens exactly once: a second completion attempt finds a
//! terminal status before anything touches the ledger.

use std::collections::HashMap;
use std::sync::RwLock;

use core_kernel::{GroupId, MemberId, Money, SettlementId};
use domain_ledger::BalanceLedger;
use tracing::{debug, info};

use crate::error::SettlementError;
use crate::settlement::{Settlement, SettlementStatus};

/// Creates, completes, and cancels settlements against a ledger.
#[derive(Debug, Default)]
pub struct SettlementRecorder {
    settlements: RwLock<HashMap<SettlementId, Settlement>>,
}

impl SettlementRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pending settlement. No ledger effect until completion.
    pub fn create(
        &self,
        group_id: GroupId,
        from: MemberId,
        to: MemberId,
        amount: Money,
    ) -> Result<Settlement, SettlementError> {
        let settlement = Settlement::new(group_id, from, to, amount)?;
        debug!(settlement_id = %settlement.id, %group_id, "settlement created");

        self.settlements
            .write()
            .expect("settlement store lock poisoned")
            .insert(settlement.id, settlement.clone());
        Ok(settlement)
    }

    /// Completes a pending settlement: applies the mirror-image balance
    /// adjustment to the ledger, then marks it completed.
    ///
    /// Fails with `NotFound` for unknown ids and `InvalidState` for
    /// settlements already in a terminal state; in both cases the ledger
    /// is untouched. If the ledger rejects the adjustment (e.g. a write
    /// conflict past the retry bound), the settlement stays pending and
    /// the whole completion may be retried.
    pub fn complete(
        &self,
        id: SettlementId,
        ledger: &BalanceLedger,
    ) -> Result<Settlement, SettlementError> {
        let mut settlements = self
            .settlements
            .write()
            .expect("settlement store lock poisoned");
        let settlement = settlements
            .get_mut(&id)
            .ok_or(SettlementError::NotFound(id))?;

        if settlement.status != SettlementStatus::Pending {
            return Err(SettlementError::InvalidState {
                id,
                status: settlement.status,
            });
        }

        ledger.apply_settlement(
            settlement.group_id,
            settlement.from,
            settlement.to,
            settlement.amount,
        )?;
        settlement.complete()?;

        info!(settlement_id = %id, group_id = %settlement.group_id, "settlement completed");
        Ok(settlement.clone())
    }

    /// Cancels a pending settlement. Never touches the ledger.
    pub fn cancel(&self, id: SettlementId) -> Result<Settlement, SettlementError> {
        let mut settlements = self
            .settlements
            .write()
            .expect("settlement store lock poisoned");
        let settlement = settlements
            .get_mut(&id)
            .ok_or(SettlementError::NotFound(id))?;

        settlement.cancel()?;
        info!(settlement_id = %id, "settlement cancelled");
        Ok(settlement.clone())
    }

    /// Looks up a settlement by id.
    pub fn get(&self, id: SettlementId) -> Option<Settlement> {
        self.settlements
            .read()
            .expect("settlement store lock poisoned")
            .get(&id)
            .cloned()
    }

    /// Returns a group's settlements, oldest first.
    pub fn for_group(&self, group_id: GroupId) -> Vec<Settlement> {
        let mut settlements: Vec<Settlement> = self
            .settlements
            .read()
            .expect("settlement store lock poisoned")
            .values()
            .filter(|s| s.group_id == group_id)
            .cloned()
            .collect();
        settlements.sort_by_key(|s| (s.created_at, s.id));
        settlements
    }
}
