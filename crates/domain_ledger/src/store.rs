//! Version-stamped balance store
//!
//! Balances live in an in-memory map of version-stamped rows. A write
//! snapshots the rows it will touch, computes the new amounts, and then
//! commits all of them under the write lock only if no snapshotted
//! version moved in the meantime. Commits are all-or-nothing, so a
//! partially applied operation is never observable; writers touching
//! disjoint member sets never invalidate each other, while overlapping
//! writers are caught by the version check instead of silently dropping a
//! delta.

use std::collections::HashMap;
use std::sync::RwLock;

use core_kernel::{Currency, GroupId, MemberId};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::LedgerError;

/// Default bound on optimistic-commit attempts before surfacing a
/// conflict to the caller.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Copy)]
struct Row {
    amount: Decimal,
    version: u64,
}

/// In-memory balance rows for all groups, keyed by (group, member).
#[derive(Debug)]
pub struct BalanceStore {
    rows: RwLock<HashMap<(GroupId, MemberId), Row>>,
    /// Base currency per group, pinned on first write
    currencies: RwLock<HashMap<GroupId, Currency>>,
    max_retries: u32,
}

impl BalanceStore {
    pub fn new(max_retries: u32) -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            currencies: RwLock::new(HashMap::new()),
            max_retries: max_retries.max(1),
        }
    }

    /// Applies a set of balance deltas as one atomic unit.
    ///
    /// `deltas` must contain at most one entry per member (callers merge
    /// duplicates first). A zero delta still materializes the member's
    /// row, which is how "referenced but settled" members become visible
    /// to reads.
    pub fn apply_deltas(
        &self,
        group: GroupId,
        currency: Currency,
        deltas: &[(MemberId, Decimal)],
    ) -> Result<(), LedgerError> {
        if deltas.is_empty() {
            return Err(LedgerError::validation("no balance deltas to apply"));
        }
        self.pin_currency(group, currency)?;

        for attempt in 1..=self.max_retries {
            let snapshot: Vec<(MemberId, u64, Decimal)> = {
                let rows = self.rows.read().expect("balance store lock poisoned");
                deltas
                    .iter()
                    .map(|(member, _)| {
                        let row = rows.get(&(group, *member));
                        (
                            *member,
                            row.map_or(0, |r| r.version),
                            row.map_or(Decimal::ZERO, |r| r.amount),
                        )
                    })
                    .collect()
            };

            let updated: Vec<(MemberId, u64, Decimal)> = snapshot
                .iter()
                .zip(deltas)
                .map(|((member, version, amount), (_, delta))| (*member, *version, *amount + *delta))
                .collect();

            let mut rows = self.rows.write().expect("balance store lock poisoned");
            let unchanged = updated.iter().all(|(member, version, _)| {
                rows.get(&(group, *member)).map_or(0, |r| r.version) == *version
            });

            if unchanged {
                for (member, version, amount) in updated {
                    rows.insert(
                        (group, member),
                        Row {
                            amount,
                            version: version + 1,
                        },
                    );
                }
                return Ok(());
            }

            drop(rows);
            debug!(%group, attempt, "balance snapshot went stale, retrying");
        }

        warn!(%group, attempts = self.max_retries, "balance write conflict exhausted retries");
        Err(LedgerError::Conflict {
            attempts: self.max_retries,
        })
    }

    /// Pins the group's base currency on first write; later writes must
    /// match it, otherwise the caller is mixing currencies in one ledger.
    fn pin_currency(&self, group: GroupId, currency: Currency) -> Result<(), LedgerError> {
        let mut currencies = self.currencies.write().expect("balance store lock poisoned");
        match currencies.get(&group) {
            None => {
                currencies.insert(group, currency);
                Ok(())
            }
            Some(pinned) if *pinned == currency => Ok(()),
            Some(pinned) => Err(LedgerError::Validation(format!(
                "group {group} ledger is denominated in {pinned}, got {currency}"
            ))),
        }
    }

    /// Returns the group's pinned base currency, if any write happened.
    pub fn group_currency(&self, group: GroupId) -> Option<Currency> {
        self.currencies
            .read()
            .expect("balance store lock poisoned")
            .get(&group)
            .copied()
    }

    /// Returns every row of a group, sorted by member id.
    pub fn group_rows(&self, group: GroupId) -> Vec<(MemberId, Decimal)> {
        let rows = self.rows.read().expect("balance store lock poisoned");
        let mut out: Vec<(MemberId, Decimal)> = rows
            .iter()
            .filter(|((g, _), _)| *g == group)
            .map(|((_, member), row)| (*member, row.amount))
            .collect();
        out.sort_by_key(|(member, _)| *member);
        out
    }

    /// Returns one member's amount, if their row was ever materialized.
    pub fn get(&self, group: GroupId, member: MemberId) -> Option<Decimal> {
        self.rows
            .read()
            .expect("balance store lock poisoned")
            .get(&(group, member))
            .map(|r| r.amount)
    }
}

impl Default for BalanceStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn deltas_commit_atomically() {
        let store = BalanceStore::default();
        let group = GroupId::new();
        let (a, b) = (MemberId::new_user(), MemberId::new_user());

        store
            .apply_deltas(group, Currency::USD, &[(a, dec!(30)), (b, dec!(-30))])
            .unwrap();

        assert_eq!(store.get(group, a), Some(dec!(30)));
        assert_eq!(store.get(group, b), Some(dec!(-30)));
    }

    #[test]
    fn zero_delta_materializes_the_row() {
        let store = BalanceStore::default();
        let group = GroupId::new();
        let a = MemberId::new_user();

        store
            .apply_deltas(group, Currency::USD, &[(a, Decimal::ZERO)])
            .unwrap();

        assert_eq!(store.get(group, a), Some(Decimal::ZERO));
        assert_eq!(store.group_rows(group).len(), 1);
    }

    #[test]
    fn empty_delta_set_is_rejected() {
        let store = BalanceStore::default();
        let err = store
            .apply_deltas(GroupId::new(), Currency::USD, &[])
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn currency_is_pinned_per_group() {
        let store = BalanceStore::default();
        let group = GroupId::new();
        let a = MemberId::new_user();

        store
            .apply_deltas(group, Currency::USD, &[(a, dec!(5))])
            .unwrap();
        let err = store
            .apply_deltas(group, Currency::EUR, &[(a, dec!(5))])
            .unwrap_err();

        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(store.group_currency(group), Some(Currency::USD));
        // the failed write must not have touched the row
        assert_eq!(store.get(group, a), Some(dec!(5)));
    }

    #[test]
    fn rows_are_sorted_by_member_id() {
        let store = BalanceStore::default();
        let group = GroupId::new();
        let members = vec![
            MemberId::new_user(),
            MemberId::new_friend(),
            MemberId::new_user(),
        ];

        for member in &members {
            store
                .apply_deltas(group, Currency::USD, &[(*member, dec!(1))])
                .unwrap();
        }

        let rows = store.group_rows(group);
        let mut expected = members.clone();
        expected.sort();
        let got: Vec<_> = rows.iter().map(|(m, _)| *m).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn groups_are_isolated() {
        let store = BalanceStore::default();
        let (g1, g2) = (GroupId::new(), GroupId::new());
        let a = MemberId::new_user();

        store
            .apply_deltas(g1, Currency::USD, &[(a, dec!(10))])
            .unwrap();
        store
            .apply_deltas(g2, Currency::EUR, &[(a, dec!(-4))])
            .unwrap();

        assert_eq!(store.get(g1, a), Some(dec!(10)));
        assert_eq!(store.get(g2, a), Some(dec!(-4)));
    }
}
