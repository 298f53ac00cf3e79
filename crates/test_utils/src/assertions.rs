//! Custom assertion helpers for ledger invariants

use core_kernel::Money;
use domain_expense::ShareLine;
use domain_ledger::Balance;
use domain_settlement::{Settlement, SettlementStatus};
use rust_decimal::Decimal;

/// Asserts two Money values share a currency and differ by at most
/// `tolerance`.
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts a group's balances sum to zero within `tolerance`.
pub fn assert_group_balanced(balances: &[Balance], tolerance: Decimal) {
    let total: Decimal = balances.iter().map(|b| b.amount).sum();
    assert!(
        total.abs() <= tolerance,
        "Group is not balanced: sum={}, tolerance={}",
        total,
        tolerance
    );
}

/// Asserts every balance in the group is within epsilon of zero.
pub fn assert_all_settled(balances: &[Balance]) {
    for balance in balances {
        assert!(
            balance.is_settled(),
            "Member {} is not settled: balance={}",
            balance.member,
            balance.amount
        );
    }
}

/// Asserts a settlement reached `Completed` with a completion timestamp.
pub fn assert_settlement_completed(settlement: &Settlement) {
    assert_eq!(
        settlement.status,
        SettlementStatus::Completed,
        "Settlement {} is {}, expected completed",
        settlement.id,
        settlement.status
    );
    assert!(
        settlement.completed_at.is_some(),
        "Completed settlement {} has no completion timestamp",
        settlement.id
    );
}

/// Asserts share lines reconcile with the expense total within
/// `Money::EPSILON`.
pub fn assert_shares_reconcile(lines: &[ShareLine], total: &Money) {
    let sum: Decimal = lines.iter().map(|l| l.amount.amount()).sum();
    let diff = (sum - total.amount()).abs();
    assert!(
        diff <= Money::EPSILON,
        "Shares do not reconcile: sum={}, total={}, diff={}",
        sum,
        total.amount(),
        diff
    );
}
