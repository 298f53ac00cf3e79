//! Greedy settlement suggestion
//!
//! Pairs the largest remaining creditor with the largest remaining debtor
//! until one side runs out. Members within `Money::EPSILON` of zero are
//! left alone. The function is read-only: it works on copies of the
//! balances and proposes payments without recording anything.

use core_kernel::{MemberId, Money};
use domain_ledger::Balance;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A proposed payment that would reduce the group's outstanding debt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedPayment {
    /// Who should pay
    pub from: MemberId,
    /// Who should receive
    pub to: MemberId,
    pub amount: Money,
}

/// Proposes a minimal-ish set of payments that would zero every balance.
///
/// Greedy largest-creditor / largest-debtor matching; emits at most
/// `min(|creditors|, |debtors|) + max(|creditors|, |debtors|) - 1`
/// payments and typically about `max(|creditors|, |debtors|) - 1`. Ties
/// are broken by member id so the output is deterministic for a given
/// balance snapshot.
pub fn suggest_settlements(balances: &[Balance]) -> Vec<SuggestedPayment> {
    let currency = match balances.first() {
        Some(balance) => balance.currency,
        None => return Vec::new(),
    };

    let mut creditors: Vec<(MemberId, Decimal)> = balances
        .iter()
        .filter(|b| b.amount > Money::EPSILON)
        .map(|b| (b.member, b.amount))
        .collect();
    let mut debtors: Vec<(MemberId, Decimal)> = balances
        .iter()
        .filter(|b| b.amount < -Money::EPSILON)
        .map(|b| (b.member, b.amount))
        .collect();

    // creditors descending, debtors ascending (most negative first)
    creditors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    debtors.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

    let mut payments = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < creditors.len() && j < debtors.len() {
        let credit = creditors[i].1;
        let debt = -debtors[j].1;
        let pay = credit.min(debt);

        if pay > Money::EPSILON {
            payments.push(SuggestedPayment {
                from: debtors[j].0,
                to: creditors[i].0,
                amount: Money::new(pay, currency),
            });
        }

        creditors[i].1 -= pay;
        debtors[j].1 += pay;

        if creditors[i].1 <= Money::EPSILON {
            i += 1;
        }
        if debtors[j].1 >= -Money::EPSILON {
            j += 1;
        }
    }

    payments
}
