//! Balance rows

use core_kernel::{Currency, GroupId, MemberId, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One member's signed balance within a group, in the group's base
/// currency.
///
/// Positive means others owe this member; negative means this member owes
/// others. Rows are materialized lazily at zero the first time an expense
/// or settlement touches the member, and are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub group_id: GroupId,
    pub member: MemberId,
    pub amount: Decimal,
    pub currency: Currency,
}

impl Balance {
    /// True when the balance is within `Money::EPSILON` of zero
    pub fn is_settled(&self) -> bool {
        self.amount.abs() <= Money::EPSILON
    }

    /// The balance as a `Money` value
    pub fn as_money(&self) -> Money {
        Money::new(self.amount, self.currency)
    }
}
