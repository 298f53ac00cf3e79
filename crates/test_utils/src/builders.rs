//! Test data builders
//!
//! Builders with sensible defaults so tests only spell out the fields
//! they actually care about.

use chrono::{DateTime, Utc};
use core_kernel::{Currency, GroupId, MemberId, Money};
use domain_expense::{NewExpense, SplitSpec};
use rust_decimal_macros::dec;

use crate::fixtures::{MemberFixtures, StringFixtures};

/// Builder for [`NewExpense`] drafts.
///
/// Defaults: a fresh group, two registered users splitting 60.00 USD
/// equally, paid by the first participant.
pub struct NewExpenseBuilder {
    group_id: GroupId,
    paid_by: Option<MemberId>,
    amount: Money,
    category: String,
    description: Option<String>,
    date: DateTime<Utc>,
    participants: Vec<MemberId>,
    split: SplitSpec,
}

impl Default for NewExpenseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NewExpenseBuilder {
    pub fn new() -> Self {
        Self {
            group_id: GroupId::new(),
            paid_by: None,
            amount: Money::new(dec!(60.00), Currency::USD),
            category: StringFixtures::category(),
            description: None,
            date: Utc::now(),
            participants: MemberFixtures::users(2),
            split: SplitSpec::Equal,
        }
    }

    pub fn with_group(mut self, group_id: GroupId) -> Self {
        self.group_id = group_id;
        self
    }

    pub fn with_payer(mut self, payer: MemberId) -> Self {
        self.paid_by = Some(payer);
        self
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    pub fn with_participants(mut self, participants: Vec<MemberId>) -> Self {
        self.participants = participants;
        self
    }

    pub fn with_split(mut self, split: SplitSpec) -> Self {
        self.split = split;
        self
    }

    /// Builds the draft. The payer defaults to the first participant.
    pub fn build(self) -> NewExpense {
        let paid_by = self
            .paid_by
            .or_else(|| self.participants.first().copied())
            .expect("expense builder needs at least one participant or an explicit payer");

        NewExpense {
            group_id: self.group_id,
            paid_by,
            amount: self.amount,
            category: self.category,
            description: self.description,
            date: self.date,
            participants: self.participants,
            split: self.split,
        }
    }
}
