//! Pre-built test data

use core_kernel::{Currency, MemberId, Money};
use fake::faker::lorem::en::Word;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Common member sets
pub struct MemberFixtures;

impl MemberFixtures {
    /// `n` registered users
    pub fn users(n: usize) -> Vec<MemberId> {
        (0..n).map(|_| MemberId::new_user()).collect()
    }

    /// A mix of registered users and friend placeholders, users first
    pub fn mixed_party(users: usize, friends: usize) -> Vec<MemberId> {
        let mut members: Vec<MemberId> = (0..users).map(|_| MemberId::new_user()).collect();
        members.extend((0..friends).map(|_| MemberId::new_friend()));
        members
    }
}

/// Common monetary amounts
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    /// A typical shared dinner bill
    pub fn dinner() -> Money {
        Money::new(dec!(120.00), Currency::USD)
    }

    /// A foreign-currency hotel bill
    pub fn eur_hotel() -> Money {
        Money::new(dec!(250.00), Currency::EUR)
    }
}

/// Incidental string data
pub struct StringFixtures;

impl StringFixtures {
    /// A random single-word expense category
    pub fn category() -> String {
        Word().fake()
    }

    /// A short random expense description
    pub fn description() -> String {
        let words: Vec<String> = fake::faker::lorem::en::Words(2..5).fake();
        words.join(" ")
    }
}
