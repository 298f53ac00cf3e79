//! Property-based test data generators
//!
//! Proptest strategies that keep generated data inside domain invariants.
//! Member ids are derived from proptest-controlled bytes so failures
//! shrink and replay deterministically.

use core_kernel::{Currency, FriendId, MemberId, Money, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Strategy for generating Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::JPY),
        Just(Currency::CHF),
        Just(Currency::INR),
        Just(Currency::AUD),
        Just(Currency::CAD),
        Just(Currency::SGD),
        Just(Currency::HKD),
    ]
}

/// Strategy for positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for positive Money values in a fixed currency
pub fn positive_money_strategy(currency: Currency) -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(move |minor| Money::from_minor(minor, currency))
}

/// Strategy for member ids (users and friend placeholders alike)
pub fn member_id_strategy() -> impl Strategy<Value = MemberId> {
    (any::<bool>(), any::<[u8; 16]>()).prop_map(|(registered, bytes)| {
        let uuid = Uuid::from_bytes(bytes);
        if registered {
            MemberId::user(UserId::from_uuid(uuid))
        } else {
            MemberId::friend(FriendId::from_uuid(uuid))
        }
    })
}

/// Strategy for a pool of distinct member ids
pub fn member_pool_strategy(size: usize) -> impl Strategy<Value = Vec<MemberId>> {
    proptest::collection::hash_set(member_id_strategy(), size..=size)
        .prop_map(|set| set.into_iter().collect())
}

/// Strategy for positive split weights
pub fn weight_vector_strategy(max_len: usize) -> impl Strategy<Value = Vec<u32>> {
    proptest::collection::vec(1u32..1000u32, 1..=max_len)
}

/// Strategy for percentage vectors summing to exactly 100
pub fn percentage_vector_strategy(len: usize) -> impl Strategy<Value = Vec<Decimal>> {
    proptest::collection::vec(1u32..1000u32, len..=len).prop_map(|weights| {
        let total: u32 = weights.iter().sum();
        let mut percents: Vec<Decimal> = weights
            .iter()
            .map(|w| (Decimal::from(*w) * dec!(100) / Decimal::from(total)).round_dp(2))
            .collect();

        // Park the rounding residue on the largest entry so every value
        // stays inside 0..=100.
        let sum: Decimal = percents.iter().sum();
        let largest = (0..percents.len())
            .max_by_key(|i| percents[*i])
            .expect("percentage vector is never empty");
        percents[largest] += dec!(100) - sum;
        percents
    })
}
