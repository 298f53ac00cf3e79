//! Currency normalization
//!
//! An expense arrives in its native currency; the ledger runs entirely in
//! the group's base currency. The engine never derives rates itself (the
//! host supplies one) but it does validate what it is handed: rates must
//! be positive, and a same-currency expense must carry the identity rate.

use core_kernel::{Currency, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ExpenseError;

/// A validated exchange-rate multiplier into a base currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FxRate(Decimal);

impl FxRate {
    /// The rate for same-currency conversion.
    pub const IDENTITY: FxRate = FxRate(Decimal::ONE);

    /// Validates a rate supplied by the host's rate source.
    pub fn new(rate: Decimal) -> Result<Self, ExpenseError> {
        if rate <= Decimal::ZERO {
            return Err(ExpenseError::InvalidRate(rate));
        }
        Ok(Self(rate))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_identity(&self) -> bool {
        self.0 == Decimal::ONE
    }
}

impl<'de> Deserialize<'de> for FxRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <Decimal as Deserialize>::deserialize(deserializer)?;
        FxRate::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Converts a native-currency amount into the base currency.
///
/// The result is rounded to the base currency's minor units. A
/// same-currency conversion must use the identity rate; anything else
/// means the caller handed us a stale or misdirected rate.
pub fn normalize(native: Money, rate: FxRate, base: Currency) -> Result<Money, ExpenseError> {
    if native.currency() == base && !rate.is_identity() {
        return Err(ExpenseError::InvalidRate(rate.as_decimal()));
    }
    Ok(Money::new(native.amount() * rate.as_decimal(), base))
}
