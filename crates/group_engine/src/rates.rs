//! The FX rate port
//!
//! Rate lookup is owned by the host service; the engine only consumes it.
//! Same-currency conversion never consults the source; the engine pins
//! the identity rate itself.

use std::collections::HashMap;

use core_kernel::Currency;
use rust_decimal::Decimal;

/// Host-implemented source of exchange rates.
///
/// `rate(from, to)` returns the multiplier converting `from` amounts into
/// `to`, or `None` when no rate is available. Values the source returns
/// are still validated by the engine (non-positive rates are rejected).
pub trait RateSource: Send + Sync {
    fn rate(&self, from: Currency, to: Currency) -> Option<Decimal>;
}

/// A fixed in-memory rate table, useful in tests and simple hosts.
#[derive(Debug, Default)]
pub struct FixedRates {
    rates: HashMap<(Currency, Currency), Decimal>,
}

impl FixedRates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rate for the `from -> to` direction.
    pub fn with_rate(mut self, from: Currency, to: Currency, rate: Decimal) -> Self {
        self.rates.insert((from, to), rate);
        self
    }
}

impl RateSource for FixedRates {
    fn rate(&self, from: Currency, to: Currency) -> Option<Decimal> {
        self.rates.get(&(from, to)).copied()
    }
}
