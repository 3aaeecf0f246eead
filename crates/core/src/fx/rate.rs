//! FX rate snapshot documents.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tourbook_shared::types::CurrencyCode;

/// All rates effective on one date, quoted against the base currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FxRateSnapshot {
    /// Effective date; doubles as the snapshot identifier.
    pub date: NaiveDate,
    /// Base currency of the quotes.
    pub base: CurrencyCode,
    /// Currency -> rate, meaning "1 base = rate currency".
    pub rates: BTreeMap<CurrencyCode, Decimal>,
}

impl FxRateSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new(date: NaiveDate, base: CurrencyCode) -> Self {
        Self {
            date,
            base,
            rates: BTreeMap::new(),
        }
    }

    /// Adds a quote, returning the snapshot for chaining.
    #[must_use]
    pub fn with_rate(mut self, currency: CurrencyCode, rate: Decimal) -> Self {
        self.rates.insert(currency, rate);
        self
    }

    /// Returns the quote for `currency`, if any.
    #[must_use]
    pub fn rate_for(&self, currency: &CurrencyCode) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }
}
