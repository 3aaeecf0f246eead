//! Point-in-time rate lookup and conversion into the base currency.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tourbook_shared::types::{CurrencyCode, round_money};

use super::error::FxError;
use super::rate::FxRateSnapshot;

/// How the snapshot used for a conversion was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLookupMethod {
    /// Snapshot effective exactly on the requested date.
    Exact,
    /// Latest snapshot dated before the requested date.
    Prior,
    /// Requested date predates every snapshot; the oldest one was used.
    OldestFallback,
}

/// A resolved rate together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FxQuote {
    /// Rate as "1 base = rate currency".
    pub rate: Decimal,
    /// Effective date of the snapshot that supplied the rate.
    pub snapshot_date: NaiveDate,
    /// How the snapshot was selected.
    pub method: RateLookupMethod,
}

/// Resolves amounts in any currency into the base currency.
///
/// Snapshots are held sorted by date; one snapshot per date (the last one
/// supplied for a date wins). Snapshots quoted against another base are
/// dropped.
#[derive(Debug, Clone)]
pub struct FxResolver {
    base: CurrencyCode,
    snapshots: Vec<FxRateSnapshot>,
}

impl FxResolver {
    /// Creates a resolver over the given snapshots.
    #[must_use]
    pub fn new(base: CurrencyCode, mut snapshots: Vec<FxRateSnapshot>) -> Self {
        snapshots.retain(|s| {
            let matches = s.base == base;
            if !matches {
                tracing::warn!(
                    date = %s.date,
                    snapshot_base = %s.base,
                    %base,
                    "Ignoring FX snapshot with foreign base"
                );
            }
            matches
        });
        snapshots.sort_by_key(|s| s.date);
        // keep the last snapshot supplied for each date
        snapshots.reverse();
        snapshots.dedup_by_key(|s| s.date);
        snapshots.reverse();
        Self { base, snapshots }
    }

    /// Returns the base currency.
    #[must_use]
    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    /// Returns true when no snapshot is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Picks the snapshot for `date`: exact match, else latest before, else oldest.
    #[must_use]
    pub fn snapshot_for(&self, date: NaiveDate) -> Option<(&FxRateSnapshot, RateLookupMethod)> {
        let idx = self.snapshots.partition_point(|s| s.date <= date);
        if idx > 0 {
            let snapshot = &self.snapshots[idx - 1];
            let method = if snapshot.date == date {
                RateLookupMethod::Exact
            } else {
                RateLookupMethod::Prior
            };
            Some((snapshot, method))
        } else {
            self.snapshots
                .first()
                .map(|s| (s, RateLookupMethod::OldestFallback))
        }
    }

    /// Resolves the rate for `currency` on `date`.
    ///
    /// # Errors
    ///
    /// Returns an error when there are no snapshots, the snapshot does not
    /// quote the currency, or the quote is not positive.
    pub fn quote(&self, currency: &CurrencyCode, date: NaiveDate) -> Result<FxQuote, FxError> {
        if *currency == self.base {
            return Ok(FxQuote {
                rate: Decimal::ONE,
                snapshot_date: date,
                method: RateLookupMethod::Exact,
            });
        }

        let (snapshot, method) = self.snapshot_for(date).ok_or(FxError::NoSnapshots)?;
        let rate = snapshot
            .rate_for(currency)
            .ok_or_else(|| FxError::CurrencyNotQuoted {
                currency: currency.to_string(),
                snapshot_date: snapshot.date,
            })?;

        if rate <= Decimal::ZERO {
            return Err(FxError::NonPositiveRate {
                currency: currency.to_string(),
                snapshot_date: snapshot.date,
            });
        }

        Ok(FxQuote {
            rate,
            snapshot_date: snapshot.date,
            method,
        })
    }

    /// Converts `amount` into the base currency, rounded to 2 dp.
    ///
    /// Fail-soft: returns zero when no usable rate exists. A zero result for a
    /// non-zero amount means "unconvertible", not "worthless".
    #[must_use]
    pub fn to_base(&self, amount: Decimal, currency: &CurrencyCode, date: NaiveDate) -> Decimal {
        match self.quote(currency, date) {
            Ok(quote) => round_money(amount / quote.rate),
            Err(e) => {
                tracing::warn!(error = %e, %currency, %date, "FX conversion degraded to zero");
                Decimal::ZERO
            }
        }
    }
}
