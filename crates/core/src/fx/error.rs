//! FX error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while resolving a rate.
///
/// `FxResolver::to_base` never surfaces these: it degrades to zero. They are
/// exposed for callers that want to explain why a conversion yielded zero.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FxError {
    /// No rate snapshot exists at all.
    #[error("No FX rate snapshots available")]
    NoSnapshots,

    /// The selected snapshot does not quote the currency.
    #[error("No {currency} rate in snapshot of {snapshot_date}")]
    CurrencyNotQuoted {
        /// Requested currency.
        currency: String,
        /// Effective date of the snapshot that was consulted.
        snapshot_date: NaiveDate,
    },

    /// The quoted rate is zero or negative.
    #[error("Non-positive {currency} rate in snapshot of {snapshot_date}")]
    NonPositiveRate {
        /// Requested currency.
        currency: String,
        /// Effective date of the snapshot that was consulted.
        snapshot_date: NaiveDate,
    },
}
