//! Report error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during report generation.
///
/// Data problems (missing bookings, missing FX rates) never fail a report;
/// they surface as anomalies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {from} is after end {to}")]
    InvalidDateRange {
        /// Start date.
        from: NaiveDate,
        /// End date.
        to: NaiveDate,
    },
}
