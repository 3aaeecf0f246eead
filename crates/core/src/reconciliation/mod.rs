//! Point-in-time reconciliation of bookings, operators, and bank accounts.
//!
//! Given `[from, to]`, aggregates every posted allocation dated on or before
//! `to` into:
//! - per-booking finance rows (advance-payment debt rule, commission accrual)
//! - operator rows and monthly flows
//! - portfolio totals, bank cross-check, and owner payouts
//! - non-fatal anomaly buckets
//! - a comparison with the preceding period of equal length

pub mod cache;
pub mod engine;
pub mod error;
pub mod finance;
pub mod period;
pub mod types;

pub use cache::LiveReportCache;
pub use engine::ReconciliationEngine;
pub use error::ReportError;
pub use finance::{BookingFinance, BookingFlows, FULLY_PAID_EPSILON, is_fully_paid};
pub use period::{month_bounds, month_key, months_between, previous_period, validate_range};
pub use types::*;
