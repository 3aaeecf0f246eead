//! Booking data model as consumed by the ledger.
//!
//! Bookings are owned by the booking-management side; the ledger only reads
//! them, except for the commission figures it derives and freezes.

pub mod operator;
pub mod state;
pub mod types;

pub use operator::OperatorRegistry;
pub use state::{CommissionFigures, CommissionState, OverrideError};
pub use types::{Basis, Booking, BookingKind, CostFields, Founder, PaymentMethod, PooledBase};
