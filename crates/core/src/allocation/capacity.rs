//! Remaining capacity of a booking, derived from its allocations.

use rust_decimal::Decimal;
use serde::Serialize;
use tourbook_shared::types::{AllocationId, BookingId};

use super::index::AllocationIndex;
use crate::booking::Booking;
use crate::ledger::Side;

/// How much more can be allocated to a booking, per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCapacity {
    /// Booking ID.
    pub booking_id: BookingId,
    /// Posted income so far.
    pub allocated_income: Decimal,
    /// Posted expense so far.
    pub allocated_expense: Decimal,
    /// `max(0, gross - income)`.
    pub income_remaining: Decimal,
    /// `max(0, net_cost - expense)`.
    pub expense_remaining: Decimal,
    /// Client overpayment not yet paid back.
    pub overpayment_bucket: Decimal,
}

impl BookingCapacity {
    /// Derives capacity from the posted allocations of `booking`.
    #[must_use]
    pub fn derive(booking: &Booking, index: &AllocationIndex, exclude: Option<AllocationId>) -> Self {
        let allocated_income = index.booking_total(booking.id, Side::Income, exclude);
        let allocated_expense = index.booking_total(booking.id, Side::Expense, exclude);
        let gross = booking.gross_client_price;
        let net = booking.net_cost();

        let overpaid = (allocated_income - gross).max(Decimal::ZERO);
        let refunded = (allocated_expense - net).max(Decimal::ZERO);

        Self {
            booking_id: booking.id,
            allocated_income,
            allocated_expense,
            income_remaining: (gross - allocated_income).max(Decimal::ZERO),
            expense_remaining: (net - allocated_expense).max(Decimal::ZERO),
            overpayment_bucket: (overpaid - refunded).max(Decimal::ZERO),
        }
    }

    /// Cap for a new allocation on `side`.
    ///
    /// Expenses fall back to the overpayment bucket once the net cost is
    /// fully covered, so a refund can still be linked.
    #[must_use]
    pub fn cap_for(&self, side: Side) -> Decimal {
        match side {
            Side::Income => self.income_remaining,
            Side::Expense if self.expense_remaining > Decimal::ZERO => self.expense_remaining,
            Side::Expense => self.overpayment_bucket,
        }
    }
}
