//! Allocation engine: links transaction value to bookings under caps.
//!
//! The engine is pure. Callers load the transaction, the booking, and the
//! full allocation list, then persist whatever the outcome says.

use rust_decimal::Decimal;
use serde::Serialize;
use tourbook_shared::types::{AllocationId, round_money};

use super::capacity::BookingCapacity;
use super::error::AllocationError;
use super::index::AllocationIndex;
use crate::booking::Booking;
use crate::ledger::{Allocation, AllocationStatus, Transaction};

/// Result of an allocate or revise request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationOutcome {
    /// Record to persist; `None` when nothing is written.
    pub allocation: Option<Allocation>,
    /// Amount asked for.
    pub requested: Decimal,
    /// Amount granted after clamping.
    pub granted: Decimal,
    /// The request (within the booking cap) exceeds what is left on the
    /// transaction. Without confirmation the grant was clamped to it.
    pub would_exceed_transaction_total: bool,
    /// Transaction remaining to allocate after the write.
    pub transaction_remaining: Decimal,
    /// Booking capacity after the write.
    pub capacity: BookingCapacity,
}

/// Result of removing an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalOutcome {
    /// The removed record.
    pub removed: Allocation,
    /// Transaction remaining to allocate after removal.
    pub transaction_remaining: Decimal,
    /// Booking capacity after removal.
    pub capacity: BookingCapacity,
}

/// Clamps a requested amount.
///
/// Returns `(granted, would_exceed_transaction_total)`. A request `<= 0`
/// grants nothing.
#[must_use]
pub fn clamp_request(
    requested: Decimal,
    transaction_remaining: Decimal,
    booking_cap: Decimal,
    confirm_over_allocation: bool,
) -> (Decimal, bool) {
    let requested = round_money(requested);
    if requested <= Decimal::ZERO {
        return (Decimal::ZERO, false);
    }
    let within_booking = requested.min(booking_cap).max(Decimal::ZERO);
    let would_exceed = within_booking > transaction_remaining;
    let granted = if confirm_over_allocation {
        within_booking
    } else {
        within_booking.min(transaction_remaining.max(Decimal::ZERO))
    };
    (granted, would_exceed)
}

/// Stateless allocation engine.
pub struct AllocationEngine;

impl AllocationEngine {
    /// Base amount of `transaction` not yet allocated, floored at zero.
    #[must_use]
    pub fn transaction_remaining(
        transaction: &Transaction,
        index: &AllocationIndex,
        exclude: Option<AllocationId>,
    ) -> Decimal {
        (transaction.base_amount - index.transaction_total(transaction.id, exclude))
            .max(Decimal::ZERO)
    }

    /// Current capacity of `booking`.
    #[must_use]
    pub fn capacity(booking: &Booking, index: &AllocationIndex) -> BookingCapacity {
        BookingCapacity::derive(booking, index, None)
    }

    /// Allocates part of `transaction` to `booking`.
    ///
    /// The new record takes the transaction's date and side and is posted.
    #[must_use]
    pub fn allocate(
        transaction: &Transaction,
        booking: &Booking,
        index: &AllocationIndex,
        requested: Decimal,
        confirm_over_allocation: bool,
    ) -> AllocationOutcome {
        let tx_remaining = Self::transaction_remaining(transaction, index, None);
        let capacity = BookingCapacity::derive(booking, index, None);
        let (granted, would_exceed) = clamp_request(
            requested,
            tx_remaining,
            capacity.cap_for(transaction.side),
            confirm_over_allocation,
        );

        if granted <= Decimal::ZERO {
            return AllocationOutcome {
                allocation: None,
                requested,
                granted: Decimal::ZERO,
                would_exceed_transaction_total: would_exceed,
                transaction_remaining: tx_remaining,
                capacity,
            };
        }

        let allocation = Allocation {
            id: AllocationId::new(),
            transaction_id: transaction.id,
            booking_id: booking.id,
            date: transaction.date,
            side: transaction.side,
            amount: granted,
            status: AllocationStatus::Posted,
        };
        Self::outcome_after(transaction, booking, index, allocation, requested, would_exceed)
    }

    /// Changes the amount of an existing allocation.
    ///
    /// Caps are derived without the revised record. A request `<= 0` or a
    /// zero grant leaves the record unchanged; use `remove` to delete it.
    pub fn revise(
        transaction: &Transaction,
        booking: &Booking,
        index: &AllocationIndex,
        allocation_id: AllocationId,
        requested: Decimal,
        confirm_over_allocation: bool,
    ) -> Result<AllocationOutcome, AllocationError> {
        let existing = Self::owned(transaction, booking, index, allocation_id)?;

        let tx_remaining = Self::transaction_remaining(transaction, index, Some(allocation_id));
        let capacity = BookingCapacity::derive(booking, index, Some(allocation_id));
        let (granted, would_exceed) = clamp_request(
            requested,
            tx_remaining,
            capacity.cap_for(transaction.side),
            confirm_over_allocation,
        );

        if granted <= Decimal::ZERO {
            return Ok(AllocationOutcome {
                allocation: None,
                requested,
                granted: Decimal::ZERO,
                would_exceed_transaction_total: would_exceed,
                transaction_remaining: Self::transaction_remaining(transaction, index, None),
                capacity: BookingCapacity::derive(booking, index, None),
            });
        }

        let revised = Allocation {
            amount: granted,
            date: transaction.date,
            side: transaction.side,
            ..existing.clone()
        };
        Ok(Self::outcome_after(
            transaction,
            booking,
            index,
            revised,
            requested,
            would_exceed,
        ))
    }

    /// Removes an allocation and re-derives the dependent figures.
    pub fn remove(
        transaction: &Transaction,
        booking: &Booking,
        index: &AllocationIndex,
        allocation_id: AllocationId,
    ) -> Result<RemovalOutcome, AllocationError> {
        let removed = Self::owned(transaction, booking, index, allocation_id)?.clone();
        let after = index.without(allocation_id);
        Ok(RemovalOutcome {
            removed,
            transaction_remaining: Self::transaction_remaining(transaction, &after, None),
            capacity: BookingCapacity::derive(booking, &after, None),
        })
    }

    fn owned<'a>(
        transaction: &Transaction,
        booking: &Booking,
        index: &'a AllocationIndex,
        allocation_id: AllocationId,
    ) -> Result<&'a Allocation, AllocationError> {
        let existing = index
            .get(allocation_id)
            .ok_or(AllocationError::AllocationNotFound(allocation_id))?;
        if existing.transaction_id != transaction.id {
            return Err(AllocationError::TransactionMismatch {
                allocation: allocation_id,
                transaction: transaction.id,
            });
        }
        if existing.booking_id != booking.id {
            return Err(AllocationError::BookingMismatch {
                allocation: allocation_id,
                booking: booking.id,
            });
        }
        Ok(existing)
    }

    fn outcome_after(
        transaction: &Transaction,
        booking: &Booking,
        index: &AllocationIndex,
        allocation: Allocation,
        requested: Decimal,
        would_exceed: bool,
    ) -> AllocationOutcome {
        let after = index.with_upserted(allocation.clone());
        AllocationOutcome {
            granted: allocation.amount,
            allocation: Some(allocation),
            requested,
            would_exceed_transaction_total: would_exceed,
            transaction_remaining: Self::transaction_remaining(transaction, &after, None),
            capacity: BookingCapacity::derive(booking, &after, None),
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
