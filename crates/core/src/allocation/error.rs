//! Allocation error types.

use thiserror::Error;
use tourbook_shared::types::{AllocationId, BookingId, TransactionId};

/// Errors from allocation operations.
///
/// Over-allocation is not an error; it is reported through
/// `AllocationOutcome::would_exceed_transaction_total`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// Allocation not found in the index.
    #[error("Allocation not found: {0}")]
    AllocationNotFound(AllocationId),

    /// The supplied transaction does not own the allocation.
    #[error("Allocation {allocation} does not belong to transaction {transaction}")]
    TransactionMismatch {
        /// Allocation ID.
        allocation: AllocationId,
        /// Transaction ID that was supplied.
        transaction: TransactionId,
    },

    /// The supplied booking is not the allocation's target.
    #[error("Allocation {allocation} does not target booking {booking}")]
    BookingMismatch {
        /// Allocation ID.
        allocation: AllocationId,
        /// Booking ID that was supplied.
        booking: BookingId,
    },
}
