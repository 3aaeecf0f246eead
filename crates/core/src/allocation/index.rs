//! Arena of allocation records indexed by booking and by transaction.
//!
//! Every total is re-derived from the full record list on demand; nothing is
//! kept as a running counter.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tourbook_shared::types::{AllocationId, BookingId, TransactionId};

use crate::ledger::{Allocation, Side};

/// Allocation records with lookups by booking and transaction.
#[derive(Debug, Clone, Default)]
pub struct AllocationIndex {
    allocations: Vec<Allocation>,
    by_booking: HashMap<BookingId, Vec<usize>>,
    by_transaction: HashMap<TransactionId, Vec<usize>>,
}

impl AllocationIndex {
    /// Builds the index.
    #[must_use]
    pub fn new(allocations: Vec<Allocation>) -> Self {
        let mut by_booking: HashMap<BookingId, Vec<usize>> = HashMap::new();
        let mut by_transaction: HashMap<TransactionId, Vec<usize>> = HashMap::new();
        for (pos, a) in allocations.iter().enumerate() {
            by_booking.entry(a.booking_id).or_default().push(pos);
            by_transaction.entry(a.transaction_id).or_default().push(pos);
        }
        Self {
            allocations,
            by_booking,
            by_transaction,
        }
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.allocations.len()
    }

    /// Returns true when there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }

    /// All records.
    pub fn iter(&self) -> impl Iterator<Item = &Allocation> {
        self.allocations.iter()
    }

    /// Finds a record by id.
    #[must_use]
    pub fn get(&self, id: AllocationId) -> Option<&Allocation> {
        self.allocations.iter().find(|a| a.id == id)
    }

    /// Records targeting `booking`.
    pub fn for_booking(&self, booking: BookingId) -> impl Iterator<Item = &Allocation> {
        self.positions(self.by_booking.get(&booking))
    }

    /// Records owned by `transaction`.
    pub fn for_transaction(&self, transaction: TransactionId) -> impl Iterator<Item = &Allocation> {
        self.positions(self.by_transaction.get(&transaction))
    }

    /// Posted total for a booking and side, optionally ignoring one record.
    #[must_use]
    pub fn booking_total(
        &self,
        booking: BookingId,
        side: Side,
        exclude: Option<AllocationId>,
    ) -> Decimal {
        self.for_booking(booking)
            .filter(|a| a.is_posted() && a.side == side && Some(a.id) != exclude)
            .map(|a| a.amount)
            .sum()
    }

    /// Posted total for a transaction, optionally ignoring one record.
    #[must_use]
    pub fn transaction_total(&self, transaction: TransactionId, exclude: Option<AllocationId>) -> Decimal {
        self.for_transaction(transaction)
            .filter(|a| a.is_posted() && Some(a.id) != exclude)
            .map(|a| a.amount)
            .sum()
    }

    /// Returns a new index with `allocation` inserted, or replacing the record
    /// with the same id.
    #[must_use]
    pub fn with_upserted(&self, allocation: Allocation) -> Self {
        let mut records = self.allocations.clone();
        match records.iter_mut().find(|a| a.id == allocation.id) {
            Some(existing) => *existing = allocation,
            None => records.push(allocation),
        }
        Self::new(records)
    }

    /// Returns a new index without the record `id`.
    #[must_use]
    pub fn without(&self, id: AllocationId) -> Self {
        Self::new(
            self.allocations
                .iter()
                .filter(|a| a.id != id)
                .cloned()
                .collect(),
        )
    }

    fn positions<'a>(&'a self, positions: Option<&'a Vec<usize>>) -> impl Iterator<Item = &'a Allocation> {
        positions
            .into_iter()
            .flatten()
            .map(|&pos| &self.allocations[pos])
    }
}

impl FromIterator<Allocation> for AllocationIndex {
    fn from_iter<I: IntoIterator<Item = Allocation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
