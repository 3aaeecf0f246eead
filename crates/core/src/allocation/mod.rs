//! Allocation engine: splits transaction value across bookings.
//!
//! Capacity is always re-derived from the full allocation list, never kept
//! as a running counter, so concurrent edits cannot drift.

pub mod capacity;
pub mod engine;
pub mod error;
pub mod index;

pub use capacity::BookingCapacity;
pub use engine::{AllocationEngine, AllocationOutcome, RemovalOutcome, clamp_request};
pub use error::AllocationError;
pub use index::AllocationIndex;
