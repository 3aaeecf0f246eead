//! Commission and founder-profit calculation.
//!
//! Two independent formula families:
//! - generic bookings: agent commission from margin, operator flag and payment method
//! - pooled bookings: two-way founder split plus commission after the external fee
//!
//! Everything here is pure and deterministic.

pub mod generic;
pub mod pooled;
pub mod service;

pub use generic::{GenericCommissionInput, agent_commission};
pub use pooled::{PooledSplit, pooled_split};
pub use service::{CommissionCalculator, CommissionError, RecomputeOutcome};
