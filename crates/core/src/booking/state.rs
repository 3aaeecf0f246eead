//! Commission state per booking.
//!
//! The valid transitions are:
//! - Pending → Computed (first recompute)
//! - Computed → Computed (recompute)
//! - Pending | Computed | ManualOverride → ManualOverride (user edits an amount)
//! - ManualOverride → Computed (explicit `clear_override` only)
//!
//! Recomputation never writes while a manual override is in place.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::commission::PooledSplit;

/// Derived commission numbers for one booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CommissionFigures {
    /// Generic booking: agent commission.
    Agent {
        /// Agent commission.
        commission: Decimal,
    },
    /// Pooled booking: the six stored numbers.
    Pooled(PooledSplit),
}

impl CommissionFigures {
    /// Agent commission carried by these figures (zero for pooled bookings).
    #[must_use]
    pub fn agent_commission(&self) -> Decimal {
        match self {
            Self::Agent { commission } => *commission,
            Self::Pooled(_) => Decimal::ZERO,
        }
    }

    /// Pooled split carried by these figures, if any.
    #[must_use]
    pub fn pooled(&self) -> Option<&PooledSplit> {
        match self {
            Self::Agent { .. } => None,
            Self::Pooled(split) => Some(split),
        }
    }

    /// Returns true when both figures are of the same family.
    #[must_use]
    pub fn same_family(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::Agent { .. }, Self::Agent { .. }) | (Self::Pooled(_), Self::Pooled(_))
        )
    }
}

/// Errors from commission state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverrideError {
    /// Override figures belong to the other formula family.
    #[error("Override figures do not match the booking variant")]
    FamilyMismatch,

    /// `clear_override` called on a booking that is not overridden.
    #[error("Booking commission is not manually overridden")]
    NotOverridden,
}

/// Commission state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "figures", rename_all = "snake_case")]
pub enum CommissionState {
    /// Never computed.
    #[default]
    Pending,
    /// Derived by the calculator; safe to recompute.
    Computed(CommissionFigures),
    /// Frozen by a user edit.
    ManualOverride(CommissionFigures),
}

impl CommissionState {
    /// Returns the current figures, if any.
    #[must_use]
    pub fn figures(&self) -> Option<&CommissionFigures> {
        match self {
            Self::Pending => None,
            Self::Computed(f) | Self::ManualOverride(f) => Some(f),
        }
    }

    /// Returns true while a manual override freezes the figures.
    #[must_use]
    pub fn is_overridden(&self) -> bool {
        matches!(self, Self::ManualOverride(_))
    }

    /// Returns the string representation of the state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Computed(_) => "computed",
            Self::ManualOverride(_) => "manual_override",
        }
    }

    /// Writes freshly computed figures unless overridden.
    ///
    /// Returns true when the stored figures were written.
    pub fn apply_computed(&mut self, figures: CommissionFigures) -> bool {
        if self.is_overridden() {
            return false;
        }
        *self = Self::Computed(figures);
        true
    }

    /// Freezes user-supplied figures.
    ///
    /// # Errors
    ///
    /// Returns `FamilyMismatch` when `figures` belong to a different formula
    /// family than the `expected` shape for the booking.
    pub fn override_with(
        &mut self,
        figures: CommissionFigures,
        expected: &CommissionFigures,
    ) -> Result<(), OverrideError> {
        if !figures.same_family(expected) {
            return Err(OverrideError::FamilyMismatch);
        }
        *self = Self::ManualOverride(figures);
        Ok(())
    }

    /// Leaves manual override, storing `fresh` computed figures.
    ///
    /// # Errors
    ///
    /// Returns `NotOverridden` when no override is in place.
    pub fn clear_override(&mut self, fresh: CommissionFigures) -> Result<(), OverrideError> {
        if !self.is_overridden() {
            return Err(OverrideError::NotOverridden);
        }
        *self = Self::Computed(fresh);
        Ok(())
    }
}
