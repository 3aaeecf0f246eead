//! Commission calculator: dispatches on the booking variant and drives the
//! per-booking commission state machine.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::booking::{Booking, BookingKind, CommissionFigures, CommissionState, Founder, OverrideError};

use super::generic::{GenericCommissionInput, agent_commission};
use super::pooled::pooled_split;

/// Errors from commission operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommissionError {
    /// Invalid state transition.
    #[error(transparent)]
    State(#[from] OverrideError),

    /// Pooled override where `real != base + over`.
    #[error("Inconsistent pooled split: real {real} != base {base} + over {over}")]
    InconsistentSplit {
        /// Base commission.
        base: Decimal,
        /// Over commission.
        over: Decimal,
        /// Real commission.
        real: Decimal,
    },
}

/// Result of a recompute request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecomputeOutcome {
    /// Stored figures changed.
    Updated,
    /// Fresh figures equal the stored ones.
    Unchanged,
    /// Manual override in place; nothing written.
    Frozen,
}

/// Stateless commission calculator.
pub struct CommissionCalculator;

impl CommissionCalculator {
    /// Computes fresh figures from the booking's price fields.
    #[must_use]
    pub fn compute(booking: &Booking) -> CommissionFigures {
        let net_cost = booking.net_cost();
        match booking.kind {
            BookingKind::Generic { allow_net } => {
                let input = GenericCommissionInput {
                    allow_net,
                    gross_client_price: booking.gross_client_price,
                    net_cost,
                    operator_gross: non_empty(booking.costs.operator_gross).unwrap_or(net_cost),
                    payment_method: booking.payment_method,
                };
                CommissionFigures::Agent {
                    commission: agent_commission(&input),
                }
            }
            BookingKind::Pooled { base } => {
                let supplier_net = non_empty(booking.costs.supplier_net).unwrap_or(net_cost);
                let internal_net = non_empty(booking.costs.internal_net).unwrap_or(supplier_net);
                CommissionFigures::Pooled(pooled_split(
                    base,
                    booking.gross_client_price,
                    supplier_net,
                    internal_net,
                ))
            }
        }
    }

    /// Recomputes and stores figures unless a manual override is in place.
    pub fn recompute(booking: &mut Booking) -> RecomputeOutcome {
        if booking.commission.is_overridden() {
            tracing::debug!(booking_id = %booking.id, "Commission frozen by manual override");
            return RecomputeOutcome::Frozen;
        }
        let fresh = Self::compute(booking);
        if booking.commission.figures() == Some(&fresh) {
            return RecomputeOutcome::Unchanged;
        }
        booking.commission.apply_computed(fresh);
        RecomputeOutcome::Updated
    }

    /// Freezes user-edited figures on the booking.
    ///
    /// # Errors
    ///
    /// Returns an error when the figures belong to the other formula family
    /// or a pooled split is internally inconsistent.
    pub fn override_figures(
        booking: &mut Booking,
        figures: CommissionFigures,
    ) -> Result<(), CommissionError> {
        if let CommissionFigures::Pooled(split) = &figures
            && split.real_commission != split.base_commission + split.over_commission
        {
            return Err(CommissionError::InconsistentSplit {
                base: split.base_commission,
                over: split.over_commission,
                real: split.real_commission,
            });
        }
        let expected = Self::compute(booking);
        booking.commission.override_with(figures, &expected)?;
        tracing::info!(booking_id = %booking.id, "Commission manually overridden");
        Ok(())
    }

    /// Leaves manual override and stores freshly computed figures.
    ///
    /// # Errors
    ///
    /// Returns an error when the booking is not overridden.
    pub fn clear_override(booking: &mut Booking) -> Result<CommissionFigures, CommissionError> {
        let fresh = Self::compute(booking);
        booking.commission.clear_override(fresh)?;
        Ok(fresh)
    }

    /// Figures in force: a manual override is frozen, anything else is
    /// computed from the booking's current prices.
    #[must_use]
    pub fn effective(booking: &Booking) -> CommissionFigures {
        match booking.commission {
            CommissionState::ManualOverride(figures) => figures,
            CommissionState::Pending | CommissionState::Computed(_) => Self::compute(booking),
        }
    }

    /// Agent commission in force (zero for pooled bookings).
    #[must_use]
    pub fn effective_agent_commission(booking: &Booking) -> Decimal {
        Self::effective(booking).agent_commission()
    }

    /// Founder share in force (zero for generic bookings).
    #[must_use]
    pub fn founder_share(booking: &Booking, founder: Founder) -> Decimal {
        Self::effective(booking)
            .pooled()
            .map_or(Decimal::ZERO, |split| split.share_of(founder))
    }
}

fn non_empty(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| !v.is_zero())
}
