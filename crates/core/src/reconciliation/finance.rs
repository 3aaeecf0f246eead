//! Per-booking finance figures as of a cutoff date.

use rust_decimal::Decimal;
use serde::Serialize;
use tourbook_shared::types::{BookingId, round_money};

use crate::booking::{Booking, BookingKind};
use crate::commission::CommissionCalculator;

/// Rounding tolerance for the fully-paid threshold.
pub const FULLY_PAID_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Allocation sums feeding one booking row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BookingFlows {
    /// Posted income up to the cutoff.
    pub income: Decimal,
    /// Posted expense up to the cutoff, agent-commission payouts included.
    pub expense: Decimal,
    /// Part of `expense` in agent-commission categories.
    pub commission_paid: Decimal,
}

/// One booking's reconciled figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingFinance {
    /// Booking ID.
    pub booking_id: BookingId,
    /// Booking number (empty for missing bookings).
    pub booking_number: String,
    /// Operator name.
    pub operator: String,
    /// Sales agent.
    pub agent: Option<String>,
    /// Pooled (founders') booking.
    pub pooled: bool,
    /// Client gross price.
    pub gross_client_price: Decimal,
    /// Contractual net cost.
    pub net_cost: Decimal,
    /// Client income allocated.
    #[serde(rename = "CI")]
    pub ci: Decimal,
    /// All expense allocated.
    #[serde(rename = "CE")]
    pub ce: Decimal,
    /// `min(CE - commission payouts, net)`.
    pub operator_paid: Decimal,
    /// Operator-facing expense beyond `operator_paid`.
    pub refunds: Decimal,
    /// `max(0, CI - refunds)`.
    pub client_paid_effective: Decimal,
    /// Client paid at least the gross price (within the tolerance).
    pub fully_paid: bool,
    /// `min(client_paid_effective, net)`.
    pub payable_cap: Decimal,
    /// `max(0, payable_cap - operator_paid)`.
    pub operator_debt: Decimal,
    /// `max(0, client_paid_effective - gross)`.
    pub client_overpay: Decimal,
    /// `max(0, operator_paid - payable_cap)`.
    pub prepaid_from_own_funds: Decimal,
    /// Agent commission, recognized only once fully paid.
    pub agent_commission_accrued: Decimal,
    /// Agent commission paid out.
    pub agent_commission_paid: Decimal,
    /// `max(0, accrued - paid)`.
    pub agent_commission_owed: Decimal,
    /// `gross - net` once fully paid.
    pub owners_profit: Decimal,
    /// `CI - CE`.
    pub balance: Decimal,
    /// Booking was referenced but not found; zero-valued stand-in.
    pub missing: bool,
}

impl BookingFinance {
    /// Computes the figures for `booking` from its allocation sums.
    #[must_use]
    pub fn compute(booking: &Booking, flows: BookingFlows, missing: bool) -> Self {
        let gross = booking.gross_client_price;
        let net = booking.net_cost();
        let ci = flows.income;
        let ce = flows.expense;
        let operator_expense = (ce - flows.commission_paid).max(Decimal::ZERO);

        let operator_paid = operator_expense.min(net);
        let refunds = (operator_expense - operator_paid).max(Decimal::ZERO);
        let client_paid_effective = (ci - refunds).max(Decimal::ZERO);
        let fully_paid = is_fully_paid(client_paid_effective, gross);
        let payable_cap = client_paid_effective.min(net);
        let operator_debt = (payable_cap - operator_paid).max(Decimal::ZERO);
        let client_overpay = (client_paid_effective - gross).max(Decimal::ZERO);
        let prepaid_from_own_funds = (operator_paid - payable_cap).max(Decimal::ZERO);

        let agent_commission_accrued = if fully_paid {
            CommissionCalculator::effective_agent_commission(booking)
        } else {
            Decimal::ZERO
        };
        let agent_commission_paid = flows.commission_paid;
        let agent_commission_owed =
            (agent_commission_accrued - agent_commission_paid).max(Decimal::ZERO);
        let owners_profit = if fully_paid { gross - net } else { Decimal::ZERO };

        Self {
            booking_id: booking.id,
            booking_number: booking.booking_number.clone(),
            operator: booking.operator.clone(),
            agent: booking.agent.clone(),
            pooled: matches!(booking.kind, BookingKind::Pooled { .. }),
            gross_client_price: round_money(gross),
            net_cost: round_money(net),
            ci: round_money(ci),
            ce: round_money(ce),
            operator_paid: round_money(operator_paid),
            refunds: round_money(refunds),
            client_paid_effective: round_money(client_paid_effective),
            fully_paid,
            payable_cap: round_money(payable_cap),
            operator_debt: round_money(operator_debt),
            client_overpay: round_money(client_overpay),
            prepaid_from_own_funds: round_money(prepaid_from_own_funds),
            agent_commission_accrued: round_money(agent_commission_accrued),
            agent_commission_paid: round_money(agent_commission_paid),
            agent_commission_owed: round_money(agent_commission_owed),
            owners_profit: round_money(owners_profit),
            balance: round_money(ci - ce),
            missing,
        }
    }
}

/// `client_paid_effective + 0.01 >= gross`.
#[must_use]
pub fn is_fully_paid(client_paid_effective: Decimal, gross_client_price: Decimal) -> bool {
    client_paid_effective + FULLY_PAID_EPSILON >= gross_client_price
}
