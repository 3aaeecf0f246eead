//! Formula family A: agent commission on generic bookings.

use rust_decimal::Decimal;
use tourbook_shared::types::round_money;

use crate::booking::PaymentMethod;

/// Flat share of the operator gross paid on gross-sale operators.
const GROSS_OPERATOR_RATE: Decimal = Decimal::from_parts(3, 0, 0, false, 2);

/// Inputs of the generic commission formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenericCommissionInput {
    /// Operator sells at net.
    pub allow_net: bool,
    /// Client gross price.
    pub gross_client_price: Decimal,
    /// Booking net cost (preference list).
    pub net_cost: Decimal,
    /// Operator's own gross price.
    pub operator_gross: Decimal,
    /// Client payment method.
    pub payment_method: PaymentMethod,
}

/// Computes the agent commission, rounded to 2 dp.
///
/// - net operators: `(gross - net) * share`
/// - gross operators: `operator_gross * 0.03 + max(0, gross - operator_gross) * share`
#[must_use]
pub fn agent_commission(input: &GenericCommissionInput) -> Decimal {
    let share = input.payment_method.agent_share();
    let raw = if input.allow_net {
        (input.gross_client_price - input.net_cost) * share
    } else {
        let margin = (input.gross_client_price - input.operator_gross).max(Decimal::ZERO);
        input.operator_gross * GROSS_OPERATOR_RATE + margin * share
    };
    round_money(raw)
}
