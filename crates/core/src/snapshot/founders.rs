//! Founders ledger: pooled shares against founder expenses and payouts.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::booking::{Basis, BookingKind, Founder};
use crate::commission::CommissionCalculator;
use crate::ledger::Side;
use crate::reconciliation::{ReconciliationEngine, ReportInput};

/// One founder's ledger for the range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FounderLedger {
    /// Founder.
    pub founder: Founder,
    /// Fully-paid pooled bookings counted.
    pub pooled_bookings: usize,
    /// Sum of this founder's pooled shares.
    pub pooled_share: Decimal,
    /// Realized expenses attributed to this founder.
    pub expenses: Decimal,
    /// Withdrawals inside the range.
    pub withdrawals: Decimal,
    /// `pooled_share - expenses - withdrawals`.
    pub balance: Decimal,
}

/// Founders ledger for one range and basis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundersSnapshot {
    /// Range start.
    pub from: NaiveDate,
    /// Range end (and payment cutoff).
    pub to: NaiveDate,
    /// Date basis for pooled bookings.
    pub basis: Basis,
    /// One entry per founder.
    pub founders: Vec<FounderLedger>,
}

/// Builds the founders ledger.
///
/// A pooled booking counts once it is fully paid as of `to`.
#[must_use]
pub fn build_founders(
    input: &ReportInput,
    from: NaiveDate,
    to: NaiveDate,
    basis: Basis,
) -> FoundersSnapshot {
    let fully_paid: HashSet<_> = ReconciliationEngine::booking_rows(input, to)
        .into_iter()
        .filter(|r| r.fully_paid && !r.missing)
        .map(|r| r.booking_id)
        .collect();

    let pooled: Vec<_> = input
        .bookings
        .iter()
        .filter(|b| matches!(b.kind, BookingKind::Pooled { .. }))
        .filter(|b| fully_paid.contains(&b.id))
        .filter(|b| {
            let date = b.basis_date(basis);
            date >= from && date <= to
        })
        .collect();

    let founders = Founder::ALL
        .iter()
        .map(|&founder| {
            let pooled_share: Decimal = pooled
                .iter()
                .map(|b| CommissionCalculator::founder_share(b, founder))
                .sum();
            let expenses: Decimal = input
                .transactions
                .iter()
                .filter(|t| {
                    t.side == Side::Expense
                        && t.status.is_realized()
                        && t.owner_who == Some(founder)
                        && t.date >= from
                        && t.date <= to
                })
                .map(|t| t.base_amount)
                .sum();
            let withdrawals: Decimal = input
                .withdrawals
                .iter()
                .filter(|w| w.founder == founder && w.date >= from && w.date <= to)
                .map(|w| w.amount)
                .sum();
            FounderLedger {
                founder,
                pooled_bookings: pooled.len(),
                pooled_share,
                expenses,
                withdrawals,
                balance: pooled_share - expenses - withdrawals,
            }
        })
        .collect();

    FoundersSnapshot {
        from,
        to,
        basis,
        founders,
    }
}
