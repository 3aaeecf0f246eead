//! Sales dashboard: bookings by operator and by agent.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::booking::{Basis, Booking};
use crate::commission::CommissionCalculator;

/// One dashboard row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRow {
    /// Operator or agent name; `total` for the totals row.
    pub key: String,
    /// Bookings.
    pub bookings: usize,
    /// Sum of gross prices.
    pub gross: Decimal,
    /// Sum of net costs.
    pub net_cost: Decimal,
    /// Sum of agent commissions in force.
    pub commission: Decimal,
    /// `gross - net_cost - commission`.
    pub profit: Decimal,
}

impl SalesRow {
    fn add(&mut self, booking: &Booking) {
        let net = booking.net_cost();
        let commission = CommissionCalculator::effective_agent_commission(booking);
        self.bookings += 1;
        self.gross += booking.gross_client_price;
        self.net_cost += net;
        self.commission += commission;
        self.profit += booking.gross_client_price - net - commission;
    }
}

/// Sales dashboard for one range and basis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSnapshot {
    /// Range start.
    pub from: NaiveDate,
    /// Range end.
    pub to: NaiveDate,
    /// Date basis.
    pub basis: Basis,
    /// Rows by operator, sorted by name.
    pub by_operator: Vec<SalesRow>,
    /// Rows by agent, sorted by name; bookings without agent under `""`.
    pub by_agent: Vec<SalesRow>,
    /// Totals row.
    pub totals: SalesRow,
}

/// Builds the sales dashboard from bookings whose basis date is in range.
#[must_use]
pub fn build_sales(bookings: &[Booking], from: NaiveDate, to: NaiveDate, basis: Basis) -> SalesSnapshot {
    let mut by_operator: BTreeMap<String, SalesRow> = BTreeMap::new();
    let mut by_agent: BTreeMap<String, SalesRow> = BTreeMap::new();
    let mut totals = SalesRow {
        key: "total".to_string(),
        ..SalesRow::default()
    };

    for booking in bookings.iter().filter(|b| {
        let date = b.basis_date(basis);
        date >= from && date <= to
    }) {
        let agent = booking.agent.clone().unwrap_or_default();
        row(&mut by_operator, &booking.operator).add(booking);
        row(&mut by_agent, &agent).add(booking);
        totals.add(booking);
    }

    SalesSnapshot {
        from,
        to,
        basis,
        by_operator: by_operator.into_values().collect(),
        by_agent: by_agent.into_values().collect(),
        totals,
    }
}

fn row<'a>(rows: &'a mut BTreeMap<String, SalesRow>, key: &str) -> &'a mut SalesRow {
    rows.entry(key.to_string()).or_insert_with(|| SalesRow {
        key: key.to_string(),
        ..SalesRow::default()
    })
}
