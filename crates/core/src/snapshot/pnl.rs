//! Monthly profit and loss.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tourbook_shared::types::CategoryId;

use crate::booking::Basis;
use crate::ledger::Side;
use crate::reconciliation::{ReconciliationEngine, ReportInput};

/// Realized amount of one category and side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAmount {
    /// Category, or `None` for uncategorized.
    pub category_id: Option<CategoryId>,
    /// Category name (empty when uncategorized).
    pub name: String,
    /// Income or expense.
    pub side: Side,
    /// Base-currency amount.
    pub amount: Decimal,
}

/// P&L of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPnl {
    /// `YYYY-MM`.
    pub month: String,
    /// Realized income transactions.
    pub income: Decimal,
    /// Realized expense transactions.
    pub expense: Decimal,
    /// Realized amounts per category.
    pub by_category: Vec<CategoryAmount>,
    /// Gross price of bookings placed in the month.
    pub gross_sales: Decimal,
    /// Net cost of those bookings.
    pub net_cost: Decimal,
    /// `gross_sales - net_cost`.
    pub gross_profit: Decimal,
    /// Agent commission accrued on those bookings as of month end.
    pub agent_commission: Decimal,
    /// `gross_profit - agent_commission`.
    pub net_profit: Decimal,
}

/// Builds the P&L of the month spanning `first..=last`.
#[must_use]
pub fn build_monthly_pnl(
    input: &ReportInput,
    month: &str,
    first: NaiveDate,
    last: NaiveDate,
    basis: Basis,
) -> MonthlyPnl {
    let names: HashMap<CategoryId, &str> = input
        .categories
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    let mut by_category: BTreeMap<(Option<CategoryId>, bool), Decimal> = BTreeMap::new();
    for t in input
        .transactions
        .iter()
        .filter(|t| t.status.is_realized() && t.date >= first && t.date <= last)
    {
        match t.side {
            Side::Income => income += t.base_amount,
            Side::Expense => expense += t.base_amount,
        }
        *by_category
            .entry((t.category_id, t.side == Side::Expense))
            .or_default() += t.base_amount;
    }

    let accrued: HashMap<_, _> = ReconciliationEngine::booking_rows(input, last)
        .into_iter()
        .map(|r| (r.booking_id, r.agent_commission_accrued))
        .collect();

    let mut gross_sales = Decimal::ZERO;
    let mut net_cost = Decimal::ZERO;
    let mut agent_commission = Decimal::ZERO;
    for b in input.bookings.iter().filter(|b| {
        let date = b.basis_date(basis);
        date >= first && date <= last
    }) {
        gross_sales += b.gross_client_price;
        net_cost += b.net_cost();
        agent_commission += accrued.get(&b.id).copied().unwrap_or(Decimal::ZERO);
    }
    let gross_profit = gross_sales - net_cost;

    MonthlyPnl {
        month: month.to_string(),
        income,
        expense,
        by_category: by_category
            .into_iter()
            .map(|((category_id, is_expense), amount)| CategoryAmount {
                category_id,
                name: category_id
                    .and_then(|id| names.get(&id).copied())
                    .unwrap_or_default()
                    .to_string(),
                side: if is_expense { Side::Expense } else { Side::Income },
                amount,
            })
            .collect(),
        gross_sales,
        net_cost,
        gross_profit,
        agent_commission,
        net_profit: gross_profit - agent_commission,
    }
}
