//! Account-balance overview and free cash.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tourbook_shared::types::AccountId;

use crate::reconciliation::{ReconciliationEngine, ReportError, ReportInput};

/// Closing balance of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalanceRow {
    /// Account ID.
    pub account_id: AccountId,
    /// Account name.
    pub name: String,
    /// Opening balance (base currency).
    pub opening: Decimal,
    /// Balance as of the cutoff (base currency).
    pub closing: Decimal,
}

/// Cash position as of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOverview {
    /// Cutoff.
    pub as_of: NaiveDate,
    /// Per-account balances.
    pub accounts: Vec<AccountBalanceRow>,
    /// Sum of closing balances.
    pub total_cash: Decimal,
    /// Money that should stay inside open bookings (`Z_asOf`).
    pub earmarked: Decimal,
    /// Owed to operators.
    pub operator_debt: Decimal,
    /// Owed to agents.
    pub agent_commission_owed: Decimal,
    /// `total_cash - earmarked - operator_debt - agent_commission_owed`.
    pub free_cash: Decimal,
}

/// Builds the overview over all history up to `as_of`.
pub fn build_account_overview(
    input: &ReportInput,
    as_of: NaiveDate,
) -> Result<AccountOverview, ReportError> {
    let earliest = input
        .allocations
        .iter()
        .map(|a| a.date)
        .chain(input.transactions.iter().map(|t| t.date))
        .filter(|d| *d <= as_of)
        .min()
        .unwrap_or(as_of);

    let report = ReconciliationEngine::run(input, earliest, as_of)?;
    let opening = |id: AccountId| {
        input
            .accounts
            .iter()
            .find(|a| a.id == id)
            .map_or(Decimal::ZERO, |a| a.opening_balance)
    };
    let accounts: Vec<AccountBalanceRow> = report
        .bank
        .accounts
        .iter()
        .map(|a| AccountBalanceRow {
            account_id: a.account_id,
            name: a.name.clone(),
            opening: opening(a.account_id),
            closing: a.closing,
        })
        .collect();

    let total_cash = report.bank.closing;
    let earmarked = report.totals.z_as_of;
    let operator_debt = report.totals.operator_debt;
    let agent_commission_owed = report.totals.agent_commission_owed;

    Ok(AccountOverview {
        as_of,
        accounts,
        total_cash,
        earmarked,
        operator_debt,
        agent_commission_owed,
        free_cash: total_cash - earmarked - operator_debt - agent_commission_owed,
    })
}
