//! Reconciliation report types.
//!
//! Every amount is in the base currency, rounded to 2 dp. The report carries
//! no wall-clock timestamp so identical inputs serialize identically.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tourbook_shared::types::{AccountId, BookingId, TransactionId};

use super::finance::BookingFinance;
use crate::booking::{Booking, Founder};
use crate::ledger::{Account, Allocation, Category, OwnerWithdrawal, Transaction};

/// Source documents the report is computed from.
///
/// Allocations dated after the cutoff and non-posted allocations are ignored,
/// so callers may pass a superset.
#[derive(Debug, Clone, Default)]
pub struct ReportInput {
    /// Bookings; at least those referenced by the allocations.
    pub bookings: Vec<Booking>,
    /// Allocations (orders).
    pub allocations: Vec<Allocation>,
    /// Transactions (for categories and the bank cross-check).
    pub transactions: Vec<Transaction>,
    /// Finance categories.
    pub categories: Vec<Category>,
    /// Finance accounts.
    pub accounts: Vec<Account>,
    /// Owner withdrawals.
    pub withdrawals: Vec<OwnerWithdrawal>,
    /// Stored records left out because they could not be read.
    pub corrupt_records: Vec<CorruptRecord>,
}

/// A stored record that could not be mapped and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorruptRecord {
    /// Collection the record lives in.
    pub entity: String,
    /// Record ID.
    pub id: String,
    /// What failed.
    pub reason: String,
}

/// Portfolio-level totals.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    /// Bookings in the report.
    pub bookings: usize,
    /// Sum of client gross prices.
    pub gross_client_price: Decimal,
    /// Sum of net costs.
    pub net_cost: Decimal,
    /// Sum of CI.
    #[serde(rename = "CI")]
    pub ci: Decimal,
    /// Sum of CE.
    #[serde(rename = "CE")]
    pub ce: Decimal,
    /// Sum of operator paid.
    pub operator_paid: Decimal,
    /// Sum of refunds.
    pub refunds: Decimal,
    /// Sum of effective client payments.
    pub client_paid_effective: Decimal,
    /// Fully-paid bookings.
    pub fully_paid_bookings: usize,
    /// Sum of operator debt.
    pub operator_debt: Decimal,
    /// Sum of client overpayments.
    pub client_overpay: Decimal,
    /// Sum of advances from own funds.
    pub prepaid_from_own_funds: Decimal,
    /// Sum of accrued agent commission.
    pub agent_commission_accrued: Decimal,
    /// Sum of paid agent commission.
    pub agent_commission_paid: Decimal,
    /// Sum of owed agent commission.
    pub agent_commission_owed: Decimal,
    /// Sum of recognized owners' profit.
    pub owners_profit: Decimal,
    /// Money held inside bookings before `from`, floored at zero.
    #[serde(rename = "Z0")]
    pub z0: Decimal,
    /// Income allocations dated inside the period.
    pub period_income: Decimal,
    /// Expense allocations dated inside the period.
    pub period_expense: Decimal,
    /// `max(0, Z0 + period_income - period_expense)`.
    #[serde(rename = "Z_asOf")]
    pub z_as_of: Decimal,
    /// Owner payouts and unwithdrawn equity.
    pub owners: OwnersSummary,
}

/// Owner payouts against recognized profit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnersSummary {
    /// Recognized owners' profit.
    pub profit: Decimal,
    /// Withdrawn up to the cutoff.
    pub withdrawn: Decimal,
    /// `profit - withdrawn`.
    pub unwithdrawn: Decimal,
    /// Withdrawn per founder.
    pub by_founder: Vec<FounderWithdrawn>,
}

/// Withdrawals of one founder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FounderWithdrawn {
    /// Founder.
    pub founder: Founder,
    /// Withdrawn up to the cutoff.
    pub withdrawn: Decimal,
}

/// One account's flows over the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountFlow {
    /// Account ID.
    pub account_id: AccountId,
    /// Account name (empty for unknown accounts).
    pub name: String,
    /// Balance before `from`.
    pub opening: Decimal,
    /// Realized income inside the period.
    pub inflow: Decimal,
    /// Realized expense inside the period.
    pub outflow: Decimal,
    /// `opening + inflow - outflow`.
    pub closing: Decimal,
}

/// Bank cross-check, independent of the allocation view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankSummary {
    /// Per-account flows, sorted by account id.
    pub accounts: Vec<AccountFlow>,
    /// Sum of openings.
    pub opening: Decimal,
    /// Sum of inflows.
    pub inflow: Decimal,
    /// Sum of outflows.
    pub outflow: Decimal,
    /// Sum of closings.
    pub closing: Decimal,
    /// `inflow - outflow`.
    pub net_flow: Decimal,
    /// Period income minus period expense allocations.
    pub orders_net_flow: Decimal,
    /// Money movement not tied to any booking.
    pub other_net: Decimal,
}

/// Per-operator aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorSummary {
    /// Operator name.
    pub operator: String,
    /// Bookings.
    pub bookings: usize,
    /// Sum of gross prices.
    pub gross_client_price: Decimal,
    /// Sum of net costs.
    pub net_cost: Decimal,
    /// Sum of effective client payments.
    pub client_paid: Decimal,
    /// Sum of operator paid.
    pub operator_paid: Decimal,
    /// Sum of operator debt.
    pub operator_debt: Decimal,
    /// Sum of advances from own funds.
    pub prepaid_from_own_funds: Decimal,
    /// Sum of accrued agent commission.
    pub agent_commission_accrued: Decimal,
    /// Sum of owners' profit.
    pub owners_profit: Decimal,
}

/// Allocation flows of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesPoint {
    /// `YYYY-MM`.
    pub month: String,
    /// Income allocations.
    pub income: Decimal,
    /// Expense allocations.
    pub expense: Decimal,
    /// `income - expense`.
    pub net: Decimal,
}

/// A booking flagged by an anomaly check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingAnomaly {
    /// Booking ID.
    pub booking_id: BookingId,
    /// Booking number.
    pub booking_number: String,
    /// Offending amount.
    pub amount: Decimal,
}

/// Non-fatal data-integrity findings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomalies {
    /// `client_overpay > 0`.
    pub overpaid: Vec<BookingAnomaly>,
    /// `refunds > 0`.
    pub refunds: Vec<BookingAnomaly>,
    /// `CI - CE < 0`.
    pub negative_balance: Vec<BookingAnomaly>,
    /// Bookings referenced by allocations but not found.
    pub missing_booking_refs: Vec<BookingId>,
    /// Transactions with a non-zero amount but no base amount.
    pub unconvertible_transactions: Vec<TransactionId>,
    /// Unreadable stored records left out of the report.
    pub corrupt_records: Vec<CorruptRecord>,
}

impl Anomalies {
    /// Total number of findings.
    #[must_use]
    pub fn count(&self) -> usize {
        self.overpaid.len()
            + self.refunds.len()
            + self.negative_balance.len()
            + self.missing_booking_refs.len()
            + self.unconvertible_transactions.len()
            + self.corrupt_records.len()
    }
}

/// Current minus previous figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsDelta {
    /// Period income delta.
    pub period_income: Decimal,
    /// Period expense delta.
    pub period_expense: Decimal,
    /// Accrued agent commission delta.
    pub agent_commission_accrued: Decimal,
    /// Owners' profit delta.
    pub owners_profit: Decimal,
    /// Operator debt delta.
    pub operator_debt: Decimal,
    /// `Z_asOf` delta.
    #[serde(rename = "Z_asOf")]
    pub z_as_of: Decimal,
}

impl TotalsDelta {
    /// `current - previous` for each tracked figure.
    #[must_use]
    pub fn between(current: &ReportTotals, previous: &ReportTotals) -> Self {
        Self {
            period_income: current.period_income - previous.period_income,
            period_expense: current.period_expense - previous.period_expense,
            agent_commission_accrued: current.agent_commission_accrued
                - previous.agent_commission_accrued,
            owners_profit: current.owners_profit - previous.owners_profit,
            operator_debt: current.operator_debt - previous.operator_debt,
            z_as_of: current.z_as_of - previous.z_as_of,
        }
    }
}

/// Comparison against the immediately preceding period of equal length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodComparison {
    /// Previous period start.
    pub from: NaiveDate,
    /// Previous period end (the day before `from`).
    pub to: NaiveDate,
    /// Previous period totals.
    pub totals: ReportTotals,
    /// Deltas.
    pub delta: TotalsDelta,
}

/// Report metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    /// Period start.
    pub from: NaiveDate,
    /// Period end and cutoff.
    pub to: NaiveDate,
    /// Previous-period comparison.
    pub compare: Option<PeriodComparison>,
}

/// Full reconciliation report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    /// Portfolio totals.
    pub totals: ReportTotals,
    /// Bank cross-check.
    pub bank: BankSummary,
    /// Booking rows, sorted by booking id.
    pub bookings: Vec<BookingFinance>,
    /// Operator rows, sorted by operator.
    pub operators: Vec<OperatorSummary>,
    /// Monthly flows inside the period.
    pub timeseries: Vec<TimeseriesPoint>,
    /// Non-fatal findings.
    pub anomalies: Anomalies,
    /// Range and comparison.
    pub meta: ReportMeta,
}
