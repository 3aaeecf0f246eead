//! Reconciliation engine: as-of aggregation over bookings, allocations, and
//! transactions.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use rayon::prelude::*;
use rust_decimal::Decimal;
use tourbook_shared::types::{AccountId, BookingId, CategoryId, TransactionId, round_money};

use super::error::ReportError;
use super::finance::{BookingFinance, BookingFlows};
use super::period::{month_key, months_between, previous_period, validate_range};
use super::types::{
    AccountFlow, Anomalies, BankSummary, BookingAnomaly, FounderWithdrawn, OperatorSummary,
    OwnersSummary, PeriodComparison, ReconciliationReport, ReportInput, ReportMeta, ReportTotals,
    TimeseriesPoint, TotalsDelta,
};
use crate::booking::{Booking, Founder};
use crate::ledger::{Allocation, Side, Transaction};

/// Everything in a report except the comparison.
#[derive(Debug, Clone)]
struct PeriodSummary {
    totals: ReportTotals,
    bank: BankSummary,
    bookings: Vec<BookingFinance>,
    operators: Vec<OperatorSummary>,
    timeseries: Vec<TimeseriesPoint>,
    anomalies: Anomalies,
}

/// Lookups shared by every pass over the input.
struct Context<'a> {
    bookings: HashMap<BookingId, &'a Booking>,
    transactions: HashMap<TransactionId, &'a Transaction>,
    commission_categories: HashSet<CategoryId>,
}

impl<'a> Context<'a> {
    fn new(input: &'a ReportInput) -> Self {
        Self {
            bookings: input.bookings.iter().map(|b| (b.id, b)).collect(),
            transactions: input.transactions.iter().map(|t| (t.id, t)).collect(),
            commission_categories: input
                .categories
                .iter()
                .filter(|c| c.is_agent_commission)
                .map(|c| c.id)
                .collect(),
        }
    }

    fn is_commission_payout(&self, allocation: &Allocation) -> bool {
        allocation.side == Side::Expense
            && self
                .transactions
                .get(&allocation.transaction_id)
                .and_then(|t| t.category_id)
                .is_some_and(|c| self.commission_categories.contains(&c))
    }
}

/// Stateless reconciliation engine.
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    /// Builds the full report for `[from, to]` with `to` as the cutoff.
    ///
    /// Never fails on data problems; only an inverted range is rejected.
    pub fn run(
        input: &ReportInput,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<ReconciliationReport, ReportError> {
        validate_range(from, to)?;
        let current = Self::summarize(input, from, to);

        let compare = previous_period(from, to).map(|(prev_from, prev_to)| {
            let previous = Self::summarize(input, prev_from, prev_to);
            PeriodComparison {
                from: prev_from,
                to: prev_to,
                delta: TotalsDelta::between(&current.totals, &previous.totals),
                totals: previous.totals,
            }
        });

        Ok(ReconciliationReport {
            totals: current.totals,
            bank: current.bank,
            bookings: current.bookings,
            operators: current.operators,
            timeseries: current.timeseries,
            anomalies: current.anomalies,
            meta: ReportMeta { from, to, compare },
        })
    }

    /// Booking rows as of `cutoff`, sorted by booking id.
    #[must_use]
    pub fn booking_rows(input: &ReportInput, cutoff: NaiveDate) -> Vec<BookingFinance> {
        let ctx = Context::new(input);
        let flows = Self::booking_flows(&ctx, input, cutoff);
        Self::rows(&ctx, flows, cutoff)
    }

    fn summarize(input: &ReportInput, from: NaiveDate, to: NaiveDate) -> PeriodSummary {
        let ctx = Context::new(input);
        let flows = Self::booking_flows(&ctx, input, to);
        let bookings = Self::rows(&ctx, flows, to);

        let (z0, period_income, period_expense) = Self::cash_in_bookings(input, from, to);
        let owners = Self::owners(input, &bookings, to);
        let totals = Self::totals(&bookings, z0, period_income, period_expense, owners);
        let bank = Self::bank(input, from, to, period_income - period_expense);

        PeriodSummary {
            operators: Self::operators(&bookings),
            timeseries: Self::timeseries(input, from, to),
            anomalies: Self::anomalies(input, &bookings, to),
            totals,
            bank,
            bookings,
        }
    }

    /// Posted allocations dated on or before `cutoff`.
    fn posted_until(input: &ReportInput, cutoff: NaiveDate) -> impl Iterator<Item = &Allocation> {
        input
            .allocations
            .iter()
            .filter(move |a| a.is_posted() && a.date <= cutoff)
    }

    fn booking_flows(
        ctx: &Context<'_>,
        input: &ReportInput,
        cutoff: NaiveDate,
    ) -> BTreeMap<BookingId, BookingFlows> {
        let mut flows: BTreeMap<BookingId, BookingFlows> = BTreeMap::new();
        for a in Self::posted_until(input, cutoff) {
            let entry = flows.entry(a.booking_id).or_default();
            match a.side {
                Side::Income => entry.income += a.amount,
                Side::Expense => {
                    entry.expense += a.amount;
                    if ctx.is_commission_payout(a) {
                        entry.commission_paid += a.amount;
                    }
                }
            }
        }
        flows
    }

    fn rows(
        ctx: &Context<'_>,
        flows: BTreeMap<BookingId, BookingFlows>,
        cutoff: NaiveDate,
    ) -> Vec<BookingFinance> {
        let groups: Vec<(BookingId, BookingFlows)> = flows.into_iter().collect();
        let mut rows: Vec<BookingFinance> = groups
            .par_iter()
            .map(|(id, flows)| match ctx.bookings.get(id) {
                Some(booking) => BookingFinance::compute(booking, *flows, false),
                None => BookingFinance::compute(&Booking::placeholder(*id, cutoff), *flows, true),
            })
            .collect();
        rows.sort_by_key(|r| r.booking_id);
        rows
    }

    /// `(Z0, period income, period expense)` from posted allocations.
    fn cash_in_bookings(
        input: &ReportInput,
        from: NaiveDate,
        to: NaiveDate,
    ) -> (Decimal, Decimal, Decimal) {
        let mut before = Decimal::ZERO;
        let mut income = Decimal::ZERO;
        let mut expense = Decimal::ZERO;
        for a in Self::posted_until(input, to) {
            if a.date < from {
                before += a.side.signed(a.amount);
            } else {
                match a.side {
                    Side::Income => income += a.amount,
                    Side::Expense => expense += a.amount,
                }
            }
        }
        (before.max(Decimal::ZERO), income, expense)
    }

    fn owners(input: &ReportInput, bookings: &[BookingFinance], to: NaiveDate) -> OwnersSummary {
        let profit: Decimal = bookings.iter().map(|b| b.owners_profit).sum();
        let by_founder: Vec<FounderWithdrawn> = Founder::ALL
            .iter()
            .map(|&founder| FounderWithdrawn {
                founder,
                withdrawn: round_money(
                    input
                        .withdrawals
                        .iter()
                        .filter(|w| w.founder == founder && w.date <= to)
                        .map(|w| w.amount)
                        .sum(),
                ),
            })
            .collect();
        let withdrawn: Decimal = by_founder.iter().map(|f| f.withdrawn).sum();
        OwnersSummary {
            profit,
            withdrawn,
            unwithdrawn: profit - withdrawn,
            by_founder,
        }
    }

    fn totals(
        rows: &[BookingFinance],
        z0: Decimal,
        period_income: Decimal,
        period_expense: Decimal,
        owners: OwnersSummary,
    ) -> ReportTotals {
        let sum = |f: fn(&BookingFinance) -> Decimal| -> Decimal { rows.iter().map(f).sum() };
        ReportTotals {
            bookings: rows.len(),
            gross_client_price: sum(|r| r.gross_client_price),
            net_cost: sum(|r| r.net_cost),
            ci: sum(|r| r.ci),
            ce: sum(|r| r.ce),
            operator_paid: sum(|r| r.operator_paid),
            refunds: sum(|r| r.refunds),
            client_paid_effective: sum(|r| r.client_paid_effective),
            fully_paid_bookings: rows.iter().filter(|r| r.fully_paid).count(),
            operator_debt: sum(|r| r.operator_debt),
            client_overpay: sum(|r| r.client_overpay),
            prepaid_from_own_funds: sum(|r| r.prepaid_from_own_funds),
            agent_commission_accrued: sum(|r| r.agent_commission_accrued),
            agent_commission_paid: sum(|r| r.agent_commission_paid),
            agent_commission_owed: sum(|r| r.agent_commission_owed),
            owners_profit: sum(|r| r.owners_profit),
            z0: round_money(z0),
            period_income: round_money(period_income),
            period_expense: round_money(period_expense),
            z_as_of: round_money((z0 + period_income - period_expense).max(Decimal::ZERO)),
            owners,
        }
    }

    fn bank(
        input: &ReportInput,
        from: NaiveDate,
        to: NaiveDate,
        orders_net_flow: Decimal,
    ) -> BankSummary {
        let mut flows: BTreeMap<AccountId, AccountFlow> = input
            .accounts
            .iter()
            .map(|a| {
                (
                    a.id,
                    AccountFlow {
                        account_id: a.id,
                        name: a.name.clone(),
                        opening: a.opening_balance,
                        inflow: Decimal::ZERO,
                        outflow: Decimal::ZERO,
                        closing: Decimal::ZERO,
                    },
                )
            })
            .collect();

        for t in input
            .transactions
            .iter()
            .filter(|t| t.status.is_realized() && t.date <= to)
        {
            let flow = flows.entry(t.account_id).or_insert_with(|| AccountFlow {
                account_id: t.account_id,
                name: String::new(),
                opening: Decimal::ZERO,
                inflow: Decimal::ZERO,
                outflow: Decimal::ZERO,
                closing: Decimal::ZERO,
            });
            if t.date < from {
                flow.opening += t.signed_base_amount();
            } else {
                match t.side {
                    Side::Income => flow.inflow += t.base_amount,
                    Side::Expense => flow.outflow += t.base_amount,
                }
            }
        }

        let accounts: Vec<AccountFlow> = flows
            .into_values()
            .map(|mut f| {
                f.opening = round_money(f.opening);
                f.closing = f.opening + f.inflow - f.outflow;
                f
            })
            .collect();

        let inflow: Decimal = accounts.iter().map(|a| a.inflow).sum();
        let outflow: Decimal = accounts.iter().map(|a| a.outflow).sum();
        let net_flow = inflow - outflow;
        let orders_net_flow = round_money(orders_net_flow);
        BankSummary {
            opening: accounts.iter().map(|a| a.opening).sum(),
            closing: accounts.iter().map(|a| a.closing).sum(),
            inflow,
            outflow,
            net_flow,
            orders_net_flow,
            other_net: net_flow - orders_net_flow,
            accounts,
        }
    }

    fn operators(rows: &[BookingFinance]) -> Vec<OperatorSummary> {
        let mut by_operator: BTreeMap<&str, OperatorSummary> = BTreeMap::new();
        for r in rows {
            let op = by_operator
                .entry(r.operator.as_str())
                .or_insert_with(|| OperatorSummary {
                    operator: r.operator.clone(),
                    ..OperatorSummary::default()
                });
            op.bookings += 1;
            op.gross_client_price += r.gross_client_price;
            op.net_cost += r.net_cost;
            op.client_paid += r.client_paid_effective;
            op.operator_paid += r.operator_paid;
            op.operator_debt += r.operator_debt;
            op.prepaid_from_own_funds += r.prepaid_from_own_funds;
            op.agent_commission_accrued += r.agent_commission_accrued;
            op.owners_profit += r.owners_profit;
        }
        by_operator.into_values().collect()
    }

    fn timeseries(input: &ReportInput, from: NaiveDate, to: NaiveDate) -> Vec<TimeseriesPoint> {
        let mut buckets: BTreeMap<String, (Decimal, Decimal)> = months_between(from, to)
            .into_iter()
            .map(|m| (m, (Decimal::ZERO, Decimal::ZERO)))
            .collect();
        for a in Self::posted_until(input, to).filter(|a| a.date >= from) {
            let bucket = buckets.entry(month_key(a.date)).or_default();
            match a.side {
                Side::Income => bucket.0 += a.amount,
                Side::Expense => bucket.1 += a.amount,
            }
        }
        buckets
            .into_iter()
            .map(|(month, (income, expense))| TimeseriesPoint {
                month,
                income: round_money(income),
                expense: round_money(expense),
                net: round_money(income - expense),
            })
            .collect()
    }

    fn anomalies(input: &ReportInput, rows: &[BookingFinance], to: NaiveDate) -> Anomalies {
        let flag = |amount: fn(&BookingFinance) -> Decimal| -> Vec<BookingAnomaly> {
            rows.iter()
                .filter(|r| amount(r) > Decimal::ZERO)
                .map(|r| BookingAnomaly {
                    booking_id: r.booking_id,
                    booking_number: r.booking_number.clone(),
                    amount: amount(r),
                })
                .collect()
        };

        let mut unconvertible: Vec<TransactionId> = input
            .transactions
            .iter()
            .filter(|t| t.date <= to && t.is_unconvertible())
            .map(|t| t.id)
            .collect();
        unconvertible.sort();

        Anomalies {
            overpaid: flag(|r| r.client_overpay),
            refunds: flag(|r| r.refunds),
            negative_balance: flag(|r| -r.balance),
            missing_booking_refs: rows.iter().filter(|r| r.missing).map(|r| r.booking_id).collect(),
            unconvertible_transactions: unconvertible,
            corrupt_records: input.corrupt_records.clone(),
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
