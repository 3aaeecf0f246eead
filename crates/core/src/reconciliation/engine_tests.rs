use super::*;
use crate::reconciliation::CorruptRecord;
use crate::booking::{BookingKind, CostFields, PaymentMethod};
use crate::ledger::{Account, AllocationStatus, Category, OwnerWithdrawal, TransactionStatus};
use proptest::prelude::*;
use rust_decimal_macros::dec;
use tourbook_shared::types::{AllocationId, WithdrawalId};

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

struct Fixture {
    input: ReportInput,
    account: AccountId,
    commission: CategoryId,
}

impl Fixture {
    fn new() -> Self {
        let account = AccountId::new();
        let commission = CategoryId::new();
        let input = ReportInput {
            accounts: vec![Account {
                id: account,
                name: "Main".to_string(),
                currency: "EUR".parse().unwrap(),
                opening_balance: dec!(1000),
            }],
            categories: vec![Category {
                id: commission,
                name: "Agent commission".to_string(),
                is_agent_commission: true,
            }],
            ..ReportInput::default()
        };
        Self {
            input,
            account,
            commission,
        }
    }

    fn booking(&mut self, operator: &str, kind: BookingKind, gross: Decimal, costs: CostFields) -> BookingId {
        let mut b = Booking::placeholder(BookingId::new(), day(1, 10));
        b.booking_number = format!("B-{}", self.input.bookings.len() + 1);
        b.operator = operator.to_string();
        b.kind = kind;
        b.gross_client_price = gross;
        b.costs = costs;
        let id = b.id;
        self.input.bookings.push(b);
        id
    }

    fn transaction(&mut self, side: Side, date: NaiveDate, amount: Decimal) -> TransactionId {
        let tx = Transaction {
            id: TransactionId::new(),
            date,
            side,
            status: TransactionStatus::Actual,
            account_id: self.account,
            currency: "EUR".parse().unwrap(),
            amount,
            base_amount: amount,
            remaining_to_allocate: Decimal::ZERO,
            category_id: None,
            counterparty_id: None,
            owner_who: None,
            note: None,
        };
        let id = tx.id;
        self.input.transactions.push(tx);
        id
    }

    fn pay(&mut self, booking: BookingId, side: Side, date: NaiveDate, amount: Decimal) -> TransactionId {
        let tx = self.transaction(side, date, amount);
        self.input.allocations.push(Allocation {
            id: AllocationId::new(),
            transaction_id: tx,
            booking_id: booking,
            date,
            side,
            amount,
            status: AllocationStatus::Posted,
        });
        tx
    }

    fn tag_commission(&mut self, tx: TransactionId) {
        let commission = self.commission;
        if let Some(t) = self.input.transactions.iter_mut().find(|t| t.id == tx) {
            t.category_id = Some(commission);
        }
    }
}

/// Two real bookings, one dangling reference, and some unrelated bank movement.
fn scenario() -> (Fixture, BookingId, BookingId, BookingId) {
    let mut fx = Fixture::new();
    let toco = fx.booking(
        "TOCO",
        BookingKind::Generic { allow_net: true },
        dec!(1000),
        CostFields {
            internal_net: Some(dec!(800)),
            ..CostFields::default()
        },
    );
    let coral = fx.booking(
        "Coral",
        BookingKind::Generic { allow_net: false },
        dec!(600),
        CostFields {
            operator_gross: Some(dec!(500)),
            ..CostFields::default()
        },
    );
    if let Some(b) = fx.input.bookings.iter_mut().find(|b| b.id == coral) {
        b.payment_method = PaymentMethod::Iban;
    }
    let ghost = BookingId::new();

    fx.pay(toco, Side::Income, day(2, 20), dec!(400));
    fx.pay(toco, Side::Income, day(3, 5), dec!(600));
    fx.pay(toco, Side::Expense, day(3, 10), dec!(800));
    let payout = fx.pay(toco, Side::Expense, day(3, 20), dec!(100));
    fx.tag_commission(payout);
    fx.pay(coral, Side::Income, day(3, 12), dec!(700));
    fx.pay(ghost, Side::Income, day(3, 15), dec!(50));
    // after the cutoff
    fx.pay(coral, Side::Expense, day(4, 2), dec!(500));

    // bank fee, not tied to a booking
    fx.transaction(Side::Expense, day(3, 25), dec!(30));
    let planned = fx.transaction(Side::Income, day(3, 26), dec!(999));
    let unconvertible = fx.transaction(Side::Income, day(3, 27), dec!(10));
    for t in &mut fx.input.transactions {
        if t.id == planned {
            t.status = TransactionStatus::Planned;
        }
        if t.id == unconvertible {
            t.currency = "USD".parse().unwrap();
            t.base_amount = Decimal::ZERO;
        }
    }

    fx.input.withdrawals = vec![
        OwnerWithdrawal {
            id: WithdrawalId::new(),
            date: day(3, 25),
            founder: Founder::Igor,
            amount: dec!(100),
        },
        OwnerWithdrawal {
            id: WithdrawalId::new(),
            date: day(4, 5),
            founder: Founder::Evgeniy,
            amount: dec!(50),
        },
    ];
    (fx, toco, coral, ghost)
}

fn march(input: &ReportInput) -> ReconciliationReport {
    ReconciliationEngine::run(input, day(3, 1), day(3, 31)).unwrap()
}

#[test]
fn test_booking_rows() {
    let (fx, toco, coral, _) = scenario();
    let report = march(&fx.input);
    let row = |id| report.bookings.iter().find(|b| b.booking_id == id).unwrap();

    let t = row(toco);
    assert_eq!(t.ci, dec!(1000));
    assert_eq!(t.ce, dec!(900));
    assert_eq!(t.operator_paid, dec!(800));
    assert_eq!(t.balance, dec!(100));
    assert!(t.fully_paid);
    assert_eq!(t.agent_commission_accrued, dec!(160.00));
    assert_eq!(t.agent_commission_paid, dec!(100));
    assert_eq!(t.agent_commission_owed, dec!(60.00));
    assert_eq!(t.owners_profit, dec!(200));

    let c = row(coral);
    assert_eq!(c.net_cost, dec!(500));
    assert_eq!(c.operator_debt, dec!(500));
    assert_eq!(c.client_overpay, dec!(100));
    assert_eq!(c.agent_commission_accrued, dec!(100.00));
    assert_eq!(c.ce, Decimal::ZERO);
}

#[test]
fn test_portfolio_totals() {
    let (fx, _, _, _) = scenario();
    let totals = march(&fx.input).totals;

    assert_eq!(totals.bookings, 3);
    assert_eq!(totals.operator_debt, dec!(500));
    assert_eq!(totals.agent_commission_accrued, dec!(260.00));
    assert_eq!(totals.owners_profit, dec!(300));
    assert_eq!(totals.z0, dec!(400));
    assert_eq!(totals.period_income, dec!(1350));
    assert_eq!(totals.period_expense, dec!(900));
    assert_eq!(totals.z_as_of, dec!(850));
    assert_eq!(totals.owners.withdrawn, dec!(100));
    assert_eq!(totals.owners.unwithdrawn, dec!(200));
}

#[test]
fn test_bank_cross_check() {
    let (fx, _, _, _) = scenario();
    let bank = march(&fx.input).bank;

    assert_eq!(bank.accounts.len(), 1);
    assert_eq!(bank.opening, dec!(1400));
    assert_eq!(bank.inflow, dec!(1350));
    assert_eq!(bank.outflow, dec!(930));
    assert_eq!(bank.closing, dec!(1820));
    assert_eq!(bank.orders_net_flow, dec!(450));
    assert_eq!(bank.other_net, dec!(-30));
}

#[test]
fn test_operators_and_timeseries() {
    let (fx, _, _, _) = scenario();
    let report = march(&fx.input);

    let names: Vec<&str> = report.operators.iter().map(|o| o.operator.as_str()).collect();
    assert_eq!(names, vec!["", "Coral", "TOCO"]);
    assert_eq!(report.operators[2].owners_profit, dec!(200));

    assert_eq!(report.timeseries.len(), 1);
    assert_eq!(report.timeseries[0].month, "2025-03");
    assert_eq!(report.timeseries[0].net, dec!(450));
}

#[test]
fn test_anomalies_never_abort() {
    let (fx, _, coral, ghost) = scenario();
    let anomalies = march(&fx.input).anomalies;

    assert_eq!(anomalies.missing_booking_refs, vec![ghost]);
    assert!(anomalies.overpaid.iter().any(|a| a.booking_id == coral && a.amount == dec!(100)));
    assert!(anomalies.refunds.is_empty());
    assert!(anomalies.negative_balance.is_empty());
    assert_eq!(anomalies.unconvertible_transactions.len(), 1);
}

#[test]
fn test_corrupt_records_are_reported_not_fatal() {
    let (mut fx, _, _, _) = scenario();
    fx.input.corrupt_records.push(CorruptRecord {
        entity: "booking".to_string(),
        id: "0190a8c4-0000-7000-8000-000000000001".to_string(),
        reason: "unknown commission state".to_string(),
    });
    let report = march(&fx.input);
    assert_eq!(report.anomalies.corrupt_records.len(), 1);
    assert_eq!(report.anomalies.corrupt_records[0].entity, "booking");
    let baseline = march(&scenario().0.input);
    assert_eq!(report.anomalies.count(), baseline.anomalies.count() + 1);
    assert_eq!(report.totals, baseline.totals);
}

#[test]
fn test_commission_payout_can_drive_balance_negative() {
    let mut fx = Fixture::new();
    let toco = fx.booking(
        "TOCO",
        BookingKind::Generic { allow_net: true },
        dec!(1000),
        CostFields {
            internal_net: Some(dec!(800)),
            ..CostFields::default()
        },
    );
    fx.pay(toco, Side::Income, day(3, 2), dec!(1000));
    fx.pay(toco, Side::Expense, day(3, 3), dec!(800));
    let payout = fx.pay(toco, Side::Expense, day(3, 4), dec!(300));
    fx.tag_commission(payout);

    let report = march(&fx.input);
    assert_eq!(report.totals.ce, dec!(1100));
    assert_eq!(report.totals.ce, report.totals.period_expense);
    assert_eq!(report.bookings[0].operator_paid, dec!(800));
    assert_eq!(report.bookings[0].refunds, Decimal::ZERO);
    assert_eq!(report.anomalies.negative_balance.len(), 1);
    assert_eq!(report.anomalies.negative_balance[0].booking_id, toco);
    assert_eq!(report.anomalies.negative_balance[0].amount, dec!(100));
}

#[test]
fn test_compare_with_previous_period() {
    let (fx, toco, _, _) = scenario();
    let compare = march(&fx.input).meta.compare.unwrap();

    assert_eq!(compare.from, day(1, 29));
    assert_eq!(compare.to, day(2, 28));
    assert_eq!(compare.totals.period_income, dec!(400));
    assert_eq!(compare.totals.operator_debt, dec!(400));
    assert_eq!(compare.delta.period_income, dec!(950));
    assert_eq!(compare.delta.z_as_of, dec!(450));
    assert_eq!(compare.delta.operator_debt, dec!(100));

    let previous_rows = ReconciliationEngine::booking_rows(&fx.input, day(2, 28));
    assert_eq!(previous_rows.len(), 1);
    assert_eq!(previous_rows[0].booking_id, toco);
}

#[test]
fn test_inverted_range_is_rejected() {
    let (fx, _, _, _) = scenario();
    assert_eq!(
        ReconciliationEngine::run(&fx.input, day(3, 2), day(3, 1)),
        Err(ReportError::InvalidDateRange {
            from: day(3, 2),
            to: day(3, 1)
        })
    );
}

#[test]
fn test_empty_input_yields_empty_report() {
    let report = ReconciliationEngine::run(&ReportInput::default(), day(1, 1), day(1, 31)).unwrap();
    assert!(report.bookings.is_empty());
    assert_eq!(report.totals.z_as_of, Decimal::ZERO);
    assert_eq!(report.anomalies.count(), 0);
}

#[test]
fn test_report_is_idempotent() {
    let (fx, _, _, _) = scenario();
    let first = serde_json::to_string(&march(&fx.input)).unwrap();
    let second = serde_json::to_string(&march(&fx.input)).unwrap();
    assert_eq!(first, second);
}

proptest! {
    #[test]
    fn random_ledgers_are_idempotent_and_debt_free_of_sign_errors(
        payments in prop::collection::vec((0usize..3, any::<bool>(), 1u32..28, 1i64..200_000), 0..20),
    ) {
        let mut fx = Fixture::new();
        let ids: Vec<BookingId> = (0..3)
            .map(|i| {
                fx.booking(
                    "TOCO",
                    BookingKind::Generic { allow_net: i % 2 == 0 },
                    dec!(1000),
                    CostFields { internal_net: Some(dec!(700)), ..CostFields::default() },
                )
            })
            .collect();
        for (booking, income, d, cents) in payments {
            let side = if income { Side::Income } else { Side::Expense };
            fx.pay(ids[booking], side, day(3, d), Decimal::new(cents, 2));
        }

        let first = march(&fx.input);
        let second = march(&fx.input);
        prop_assert_eq!(&first, &second);
        prop_assert!(first.totals.operator_debt >= Decimal::ZERO);
        prop_assert!(first.totals.z_as_of >= Decimal::ZERO);
        prop_assert!(first.bookings.iter().all(|b| b.operator_debt >= Decimal::ZERO));
    }
}
