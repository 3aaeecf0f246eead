use super::*;
use crate::booking::CostFields;
use crate::ledger::{Side, TransactionStatus};
use chrono::NaiveDate;
use rstest::rstest;
use rust_decimal_macros::dec;
use tourbook_shared::types::{AccountId, BookingId, TransactionId};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
}

fn booking(gross: Decimal, net: Decimal) -> Booking {
    let mut b = Booking::placeholder(BookingId::new(), day(1));
    b.gross_client_price = gross;
    b.costs = CostFields {
        internal_net: Some(net),
        ..CostFields::default()
    };
    b
}

fn transaction(side: Side, base_amount: Decimal) -> Transaction {
    Transaction {
        id: TransactionId::new(),
        date: day(10),
        side,
        status: TransactionStatus::Actual,
        account_id: AccountId::new(),
        currency: "EUR".parse().unwrap(),
        amount: base_amount,
        base_amount,
        remaining_to_allocate: base_amount,
        category_id: None,
        counterparty_id: None,
        owner_who: None,
        note: None,
    }
}

fn posted(tx: &Transaction, booking: &Booking, amount: Decimal) -> Allocation {
    Allocation {
        id: AllocationId::new(),
        transaction_id: tx.id,
        booking_id: booking.id,
        date: tx.date,
        side: tx.side,
        amount,
        status: AllocationStatus::Posted,
    }
}

#[rstest]
#[case(dec!(500), dec!(300), dec!(1000), false, dec!(300), true)]
#[case(dec!(500), dec!(300), dec!(1000), true, dec!(500), true)]
#[case(dec!(1500), dec!(2000), dec!(1000), false, dec!(1000), false)]
#[case(dec!(0), dec!(100), dec!(100), false, dec!(0), false)]
#[case(dec!(-5), dec!(100), dec!(100), true, dec!(0), false)]
#[case(dec!(50), dec!(100), dec!(0), true, dec!(0), false)]
fn test_clamp_request(
    #[case] requested: Decimal,
    #[case] tx_remaining: Decimal,
    #[case] cap: Decimal,
    #[case] confirm: bool,
    #[case] granted: Decimal,
    #[case] would_exceed: bool,
) {
    assert_eq!(
        clamp_request(requested, tx_remaining, cap, confirm),
        (granted, would_exceed)
    );
}

#[test]
fn test_exhausted_booking_clamps_to_zero() {
    let b = booking(dec!(1000), dec!(800));
    let earlier = transaction(Side::Income, dec!(1000));
    let index = AllocationIndex::new(vec![posted(&earlier, &b, dec!(1000))]);

    let tx = transaction(Side::Income, dec!(200));
    let outcome = AllocationEngine::allocate(&tx, &b, &index, dec!(200), false);

    assert_eq!(outcome.granted, Decimal::ZERO);
    assert!(outcome.allocation.is_none());
    assert_eq!(outcome.transaction_remaining, dec!(200));
}

#[test]
fn test_allocate_copies_transaction_fields() {
    let b = booking(dec!(1000), dec!(800));
    let tx = transaction(Side::Expense, dec!(900));
    let outcome = AllocationEngine::allocate(&tx, &b, &AllocationIndex::default(), dec!(900), false);

    let allocation = outcome.allocation.unwrap();
    assert_eq!(allocation.amount, dec!(800));
    assert_eq!(allocation.side, Side::Expense);
    assert_eq!(allocation.date, tx.date);
    assert_eq!(allocation.status, AllocationStatus::Posted);
    assert_eq!(outcome.transaction_remaining, dec!(100));
    assert_eq!(outcome.capacity.expense_remaining, Decimal::ZERO);
}

#[test]
fn test_over_allocation_requires_confirmation() {
    let b = booking(dec!(1000), dec!(800));
    let tx = transaction(Side::Income, dec!(300));

    let plain = AllocationEngine::allocate(&tx, &b, &AllocationIndex::default(), dec!(500), false);
    assert!(plain.would_exceed_transaction_total);
    assert_eq!(plain.granted, dec!(300));

    let confirmed = AllocationEngine::allocate(&tx, &b, &AllocationIndex::default(), dec!(500), true);
    assert!(confirmed.would_exceed_transaction_total);
    assert_eq!(confirmed.granted, dec!(500));
    assert_eq!(confirmed.transaction_remaining, Decimal::ZERO);
    assert_eq!(confirmed.capacity.income_remaining, dec!(500));
}

#[test]
fn test_revise_excludes_itself_from_caps() {
    let b = booking(dec!(1000), dec!(800));
    let tx = transaction(Side::Income, dec!(1000));
    let existing = posted(&tx, &b, dec!(600));
    let index = AllocationIndex::new(vec![existing.clone()]);

    let outcome =
        AllocationEngine::revise(&tx, &b, &index, existing.id, dec!(900), false).unwrap();
    let revised = outcome.allocation.unwrap();
    assert_eq!(revised.id, existing.id);
    assert_eq!(revised.amount, dec!(900));
    assert_eq!(outcome.transaction_remaining, dec!(100));
    assert_eq!(outcome.capacity.income_remaining, dec!(100));
}

#[test]
fn test_revise_to_zero_leaves_record() {
    let b = booking(dec!(1000), dec!(800));
    let tx = transaction(Side::Income, dec!(1000));
    let existing = posted(&tx, &b, dec!(600));
    let index = AllocationIndex::new(vec![existing.clone()]);

    let outcome = AllocationEngine::revise(&tx, &b, &index, existing.id, dec!(0), false).unwrap();
    assert!(outcome.allocation.is_none());
    assert_eq!(outcome.transaction_remaining, dec!(400));
}

#[test]
fn test_remove_recomputes_dependents() {
    let b = booking(dec!(1000), dec!(800));
    let tx = transaction(Side::Income, dec!(1000));
    let first = posted(&tx, &b, dec!(600));
    let second = posted(&tx, &b, dec!(200));
    let index = AllocationIndex::new(vec![first.clone(), second]);

    let outcome = AllocationEngine::remove(&tx, &b, &index, first.id).unwrap();
    assert_eq!(outcome.removed, first);
    assert_eq!(outcome.transaction_remaining, dec!(800));
    assert_eq!(outcome.capacity.allocated_income, dec!(200));
}

#[test]
fn test_foreign_records_are_rejected() {
    let b = booking(dec!(1000), dec!(800));
    let tx = transaction(Side::Income, dec!(1000));
    let other_tx = transaction(Side::Income, dec!(1000));
    let existing = posted(&tx, &b, dec!(100));
    let index = AllocationIndex::new(vec![existing.clone()]);

    assert!(matches!(
        AllocationEngine::remove(&other_tx, &b, &index, existing.id),
        Err(AllocationError::TransactionMismatch { .. })
    ));
    assert!(matches!(
        AllocationEngine::remove(&tx, &booking(dec!(1), dec!(1)), &index, existing.id),
        Err(AllocationError::BookingMismatch { .. })
    ));
    let missing = AllocationId::new();
    assert_eq!(
        AllocationEngine::revise(&tx, &b, &index, missing, dec!(1), false),
        Err(AllocationError::AllocationNotFound(missing))
    );
}

mod props {
    use super::*;
    use proptest::prelude::*;

    fn money() -> impl Strategy<Value = Decimal> {
        (-10_000i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    proptest! {
        #[test]
        fn granted_never_exceeds_bounds(
            requested in money(),
            remaining in money(),
            cap in money(),
            confirm in any::<bool>(),
        ) {
            let (granted, _) = clamp_request(requested, remaining, cap, confirm);
            prop_assert!(granted >= Decimal::ZERO);
            prop_assert!(granted <= requested.max(Decimal::ZERO));
            prop_assert!(granted <= cap.max(Decimal::ZERO));
            if !confirm {
                prop_assert!(granted <= remaining.max(Decimal::ZERO));
            }
        }

        #[test]
        fn repeated_income_never_exceeds_gross(
            gross_cents in 0i64..500_000,
            requests in prop::collection::vec(0i64..200_000, 1..8),
        ) {
            let b = booking(Decimal::new(gross_cents, 2), Decimal::ZERO);
            let mut index = AllocationIndex::default();
            for cents in requests {
                let tx = transaction(Side::Income, Decimal::new(cents, 2));
                let outcome = AllocationEngine::allocate(&tx, &b, &index, tx.base_amount, false);
                if let Some(a) = outcome.allocation {
                    index = index.with_upserted(a);
                }
            }
            prop_assert!(index.booking_total(b.id, Side::Income, None) <= b.gross_client_price);
        }
    }
}
