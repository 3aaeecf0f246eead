//! Conversions between stored rows and domain types.

use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::Set;
use tourbook_core::booking::{
    Booking, CommissionState, CostFields, Founder, OperatorRegistry, PaymentMethod, PooledBase,
};
use tourbook_core::fx::FxRateSnapshot;
use tourbook_core::ledger::{
    Account, Allocation, AllocationStatus, Category, OwnerWithdrawal, Side, Transaction,
    TransactionStatus,
};
use tourbook_core::reconciliation::CorruptRecord;
use tourbook_core::snapshot::CacheRunStatus;
use tourbook_shared::types::{
    AccountId, AllocationId, BookingId, CategoryId, CounterpartyId, CurrencyCode, TransactionId,
    WithdrawalId,
};
use tracing::warn;

use crate::entities::{
    bookings, finance_accounts, finance_allocations, finance_categories, finance_fx_rates,
    finance_transactions, owner_withdrawals, sea_orm_active_enums,
};
use crate::error::RepositoryError;

impl From<sea_orm_active_enums::TransactionSide> for Side {
    fn from(side: sea_orm_active_enums::TransactionSide) -> Self {
        match side {
            sea_orm_active_enums::TransactionSide::Income => Self::Income,
            sea_orm_active_enums::TransactionSide::Expense => Self::Expense,
        }
    }
}

impl From<Side> for sea_orm_active_enums::TransactionSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Income => Self::Income,
            Side::Expense => Self::Expense,
        }
    }
}

impl From<sea_orm_active_enums::TransactionStatus> for TransactionStatus {
    fn from(status: sea_orm_active_enums::TransactionStatus) -> Self {
        match status {
            sea_orm_active_enums::TransactionStatus::Planned => Self::Planned,
            sea_orm_active_enums::TransactionStatus::Actual => Self::Actual,
            sea_orm_active_enums::TransactionStatus::Reconciled => Self::Reconciled,
        }
    }
}

impl From<TransactionStatus> for sea_orm_active_enums::TransactionStatus {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Planned => Self::Planned,
            TransactionStatus::Actual => Self::Actual,
            TransactionStatus::Reconciled => Self::Reconciled,
        }
    }
}

impl From<sea_orm_active_enums::AllocationStatus> for AllocationStatus {
    fn from(status: sea_orm_active_enums::AllocationStatus) -> Self {
        match status {
            sea_orm_active_enums::AllocationStatus::Planned => Self::Planned,
            sea_orm_active_enums::AllocationStatus::Posted => Self::Posted,
        }
    }
}

impl From<AllocationStatus> for sea_orm_active_enums::AllocationStatus {
    fn from(status: AllocationStatus) -> Self {
        match status {
            AllocationStatus::Planned => Self::Planned,
            AllocationStatus::Posted => Self::Posted,
        }
    }
}

impl From<sea_orm_active_enums::CacheRunStatus> for CacheRunStatus {
    fn from(status: sea_orm_active_enums::CacheRunStatus) -> Self {
        match status {
            sea_orm_active_enums::CacheRunStatus::Running => Self::Running,
            sea_orm_active_enums::CacheRunStatus::Done => Self::Done,
            sea_orm_active_enums::CacheRunStatus::Error => Self::Error,
        }
    }
}

impl From<CacheRunStatus> for sea_orm_active_enums::CacheRunStatus {
    fn from(status: CacheRunStatus) -> Self {
        match status {
            CacheRunStatus::Running => Self::Running,
            CacheRunStatus::Done => Self::Done,
            CacheRunStatus::Error => Self::Error,
        }
    }
}

/// Keeps the rows that mapped cleanly and moves unreadable ones into `corrupt`.
///
/// Errors other than [`RepositoryError::Corrupt`] are returned as-is.
pub fn keep_readable<T>(
    results: impl IntoIterator<Item = Result<T, RepositoryError>>,
    corrupt: &mut Vec<CorruptRecord>,
) -> Result<Vec<T>, RepositoryError> {
    let mut readable = Vec::new();
    for result in results {
        match result {
            Ok(value) => readable.push(value),
            Err(RepositoryError::Corrupt { entity, id, reason }) => {
                warn!(entity, %id, %reason, "Skipping unreadable record");
                corrupt.push(CorruptRecord {
                    entity: entity.to_string(),
                    id,
                    reason,
                });
            }
            Err(e) => return Err(e),
        }
    }
    Ok(readable)
}

/// Maps a booking row; the generic/pooled variant is resolved here.
pub fn booking_from_row(
    row: bookings::Model,
    registry: &OperatorRegistry,
) -> Result<Booking, RepositoryError> {
    let pooled_base = match row.pooled_base.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            PooledBase::parse(raw)
                .ok_or_else(|| RepositoryError::corrupt("booking", row.id, format!("pooled base {raw}")))?,
        ),
    };
    let commission: CommissionState = serde_json::from_value(row.commission)
        .map_err(|e| RepositoryError::corrupt("booking", row.id, e))?;

    Ok(Booking {
        id: BookingId::from_uuid(row.id),
        kind: registry.kind_for(&row.operator, pooled_base),
        booking_number: row.booking_number,
        operator: row.operator,
        agent: row.agent.filter(|a| !a.trim().is_empty()),
        created_on: row.created_on,
        check_in: row.check_in,
        payment_method: PaymentMethod::parse(&row.payment_method),
        gross_client_price: row.gross_client_price,
        costs: CostFields {
            internal_net: row.internal_net,
            supplier_net: row.supplier_net,
            operator_gross: row.operator_gross,
        },
        commission,
    })
}

/// Serializes the commission state for the `commission` column.
pub fn commission_json(state: &CommissionState) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(state).map_err(|e| RepositoryError::corrupt("commission", "-", e))
}

/// Maps a transaction row.
pub fn transaction_from_row(row: finance_transactions::Model) -> Result<Transaction, RepositoryError> {
    let currency: CurrencyCode = row
        .currency
        .parse()
        .map_err(|e: String| RepositoryError::corrupt("transaction", row.id, e))?;
    Ok(Transaction {
        id: TransactionId::from_uuid(row.id),
        date: row.date,
        side: row.side.into(),
        status: row.status.into(),
        account_id: AccountId::from_uuid(row.account_id),
        currency,
        amount: row.amount,
        base_amount: row.base_amount,
        remaining_to_allocate: row.remaining_to_allocate,
        category_id: row.category_id.map(CategoryId::from_uuid),
        counterparty_id: row.counterparty_id.map(CounterpartyId::from_uuid),
        owner_who: row.owner_who.as_deref().and_then(Founder::parse),
        note: row.note,
    })
}

/// Builds an insertable transaction row.
pub fn transaction_to_active(tx: &Transaction) -> finance_transactions::ActiveModel {
    finance_transactions::ActiveModel {
        id: Set(tx.id.into_inner()),
        date: Set(tx.date),
        side: Set(tx.side.into()),
        status: Set(tx.status.into()),
        account_id: Set(tx.account_id.into_inner()),
        currency: Set(tx.currency.to_string()),
        amount: Set(tx.amount),
        base_amount: Set(tx.base_amount),
        remaining_to_allocate: Set(tx.remaining_to_allocate),
        category_id: Set(tx.category_id.map(CategoryId::into_inner)),
        counterparty_id: Set(tx.counterparty_id.map(CounterpartyId::into_inner)),
        owner_who: Set(tx.owner_who.map(|f| f.as_str().to_string())),
        note: Set(tx.note.clone()),
        created_at: Set(Utc::now().into()),
    }
}

/// Maps an allocation row.
pub fn allocation_from_row(row: finance_allocations::Model) -> Allocation {
    Allocation {
        id: AllocationId::from_uuid(row.id),
        transaction_id: TransactionId::from_uuid(row.transaction_id),
        booking_id: BookingId::from_uuid(row.booking_id),
        date: row.date,
        side: row.side.into(),
        amount: row.amount,
        status: row.status.into(),
    }
}

/// Builds an insertable allocation row.
pub fn allocation_to_active(allocation: &Allocation) -> finance_allocations::ActiveModel {
    finance_allocations::ActiveModel {
        id: Set(allocation.id.into_inner()),
        transaction_id: Set(allocation.transaction_id.into_inner()),
        booking_id: Set(allocation.booking_id.into_inner()),
        date: Set(allocation.date),
        side: Set(allocation.side.into()),
        amount: Set(allocation.amount),
        status: Set(allocation.status.into()),
        created_at: Set(Utc::now().into()),
    }
}

/// Maps a category row.
pub fn category_from_row(row: finance_categories::Model) -> Category {
    Category {
        id: CategoryId::from_uuid(row.id),
        name: row.name,
        is_agent_commission: row.is_agent_commission,
    }
}

/// Maps an account row.
pub fn account_from_row(row: finance_accounts::Model) -> Result<Account, RepositoryError> {
    let currency: CurrencyCode = row
        .currency
        .parse()
        .map_err(|e: String| RepositoryError::corrupt("account", row.id, e))?;
    Ok(Account {
        id: AccountId::from_uuid(row.id),
        name: row.name,
        currency,
        opening_balance: row.opening_balance,
    })
}

/// Maps a withdrawal row.
pub fn withdrawal_from_row(row: owner_withdrawals::Model) -> Result<OwnerWithdrawal, RepositoryError> {
    let founder = Founder::parse(&row.founder)
        .ok_or_else(|| RepositoryError::corrupt("withdrawal", row.id, format!("founder {}", row.founder)))?;
    Ok(OwnerWithdrawal {
        id: WithdrawalId::from_uuid(row.id),
        date: row.date,
        founder,
        amount: row.amount,
    })
}

/// Maps an FX rate document.
pub fn fx_snapshot_from_row(row: finance_fx_rates::Model) -> Result<FxRateSnapshot, RepositoryError> {
    let base: CurrencyCode = row
        .base
        .parse()
        .map_err(|e: String| RepositoryError::corrupt("fx_rates", row.date, e))?;
    let rates: BTreeMap<CurrencyCode, Decimal> = serde_json::from_value(row.rates)
        .map_err(|e| RepositoryError::corrupt("fx_rates", row.date, e))?;
    Ok(FxRateSnapshot {
        date: row.date,
        base,
        rates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use tourbook_core::booking::{BookingKind, CommissionFigures};
    use tourbook_shared::OperatorConfig;
    use uuid::Uuid;

    fn registry() -> OperatorRegistry {
        OperatorRegistry::from_config(&[OperatorConfig {
            name: "TOCO".to_string(),
            allow_net: true,
        }])
    }

    fn row() -> bookings::Model {
        bookings::Model {
            id: Uuid::now_v7(),
            booking_number: "TB-1001".to_string(),
            operator: "TOCO".to_string(),
            agent: Some("  ".to_string()),
            created_on: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            check_in: None,
            payment_method: "iban".to_string(),
            gross_client_price: dec!(1000),
            internal_net: Some(dec!(800)),
            supplier_net: None,
            operator_gross: None,
            pooled_base: None,
            commission: json!({"state": "pending"}),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_booking_kind_comes_from_registry() {
        let booking = booking_from_row(row(), &registry()).unwrap();
        assert_eq!(booking.kind, BookingKind::Generic { allow_net: true });
        assert_eq!(booking.payment_method, PaymentMethod::Iban);
        assert_eq!(booking.agent, None);
        assert_eq!(booking.commission, CommissionState::Pending);
    }

    #[test]
    fn test_pooled_base_overrides_operator() {
        let mut r = row();
        r.pooled_base = Some("company".to_string());
        let booking = booking_from_row(r, &registry()).unwrap();
        assert_eq!(
            booking.kind,
            BookingKind::Pooled {
                base: PooledBase::Company
            }
        );
    }

    #[test]
    fn test_unknown_pooled_base_is_corrupt() {
        let mut r = row();
        r.pooled_base = Some("nobody".to_string());
        let err = booking_from_row(r, &registry()).unwrap_err();
        assert!(matches!(err, RepositoryError::Corrupt { entity: "booking", .. }));
    }

    #[test]
    fn test_commission_state_survives_storage() {
        let state = CommissionState::ManualOverride(CommissionFigures::Agent {
            commission: dec!(120),
        });
        let mut r = row();
        r.commission = commission_json(&state).unwrap();
        let booking = booking_from_row(r, &registry()).unwrap();
        assert_eq!(booking.commission, state);
    }

    #[test]
    fn test_fx_document_mapping() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let snapshot = fx_snapshot_from_row(finance_fx_rates::Model {
            date,
            base: "EUR".to_string(),
            rates: json!({"USD": "1.10", "try": "35.5"}),
        })
        .unwrap();
        assert_eq!(snapshot.rate_for(&"USD".parse().unwrap()), Some(dec!(1.10)));
        assert_eq!(snapshot.rate_for(&"TRY".parse().unwrap()), Some(dec!(35.5)));
    }

    #[rstest]
    #[case("someone")]
    #[case("")]
    #[case("igor evgeniy")]
    fn test_withdrawal_requires_known_founder(#[case] founder: &str) {
        let err = withdrawal_from_row(owner_withdrawals::Model {
            id: Uuid::now_v7(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            founder: founder.to_string(),
            amount: dec!(10),
        })
        .unwrap_err();
        assert!(matches!(err, RepositoryError::Corrupt { .. }));
    }

    #[test]
    fn test_keep_readable_collects_corrupt_rows() {
        let mut bad = row();
        bad.commission = json!({"state": "weird"});
        let bad_id = bad.id;
        let mut corrupt = Vec::new();
        let bookings = keep_readable(
            [row(), bad].into_iter().map(|r| booking_from_row(r, &registry())),
            &mut corrupt,
        )
        .unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(corrupt.len(), 1);
        assert_eq!(corrupt[0].entity, "booking");
        assert_eq!(corrupt[0].id, bad_id.to_string());
    }

    #[test]
    fn test_keep_readable_propagates_other_errors() {
        let mut corrupt = Vec::new();
        let results: Vec<Result<u8, RepositoryError>> = vec![
            Ok(1),
            Err(RepositoryError::not_found("booking", "x")),
        ];
        let err = keep_readable(results, &mut corrupt).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
        assert!(corrupt.is_empty());
    }
}
