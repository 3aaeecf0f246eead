//! Booking repository: reads bookings and persists derived commission figures.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tourbook_core::booking::{Booking, CommissionFigures, OperatorRegistry};
use tourbook_core::commission::{CommissionCalculator, RecomputeOutcome};
use tourbook_core::reconciliation::CorruptRecord;
use tourbook_shared::types::BookingId;
use tracing::info;
use uuid::Uuid;

use super::chunked::fetch_by_ids;
use crate::entities::bookings;
use crate::error::RepositoryError;
use crate::mapping::{booking_from_row, commission_json, keep_readable};

/// Booking repository.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    db: Arc<DatabaseConnection>,
    registry: OperatorRegistry,
    chunk_size: usize,
}

impl BookingRepository {
    /// Creates a new booking repository.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        registry: OperatorRegistry,
        chunk_size: usize,
    ) -> Self {
        Self {
            db,
            registry,
            chunk_size,
        }
    }

    /// Loads one booking.
    pub async fn find(&self, id: BookingId) -> Result<Booking, RepositoryError> {
        load_booking(self.db.as_ref(), &self.registry, id, false).await
    }

    /// Loads bookings by id list in chunks; unknown ids are skipped.
    ///
    /// Rows that cannot be mapped are skipped and recorded in `corrupt`.
    pub async fn find_many(
        &self,
        ids: &[BookingId],
        corrupt: &mut Vec<CorruptRecord>,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let raw: Vec<Uuid> = ids.iter().copied().map(BookingId::into_inner).collect();
        let rows = fetch_by_ids::<bookings::Entity, _>(
            self.db.as_ref(),
            bookings::Column::Id,
            &raw,
            self.chunk_size,
        )
        .await?;
        keep_readable(
            rows.into_iter().map(|row| booking_from_row(row, &self.registry)),
            corrupt,
        )
    }

    /// Loads bookings created or checking in within `[from, to]`.
    pub async fn in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        corrupt: &mut Vec<CorruptRecord>,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let rows = bookings::Entity::find()
            .filter(
                Condition::any()
                    .add(bookings::Column::CreatedOn.between(from, to))
                    .add(bookings::Column::CheckIn.between(from, to)),
            )
            .order_by_asc(bookings::Column::CreatedOn)
            .all(self.db.as_ref())
            .await?;
        keep_readable(
            rows.into_iter().map(|row| booking_from_row(row, &self.registry)),
            corrupt,
        )
    }

    /// Recomputes commission figures; a manual override is left untouched.
    pub async fn recompute_commission(
        &self,
        id: BookingId,
    ) -> Result<(Booking, RecomputeOutcome), RepositoryError> {
        let txn = self.db.begin().await?;
        let mut booking = load_booking(&txn, &self.registry, id, true).await?;
        let outcome = CommissionCalculator::recompute(&mut booking);
        if outcome == RecomputeOutcome::Updated {
            store_commission(&txn, &booking).await?;
        }
        txn.commit().await?;

        info!(booking_id = %id, ?outcome, "Commission recomputed");
        Ok((booking, outcome))
    }

    /// Freezes the booking's commission at `figures`.
    pub async fn override_commission(
        &self,
        id: BookingId,
        figures: CommissionFigures,
    ) -> Result<Booking, RepositoryError> {
        let txn = self.db.begin().await?;
        let mut booking = load_booking(&txn, &self.registry, id, true).await?;
        CommissionCalculator::override_figures(&mut booking, figures)?;
        store_commission(&txn, &booking).await?;
        txn.commit().await?;

        info!(booking_id = %id, "Commission manually overridden");
        Ok(booking)
    }

    /// Drops a manual override and stores freshly computed figures.
    pub async fn clear_commission_override(&self, id: BookingId) -> Result<Booking, RepositoryError> {
        let txn = self.db.begin().await?;
        let mut booking = load_booking(&txn, &self.registry, id, true).await?;
        CommissionCalculator::clear_override(&mut booking)?;
        store_commission(&txn, &booking).await?;
        txn.commit().await?;

        info!(booking_id = %id, "Commission override cleared");
        Ok(booking)
    }
}

/// Loads a booking, optionally locking its row for the rest of the transaction.
pub(crate) async fn load_booking<C: ConnectionTrait>(
    conn: &C,
    registry: &OperatorRegistry,
    id: BookingId,
    lock: bool,
) -> Result<Booking, RepositoryError> {
    let mut query = bookings::Entity::find_by_id(id.into_inner());
    if lock {
        query = query.lock_exclusive();
    }
    let row = query
        .one(conn)
        .await?
        .ok_or_else(|| RepositoryError::not_found("booking", id.into_inner()))?;
    booking_from_row(row, registry)
}

async fn store_commission<C: ConnectionTrait>(conn: &C, booking: &Booking) -> Result<(), RepositoryError> {
    let active = bookings::ActiveModel {
        id: Set(booking.id.into_inner()),
        commission: Set(commission_json(&booking.commission)?),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };
    active.update(conn).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use tourbook_core::booking::CommissionState;
    use tourbook_shared::OperatorConfig;

    fn registry() -> OperatorRegistry {
        OperatorRegistry::from_config(&[OperatorConfig {
            name: "TOCO".to_string(),
            allow_net: true,
        }])
    }

    fn row(commission: serde_json::Value) -> bookings::Model {
        bookings::Model {
            id: Uuid::now_v7(),
            booking_number: "TB-2001".to_string(),
            operator: "TOCO".to_string(),
            agent: Some("Anna".to_string()),
            created_on: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            check_in: None,
            payment_method: "card".to_string(),
            gross_client_price: dec!(1000),
            internal_net: Some(dec!(800)),
            supplier_net: None,
            operator_gross: None,
            pooled_base: None,
            commission,
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_many_chunks_and_maps() {
        let rows: Vec<bookings::Model> = (0..5).map(|_| row(json!({"state": "pending"}))).collect();
        let ids: Vec<BookingId> = rows.iter().map(|r| BookingId::from_uuid(r.id)).collect();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows[..2].to_vec(), rows[2..4].to_vec(), rows[4..].to_vec()])
            .into_connection();

        let repo = BookingRepository::new(Arc::new(db), registry(), 2);
        let mut corrupt = Vec::new();
        let bookings = repo.find_many(&ids, &mut corrupt).await.unwrap();
        assert_eq!(bookings.len(), 5);
        assert!(bookings.iter().all(|b| b.operator == "TOCO"));
        assert!(corrupt.is_empty());
    }

    #[tokio::test]
    async fn test_find_many_skips_unreadable_rows() {
        let good = row(json!({"state": "pending"}));
        let bad = row(json!({"state": "weird"}));
        let ids = vec![BookingId::from_uuid(good.id), BookingId::from_uuid(bad.id)];
        let bad_id = bad.id.to_string();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![good, bad]])
            .into_connection();

        let repo = BookingRepository::new(Arc::new(db), registry(), 10);
        let mut corrupt = Vec::new();
        let bookings = repo.find_many(&ids, &mut corrupt).await.unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(corrupt.len(), 1);
        assert_eq!(corrupt[0].id, bad_id);
    }

    #[tokio::test]
    async fn test_cloned_repository_shares_connection() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(json!({"state": "pending"}))]])
            .into_connection();

        let original = BookingRepository::new(Arc::new(db), registry(), 10);
        let cloned = original.clone();
        drop(original);
        let booking = cloned.find(BookingId::new()).await.unwrap();
        assert_eq!(booking.booking_number, "TB-2001");
    }

    #[tokio::test]
    async fn test_find_missing_booking() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<bookings::Model>::new()])
            .into_connection();

        let repo = BookingRepository::new(Arc::new(db), registry(), 10);
        let err = repo.find(BookingId::new()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { entity: "booking", .. }));
    }

    #[tokio::test]
    async fn test_recompute_leaves_override_frozen() {
        let frozen = json!({"state": "manual_override", "figures": {"kind": "agent", "commission": "50"}});
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(frozen)]])
            .into_connection();

        let repo = BookingRepository::new(Arc::new(db), registry(), 10);
        let (booking, outcome) = repo.recompute_commission(BookingId::new()).await.unwrap();
        assert_eq!(outcome, RecomputeOutcome::Frozen);
        assert!(booking.commission.is_overridden());
    }

    #[tokio::test]
    async fn test_recompute_pending_writes_figures() {
        let pending = row(json!({"state": "pending"}));
        let mut stored = pending.clone();
        stored.commission = json!({"state": "computed", "figures": {"kind": "agent", "commission": "160.00"}});
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending], vec![stored]])
            .into_connection();

        let repo = BookingRepository::new(Arc::new(db), registry(), 10);
        let (booking, outcome) = repo.recompute_commission(BookingId::new()).await.unwrap();
        assert_eq!(outcome, RecomputeOutcome::Updated);
        assert!(matches!(booking.commission, CommissionState::Computed(_)));
    }
}
