//! Allocation repository.
//!
//! Every write runs in one database transaction that locks the transaction
//! and booking rows, rebuilds the index from their full allocation lists,
//! applies the engine, and persists the recomputed `remaining_to_allocate`.

use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use tourbook_core::allocation::{
    AllocationEngine, AllocationIndex, AllocationOutcome, BookingCapacity, RemovalOutcome,
};
use tourbook_core::booking::OperatorRegistry;
use tourbook_shared::types::{AllocationId, BookingId, TransactionId};
use tracing::{info, warn};

use super::booking::load_booking;
use super::transaction::load_transaction;
use crate::entities::{finance_allocations, finance_transactions};
use crate::error::RepositoryError;
use crate::mapping::{allocation_from_row, allocation_to_active};

/// Input for a new allocation.
#[derive(Debug, Clone, Copy)]
pub struct AllocateInput {
    /// Source transaction.
    pub transaction_id: TransactionId,
    /// Target booking.
    pub booking_id: BookingId,
    /// Requested amount in base currency.
    pub amount: Decimal,
    /// Caller confirmed going past the transaction's remaining amount.
    pub confirm_over_allocation: bool,
}

/// Allocation repository.
#[derive(Debug, Clone)]
pub struct AllocationRepository {
    db: Arc<DatabaseConnection>,
    registry: OperatorRegistry,
}

impl AllocationRepository {
    /// Creates a new allocation repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>, registry: OperatorRegistry) -> Self {
        Self { db, registry }
    }

    /// Allocates part of a transaction to a booking.
    pub async fn allocate(&self, input: AllocateInput) -> Result<AllocationOutcome, RepositoryError> {
        let txn = self.db.begin().await?;
        let transaction = load_transaction(&txn, input.transaction_id, true).await?;
        let booking = load_booking(&txn, &self.registry, input.booking_id, true).await?;
        let index = load_index(&txn, transaction.id, booking.id).await?;

        let outcome = AllocationEngine::allocate(
            &transaction,
            &booking,
            &index,
            input.amount,
            input.confirm_over_allocation,
        );
        if let Some(allocation) = &outcome.allocation {
            finance_allocations::Entity::insert(allocation_to_active(allocation))
                .exec_without_returning(&txn)
                .await?;
        }
        store_remaining(&txn, transaction.id, outcome.transaction_remaining).await?;
        txn.commit().await?;

        if outcome.would_exceed_transaction_total {
            warn!(
                transaction_id = %transaction.id,
                booking_id = %booking.id,
                requested = %outcome.requested,
                granted = %outcome.granted,
                "Allocation exceeds transaction remaining"
            );
        }
        info!(
            transaction_id = %transaction.id,
            booking_id = %booking.id,
            granted = %outcome.granted,
            "Allocation created"
        );
        Ok(outcome)
    }

    /// Changes the amount of an existing allocation.
    pub async fn revise(
        &self,
        id: AllocationId,
        amount: Decimal,
        confirm_over_allocation: bool,
    ) -> Result<AllocationOutcome, RepositoryError> {
        let txn = self.db.begin().await?;
        let existing = load_allocation(&txn, id).await?;
        let transaction = load_transaction(&txn, existing.transaction_id, true).await?;
        let booking = load_booking(&txn, &self.registry, existing.booking_id, true).await?;
        let index = load_index(&txn, transaction.id, booking.id).await?;

        let outcome = AllocationEngine::revise(
            &transaction,
            &booking,
            &index,
            id,
            amount,
            confirm_over_allocation,
        )?;
        if let Some(revised) = &outcome.allocation {
            let active = finance_allocations::ActiveModel {
                id: Set(revised.id.into_inner()),
                date: Set(revised.date),
                side: Set(revised.side.into()),
                amount: Set(revised.amount),
                ..Default::default()
            };
            active.update(&txn).await?;
        }
        store_remaining(&txn, transaction.id, outcome.transaction_remaining).await?;
        txn.commit().await?;

        info!(allocation_id = %id, granted = %outcome.granted, "Allocation revised");
        Ok(outcome)
    }

    /// Deletes an allocation.
    pub async fn remove(&self, id: AllocationId) -> Result<RemovalOutcome, RepositoryError> {
        let txn = self.db.begin().await?;
        let existing = load_allocation(&txn, id).await?;
        let transaction = load_transaction(&txn, existing.transaction_id, true).await?;
        let booking = load_booking(&txn, &self.registry, existing.booking_id, true).await?;
        let index = load_index(&txn, transaction.id, booking.id).await?;

        let outcome = AllocationEngine::remove(&transaction, &booking, &index, id)?;
        finance_allocations::Entity::delete_by_id(id.into_inner())
            .exec(&txn)
            .await?;
        store_remaining(&txn, transaction.id, outcome.transaction_remaining).await?;
        txn.commit().await?;

        info!(allocation_id = %id, amount = %outcome.removed.amount, "Allocation removed");
        Ok(outcome)
    }

    /// Remaining capacities of a booking.
    pub async fn capacity(&self, booking_id: BookingId) -> Result<BookingCapacity, RepositoryError> {
        let booking = load_booking(self.db.as_ref(), &self.registry, booking_id, false).await?;
        let index: AllocationIndex = finance_allocations::Entity::find()
            .filter(finance_allocations::Column::BookingId.eq(booking_id.into_inner()))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(allocation_from_row)
            .collect();
        Ok(AllocationEngine::capacity(&booking, &index))
    }
}

async fn load_allocation<C: ConnectionTrait>(
    conn: &C,
    id: AllocationId,
) -> Result<tourbook_core::ledger::Allocation, RepositoryError> {
    finance_allocations::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .map(allocation_from_row)
        .ok_or_else(|| RepositoryError::not_found("allocation", id.into_inner()))
}

/// Every allocation of the transaction and of the booking.
async fn load_index<C: ConnectionTrait>(
    conn: &C,
    transaction: TransactionId,
    booking: BookingId,
) -> Result<AllocationIndex, RepositoryError> {
    let rows = finance_allocations::Entity::find()
        .filter(
            Condition::any()
                .add(finance_allocations::Column::TransactionId.eq(transaction.into_inner()))
                .add(finance_allocations::Column::BookingId.eq(booking.into_inner())),
        )
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(allocation_from_row).collect())
}

async fn store_remaining<C: ConnectionTrait>(
    conn: &C,
    transaction: TransactionId,
    remaining: Decimal,
) -> Result<(), RepositoryError> {
    finance_transactions::Entity::update_many()
        .col_expr(
            finance_transactions::Column::RemainingToAllocate,
            sea_orm::sea_query::Expr::value(remaining),
        )
        .filter(finance_transactions::Column::Id.eq(transaction.into_inner()))
        .exec(conn)
        .await?;
    Ok(())
}
