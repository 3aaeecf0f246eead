//! Transaction repository: creation with one-time FX resolution and
//! cascading deletion.

use std::sync::Arc;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
    TransactionTrait,
};
use tourbook_core::fx::FxResolver;
use tourbook_core::ledger::{NewTransaction, Transaction};
use tourbook_shared::types::TransactionId;
use serde::Serialize;
use tracing::info;

use crate::entities::{finance_allocations, finance_transactions};
use crate::error::RepositoryError;
use crate::mapping::{transaction_from_row, transaction_to_active};

/// Result of deleting a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedTransaction {
    /// Deleted transaction.
    pub id: TransactionId,
    /// Allocations removed with it.
    pub allocations_removed: u64,
}

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: Arc<DatabaseConnection>,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Validates `input`, resolves its base amount with `fx`, and stores it.
    pub async fn create(
        &self,
        input: NewTransaction,
        fx: &FxResolver,
    ) -> Result<Transaction, RepositoryError> {
        let tx = input.into_transaction(fx)?;
        finance_transactions::Entity::insert(transaction_to_active(&tx))
            .exec_without_returning(self.db.as_ref())
            .await?;

        info!(
            transaction_id = %tx.id,
            side = tx.side.as_str(),
            currency = %tx.currency,
            base_amount = %tx.base_amount,
            "Transaction created"
        );
        Ok(tx)
    }

    /// Deletes a transaction together with its allocations.
    pub async fn delete(&self, id: TransactionId) -> Result<DeletedTransaction, RepositoryError> {
        let txn = self.db.begin().await?;
        load_transaction(&txn, id, true).await?;

        let allocations_removed = finance_allocations::Entity::delete_many()
            .filter(finance_allocations::Column::TransactionId.eq(id.into_inner()))
            .exec(&txn)
            .await?
            .rows_affected;
        finance_transactions::Entity::delete_by_id(id.into_inner())
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!(transaction_id = %id, allocations_removed, "Transaction deleted");
        Ok(DeletedTransaction {
            id,
            allocations_removed,
        })
    }
}

/// Loads a transaction, optionally locking its row.
pub(crate) async fn load_transaction<C: ConnectionTrait>(
    conn: &C,
    id: TransactionId,
    lock: bool,
) -> Result<Transaction, RepositoryError> {
    let mut query = finance_transactions::Entity::find_by_id(id.into_inner());
    if lock {
        query = query.lock_exclusive();
    }
    let row = query
        .one(conn)
        .await?
        .ok_or_else(|| RepositoryError::not_found("transaction", id.into_inner()))?;
    transaction_from_row(row)
}
