//! Loads the documents a report or snapshot build reads.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tourbook_core::booking::OperatorRegistry;
use tourbook_core::reconciliation::{CorruptRecord, ReportInput};
use tourbook_shared::types::BookingId;
use tracing::debug;

use super::booking::BookingRepository;
use crate::entities::{
    finance_accounts, finance_allocations, finance_categories, finance_transactions,
    owner_withdrawals,
};
use crate::error::RepositoryError;
use crate::mapping::{
    account_from_row, allocation_from_row, category_from_row, keep_readable,
    transaction_from_row, withdrawal_from_row,
};

/// Read-side loader for reports and snapshots.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
    bookings: BookingRepository,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, registry: OperatorRegistry, chunk_size: usize) -> Self {
        Self {
            bookings: BookingRepository::new(Arc::clone(&db), registry, chunk_size),
            db,
        }
    }

    /// Loads everything dated on or before `to`.
    ///
    /// Bookings are fetched by the ids the allocations reference. With
    /// `range`, bookings created or checking in inside it are added too, so
    /// dashboards see unpaid bookings.
    pub async fn load_input(
        &self,
        to: NaiveDate,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<ReportInput, RepositoryError> {
        let (allocation_rows, transaction_rows, category_rows, account_rows, withdrawal_rows) = futures::try_join!(
            finance_allocations::Entity::find()
                .filter(finance_allocations::Column::Date.lte(to))
                .order_by_asc(finance_allocations::Column::Date)
                .all(self.db.as_ref()),
            finance_transactions::Entity::find()
                .filter(finance_transactions::Column::Date.lte(to))
                .order_by_asc(finance_transactions::Column::Date)
                .all(self.db.as_ref()),
            finance_categories::Entity::find().all(self.db.as_ref()),
            finance_accounts::Entity::find()
                .order_by_asc(finance_accounts::Column::Name)
                .all(self.db.as_ref()),
            owner_withdrawals::Entity::find()
                .filter(owner_withdrawals::Column::Date.lte(to))
                .all(self.db.as_ref()),
        )?;

        let allocations: Vec<_> = allocation_rows.into_iter().map(allocation_from_row).collect();
        let referenced: Vec<BookingId> = allocations
            .iter()
            .map(|a| a.booking_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let mut corrupt: Vec<CorruptRecord> = Vec::new();
        let mut bookings = self.bookings.find_many(&referenced, &mut corrupt).await?;
        if let Some((range_from, range_to)) = range {
            let known: HashSet<BookingId> = bookings.iter().map(|b| b.id).collect();
            let mut skipped = Vec::new();
            let extra = self.bookings.in_range(range_from, range_to, &mut skipped).await?;
            bookings.extend(extra.into_iter().filter(|b| !known.contains(&b.id)));
            for record in skipped {
                if !corrupt.contains(&record) {
                    corrupt.push(record);
                }
            }
        }

        let transactions = keep_readable(transaction_rows.into_iter().map(transaction_from_row), &mut corrupt)?;
        let accounts = keep_readable(account_rows.into_iter().map(account_from_row), &mut corrupt)?;
        let withdrawals = keep_readable(withdrawal_rows.into_iter().map(withdrawal_from_row), &mut corrupt)?;

        let input = ReportInput {
            bookings,
            allocations,
            transactions,
            categories: category_rows.into_iter().map(category_from_row).collect(),
            accounts,
            withdrawals,
            corrupt_records: corrupt,
        };
        debug!(
            %to,
            bookings = input.bookings.len(),
            allocations = input.allocations.len(),
            transactions = input.transactions.len(),
            corrupt = input.corrupt_records.len(),
            "Report input loaded"
        );
        Ok(input)
    }
}
