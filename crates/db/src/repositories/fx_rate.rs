//! FX rate repository: one rate document per effective date.

use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tourbook_core::fx::FxResolver;
use tourbook_shared::types::CurrencyCode;

use crate::entities::finance_fx_rates;
use crate::error::RepositoryError;
use crate::mapping::fx_snapshot_from_row;

/// FX rate repository.
#[derive(Debug, Clone)]
pub struct FxRateRepository {
    db: Arc<DatabaseConnection>,
    base: CurrencyCode,
}

impl FxRateRepository {
    /// Creates a new FX rate repository for `base`.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>, base: CurrencyCode) -> Self {
        Self { db, base }
    }

    /// Builds a resolver holding just the documents a conversion on `date`
    /// can use: the latest one on or before `date`, else the oldest one.
    /// Only documents quoted against the repository's base are considered.
    pub async fn resolver_for(&self, date: NaiveDate) -> Result<FxResolver, RepositoryError> {
        let base = finance_fx_rates::Column::Base.eq(self.base.as_str());
        let prior = finance_fx_rates::Entity::find()
            .filter(base.clone())
            .filter(finance_fx_rates::Column::Date.lte(date))
            .order_by_desc(finance_fx_rates::Column::Date)
            .one(self.db.as_ref())
            .await?;
        let row = match prior {
            Some(row) => Some(row),
            None => {
                finance_fx_rates::Entity::find()
                    .filter(base)
                    .order_by_asc(finance_fx_rates::Column::Date)
                    .one(self.db.as_ref())
                    .await?
            }
        };

        let snapshots = row.map(fx_snapshot_from_row).transpose()?.into_iter().collect();
        Ok(FxResolver::new(self.base.clone(), snapshots))
    }
}
