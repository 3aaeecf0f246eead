//! Snapshot store and cache run metadata.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    DatabaseConnection, EntityTrait, Set, TransactionTrait, sea_query::OnConflict,
};
use serde::Serialize;
use tourbook_core::snapshot::{CacheRunStatus, SnapshotKey, SnapshotKind, SnapshotPayload};

use crate::entities::{cache_runs, report_snapshots};
use crate::error::RepositoryError;

/// A persisted snapshot with its as-of timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSnapshot {
    /// Document key.
    pub key: SnapshotKey,
    /// When the document was computed.
    pub built_at: DateTime<Utc>,
    /// Computed document.
    pub payload: SnapshotPayload,
}

/// Rebuild metadata for one snapshot kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRun {
    /// Snapshot kind.
    pub kind: SnapshotKind,
    /// Run status.
    pub status: CacheRunStatus,
    /// When the last run started.
    pub started_at: DateTime<Utc>,
    /// When the last run finished.
    pub finished_at: Option<DateTime<Utc>>,
    /// Failure message of the last run.
    pub error: Option<String>,
}

/// Snapshot repository.
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    db: Arc<DatabaseConnection>,
}

impl SnapshotRepository {
    /// Creates a new snapshot repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Replaces the given documents in one database transaction.
    pub async fn save_all(
        &self,
        documents: &[(SnapshotKey, SnapshotPayload)],
        built_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;
        for (key, payload) in documents {
            let payload = serde_json::to_value(payload)
                .map_err(|e| RepositoryError::corrupt("snapshot", key, e))?;
            let active = report_snapshots::ActiveModel {
                kind: Set(key.kind.as_str().to_string()),
                key: Set(key.key.clone()),
                payload: Set(payload),
                built_at: Set(built_at.into()),
            };
            report_snapshots::Entity::insert(active)
                .on_conflict(
                    OnConflict::columns([report_snapshots::Column::Kind, report_snapshots::Column::Key])
                        .update_columns([
                            report_snapshots::Column::Payload,
                            report_snapshots::Column::BuiltAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(())
    }

    /// Loads one document.
    pub async fn get(&self, key: &SnapshotKey) -> Result<Option<StoredSnapshot>, RepositoryError> {
        let Some(row) = report_snapshots::Entity::find_by_id((
            key.kind.as_str().to_string(),
            key.key.clone(),
        ))
        .one(self.db.as_ref())
        .await?
        else {
            return Ok(None);
        };

        let payload: SnapshotPayload = serde_json::from_value(row.payload)
            .map_err(|e| RepositoryError::corrupt("snapshot", key, e))?;
        Ok(Some(StoredSnapshot {
            key: key.clone(),
            built_at: row.built_at.with_timezone(&Utc),
            payload,
        }))
    }

    /// Records that a rebuild of `kind` started.
    pub async fn mark_running(&self, kind: SnapshotKind, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        self.upsert_run(kind, CacheRunStatus::Running, at, None, None).await
    }

    /// Records a successful rebuild.
    pub async fn mark_done(
        &self,
        kind: SnapshotKind,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.upsert_run(kind, CacheRunStatus::Done, started_at, Some(finished_at), None)
            .await
    }

    /// Records a failed rebuild.
    pub async fn mark_error(
        &self,
        kind: SnapshotKind,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        message: String,
    ) -> Result<(), RepositoryError> {
        self.upsert_run(
            kind,
            CacheRunStatus::Error,
            started_at,
            Some(finished_at),
            Some(message),
        )
        .await
    }

    /// Metadata of the last rebuild of `kind`.
    pub async fn run_status(&self, kind: SnapshotKind) -> Result<Option<CacheRun>, RepositoryError> {
        let row = cache_runs::Entity::find_by_id(kind.as_str().to_string())
            .one(self.db.as_ref())
            .await?;
        Ok(row.map(|row| CacheRun {
            kind,
            status: row.status.into(),
            started_at: row.started_at.with_timezone(&Utc),
            finished_at: row.finished_at.map(|t| t.with_timezone(&Utc)),
            error: row.error,
        }))
    }

    async fn upsert_run(
        &self,
        kind: SnapshotKind,
        status: CacheRunStatus,
        started_at: DateTime<Utc>,
        finished_at: Option<DateTime<Utc>>,
        error: Option<String>,
    ) -> Result<(), RepositoryError> {
        let active = cache_runs::ActiveModel {
            kind: Set(kind.as_str().to_string()),
            status: Set(status.into()),
            started_at: Set(started_at.into()),
            finished_at: Set(finished_at.map(Into::into)),
            error: Set(error),
        };
        cache_runs::Entity::insert(active)
            .on_conflict(
                OnConflict::column(cache_runs::Column::Kind)
                    .update_columns([
                        cache_runs::Column::Status,
                        cache_runs::Column::StartedAt,
                        cache_runs::Column::FinishedAt,
                        cache_runs::Column::Error,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;
        Ok(())
    }
}
