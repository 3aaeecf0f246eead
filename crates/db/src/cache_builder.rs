//! Snapshot cache builder.
//!
//! A rebuild marks the kind as running, recomputes every document from the
//! source tables, writes them in one database transaction, and marks the
//! kind done. On failure the run is marked as errored and the previously
//! stored documents stay in place.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tourbook_core::reconciliation::{ReportError, validate_range};
use tourbook_core::snapshot::{
    SnapshotBuilder, SnapshotKey, SnapshotKind, SnapshotPayload, SnapshotRequest,
};
use tourbook_shared::AppError;
use tracing::{error, info};

use crate::error::RepositoryError;
use crate::repositories::{ReportRepository, SnapshotRepository};

/// Errors from a snapshot rebuild.
#[derive(Debug, Error)]
pub enum CacheBuildError {
    /// Invalid request.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Loading or storing failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<CacheBuildError> for AppError {
    fn from(err: CacheBuildError) -> Self {
        match err {
            CacheBuildError::Report(e) => Self::Validation(e.to_string()),
            CacheBuildError::Repository(e) => e.into(),
        }
    }
}

/// Outcome of a successful rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildSummary {
    /// Rebuilt kind.
    pub kind: SnapshotKind,
    /// Keys of the documents written.
    pub keys: Vec<String>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the documents were written; their as-of timestamp.
    pub built_at: DateTime<Utc>,
}

/// Rebuilds precomputed snapshots.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    reports: ReportRepository,
    snapshots: SnapshotRepository,
}

impl CacheBuilder {
    /// Creates a new cache builder.
    #[must_use]
    pub const fn new(reports: ReportRepository, snapshots: SnapshotRepository) -> Self {
        Self { reports, snapshots }
    }

    /// Rebuilds every document `request` covers.
    pub async fn rebuild(&self, request: SnapshotRequest) -> Result<RebuildSummary, CacheBuildError> {
        let kind = request.kind;
        let started_at = Utc::now();
        self.snapshots.mark_running(kind, started_at).await?;

        match self.build_and_store(&request).await {
            Ok((documents, built_at)) => {
                self.snapshots.mark_done(kind, started_at, Utc::now()).await?;
                info!(
                    kind = kind.as_str(),
                    documents = documents.len(),
                    "Snapshot rebuilt"
                );
                Ok(RebuildSummary {
                    kind,
                    keys: documents.into_iter().map(|(key, _)| key.key).collect(),
                    started_at,
                    built_at,
                })
            }
            Err(e) => {
                error!(error = %e, kind = kind.as_str(), "Snapshot rebuild failed");
                if let Err(mark) = self
                    .snapshots
                    .mark_error(kind, started_at, Utc::now(), e.to_string())
                    .await
                {
                    error!(error = %mark, kind = kind.as_str(), "Failed to record rebuild error");
                }
                Err(e)
            }
        }
    }

    async fn build_and_store(
        &self,
        request: &SnapshotRequest,
    ) -> Result<(Vec<(SnapshotKey, SnapshotPayload)>, DateTime<Utc>), CacheBuildError> {
        validate_range(request.from, request.to)?;
        let input = self
            .reports
            .load_input(request.to, Some((request.from, request.to)))
            .await?;
        let documents = SnapshotBuilder::build(request, &input)?;
        let built_at = Utc::now();
        self.snapshots.save_all(&documents, built_at).await?;
        Ok((documents, built_at))
    }
}
