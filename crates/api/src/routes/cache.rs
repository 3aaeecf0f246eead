//! Snapshot cache routes: rebuild, read, and run status.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tourbook_core::booking::Basis;
use tourbook_core::reconciliation::{month_bounds, month_key};
use tourbook_core::snapshot::{SnapshotKey, SnapshotKind, SnapshotRequest};
use tourbook_shared::AppError;

use super::{date_or_today, error_response};
use crate::AppState;

/// Creates the cache routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cache/{kind}", get(get_snapshot))
        .route("/cache/{kind}/rebuild", post(rebuild_snapshot))
        .route("/cache/{kind}/status", get(get_run_status))
}

/// Query parameters selecting a snapshot.
#[derive(Debug, Default, Deserialize)]
pub struct SnapshotQuery {
    /// Range start (ISO date, defaults to today).
    pub from: Option<String>,
    /// Range end (ISO date, defaults to today).
    pub to: Option<String>,
    /// `created` (default) or `check_in`.
    pub basis: Option<String>,
    /// `YYYY-MM`, monthly P&L reads only.
    pub month: Option<String>,
}

fn parse_kind(raw: &str) -> Result<SnapshotKind, AppError> {
    SnapshotKind::parse(raw).ok_or_else(|| {
        AppError::Validation(format!(
            "Unknown snapshot kind {raw}; expected sales, founders, pnl or accounts"
        ))
    })
}

fn parse_request(kind: SnapshotKind, query: &SnapshotQuery) -> Result<SnapshotRequest, AppError> {
    Ok(SnapshotRequest {
        kind,
        from: date_or_today("from", query.from.as_deref())?,
        to: date_or_today("to", query.to.as_deref())?,
        basis: query.basis.as_deref().map(Basis::parse).unwrap_or_default(),
    })
}

fn snapshot_key(kind: SnapshotKind, query: &SnapshotQuery) -> Result<SnapshotKey, AppError> {
    match kind {
        SnapshotKind::Accounts => Ok(SnapshotKey::summary()),
        SnapshotKind::Pnl => {
            let month = match query.month.as_deref() {
                Some(month) => month.to_string(),
                None => month_key(date_or_today("to", query.to.as_deref())?),
            };
            if month_bounds(&month).is_none() {
                return Err(AppError::Validation(format!(
                    "month must be YYYY-MM, got {month}"
                )));
            }
            Ok(SnapshotKey::month(&month))
        }
        SnapshotKind::Sales | SnapshotKind::Founders => {
            let request = parse_request(kind, query)?;
            Ok(SnapshotKey::range(kind, request.from, request.to, request.basis))
        }
    }
}

/// POST `/cache/{kind}/rebuild` - Recompute and store a snapshot.
async fn rebuild_snapshot(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<SnapshotQuery>,
) -> Response {
    let request = match parse_kind(&kind).and_then(|kind| parse_request(kind, &query)) {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };

    match state.cache_builder().rebuild(request).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => error_response(&e.into()),
    }
}

/// GET `/cache/{kind}` - Stored snapshot with its as-of timestamp.
async fn get_snapshot(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<SnapshotQuery>,
) -> Response {
    let key = match parse_kind(&kind).and_then(|kind| snapshot_key(kind, &query)) {
        Ok(key) => key,
        Err(e) => return error_response(&e),
    };

    match state.snapshots().get(&key).await {
        Ok(Some(snapshot)) => (StatusCode::OK, Json(snapshot)).into_response(),
        Ok(None) => error_response(&AppError::NotFound(format!(
            "snapshot {key} has not been built; rebuild it or request the live report"
        ))),
        Err(e) => error_response(&e.into()),
    }
}

/// GET `/cache/{kind}/status` - Last rebuild metadata.
async fn get_run_status(State(state): State<AppState>, Path(kind): Path<String>) -> Response {
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(e) => return error_response(&e),
    };

    match state.snapshots().run_status(kind).await {
        Ok(Some(run)) => (StatusCode::OK, Json(run)).into_response(),
        Ok(None) => error_response(&AppError::NotFound(format!(
            "no rebuild recorded for {kind}"
        ))),
        Err(e) => error_response(&e.into()),
    }
}
