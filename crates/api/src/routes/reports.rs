//! Reconciliation report routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tourbook_core::reconciliation::{ReconciliationEngine, ReconciliationReport, validate_range};
use tourbook_shared::AppError;
use tracing::{debug, info};

use super::{date_or_today, error_response};
use crate::AppState;

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/reports/reconciliation", get(get_reconciliation_report))
}

/// Query parameters for the reconciliation report.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// Period start (ISO date, defaults to today).
    pub from: Option<String>,
    /// Period end and as-of cutoff (ISO date, defaults to today).
    pub to: Option<String>,
}

/// GET `/reports/reconciliation` - As-of reconciliation report.
async fn get_reconciliation_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Response {
    match live_report(&state, &query).await {
        Ok(report) => (StatusCode::OK, Json(report.as_ref())).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn live_report(
    state: &AppState,
    query: &ReportQuery,
) -> Result<Arc<ReconciliationReport>, AppError> {
    let from = date_or_today("from", query.from.as_deref())?;
    let to = date_or_today("to", query.to.as_deref())?;
    validate_range(from, to).map_err(|e| AppError::Validation(e.to_string()))?;

    if let Some(report) = state.live_reports.get(from, to) {
        debug!(%from, %to, "Serving memoized report");
        return Ok(report);
    }

    let input = state.reports().load_input(to, None).await?;
    let report = ReconciliationEngine::run(&input, from, to)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let report = Arc::new(report);
    state.live_reports.insert(from, to, Arc::clone(&report));

    info!(
        %from,
        %to,
        bookings = report.bookings.len(),
        anomalies = report.anomalies.count(),
        "Reconciliation report computed"
    );
    Ok(report)
}
