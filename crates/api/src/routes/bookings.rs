//! Booking routes: allocation capacity and commission state.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde::Serialize;
use tourbook_core::booking::{Booking, CommissionFigures, CommissionState};
use tourbook_core::commission::{CommissionCalculator, RecomputeOutcome};
use tourbook_shared::types::BookingId;
use uuid::Uuid;

use super::error_response;
use crate::AppState;

/// Creates the booking routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings/{id}/capacity", get(get_capacity))
        .route("/bookings/{id}/commission/recompute", post(recompute_commission))
        .route("/bookings/{id}/commission", put(override_commission))
        .route("/bookings/{id}/commission/override", delete(clear_override))
}

/// Commission state of a booking.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionResponse {
    /// Booking ID.
    pub booking_id: BookingId,
    /// Stored state.
    pub commission: CommissionState,
    /// Figures in force (override, else computed from current prices).
    pub effective: CommissionFigures,
    /// Recompute result, for recompute requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RecomputeOutcome>,
}

impl CommissionResponse {
    fn new(booking: &Booking, outcome: Option<RecomputeOutcome>) -> Self {
        Self {
            booking_id: booking.id,
            commission: booking.commission,
            effective: CommissionCalculator::effective(booking),
            outcome,
        }
    }
}

/// GET `/bookings/{id}/capacity` - Remaining allocation capacity.
async fn get_capacity(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.allocations().capacity(BookingId::from_uuid(id)).await {
        Ok(capacity) => (StatusCode::OK, Json(capacity)).into_response(),
        Err(e) => error_response(&e.into()),
    }
}

/// POST `/bookings/{id}/commission/recompute` - Recompute unless overridden.
async fn recompute_commission(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.bookings().recompute_commission(BookingId::from_uuid(id)).await {
        Ok((booking, outcome)) => {
            if outcome == RecomputeOutcome::Updated {
                state.live_reports.invalidate_all();
            }
            (StatusCode::OK, Json(CommissionResponse::new(&booking, Some(outcome)))).into_response()
        }
        Err(e) => error_response(&e.into()),
    }
}

/// PUT `/bookings/{id}/commission` - Freeze the commission at the given figures.
async fn override_commission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(figures): Json<CommissionFigures>,
) -> Response {
    match state
        .bookings()
        .override_commission(BookingId::from_uuid(id), figures)
        .await
    {
        Ok(booking) => {
            state.live_reports.invalidate_all();
            (StatusCode::OK, Json(CommissionResponse::new(&booking, None))).into_response()
        }
        Err(e) => error_response(&e.into()),
    }
}

/// DELETE `/bookings/{id}/commission/override` - Return to computed figures.
async fn clear_override(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state
        .bookings()
        .clear_commission_override(BookingId::from_uuid(id))
        .await
    {
        Ok(booking) => {
            state.live_reports.invalidate_all();
            (StatusCode::OK, Json(CommissionResponse::new(&booking, None))).into_response()
        }
        Err(e) => error_response(&e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, send, state};
    use axum::http::StatusCode;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use tourbook_db::entities::bookings;
    use uuid::Uuid;

    fn row(commission: serde_json::Value) -> bookings::Model {
        bookings::Model {
            id: Uuid::now_v7(),
            booking_number: "TB-4001".to_string(),
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
    async fn test_recompute_respects_override() {
        let frozen = json!({"state": "manual_override", "figures": {"kind": "agent", "commission": "50"}});
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(frozen)]])
            .into_connection();
        let uri = format!("/api/v1/bookings/{}/commission/recompute", Uuid::now_v7());
        let (status, body) = send(app(state(db)), "POST", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "frozen");
        assert_eq!(body["commission"]["state"], "manual_override");
    }

    #[tokio::test]
    async fn test_clearing_without_override_is_conflict() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(json!({"state": "pending"}))]])
            .into_connection();
        let uri = format!("/api/v1/bookings/{}/commission/override", Uuid::now_v7());
        let (status, body) = send(app(state(db)), "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "conflict");
    }
}
