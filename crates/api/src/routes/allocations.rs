//! Allocation (order) routes.
//!
//! Every successful write drops the memoized live reports.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tourbook_db::AllocateInput;
use tourbook_shared::types::{AllocationId, BookingId, TransactionId};
use uuid::Uuid;

use super::error_response;
use crate::AppState;

/// Creates the allocation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/allocations", post(create_allocation))
        .route(
            "/allocations/{id}",
            put(revise_allocation).delete(delete_allocation),
        )
}

/// Request body for a new allocation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAllocationRequest {
    /// Source transaction.
    pub transaction_id: Uuid,
    /// Target booking.
    pub booking_id: Uuid,
    /// Requested amount in base currency.
    pub amount: Decimal,
    /// Allow going past the transaction's remaining amount.
    #[serde(default)]
    pub confirm_over_allocation: bool,
}

/// Request body for revising an allocation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviseAllocationRequest {
    /// New amount in base currency.
    pub amount: Decimal,
    /// Allow going past the transaction's remaining amount.
    #[serde(default)]
    pub confirm_over_allocation: bool,
}

/// POST `/allocations` - Allocate part of a transaction to a booking.
///
/// Responds 201 when a record was written and 200 when the clamp granted
/// nothing; the outcome tells the caller whether confirmation is needed.
async fn create_allocation(
    State(state): State<AppState>,
    Json(payload): Json<CreateAllocationRequest>,
) -> Response {
    let input = AllocateInput {
        transaction_id: TransactionId::from_uuid(payload.transaction_id),
        booking_id: BookingId::from_uuid(payload.booking_id),
        amount: payload.amount,
        confirm_over_allocation: payload.confirm_over_allocation,
    };
    match state.allocations().allocate(input).await {
        Ok(outcome) => {
            state.live_reports.invalidate_all();
            let status = if outcome.allocation.is_some() {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, Json(outcome)).into_response()
        }
        Err(e) => error_response(&e.into()),
    }
}

/// PUT `/allocations/{id}` - Change an allocation's amount.
async fn revise_allocation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviseAllocationRequest>,
) -> Response {
    match state
        .allocations()
        .revise(
            AllocationId::from_uuid(id),
            payload.amount,
            payload.confirm_over_allocation,
        )
        .await
    {
        Ok(outcome) => {
            state.live_reports.invalidate_all();
            (StatusCode::OK, Json(outcome)).into_response()
        }
        Err(e) => error_response(&e.into()),
    }
}

/// DELETE `/allocations/{id}` - Remove an allocation.
async fn delete_allocation(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.allocations().remove(AllocationId::from_uuid(id)).await {
        Ok(outcome) => {
            state.live_reports.invalidate_all();
            (StatusCode::OK, Json(outcome)).into_response()
        }
        Err(e) => error_response(&e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, send, state};
    use axum::http::StatusCode;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use tourbook_db::entities::{finance_allocations, finance_transactions};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_unknown_transaction_is_404() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<finance_transactions::Model>::new()])
            .into_connection();
        let body = json!({
            "transactionId": Uuid::now_v7(),
            "bookingId": Uuid::now_v7(),
            "amount": "100.00"
        });
        let (status, body) = send(app(state(db)), "POST", "/api/v1/allocations", Some(body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_delete_unknown_allocation_is_404() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<finance_allocations::Model>::new()])
            .into_connection();
        let uri = format!("/api/v1/allocations/{}", Uuid::now_v7());
        let (status, _) = send(app(state(db)), "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
