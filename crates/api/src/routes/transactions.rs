//! Transaction routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, post},
};
use tourbook_core::ledger::NewTransaction;
use tourbook_shared::types::TransactionId;
use uuid::Uuid;

use super::error_response;
use crate::AppState;

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(create_transaction))
        .route("/transactions/{id}", delete(delete_transaction))
}

/// POST `/transactions` - Record a money movement.
///
/// The base amount is fixed here from the FX document in force on the
/// transaction's date and never recomputed.
async fn create_transaction(
    State(state): State<AppState>,
    Json(payload): Json<NewTransaction>,
) -> Response {
    let fx = match state.fx_rates().resolver_for(payload.date).await {
        Ok(fx) => fx,
        Err(e) => return error_response(&e.into()),
    };
    match state.transactions().create(payload, &fx).await {
        Ok(tx) => {
            state.live_reports.invalidate_all();
            (StatusCode::CREATED, Json(tx)).into_response()
        }
        Err(e) => error_response(&e.into()),
    }
}

/// DELETE `/transactions/{id}` - Delete a transaction and its allocations.
async fn delete_transaction(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.transactions().delete(TransactionId::from_uuid(id)).await {
        Ok(deleted) => {
            state.live_reports.invalidate_all();
            (StatusCode::OK, Json(deleted)).into_response()
        }
        Err(e) => error_response(&e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, send, state};
    use axum::http::StatusCode;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;
    use tourbook_db::entities::{finance_fx_rates, finance_transactions};
    use uuid::Uuid;

    fn no_fx_documents() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([
            Vec::<finance_fx_rates::Model>::new(),
            Vec::<finance_fx_rates::Model>::new(),
        ])
    }

    fn body(amount: &str) -> serde_json::Value {
        json!({
            "date": "2025-03-05",
            "side": "expense",
            "accountId": Uuid::now_v7(),
            "currency": "EUR",
            "amount": amount
        })
    }

    #[tokio::test]
    async fn test_create_base_currency_transaction() {
        let db = no_fx_documents()
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let (status, body) = send(app(state(db)), "POST", "/api/v1/transactions", Some(body("120"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["side"], "expense");
        assert_eq!(body["status"], "actual");
    }

    #[tokio::test]
    async fn test_non_positive_amount_is_rejected() {
        let db = no_fx_documents().into_connection();
        let (status, body) = send(app(state(db)), "POST", "/api/v1/transactions", Some(body("0"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_delete_unknown_transaction_is_404() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<finance_transactions::Model>::new()])
            .into_connection();
        let uri = format!("/api/v1/transactions/{}", Uuid::now_v7());
        let (status, _) = send(app(state(db)), "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
