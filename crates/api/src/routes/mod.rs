//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, Utc};
use serde_json::json;
use tourbook_shared::AppError;
use tracing::{error, warn};

use crate::AppState;

pub mod allocations;
pub mod bookings;
pub mod cache;
pub mod health;
pub mod reports;
pub mod transactions;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(reports::routes())
        .merge(cache::routes())
        .merge(allocations::routes())
        .merge(bookings::routes())
        .merge(transactions::routes())
}

/// Renders an error as `{"error": code, "message": text}`.
///
/// Server-side failures are logged and their details withheld.
pub(crate) fn error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = if status.is_server_error() {
        error!(error = %err, "Request failed");
        "An error occurred".to_string()
    } else {
        warn!(error = %err, "Request rejected");
        err.to_string()
    };
    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": message,
        })),
    )
        .into_response()
}

/// Parses an optional ISO date query value, defaulting to today.
pub(crate) fn date_or_today(field: &str, value: Option<&str>) -> Result<NaiveDate, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(Utc::now().date_naive()),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| AppError::Validation(format!("{field} must be an ISO date, got {raw}"))),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use sea_orm::DatabaseConnection;
    use tourbook_shared::{LedgerConfig, OperatorConfig};
    use tower::ServiceExt;

    use crate::{AppState, create_router};

    pub fn state(db: DatabaseConnection) -> AppState {
        let ledger = LedgerConfig {
            operators: vec![OperatorConfig {
                name: "TOCO".to_string(),
                allow_net: true,
            }],
            ..LedgerConfig::default()
        };
        AppState::new(db, ledger).unwrap()
    }

    pub fn app(state: AppState) -> Router {
        create_router(state)
    }

    pub async fn send(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, value)
    }
}
