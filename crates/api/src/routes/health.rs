//! Health check endpoints.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status: `healthy` or `degraded`.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Database reachability: `up` or `down`.
    pub database: &'static str,
    /// Base currency every amount is reported in.
    pub base_currency: String,
}

/// Health check handler.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.db.ping().await {
        Ok(()) => "up",
        Err(e) => {
            warn!(error = %e, "Database ping failed");
            "down"
        }
    };
    Json(HealthResponse {
        status: if database == "up" { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
        base_currency: state.base_currency.to_string(),
    })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, send, state};
    use axum::http::StatusCode;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_health_reports_version_and_currency() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let (status, body) = send(app(state(db)), "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["base_currency"], "EUR");
        assert!(body["status"].is_string());
    }
}
