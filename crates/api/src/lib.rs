//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for the ledger, reports, and snapshot cache
//! - Shared application state
//! - JSON error responses

pub mod routes;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tourbook_core::booking::OperatorRegistry;
use tourbook_core::reconciliation::LiveReportCache;
use tourbook_db::{
    AllocationRepository, BookingRepository, CacheBuilder, FxRateRepository, ReportRepository,
    SnapshotRepository, TransactionRepository,
};
use tourbook_shared::types::CurrencyCode;
use tourbook_shared::{AppError, LedgerConfig};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Ledger configuration.
    pub ledger: Arc<LedgerConfig>,
    /// Operator registry built from the ledger configuration.
    pub registry: Arc<OperatorRegistry>,
    /// Base currency.
    pub base_currency: CurrencyCode,
    /// Memoized live reports.
    pub live_reports: LiveReportCache,
}

impl AppState {
    /// Builds the state from a connection and the ledger configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the base currency is not a valid code.
    pub fn new(db: DatabaseConnection, ledger: LedgerConfig) -> Result<Self, AppError> {
        let base_currency: CurrencyCode = ledger
            .base_currency
            .parse()
            .map_err(AppError::Validation)?;
        Ok(Self {
            db: Arc::new(db),
            registry: Arc::new(OperatorRegistry::from_config(&ledger.operators)),
            live_reports: LiveReportCache::from_config(&ledger),
            base_currency,
            ledger: Arc::new(ledger),
        })
    }

    /// Booking repository.
    #[must_use]
    pub fn bookings(&self) -> BookingRepository {
        BookingRepository::new(
            Arc::clone(&self.db),
            (*self.registry).clone(),
            self.ledger.id_chunk_size,
        )
    }

    /// Allocation repository.
    #[must_use]
    pub fn allocations(&self) -> AllocationRepository {
        AllocationRepository::new(Arc::clone(&self.db), (*self.registry).clone())
    }

    /// Transaction repository.
    #[must_use]
    pub fn transactions(&self) -> TransactionRepository {
        TransactionRepository::new(Arc::clone(&self.db))
    }

    /// FX rate repository.
    #[must_use]
    pub fn fx_rates(&self) -> FxRateRepository {
        FxRateRepository::new(Arc::clone(&self.db), self.base_currency.clone())
    }

    /// Report input loader.
    #[must_use]
    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(
            Arc::clone(&self.db),
            (*self.registry).clone(),
            self.ledger.id_chunk_size,
        )
    }

    /// Snapshot repository.
    #[must_use]
    pub fn snapshots(&self) -> SnapshotRepository {
        SnapshotRepository::new(Arc::clone(&self.db))
    }

    /// Snapshot cache builder.
    #[must_use]
    pub fn cache_builder(&self) -> CacheBuilder {
        CacheBuilder::new(self.reports(), self.snapshots())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
