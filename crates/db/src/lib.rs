//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access (chunked id-list lookups)
//! - The snapshot cache builder
//! - Database migrations

pub mod cache_builder;
pub mod entities;
pub mod error;
pub mod mapping;
pub mod migration;
pub mod repositories;

pub use cache_builder::{CacheBuildError, CacheBuilder, RebuildSummary};
pub use error::RepositoryError;
pub use repositories::{
    AllocateInput, AllocationRepository, BookingRepository, FxRateRepository, ReportRepository,
    SnapshotRepository, TransactionRepository,
};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tourbook_shared::config::DatabaseConfig;

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection sized from configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}
