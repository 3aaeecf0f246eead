//! Shared types, errors, and configuration for Tourbook.
//!
//! This crate provides common types used across all other crates:
//! - Money helpers with decimal precision and 2-dp rounding
//! - Typed IDs for type-safe document references
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, LedgerConfig, OperatorConfig};
pub use error::{AppError, AppResult};
