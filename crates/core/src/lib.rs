//! Core business logic for Tourbook.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, allocation rules, and calculations live here.
//!
//! # Modules
//!
//! - `fx` - Point-in-time conversion into the base currency
//! - `booking` - Booking model, operator registry, commission state machine
//! - `ledger` - Transactions, allocations, accounts, categories, withdrawals
//! - `allocation` - Capacity-capped allocation of transactions to bookings
//! - `commission` - Agent commission and founder split formulas
//! - `reconciliation` - As-of reconciliation report and live report cache
//! - `snapshot` - Precomputed dashboards (sales, founders, P&L, accounts)

pub mod allocation;
pub mod booking;
pub mod commission;
pub mod fx;
pub mod ledger;
pub mod reconciliation;
pub mod snapshot;
