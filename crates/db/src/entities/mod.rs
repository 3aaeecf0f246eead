//! `SeaORM` entity definitions.

pub mod prelude;

pub mod bookings;
pub mod cache_runs;
pub mod finance_accounts;
pub mod finance_allocations;
pub mod finance_categories;
pub mod finance_counterparties;
pub mod finance_fx_rates;
pub mod finance_transactions;
pub mod owner_withdrawals;
pub mod report_snapshots;
pub mod sea_orm_active_enums;
