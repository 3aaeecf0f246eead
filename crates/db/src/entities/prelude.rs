//! Entity prelude.

pub use super::bookings::Entity as Bookings;
pub use super::cache_runs::Entity as CacheRuns;
pub use super::finance_accounts::Entity as FinanceAccounts;
pub use super::finance_allocations::Entity as FinanceAllocations;
pub use super::finance_categories::Entity as FinanceCategories;
pub use super::finance_counterparties::Entity as FinanceCounterparties;
pub use super::finance_fx_rates::Entity as FinanceFxRates;
pub use super::finance_transactions::Entity as FinanceTransactions;
pub use super::owner_withdrawals::Entity as OwnerWithdrawals;
pub use super::report_snapshots::Entity as ReportSnapshots;
