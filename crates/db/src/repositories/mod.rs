//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod allocation;
pub mod booking;
pub mod chunked;
pub mod fx_rate;
pub mod report;
pub mod snapshot;
pub mod transaction;

pub use allocation::{AllocateInput, AllocationRepository};
pub use booking::BookingRepository;
pub use chunked::fetch_by_ids;
pub use fx_rate::FxRateRepository;
pub use report::ReportRepository;
pub use snapshot::{CacheRun, SnapshotRepository, StoredSnapshot};
pub use transaction::{DeletedTransaction, TransactionRepository};
