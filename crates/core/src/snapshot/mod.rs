//! Precomputed, read-only aggregates.
//!
//! Snapshots are always rebuilt wholesale from the source documents and
//! never patched. Persistence and run metadata live in the db crate.

pub mod accounts;
pub mod builder;
pub mod founders;
pub mod key;
pub mod pnl;
pub mod sales;

pub use accounts::{AccountBalanceRow, AccountOverview};
pub use builder::{SnapshotBuilder, SnapshotPayload, SnapshotRequest};
pub use founders::{FounderLedger, FoundersSnapshot};
pub use key::{CacheRunStatus, SUMMARY_KEY, SnapshotKey, SnapshotKind, range_key};
pub use pnl::{CategoryAmount, MonthlyPnl};
pub use sales::{SalesRow, SalesSnapshot};
