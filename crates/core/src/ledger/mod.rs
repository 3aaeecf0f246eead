//! Money-movement records: transactions, allocations, and the reference data
//! they point at (accounts, categories, counterparties, owner withdrawals).
//!
//! This is not a double-entry ledger. A transaction is a single signed money
//! movement on one account; allocations ("orders") link parts of it to bookings.

pub mod error;
pub mod transaction;
pub mod types;

pub use error::LedgerError;
pub use transaction::NewTransaction;
pub use types::{
    Account, Allocation, AllocationStatus, Category, OwnerWithdrawal, Side, Transaction,
    TransactionStatus,
};
