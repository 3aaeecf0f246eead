//! Ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised when building ledger records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Amounts are unsigned; the side carries the direction.
    #[error("Transaction amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Currency code could not be parsed.
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    /// Only expenses can be attributed to a founder.
    #[error("Founder attribution is only allowed on expense transactions")]
    OwnerOnIncome,
}
