//! Repository error types.

use sea_orm::DbErr;
use thiserror::Error;
use tourbook_core::allocation::AllocationError;
use tourbook_core::commission::CommissionError;
use tourbook_core::ledger::LedgerError;
use tourbook_shared::AppError;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Row not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity name.
        entity: &'static str,
        /// Requested ID.
        id: String,
    },

    /// Stored row cannot be mapped to a domain value.
    #[error("Stored {entity} {id} is unreadable: {reason}")]
    Corrupt {
        /// Entity name.
        entity: &'static str,
        /// Row ID.
        id: String,
        /// What failed.
        reason: String,
    },

    /// Transaction input rejected.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Allocation rule violated.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Commission state transition rejected.
    #[error(transparent)]
    Commission(#[from] CommissionError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn corrupt(entity: &'static str, id: impl ToString, reason: impl ToString) -> Self {
        Self::Corrupt {
            entity,
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => Self::NotFound(err.to_string()),
            RepositoryError::Ledger(e) => Self::Validation(e.to_string()),
            RepositoryError::Allocation(e) => Self::BusinessRule(e.to_string()),
            RepositoryError::Commission(e) => Self::Conflict(e.to_string()),
            RepositoryError::Corrupt { .. } => Self::Internal(err.to_string()),
            RepositoryError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourbook_core::booking::OverrideError;
    use tourbook_shared::types::AllocationId;

    #[test]
    fn test_maps_to_app_error() {
        let err: AppError = RepositoryError::not_found("booking", "b-1").into();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), "Not found: booking not found: b-1");

        let err: AppError = RepositoryError::from(LedgerError::OwnerOnIncome).into();
        assert_eq!(err.status_code(), 400);

        let err: AppError =
            RepositoryError::from(AllocationError::AllocationNotFound(AllocationId::new())).into();
        assert_eq!(err.status_code(), 422);

        let err: AppError =
            RepositoryError::from(CommissionError::State(OverrideError::NotOverridden)).into();
        assert_eq!(err.status_code(), 409);

        let err: AppError = RepositoryError::from(DbErr::Custom("boom".into())).into();
        assert_eq!(err.error_code(), "database_error");
    }
}
