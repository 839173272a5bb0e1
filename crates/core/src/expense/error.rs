//! Expense lifecycle errors.

use splitbook_shared::AppError;
use splitbook_shared::types::{ExpenseId, MemberId};
use thiserror::Error;

use crate::split::SplitError;

/// Errors that can occur while creating or changing an expense.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpenseError {
    /// The split could not be computed.
    #[error(transparent)]
    Split(#[from] SplitError),

    /// Only the creator or a group admin may change an expense.
    #[error("Member {member_id} may not modify expense {expense_id}")]
    NotPermitted {
        /// The expense.
        expense_id: ExpenseId,
        /// The member who attempted the change.
        member_id: MemberId,
    },

    /// The expense was soft-deleted and can no longer change.
    #[error("Expense {0} has been deleted")]
    ExpenseDeleted(ExpenseId),
}

impl ExpenseError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Split(err) => err.error_code(),
            Self::NotPermitted { .. } => "NOT_PERMITTED",
            Self::ExpenseDeleted(_) => "EXPENSE_DELETED",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Split(err) => err.http_status_code(),
            Self::NotPermitted { .. } => 403,
            Self::ExpenseDeleted(_) => 409,
        }
    }
}

impl From<ExpenseError> for AppError {
    fn from(err: ExpenseError) -> Self {
        match err {
            ExpenseError::Split(split) => split.into(),
            other @ ExpenseError::NotPermitted { .. } => AppError::Forbidden(other.to_string()),
            other @ ExpenseError::ExpenseDeleted(_) => AppError::Conflict(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_status() {
        let split: ExpenseError = SplitError::EmptyParticipants.into();
        assert_eq!(split.error_code(), "EMPTY_PARTICIPANTS");
        assert_eq!(split.http_status_code(), 400);

        let denied = ExpenseError::NotPermitted {
            expense_id: ExpenseId::new(),
            member_id: MemberId::new(),
        };
        assert_eq!(denied.error_code(), "NOT_PERMITTED");
        assert_eq!(denied.http_status_code(), 403);

        let deleted = ExpenseError::ExpenseDeleted(ExpenseId::new());
        assert_eq!(deleted.error_code(), "EXPENSE_DELETED");
        assert_eq!(deleted.http_status_code(), 409);
    }

    #[test]
    fn test_split_error_display_is_transparent() {
        let err: ExpenseError = SplitError::EmptyParticipants.into();
        assert_eq!(err.to_string(), "Expense must have at least one participant");
    }

    #[test]
    fn test_app_error_mapping() {
        let app: AppError = ExpenseError::ExpenseDeleted(ExpenseId::new()).into();
        assert_eq!(app.status_code(), 409);

        let app: AppError = ExpenseError::NotPermitted {
            expense_id: ExpenseId::new(),
            member_id: MemberId::new(),
        }
        .into();
        assert_eq!(app.status_code(), 403);

        let app: AppError = ExpenseError::Split(SplitError::EmptyParticipants).into();
        assert_eq!(app.status_code(), 400);
    }
}
