//! Balance aggregation errors.

use splitbook_shared::AppError;
use splitbook_shared::types::{ExpenseId, MemberId};
use thiserror::Error;

use super::types::MalformedReason;

/// Errors raised by strict-mode aggregation.
///
/// Lenient aggregation never fails; it reports the same findings as
/// diagnostics instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    /// A stored expense does not satisfy the split invariants.
    #[error("Malformed expense {expense_id}: {reason}")]
    MalformedExpense {
        /// The offending expense.
        expense_id: ExpenseId,
        /// What is wrong with it.
        reason: MalformedReason,
    },

    /// A member's totals do not fit in `Money`.
    #[error("Balance of member {member_id} is out of range")]
    BalanceOverflow {
        /// The member.
        member_id: MemberId,
    },
}

impl BalanceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedExpense { .. } => "MALFORMED_EXPENSE",
            Self::BalanceOverflow { .. } => "BALANCE_OVERFLOW",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::MalformedExpense { .. } | Self::BalanceOverflow { .. } => 422,
        }
    }
}

impl From<BalanceError> for AppError {
    fn from(err: BalanceError) -> Self {
        AppError::BusinessRule(err.to_string())
    }
}
