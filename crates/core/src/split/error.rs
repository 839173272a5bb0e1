//! Split calculation errors.
//!
//! Every variant is a caller-recoverable validation failure; none of them
//! leave partial results behind.

use splitbook_shared::AppError;
use splitbook_shared::types::{MemberId, Money};
use thiserror::Error;

/// Errors that can occur while splitting an expense.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    /// Expense total is negative.
    #[error("Expense amount cannot be negative: {0}")]
    InvalidAmount(Money),

    /// No participants were given.
    #[error("Expense must have at least one participant")]
    EmptyParticipants,

    /// The same member appears twice in the participant list.
    #[error("Member {0} appears more than once in the participant list")]
    DuplicateParticipant(MemberId),

    /// Weights or custom amounts cannot produce a valid split.
    #[error("Invalid split input: {0}")]
    InvalidSplitInput(String),

    /// Custom amounts do not add up to the expense total.
    #[error("Custom amounts sum to {actual}, expected {expected} (difference {difference})")]
    SplitSumMismatch {
        /// The expense total.
        expected: Money,
        /// Sum of the supplied custom amounts.
        actual: Money,
        /// `expected - actual`.
        difference: Money,
    },
}

impl SplitError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::EmptyParticipants => "EMPTY_PARTICIPANTS",
            Self::DuplicateParticipant(_) => "DUPLICATE_PARTICIPANT",
            Self::InvalidSplitInput(_) => "INVALID_SPLIT_INPUT",
            Self::SplitSumMismatch { .. } => "SPLIT_SUM_MISMATCH",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// All split errors are input validation failures.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        400
    }
}

impl From<SplitError> for AppError {
    fn from(err: SplitError) -> Self {
        AppError::Validation(err.to_string())
    }
}
