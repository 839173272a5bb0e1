//! Expense split calculation.
//!
//! - Split policies and participant types
//! - The pure split calculator
//! - Split validation errors

pub mod calculator;
pub mod error;
pub mod types;

#[cfg(test)]
mod props;

pub use calculator::{SplitCalculator, compute_split};
pub use error::SplitError;
pub use types::{Participant, SplitLine, SplitPolicy, SplitResult};
