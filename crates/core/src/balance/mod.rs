//! Group balance aggregation.

pub mod aggregator;
pub mod cache;
pub mod error;
pub mod running;
pub mod types;

#[cfg(test)]
mod props;

#[cfg(test)]
mod benchmark;

pub use aggregator::{
    AggregationOptions, BalanceAggregator, DEFAULT_PARALLEL_THRESHOLD, active_split_expenses,
    compute_balances,
};
pub use cache::{CachedReport, CalculationCache};
pub use error::BalanceError;
pub use running::RunningLedger;
pub use types::{BalanceReport, Diagnostic, MalformedReason, MemberBalance, SplitExpense};
