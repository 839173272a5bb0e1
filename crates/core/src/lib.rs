//! Core business logic for Splitbook.
//!
//! This crate contains the pure split and balance engine with ZERO web or
//! database dependencies. Callers load a consistent snapshot of a group and
//! hand it in; nothing here performs I/O.
//!
//! # Modules
//!
//! - `split` - Turning one expense total into exact per-participant shares
//! - `expense` - Expense records and their create/edit/delete lifecycle
//! - `balance` - Per-member balances, diagnostics, incremental and cached
//!   aggregation

pub mod balance;
pub mod expense;
pub mod split;

pub use balance::{BalanceReport, MemberBalance, compute_balances};
pub use split::{SplitPolicy, SplitResult, compute_split};
