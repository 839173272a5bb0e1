//! Group expenses and their lifecycle.

pub mod error;
pub mod lifecycle;
pub mod types;

pub use error::ExpenseError;
pub use types::{Actor, Expense, ExpenseUpdate, NewExpense, Settlement};
