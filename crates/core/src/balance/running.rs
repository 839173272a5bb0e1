//! Incrementally maintained group balances.
//!
//! [`RunningLedger`] applies expense lifecycle events one at a time instead
//! of re-aggregating the whole history. Callers pass the expense as it was
//! before and after each change:
//!
//! ```
//! use splitbook_core::balance::RunningLedger;
//! use splitbook_core::expense::{Actor, Expense, NewExpense};
//! use splitbook_core::split::{Participant, SplitPolicy};
//! use splitbook_shared::types::{GroupId, MemberId, Money};
//!
//! let (a, b) = (MemberId::new(), MemberId::new());
//! let mut ledger = RunningLedger::new(&[a, b]);
//!
//! let mut expense = Expense::create(NewExpense {
//!     group_id: GroupId::new(),
//!     created_by: a,
//!     payer_id: a,
//!     description: String::new(),
//!     total_amount: Money::from_minor(100),
//!     policy: SplitPolicy::Equal,
//!     participants: vec![Participant::new(a), Participant::new(b)],
//! })
//! .unwrap();
//! ledger.record(&expense);
//!
//! let before = expense.clone();
//! expense.soft_delete(&Actor::member(a)).unwrap();
//! ledger.replace(&before, &expense);
//!
//! assert!(ledger.balances().iter().all(|b| b.net_balance.is_zero()));
//! ```

use splitbook_shared::types::MemberId;

use super::aggregator::{Direction, MemberTotals, RosterIndex, log_diagnostic};
use super::types::{BalanceReport, Diagnostic, MemberBalance, SplitExpense};
use crate::expense::Expense;

/// Balances kept up to date as expenses are created, edited and deleted.
///
/// Follows the aggregator's rules: inactive expenses contribute nothing,
/// malformed expenses and members missing from the roster are skipped and
/// reported.
#[derive(Debug, Clone)]
pub struct RunningLedger {
    roster: RosterIndex,
    totals: MemberTotals,
    diagnostics: Vec<Diagnostic>,
}

impl RunningLedger {
    /// Starts a ledger with every roster member at zero.
    #[must_use]
    pub fn new(roster: &[MemberId]) -> Self {
        let roster = RosterIndex::new(roster);
        let totals = MemberTotals::new(roster.len());
        Self {
            roster,
            totals,
            diagnostics: Vec::new(),
        }
    }

    /// Builds a ledger from an existing expense history.
    #[must_use]
    pub fn from_expenses(roster: &[MemberId], expenses: &[Expense]) -> Self {
        let mut ledger = Self::new(roster);
        for expense in expenses {
            ledger.record(expense);
        }
        ledger
    }

    /// Adds an expense's contribution. Anything skipped is logged and kept
    /// in [`RunningLedger::diagnostics`].
    pub fn record(&mut self, expense: &Expense) {
        if let Some(view) = expense.to_split_expense() {
            let skipped = self.apply(&view, Direction::Add);
            for diagnostic in &skipped {
                log_diagnostic(diagnostic);
            }
            self.diagnostics.extend(skipped);
        }
    }

    /// Removes an expense's contribution. `expense` must be the version
    /// that was previously recorded; its skipped parts were reported then.
    pub fn revert(&mut self, expense: &Expense) {
        if let Some(view) = expense.to_split_expense() {
            self.apply(&view, Direction::Remove);
        }
    }

    /// Swaps the recorded version of an expense for its edited or deleted
    /// version.
    pub fn replace(&mut self, old: &Expense, new: &Expense) {
        self.revert(old);
        self.record(new);
    }

    /// Everything skipped while recording, oldest first.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Current balances, in roster order. Out-of-range figures are clamped.
    #[must_use]
    pub fn balances(&self) -> Vec<MemberBalance> {
        self.totals.finish(&self.roster).0
    }

    /// Current balances with the recorded diagnostics, followed by one
    /// `BalanceOverflow` per member whose figures were clamped.
    #[must_use]
    pub fn report(&self) -> BalanceReport {
        let (balances, overflowed) = self.totals.finish(&self.roster);
        for diagnostic in &overflowed {
            log_diagnostic(diagnostic);
        }

        let mut diagnostics = self.diagnostics.clone();
        diagnostics.extend(overflowed);

        BalanceReport {
            balances,
            diagnostics,
        }
    }

    fn apply(&mut self, expense: &SplitExpense, direction: Direction) -> Vec<Diagnostic> {
        self.totals.apply(&self.roster, expense, direction)
    }
}
