//! Group balance aggregation.
//!
//! Folds the active expenses of a group into one balance per roster member:
//!
//! 1. Every roster member starts at zero, so idle members still appear
//! 2. Each well-formed expense credits its payer and charges its participants
//! 3. `net_balance = total_paid - total_owed`
//!
//! The fold is commutative and associative. Large groups are folded in
//! parallel with rayon and give the same report as a sequential pass.
//!
//! Roster misses and malformed stored expenses never abort the fold. They
//! become [`Diagnostic`]s, and strict mode turns the first malformed expense
//! into an error for audit paths. Totals are summed in `i128`; a member whose
//! figures do not fit in `Money` is clamped and reported.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use splitbook_shared::EngineConfig;
use splitbook_shared::types::{MemberId, Money};
use tracing::{debug, error, warn};

use super::error::BalanceError;
use super::types::{BalanceReport, Diagnostic, MalformedReason, MemberBalance, SplitExpense};
use crate::expense::Expense;

/// Default expense count at which aggregation runs in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// Aggregation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationOptions {
    /// Fail on the first malformed expense instead of skipping it.
    pub strict_mode: bool,
    /// Expense count at which the fold switches to rayon.
    pub parallel_threshold: usize,
}

impl AggregationOptions {
    /// Skip-and-continue aggregation for display paths.
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            strict_mode: false,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Hard-failing aggregation for reconciliation and audits.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            strict_mode: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self::lenient()
    }
}

impl From<&EngineConfig> for AggregationOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            strict_mode: config.strict_mode,
            parallel_threshold: config.parallel_threshold.max(1),
        }
    }
}

/// Computes lenient balances for a roster. Malformed expenses and roster
/// misses are logged and skipped.
#[must_use]
pub fn compute_balances(roster: &[MemberId], expenses: &[SplitExpense]) -> Vec<MemberBalance> {
    BalanceAggregator::report(roster, expenses, DEFAULT_PARALLEL_THRESHOLD).balances
}

/// Roster lookup with duplicates collapsed to their first position.
#[derive(Debug, Clone)]
pub(crate) struct RosterIndex {
    members: Vec<MemberId>,
    positions: HashMap<MemberId, usize>,
}

impl RosterIndex {
    pub(crate) fn new(roster: &[MemberId]) -> Self {
        let mut members = Vec::with_capacity(roster.len());
        let mut positions = HashMap::with_capacity(roster.len());
        for member_id in roster {
            if !positions.contains_key(member_id) {
                positions.insert(*member_id, members.len());
                members.push(*member_id);
            }
        }
        Self { members, positions }
    }

    pub(crate) fn position(&self, member_id: MemberId) -> Option<usize> {
        self.positions.get(&member_id).copied()
    }

    pub(crate) fn members(&self) -> &[MemberId] {
        &self.members
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }
}

/// Per-member totals, held in `i128` so no expense history can overflow
/// while summing. Narrowed back to `Money` once, in [`MemberTotals::finish`].
#[derive(Debug, Clone)]
pub(crate) struct MemberTotals {
    paid: Vec<i128>,
    owed: Vec<i128>,
}

/// Whether an expense is being added to or taken out of the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Add,
    Remove,
}

impl Direction {
    fn signed(self, amount: Money) -> i128 {
        let units = i128::from(amount.minor_units());
        match self {
            Self::Add => units,
            Self::Remove => -units,
        }
    }
}

impl MemberTotals {
    pub(crate) fn new(members: usize) -> Self {
        Self {
            paid: vec![0; members],
            owed: vec![0; members],
        }
    }

    /// Applies one expense. Malformed expenses change nothing; roster misses
    /// skip only the missing member. Returns what was skipped.
    pub(crate) fn apply(
        &mut self,
        roster: &RosterIndex,
        expense: &SplitExpense,
        direction: Direction,
    ) -> Vec<Diagnostic> {
        if let Err(reason) = BalanceAggregator::validate_expense(expense) {
            return vec![Diagnostic::MalformedExpenseSkipped {
                expense_id: expense.expense_id,
                reason,
            }];
        }

        let mut skipped = Vec::new();

        match roster.position(expense.payer_id) {
            Some(i) => self.paid[i] += direction.signed(expense.total_amount),
            None => skipped.push(Diagnostic::UnknownPayer {
                expense_id: expense.expense_id,
                member_id: expense.payer_id,
            }),
        }

        for line in &expense.split {
            match roster.position(line.member_id) {
                Some(i) => self.owed[i] += direction.signed(line.owed_amount),
                None => skipped.push(Diagnostic::UnknownParticipant {
                    expense_id: expense.expense_id,
                    member_id: line.member_id,
                }),
            }
        }

        skipped
    }

    fn merge(mut self, other: Self) -> Self {
        for (acc, v) in self.paid.iter_mut().zip(other.paid) {
            *acc += v;
        }
        for (acc, v) in self.owed.iter_mut().zip(other.owed) {
            *acc += v;
        }
        self
    }

    /// Narrows the totals to per-member balances in roster order. Members
    /// whose figures do not fit in `Money` are clamped and reported.
    pub(crate) fn finish(&self, roster: &RosterIndex) -> (Vec<MemberBalance>, Vec<Diagnostic>) {
        let mut overflowed = Vec::new();

        let balances = roster
            .members()
            .iter()
            .zip(self.paid.iter().zip(&self.owed))
            .map(|(member_id, (&paid, &owed))| {
                let net = paid - owed;
                match (Money::from_wide(paid), Money::from_wide(owed), Money::from_wide(net)) {
                    (Some(total_paid), Some(total_owed), Some(_)) => {
                        MemberBalance::new(*member_id, total_paid, total_owed)
                    }
                    _ => {
                        overflowed.push(Diagnostic::BalanceOverflow {
                            member_id: *member_id,
                        });
                        MemberBalance {
                            member_id: *member_id,
                            total_paid: Money::saturating_from_wide(paid),
                            total_owed: Money::saturating_from_wide(owed),
                            net_balance: Money::saturating_from_wide(net),
                        }
                    }
                }
            })
            .collect();

        (balances, overflowed)
    }
}

/// Partial sums for one slice of the expense list.
struct Tally {
    totals: MemberTotals,
    /// Findings tagged with the expense's input position.
    diagnostics: Vec<(usize, Diagnostic)>,
}

impl Tally {
    fn new(members: usize) -> Self {
        Self {
            totals: MemberTotals::new(members),
            diagnostics: Vec::new(),
        }
    }

    fn record(mut self, roster: &RosterIndex, position: usize, expense: &SplitExpense) -> Self {
        let skipped = self.totals.apply(roster, expense, Direction::Add);
        self.diagnostics
            .extend(skipped.into_iter().map(|diagnostic| (position, diagnostic)));
        self
    }

    fn merge(mut self, other: Self) -> Self {
        self.totals = self.totals.merge(other.totals);
        self.diagnostics.extend(other.diagnostics);
        self
    }
}

/// Balance aggregation over a consistent snapshot of a group.
///
/// Pure: no I/O and no shared state, so it can be called from any number
/// of threads at once.
pub struct BalanceAggregator;

impl BalanceAggregator {
    /// Aggregates balances, honoring strict mode.
    ///
    /// # Errors
    ///
    /// In strict mode, returns `MalformedExpense` for the earliest malformed
    /// expense in input order, or `BalanceOverflow` if a member's totals do
    /// not fit in `Money`. Lenient mode never fails.
    pub fn aggregate(
        roster: &[MemberId],
        expenses: &[SplitExpense],
        options: &AggregationOptions,
    ) -> Result<BalanceReport, BalanceError> {
        let report = Self::report(roster, expenses, options.parallel_threshold);

        if !options.strict_mode {
            return Ok(report);
        }

        if let Some((expense_id, reason)) = report.skipped_expenses().next() {
            error!(%expense_id, %reason, "strict aggregation rejected malformed expense");
            return Err(BalanceError::MalformedExpense { expense_id, reason });
        }

        if let Some(member_id) = report.overflowed_members().next() {
            error!(%member_id, "strict aggregation rejected unrepresentable balance");
            return Err(BalanceError::BalanceOverflow { member_id });
        }

        Ok(report)
    }

    /// Aggregates full expense records, leaving out soft-deleted ones.
    ///
    /// # Errors
    ///
    /// Same as [`BalanceAggregator::aggregate`].
    pub fn aggregate_expenses(
        roster: &[MemberId],
        expenses: &[Expense],
        options: &AggregationOptions,
    ) -> Result<BalanceReport, BalanceError> {
        let active = active_split_expenses(expenses);
        Self::aggregate(roster, &active, options)
    }

    /// Lenient aggregation. Never fails.
    #[must_use]
    pub fn report(
        roster: &[MemberId],
        expenses: &[SplitExpense],
        parallel_threshold: usize,
    ) -> BalanceReport {
        let index = RosterIndex::new(roster);
        let members = index.len();
        let parallel = expenses.len() >= parallel_threshold.max(1);

        let tally = if parallel {
            expenses
                .par_iter()
                .enumerate()
                .fold(
                    || Tally::new(members),
                    |tally, (position, expense)| tally.record(&index, position, expense),
                )
                .reduce(|| Tally::new(members), Tally::merge)
        } else {
            expenses
                .iter()
                .enumerate()
                .fold(Tally::new(members), |tally, (position, expense)| {
                    tally.record(&index, position, expense)
                })
        };

        let Tally {
            totals,
            mut diagnostics,
        } = tally;

        // Stable: findings of one expense keep their payer-then-participants order.
        diagnostics.sort_by_key(|(position, _)| *position);
        let mut diagnostics: Vec<Diagnostic> = diagnostics.into_iter().map(|(_, d)| d).collect();

        let (balances, overflowed) = totals.finish(&index);
        diagnostics.extend(overflowed);

        for diagnostic in &diagnostics {
            log_diagnostic(diagnostic);
        }

        debug!(
            members,
            expenses = expenses.len(),
            parallel,
            diagnostics = diagnostics.len(),
            "aggregated group balances"
        );

        BalanceReport {
            balances,
            diagnostics,
        }
    }

    /// Checks a stored expense against the split invariants: non-negative
    /// total, non-negative owed amounts, owed amounts summing to the total.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate_expense(expense: &SplitExpense) -> Result<(), MalformedReason> {
        if expense.total_amount.is_negative() {
            return Err(MalformedReason::NegativeTotal {
                total_amount: expense.total_amount,
            });
        }

        if let Some(line) = expense.split.iter().find(|l| l.owed_amount.is_negative()) {
            return Err(MalformedReason::NegativeOwedAmount {
                member_id: line.member_id,
                owed_amount: line.owed_amount,
            });
        }

        match expense.split.checked_total() {
            None => Err(MalformedReason::SumOverflow),
            Some(split_sum) if split_sum != expense.total_amount => {
                Err(MalformedReason::SumMismatch {
                    total_amount: expense.total_amount,
                    split_sum,
                })
            }
            Some(_) => Ok(()),
        }
    }
}

/// Aggregator views of the active expenses, in input order.
#[must_use]
pub fn active_split_expenses(expenses: &[Expense]) -> Vec<SplitExpense> {
    expenses.iter().filter_map(Expense::to_split_expense).collect()
}

pub(crate) fn log_diagnostic(diagnostic: &Diagnostic) {
    match diagnostic {
        Diagnostic::UnknownPayer {
            expense_id,
            member_id,
        } => warn!(%expense_id, %member_id, "payer not in roster, paid amount not credited"),
        Diagnostic::UnknownParticipant {
            expense_id,
            member_id,
        } => warn!(%expense_id, %member_id, "participant not in roster, owed amount not charged"),
        Diagnostic::MalformedExpenseSkipped { expense_id, reason } => {
            warn!(%expense_id, %reason, "malformed expense skipped");
        }
        Diagnostic::BalanceOverflow { member_id } => {
            warn!(%member_id, "member balance out of range, figures clamped");
        }
    }
}
