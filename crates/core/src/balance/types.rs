//! Balance aggregation types.

use serde::{Deserialize, Serialize};
use splitbook_shared::types::{ExpenseId, MemberId, Money};

use crate::split::SplitResult;

/// An active expense as the aggregator sees it: who paid, how much, and
/// who owes what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitExpense {
    /// Expense ID, used in diagnostics.
    pub expense_id: ExpenseId,
    /// Member who paid.
    pub payer_id: MemberId,
    /// Amount paid.
    pub total_amount: Money,
    /// Owed amounts per participant.
    pub split: SplitResult,
}

/// Balance of one roster member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    /// The member.
    pub member_id: MemberId,
    /// Sum of expense totals this member paid.
    pub total_paid: Money,
    /// Sum of amounts this member owes across expenses.
    pub total_owed: Money,
    /// `total_paid - total_owed`. Positive means the group owes the member.
    pub net_balance: Money,
}

impl MemberBalance {
    /// A member with no expense activity.
    #[must_use]
    pub const fn zero(member_id: MemberId) -> Self {
        Self {
            member_id,
            total_paid: Money::ZERO,
            total_owed: Money::ZERO,
            net_balance: Money::ZERO,
        }
    }

    /// Builds a balance, deriving the net amount.
    #[must_use]
    pub fn new(member_id: MemberId, total_paid: Money, total_owed: Money) -> Self {
        Self {
            member_id,
            total_paid,
            total_owed,
            net_balance: total_paid - total_owed,
        }
    }
}

/// Why a stored expense cannot be aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MalformedReason {
    /// Expense total is negative.
    NegativeTotal {
        /// The stored total.
        total_amount: Money,
    },
    /// A participant owes a negative amount.
    NegativeOwedAmount {
        /// The participant.
        member_id: MemberId,
        /// The stored owed amount.
        owed_amount: Money,
    },
    /// Owed amounts do not add up to the total.
    SumMismatch {
        /// The stored total.
        total_amount: Money,
        /// Sum of owed amounts.
        split_sum: Money,
    },
    /// Owed amounts overflow when summed.
    SumOverflow,
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeTotal { total_amount } => {
                write!(f, "negative total {total_amount}")
            }
            Self::NegativeOwedAmount {
                member_id,
                owed_amount,
            } => write!(f, "member {member_id} owes negative amount {owed_amount}"),
            Self::SumMismatch {
                total_amount,
                split_sum,
            } => write!(f, "split sums to {split_sum} but total is {total_amount}"),
            Self::SumOverflow => write!(f, "split amounts overflow"),
        }
    }
}

/// Non-fatal finding recorded during aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Payer is not on the roster; the paid amount was not credited.
    UnknownPayer {
        /// The expense.
        expense_id: ExpenseId,
        /// The missing payer.
        member_id: MemberId,
    },
    /// Participant is not on the roster; the owed amount was not charged.
    UnknownParticipant {
        /// The expense.
        expense_id: ExpenseId,
        /// The missing participant.
        member_id: MemberId,
    },
    /// Expense failed validation and was left out entirely.
    MalformedExpenseSkipped {
        /// The expense.
        expense_id: ExpenseId,
        /// What is wrong with it.
        reason: MalformedReason,
    },
    /// A member's totals do not fit in `Money`. The reported figures are
    /// clamped to the nearest representable amount.
    BalanceOverflow {
        /// The member.
        member_id: MemberId,
    },
}

/// Balances for a whole roster plus anything noteworthy found on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReport {
    /// One entry per roster member, in roster order.
    pub balances: Vec<MemberBalance>,
    /// Findings in expense input order, then clamped members in roster order.
    pub diagnostics: Vec<Diagnostic>,
}

impl BalanceReport {
    /// Looks up a member's balance.
    #[must_use]
    pub fn balance_of(&self, member_id: MemberId) -> Option<&MemberBalance> {
        self.balances.iter().find(|b| b.member_id == member_id)
    }

    /// Sum of all net balances. Zero when every payer and participant is
    /// on the roster.
    #[must_use]
    pub fn net_total(&self) -> Money {
        let total: i128 = self
            .balances
            .iter()
            .map(|b| i128::from(b.net_balance.minor_units()))
            .sum();
        Money::saturating_from_wide(total)
    }

    /// Returns true if nothing was skipped or left uncredited.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Expenses excluded for failing validation.
    pub fn skipped_expenses(&self) -> impl Iterator<Item = (ExpenseId, MalformedReason)> + '_ {
        self.diagnostics.iter().filter_map(|d| match d {
            Diagnostic::MalformedExpenseSkipped { expense_id, reason } => {
                Some((*expense_id, *reason))
            }
            _ => None,
        })
    }

    /// Members whose totals were clamped.
    pub fn overflowed_members(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.diagnostics.iter().filter_map(|d| match d {
            Diagnostic::BalanceOverflow { member_id } => Some(*member_id),
            _ => None,
        })
    }
}
