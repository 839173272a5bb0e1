//! Split domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use splitbook_shared::types::{MemberId, Money};

/// Rule used to divide an expense amount among its participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    /// Same share for everyone; earliest participants absorb the remainder.
    Equal,
    /// Share proportional to each participant's weight; the last participant
    /// absorbs the rounding loss.
    Proportional,
    /// Caller-supplied amounts that must sum exactly to the total.
    Custom,
}

/// One participant of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// The member taking part in the expense.
    pub member_id: MemberId,
    /// Relative weight for proportional splits (non-negative, default 1).
    #[serde(default = "default_weight")]
    pub weight: Decimal,
    /// Exact owed amount for custom splits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_amount: Option<Money>,
}

fn default_weight() -> Decimal {
    Decimal::ONE
}

impl Participant {
    /// Creates a participant with the default weight of 1.
    #[must_use]
    pub fn new(member_id: MemberId) -> Self {
        Self {
            member_id,
            weight: Decimal::ONE,
            custom_amount: None,
        }
    }

    /// Creates a participant with an explicit weight.
    #[must_use]
    pub fn weighted(member_id: MemberId, weight: Decimal) -> Self {
        Self {
            member_id,
            weight,
            custom_amount: None,
        }
    }

    /// Creates a participant with a custom owed amount.
    #[must_use]
    pub fn custom(member_id: MemberId, amount: Money) -> Self {
        Self {
            member_id,
            weight: Decimal::ONE,
            custom_amount: Some(amount),
        }
    }
}

/// Amount owed by a single participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SplitLine {
    /// The member who owes.
    pub member_id: MemberId,
    /// What the member owes, in minor units.
    pub owed_amount: Money,
}

/// Per-participant owed amounts, in participant input order.
///
/// Freshly computed results always sum to the expense total. Results loaded
/// from storage are not re-checked here; the balance aggregator validates
/// them before use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SplitResult {
    lines: Vec<SplitLine>,
}

impl SplitResult {
    /// Wraps already-computed lines, e.g. a split read back from storage.
    #[must_use]
    pub fn from_lines(lines: Vec<SplitLine>) -> Self {
        Self { lines }
    }

    /// Iterates over the owed lines.
    pub fn iter(&self) -> std::slice::Iter<'_, SplitLine> {
        self.lines.iter()
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if there are no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all owed amounts, or `None` if it overflows.
    #[must_use]
    pub fn checked_total(&self) -> Option<Money> {
        self.lines
            .iter()
            .try_fold(Money::ZERO, |acc, line| acc.checked_add(line.owed_amount))
    }

    /// Amount owed by a member, if they are part of the split.
    #[must_use]
    pub fn owed_by(&self, member_id: MemberId) -> Option<Money> {
        self.lines
            .iter()
            .find(|line| line.member_id == member_id)
            .map(|line| line.owed_amount)
    }

    /// Owed amounts only, in participant order.
    #[must_use]
    pub fn amounts(&self) -> Vec<Money> {
        self.lines.iter().map(|line| line.owed_amount).collect()
    }
}

impl<'a> IntoIterator for &'a SplitResult {
    type Item = &'a SplitLine;
    type IntoIter = std::slice::Iter<'a, SplitLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}
