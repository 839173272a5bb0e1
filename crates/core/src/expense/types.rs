//! Expense domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use splitbook_shared::types::{ExpenseId, GroupId, MemberId, Money, SettlementId};

use crate::split::{Participant, SplitPolicy, SplitResult};

/// A shared expense recorded in a group.
///
/// The `split` field caches the owed amounts computed when the expense was
/// created or last edited. Use [`Expense::create`], [`Expense::update`] and
/// [`Expense::soft_delete`] to keep it consistent; the fields are public so
/// records can be loaded from storage as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense ID.
    pub id: ExpenseId,
    /// Group the expense belongs to.
    pub group_id: GroupId,
    /// Member who recorded the expense.
    pub created_by: MemberId,
    /// Member who paid.
    pub payer_id: MemberId,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Amount paid, in minor units.
    pub total_amount: Money,
    /// Split policy.
    pub policy: SplitPolicy,
    /// Participants, in declared order.
    pub participants: Vec<Participant>,
    /// Owed amounts per participant.
    pub split: SplitResult,
    /// False once soft-deleted.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-deletion timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for recording a new expense.
#[derive(Debug, Clone)]
pub struct NewExpense {
    /// Group the expense belongs to.
    pub group_id: GroupId,
    /// Member recording the expense.
    pub created_by: MemberId,
    /// Member who paid.
    pub payer_id: MemberId,
    /// Free-text description.
    pub description: String,
    /// Amount paid, in minor units.
    pub total_amount: Money,
    /// Split policy.
    pub policy: SplitPolicy,
    /// Participants, in declared order.
    pub participants: Vec<Participant>,
}

/// Partial edit of an expense. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ExpenseUpdate {
    /// New description.
    pub description: Option<String>,
    /// New payer.
    pub payer_id: Option<MemberId>,
    /// New total amount.
    pub total_amount: Option<Money>,
    /// New split policy.
    pub policy: Option<SplitPolicy>,
    /// New participant list.
    pub participants: Option<Vec<Participant>>,
}

impl ExpenseUpdate {
    /// Returns true if the update touches an input of the split.
    #[must_use]
    pub fn changes_split(&self) -> bool {
        self.total_amount.is_some() || self.policy.is_some() || self.participants.is_some()
    }
}

/// The member performing a change, with their role as resolved upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Acting member.
    pub member_id: MemberId,
    /// Whether the member administers the group.
    pub is_admin: bool,
}

impl Actor {
    /// A regular group member.
    #[must_use]
    pub const fn member(member_id: MemberId) -> Self {
        Self {
            member_id,
            is_admin: false,
        }
    }

    /// A group administrator.
    #[must_use]
    pub const fn admin(member_id: MemberId) -> Self {
        Self {
            member_id,
            is_admin: true,
        }
    }
}

/// A recorded payment from one member to another.
///
/// Settlements are kept for display only. They are not netted into
/// balances, which reflect expense flow alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Settlement ID.
    pub id: SettlementId,
    /// Group the settlement belongs to.
    pub group_id: GroupId,
    /// Member who paid.
    pub from_member: MemberId,
    /// Member who received the payment.
    pub to_member: MemberId,
    /// Amount paid, in minor units.
    pub amount: Money,
    /// When the payment was recorded.
    pub settled_at: DateTime<Utc>,
}
