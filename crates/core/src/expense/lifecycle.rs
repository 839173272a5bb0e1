//! Expense creation, editing and soft deletion.
//!
//! Every successful create or edit recomputes the split from scratch, so the
//! stored owed amounts always satisfy the split invariants. A failed edit
//! leaves the expense exactly as it was.

use chrono::Utc;
use splitbook_shared::types::ExpenseId;
use tracing::debug;

use super::error::ExpenseError;
use super::types::{Actor, Expense, ExpenseUpdate, NewExpense};
use crate::balance::SplitExpense;
use crate::split::SplitCalculator;

impl Expense {
    /// Records a new expense, computing its split.
    ///
    /// # Errors
    ///
    /// Returns `ExpenseError::Split` if the split cannot be computed.
    pub fn create(new: NewExpense) -> Result<Self, ExpenseError> {
        let NewExpense {
            group_id,
            created_by,
            payer_id,
            description,
            total_amount,
            policy,
            participants,
        } = new;

        let split = SplitCalculator::compute(total_amount, &participants, policy)?;
        let now = Utc::now();

        let expense = Self {
            id: ExpenseId::new(),
            group_id,
            created_by,
            payer_id,
            description,
            total_amount,
            policy,
            participants,
            split,
            active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        debug!(expense_id = %expense.id, group_id = %group_id, "expense created");
        Ok(expense)
    }

    /// Returns true unless the expense was soft-deleted.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns true if `actor` is the creator or a group admin.
    #[must_use]
    pub fn can_modify(&self, actor: &Actor) -> bool {
        actor.is_admin || actor.member_id == self.created_by
    }

    fn ensure_modifiable(&self, actor: &Actor) -> Result<(), ExpenseError> {
        if !self.active {
            return Err(ExpenseError::ExpenseDeleted(self.id));
        }
        if !self.can_modify(actor) {
            return Err(ExpenseError::NotPermitted {
                expense_id: self.id,
                member_id: actor.member_id,
            });
        }
        Ok(())
    }

    /// Applies an edit.
    ///
    /// The split is recomputed whenever the total, policy or participants
    /// change. Nothing is written unless the whole edit succeeds.
    ///
    /// # Errors
    ///
    /// - `ExpenseDeleted` if the expense was soft-deleted
    /// - `NotPermitted` if `actor` is neither creator nor admin
    /// - `Split` if the new split cannot be computed
    pub fn update(&mut self, actor: &Actor, update: ExpenseUpdate) -> Result<(), ExpenseError> {
        self.ensure_modifiable(actor)?;

        let recompute = update.changes_split();
        let ExpenseUpdate {
            description,
            payer_id,
            total_amount,
            policy,
            participants,
        } = update;

        if recompute {
            let total_amount = total_amount.unwrap_or(self.total_amount);
            let policy = policy.unwrap_or(self.policy);
            let participants = participants.unwrap_or_else(|| self.participants.clone());
            let split = SplitCalculator::compute(total_amount, &participants, policy)?;
            self.total_amount = total_amount;
            self.policy = policy;
            self.participants = participants;
            self.split = split;
        }

        if let Some(description) = description {
            self.description = description;
        }
        if let Some(payer_id) = payer_id {
            self.payer_id = payer_id;
        }
        self.updated_at = Utc::now();

        debug!(expense_id = %self.id, recompute, "expense updated");
        Ok(())
    }

    /// Marks the expense deleted. It stays stored but no longer counts
    /// towards balances.
    ///
    /// # Errors
    ///
    /// - `ExpenseDeleted` if already deleted
    /// - `NotPermitted` if `actor` is neither creator nor admin
    pub fn soft_delete(&mut self, actor: &Actor) -> Result<(), ExpenseError> {
        self.ensure_modifiable(actor)?;

        let now = Utc::now();
        self.active = false;
        self.deleted_at = Some(now);
        self.updated_at = now;

        debug!(expense_id = %self.id, member_id = %actor.member_id, "expense soft-deleted");
        Ok(())
    }

    /// The aggregator's view of this expense, or `None` once deleted.
    #[must_use]
    pub fn to_split_expense(&self) -> Option<SplitExpense> {
        self.active.then(|| SplitExpense {
            expense_id: self.id,
            payer_id: self.payer_id,
            total_amount: self.total_amount,
            split: self.split.clone(),
        })
    }
}
