//! Property-based tests for balance aggregation.
//!
//! - Zero-net: with a complete roster, net balances sum to zero
//! - Roster completeness: one balance per distinct roster member
//! - Order independence: shuffling expenses does not change balances
//! - Parallel equivalence: rayon and sequential folds agree
//! - Running ledger: incremental updates equal a full recompute

use proptest::prelude::*;
use rust_decimal::Decimal;
use splitbook_shared::types::{GroupId, MemberId, Money};

use super::aggregator::{BalanceAggregator, active_split_expenses, compute_balances};
use super::running::RunningLedger;
use super::types::SplitExpense;
use crate::expense::{Actor, Expense, ExpenseUpdate, NewExpense};
use crate::split::{Participant, SplitPolicy};

/// Raw expense shape: payer index, total, policy selector, participant
/// indices with weights.
type ExpenseShape = (usize, i64, u8, Vec<(usize, u32)>);

fn expense_shape() -> impl Strategy<Value = ExpenseShape> {
    (
        0usize..8,
        0i64..1_000_000,
        0u8..2,
        prop::collection::vec((0usize..8, 1u32..100), 1..6),
    )
}

fn build_expense(roster: &[MemberId], shape: &ExpenseShape) -> Option<Expense> {
    let (payer, total, policy, parts) = shape;
    let mut seen = Vec::new();
    let participants: Vec<Participant> = parts
        .iter()
        .map(|(i, w)| (roster[i % roster.len()], *w))
        .filter(|(member_id, _)| {
            let fresh = !seen.contains(member_id);
            seen.push(*member_id);
            fresh
        })
        .map(|(member_id, w)| Participant::weighted(member_id, Decimal::from(w)))
        .collect();
    let policy = if *policy == 0 {
        SplitPolicy::Equal
    } else {
        SplitPolicy::Proportional
    };
    let creator = roster[payer % roster.len()];
    Expense::create(NewExpense {
        group_id: GroupId::new(),
        created_by: creator,
        payer_id: creator,
        description: String::new(),
        total_amount: Money::from_minor(*total),
        policy,
        participants,
    })
    .ok()
}

fn build_group(size: usize, shapes: &[ExpenseShape]) -> (Vec<MemberId>, Vec<Expense>) {
    let roster: Vec<MemberId> = (0..size).map(|_| MemberId::new()).collect();
    let expenses = shapes
        .iter()
        .filter_map(|shape| build_expense(&roster, shape))
        .collect();
    (roster, expenses)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Net balances of a complete roster always sum to zero.
    #[test]
    fn prop_net_balances_sum_to_zero(
        size in 1usize..8,
        shapes in prop::collection::vec(expense_shape(), 0..30),
    ) {
        let (roster, expenses) = build_group(size, &shapes);
        let balances = compute_balances(&roster, &active_split_expenses(&expenses));

        prop_assert_eq!(balances.iter().map(|b| b.net_balance).sum::<Money>(), Money::ZERO);
        for b in &balances {
            prop_assert_eq!(b.net_balance, b.total_paid - b.total_owed);
        }
    }

    /// Every distinct roster member appears exactly once, in roster order.
    #[test]
    fn prop_roster_complete(
        size in 1usize..8,
        repeats in prop::collection::vec(0usize..8, 0..5),
        shapes in prop::collection::vec(expense_shape(), 0..10),
    ) {
        let (mut roster, expenses) = build_group(size, &shapes);
        let distinct = roster.clone();
        roster.extend(repeats.iter().map(|i| distinct[i % size]));

        let balances = compute_balances(&roster, &active_split_expenses(&expenses));

        let listed: Vec<MemberId> = balances.iter().map(|b| b.member_id).collect();
        prop_assert_eq!(listed, distinct);
    }

    /// Balances do not depend on expense order or on parallel evaluation.
    #[test]
    fn prop_order_and_parallel_independent(
        size in 1usize..8,
        shapes in prop::collection::vec(expense_shape(), 1..30),
        rotate in 0usize..30,
    ) {
        let (roster, expenses) = build_group(size, &shapes);
        let views: Vec<SplitExpense> = active_split_expenses(&expenses);

        let baseline = BalanceAggregator::report(&roster, &views, usize::MAX);

        let mut reordered = views.clone();
        reordered.reverse();
        if !reordered.is_empty() {
            let k = rotate % reordered.len();
            reordered.rotate_left(k);
        }
        let shuffled = BalanceAggregator::report(&roster, &reordered, usize::MAX);
        prop_assert_eq!(&baseline.balances, &shuffled.balances);

        let parallel = BalanceAggregator::report(&roster, &views, 1);
        prop_assert_eq!(baseline, parallel);
    }

    /// Applying lifecycle events incrementally gives the same balances as
    /// aggregating the final state.
    #[test]
    fn prop_running_ledger_matches_recompute(
        size in 1usize..6,
        shapes in prop::collection::vec(expense_shape(), 1..15),
        events in prop::collection::vec((0usize..15, 0u8..3, 0i64..100_000), 0..20),
    ) {
        let (roster, mut expenses) = build_group(size, &shapes);
        let mut ledger = RunningLedger::from_expenses(&roster, &expenses);

        for (target, kind, amount) in events {
            if expenses.is_empty() {
                break;
            }
            let idx = target % expenses.len();
            let actor = Actor::admin(roster[0]);
            let before = expenses[idx].clone();
            let outcome = match kind {
                0 => expenses[idx].soft_delete(&actor),
                1 => expenses[idx].update(
                    &actor,
                    ExpenseUpdate {
                        total_amount: Some(Money::from_minor(amount)),
                        ..ExpenseUpdate::default()
                    },
                ),
                _ => expenses[idx].update(
                    &actor,
                    ExpenseUpdate {
                        payer_id: Some(roster[usize::try_from(amount).unwrap_or(0) % roster.len()]),
                        ..ExpenseUpdate::default()
                    },
                ),
            };
            if outcome.is_ok() {
                ledger.replace(&before, &expenses[idx]);
            } else {
                prop_assert_eq!(&expenses[idx], &before);
            }
        }

        prop_assert_eq!(
            ledger.balances(),
            compute_balances(&roster, &active_split_expenses(&expenses))
        );
    }
}
