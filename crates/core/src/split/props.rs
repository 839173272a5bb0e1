//! Property-based tests for split calculation.
//!
//! - Exact-sum: owed amounts always add up to the total
//! - Non-negativity: no participant owes a negative amount
//! - Determinism: identical input gives identical output
//! - Custom rejection: mismatched custom amounts never yield a result

use proptest::prelude::*;
use rust_decimal::Decimal;
use splitbook_shared::types::{MemberId, Money};

use super::calculator::SplitCalculator;
use super::error::SplitError;
use super::types::{Participant, SplitPolicy};

/// Strategy for non-negative totals (0 to 10,000,000,000 minor units).
fn total_amount() -> impl Strategy<Value = Money> {
    (0i64..10_000_000_000i64).prop_map(Money::from_minor)
}

/// Strategy for non-negative weights with up to 4 decimal places.
fn weight() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64, 0u32..=4).prop_map(|(units, scale)| Decimal::new(units, scale))
}

/// Strategy for weight lists with a positive total.
fn weights() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(weight(), 1..20)
        .prop_filter("total weight must be positive", |ws| {
            ws.iter().copied().sum::<Decimal>() > Decimal::ZERO
        })
}

fn participants_with_weights(weights: &[Decimal]) -> Vec<Participant> {
    weights
        .iter()
        .map(|w| Participant::weighted(MemberId::new(), *w))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// *For any* total and participant count, an equal split sums to the
    /// total and never differs by more than one unit between participants.
    #[test]
    fn prop_equal_split_exact_sum_and_fair(
        total in total_amount(),
        count in 1usize..50,
    ) {
        let participants: Vec<Participant> =
            (0..count).map(|_| Participant::new(MemberId::new())).collect();
        let result = SplitCalculator::compute(total, &participants, SplitPolicy::Equal).unwrap();

        prop_assert_eq!(result.checked_total(), Some(total));
        let amounts = result.amounts();
        let max = amounts.iter().max().copied().unwrap_or_default();
        let min = amounts.iter().min().copied().unwrap_or_default();
        prop_assert!(max - min <= Money::from_minor(1));
        prop_assert!(amounts.windows(2).all(|w| w[0] >= w[1]), "extra units go first");
    }

    /// *For any* weights with a positive total, a proportional split sums
    /// to the total and every amount is non-negative.
    #[test]
    fn prop_proportional_exact_sum_non_negative(
        total in total_amount(),
        weights in weights(),
    ) {
        let participants = participants_with_weights(&weights);
        let result =
            SplitCalculator::compute(total, &participants, SplitPolicy::Proportional).unwrap();

        prop_assert_eq!(result.len(), participants.len());
        prop_assert_eq!(result.checked_total(), Some(total));
        prop_assert!(result.iter().all(|l| !l.owed_amount.is_negative()));
    }

    /// *For any* proportional split, every participant but the last gets
    /// the floor of their ideal share.
    #[test]
    fn prop_proportional_floors_all_but_last(
        total in total_amount(),
        weights in weights(),
    ) {
        let participants = participants_with_weights(&weights);
        let result =
            SplitCalculator::compute(total, &participants, SplitPolicy::Proportional).unwrap();

        let total_weight: Decimal = weights.iter().copied().sum();
        for (line, w) in result.iter().zip(&weights).take(weights.len() - 1) {
            let ideal = Decimal::from(total.minor_units()) * *w / total_weight;
            let owed = Decimal::from(line.owed_amount.minor_units());
            prop_assert!(owed <= ideal && ideal - owed < Decimal::ONE);
        }
    }

    /// *For any* input, computing twice gives identical output.
    #[test]
    fn prop_split_is_deterministic(
        total in total_amount(),
        weights in weights(),
        policy in prop_oneof![Just(SplitPolicy::Equal), Just(SplitPolicy::Proportional)],
    ) {
        let participants = participants_with_weights(&weights);
        let first = SplitCalculator::compute(total, &participants, policy).unwrap();
        let second = SplitCalculator::compute(total, &participants, policy).unwrap();
        prop_assert_eq!(first, second);
    }

    /// *For any* custom amounts, the split succeeds exactly when they sum
    /// to the total, and a mismatch reports the signed difference.
    #[test]
    fn prop_custom_accepts_only_exact_sums(
        amounts in prop::collection::vec(0i64..1_000_000, 1..20),
        offset in -1_000i64..1_000,
    ) {
        let participants: Vec<Participant> = amounts
            .iter()
            .map(|a| Participant::custom(MemberId::new(), Money::from_minor(*a)))
            .collect();
        let sum: i64 = amounts.iter().sum();
        let total = Money::from_minor((sum + offset).max(0));

        match SplitCalculator::compute(total, &participants, SplitPolicy::Custom) {
            Ok(result) => {
                prop_assert_eq!(total.minor_units(), sum);
                let expected: Vec<Money> = amounts.iter().copied().map(Money::from_minor).collect();
                prop_assert_eq!(result.amounts(), expected);
            }
            Err(SplitError::SplitSumMismatch { expected, actual, difference }) => {
                prop_assert_ne!(total.minor_units(), sum);
                prop_assert_eq!(expected, total);
                prop_assert_eq!(actual, Money::from_minor(sum));
                prop_assert_eq!(difference, expected - actual);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }
}
