//! Expense split calculation.
//!
//! Turns one expense total into per-participant owed amounts. Every policy
//! guarantees that the owed amounts sum EXACTLY to the total and that no
//! amount is negative:
//!
//! - `Equal`: `total / n` each, the first `total % n` participants pay one
//!   extra unit.
//! - `Proportional`: exact integer shares `floor(total * w_i / W)` for all
//!   but the last participant, who takes `total - sum(others)`.
//! - `Custom`: supplied amounts, accepted only if they sum to the total.

use std::collections::HashSet;

use rust_decimal::Decimal;
use splitbook_shared::types::Money;

use super::error::SplitError;
use super::types::{Participant, SplitLine, SplitPolicy, SplitResult};

/// Computes a split. Shorthand for [`SplitCalculator::compute`].
///
/// # Errors
///
/// See [`SplitCalculator::compute`].
pub fn compute_split(
    total_amount: Money,
    participants: &[Participant],
    policy: SplitPolicy,
) -> Result<SplitResult, SplitError> {
    SplitCalculator::compute(total_amount, participants, policy)
}

/// Pure split calculator.
///
/// Same inputs (including participant order) always give the same output.
pub struct SplitCalculator;

impl SplitCalculator {
    /// Splits `total_amount` among `participants` under `policy`.
    ///
    /// Returns one line per participant, in input order.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if the total is negative
    /// - `EmptyParticipants` if there are no participants
    /// - `DuplicateParticipant` if a member appears twice
    /// - `InvalidSplitInput` for unusable weights or custom amounts
    /// - `SplitSumMismatch` if custom amounts do not sum to the total
    ///
    /// # Example
    ///
    /// ```
    /// use splitbook_core::split::{Participant, SplitCalculator, SplitPolicy};
    /// use splitbook_shared::types::{MemberId, Money};
    ///
    /// let participants: Vec<Participant> =
    ///     (0..3).map(|_| Participant::new(MemberId::new())).collect();
    /// let result =
    ///     SplitCalculator::compute(Money::from_minor(1000), &participants, SplitPolicy::Equal)
    ///         .unwrap();
    /// assert_eq!(
    ///     result.amounts(),
    ///     vec![Money::from_minor(334), Money::from_minor(333), Money::from_minor(333)]
    /// );
    /// ```
    pub fn compute(
        total_amount: Money,
        participants: &[Participant],
        policy: SplitPolicy,
    ) -> Result<SplitResult, SplitError> {
        Self::validate(total_amount, participants)?;

        let amounts = match policy {
            SplitPolicy::Equal => Self::split_equal(total_amount, participants.len())?,
            SplitPolicy::Proportional => Self::split_proportional(total_amount, participants)?,
            SplitPolicy::Custom => Self::split_custom(total_amount, participants)?,
        };

        let lines = participants
            .iter()
            .zip(amounts)
            .map(|(participant, owed_amount)| SplitLine {
                member_id: participant.member_id,
                owed_amount,
            })
            .collect();

        Ok(SplitResult::from_lines(lines))
    }

    /// Checks the rules shared by every policy.
    fn validate(total_amount: Money, participants: &[Participant]) -> Result<(), SplitError> {
        if total_amount.is_negative() {
            return Err(SplitError::InvalidAmount(total_amount));
        }
        if participants.is_empty() {
            return Err(SplitError::EmptyParticipants);
        }

        let mut seen = HashSet::with_capacity(participants.len());
        for participant in participants {
            if !seen.insert(participant.member_id) {
                return Err(SplitError::DuplicateParticipant(participant.member_id));
            }
        }

        Ok(())
    }

    fn split_equal(total: Money, count: usize) -> Result<Vec<Money>, SplitError> {
        let n = i64::try_from(count)
            .map_err(|_| SplitError::InvalidSplitInput(format!("too many participants: {count}")))?;
        if n == 0 {
            return Err(SplitError::EmptyParticipants);
        }

        let base = total.minor_units() / n;
        // total >= 0, so the remainder is in 0..n
        let extra_count = usize::try_from(total.minor_units() % n).unwrap_or(0);

        Ok((0..count)
            .map(|i| Money::from_minor(if i < extra_count { base + 1 } else { base }))
            .collect())
    }

    fn split_proportional(
        total: Money,
        participants: &[Participant],
    ) -> Result<Vec<Money>, SplitError> {
        let numerators = Self::weight_numerators(participants)?;
        let total_weight = numerators
            .iter()
            .try_fold(0i128, |acc, n| acc.checked_add(*n))
            .ok_or_else(overflow)?;
        if total_weight <= 0 {
            return Err(SplitError::InvalidSplitInput(
                "total weight must be positive".to_string(),
            ));
        }

        let Some(last) = numerators.len().checked_sub(1) else {
            return Err(SplitError::EmptyParticipants);
        };

        // Validation rejected negative totals and weights.
        let total_units = total.minor_units().unsigned_abs();
        let total_weight = total_weight.unsigned_abs();
        let mut amounts = Vec::with_capacity(numerators.len());
        let mut allocated = Money::ZERO;

        for numerator in &numerators[..last] {
            let share = mul_div_floor(total_units, numerator.unsigned_abs(), total_weight);
            let share = Money::from_minor(i64::try_from(share).map_err(|_| overflow())?);
            allocated += share;
            amounts.push(share);
        }

        // Floors never exceed their ideal shares, so this stays >= 0.
        amounts.push(total - allocated);

        Ok(amounts)
    }

    /// Lifts decimal weights to integers over a common power-of-ten
    /// denominator, reduced by their gcd.
    fn weight_numerators(participants: &[Participant]) -> Result<Vec<i128>, SplitError> {
        if let Some(p) = participants.iter().find(|p| p.weight < Decimal::ZERO) {
            return Err(SplitError::InvalidSplitInput(format!(
                "weight for member {} cannot be negative: {}",
                p.member_id, p.weight
            )));
        }

        let scale = participants
            .iter()
            .map(|p| p.weight.scale())
            .max()
            .unwrap_or(0);

        let mut numerators = participants
            .iter()
            .map(|p| {
                10i128
                    .checked_pow(scale - p.weight.scale())
                    .and_then(|factor| p.weight.mantissa().checked_mul(factor))
                    .ok_or_else(overflow)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let divisor = numerators.iter().fold(0, |acc, n| gcd(acc, *n));
        if divisor > 1 {
            for n in &mut numerators {
                *n /= divisor;
            }
        }

        Ok(numerators)
    }

    fn split_custom(total: Money, participants: &[Participant]) -> Result<Vec<Money>, SplitError> {
        let amounts = participants
            .iter()
            .map(|p| match p.custom_amount {
                None => Err(SplitError::InvalidSplitInput(format!(
                    "member {} has no custom amount",
                    p.member_id
                ))),
                Some(amount) if amount.is_negative() => {
                    Err(SplitError::InvalidSplitInput(format!(
                        "custom amount for member {} cannot be negative: {amount}",
                        p.member_id
                    )))
                }
                Some(amount) => Ok(amount),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let actual = amounts
            .iter()
            .try_fold(Money::ZERO, |acc, amount| acc.checked_add(*amount))
            .ok_or_else(|| SplitError::InvalidSplitInput("custom amounts overflow".to_string()))?;

        if actual != total {
            return Err(SplitError::SplitSumMismatch {
                expected: total,
                actual,
                difference: total - actual,
            });
        }

        Ok(amounts)
    }
}

fn overflow() -> SplitError {
    SplitError::InvalidSplitInput("weights or amount too large to split exactly".to_string())
}

/// `floor(a * b / c)` for `b <= c`, exact for every `c` up to `u128::MAX`.
///
/// Binary long multiplication over the bits of `a`, keeping the running
/// product as `quotient * c + remainder` with `remainder < c`, so no
/// intermediate value exceeds `2 * c`.
fn mul_div_floor(a: u64, b: u128, c: u128) -> u128 {
    let mut quotient: u128 = 0;
    let mut remainder: u128 = 0;

    for bit in (0..u64::BITS).rev() {
        quotient <<= 1;
        // remainder < c, so the doubled value needs at most one subtraction.
        let (doubled, carried) = remainder.overflowing_add(remainder);
        if carried || doubled >= c {
            quotient += 1;
            remainder = doubled.wrapping_sub(c);
        } else {
            remainder = doubled;
        }

        if (a >> bit) & 1 == 1 {
            let (sum, carried) = remainder.overflowing_add(b);
            if carried || sum >= c {
                quotient += 1;
                remainder = sum.wrapping_sub(c);
            } else {
                remainder = sum;
            }
        }
    }

    quotient
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
