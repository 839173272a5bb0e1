//! Benchmark test for aggregation throughput.

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use splitbook_shared::types::{ExpenseId, MemberId, Money};

    use crate::balance::{
        AggregationOptions, BalanceAggregator, CalculationCache, SplitExpense,
    };
    use crate::split::{Participant, SplitCalculator, SplitPolicy};

    /// Generate a group history with every member joining a rotating subset
    /// of expenses.
    fn generate_test_data(
        num_members: usize,
        num_expenses: usize,
    ) -> (Vec<MemberId>, Vec<SplitExpense>) {
        let roster: Vec<MemberId> = (0..num_members).map(|_| MemberId::new()).collect();
        let mut expenses = Vec::with_capacity(num_expenses);

        for i in 0..num_expenses {
            let size = 2 + i % 6;
            let participants: Vec<Participant> = (0..size)
                .map(|k| Participant::new(roster[(i + k) % num_members]))
                .collect();
            let total = Money::from_minor(1000 + i64::try_from(i % 9973).unwrap());
            let split = SplitCalculator::compute(total, &participants, SplitPolicy::Equal).unwrap();

            expenses.push(SplitExpense {
                expense_id: ExpenseId::new(),
                payer_id: roster[i % num_members],
                total_amount: total,
                split,
            });
        }

        (roster, expenses)
    }

    #[test]
    fn benchmark_aggregate_100k_expenses() {
        let (roster, expenses) = generate_test_data(50, 100_000);

        let start = Instant::now();
        let sequential = BalanceAggregator::report(&roster, &expenses, usize::MAX);
        let sequential_duration = start.elapsed();

        let start = Instant::now();
        let parallel = BalanceAggregator::report(&roster, &expenses, 1);
        let parallel_duration = start.elapsed();

        println!("\n=== BENCHMARK: 50 members, 100k expenses ===");
        println!("Sequential: {:?}", sequential_duration);
        println!("Parallel:   {:?}", parallel_duration);

        assert_eq!(sequential, parallel);
        assert_eq!(sequential.net_total(), Money::ZERO);
        assert!(
            parallel_duration.as_millis() < 2000,
            "Aggregation took {}ms, expected <2000ms",
            parallel_duration.as_millis()
        );
    }

    #[test]
    fn benchmark_cache_hit() {
        use crate::expense::{Expense, NewExpense};
        use splitbook_shared::types::GroupId;

        let group_id = GroupId::new();
        let roster: Vec<MemberId> = (0..20).map(|_| MemberId::new()).collect();
        let expenses: Vec<Expense> = (0..5_000)
            .map(|i| {
                Expense::create(NewExpense {
                    group_id,
                    created_by: roster[i % 20],
                    payer_id: roster[i % 20],
                    description: format!("Expense {}", i),
                    total_amount: Money::from_minor(2500),
                    policy: SplitPolicy::Equal,
                    participants: roster.iter().copied().map(Participant::new).collect(),
                })
                .unwrap()
            })
            .collect();

        let cache = CalculationCache::new();
        let options = AggregationOptions::default();

        let start = Instant::now();
        let miss = cache.balances_cached(group_id, &roster, &expenses, &options).unwrap();
        let miss_duration = start.elapsed();

        let start = Instant::now();
        let hit = cache.balances_cached(group_id, &roster, &expenses, &options).unwrap();
        let hit_duration = start.elapsed();

        println!("\n=== BENCHMARK: 20 members, 5k expenses, cache ===");
        println!("Miss: {:?}", miss_duration);
        println!("Hit:  {:?}", hit_duration);

        assert!(!miss.cached);
        assert!(hit.cached);
        assert_eq!(miss.report, hit.report);
        assert!(
            hit_duration.as_millis() < 500,
            "Cache hit took {}ms, expected <500ms",
            hit_duration.as_millis()
        );
    }
}
