//! Balance report caching using Moka.
//!
//! Group pages ask for the same balances over and over between edits. The
//! cache keys each report by group and a SHA-256 of everything that feeds
//! the aggregation, so any edit to the roster or the active expenses misses
//! naturally.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use sha2::{Digest, Sha256};
use splitbook_shared::CacheConfig;
use splitbook_shared::types::{GroupId, MemberId};
use tracing::{debug, warn};

use super::aggregator::{AggregationOptions, BalanceAggregator, active_split_expenses};
use super::error::BalanceError;
use super::types::{BalanceReport, SplitExpense};
use crate::expense::Expense;

/// Default cache capacity (number of entries).
const DEFAULT_CACHE_CAPACITY: u64 = 1000;

/// Default time-to-live for cache entries (5 minutes).
const DEFAULT_TTL_SECS: u64 = 300;

/// A balance report and whether it came from the cache.
#[derive(Debug, Clone)]
pub struct CachedReport {
    /// The report.
    pub report: Arc<BalanceReport>,
    /// True if served from the cache.
    pub cached: bool,
}

/// Cache for balance reports.
///
/// Thread-safe; clones share the same underlying storage.
#[derive(Clone)]
pub struct CalculationCache {
    cache: Cache<(GroupId, String), Arc<BalanceReport>>,
}

impl CalculationCache {
    /// Creates a cache with default settings.
    ///
    /// Default: 1000 entries max, 5 minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a cache with custom capacity and time-to-live.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .support_invalidation_closures()
            .build();

        Self { cache }
    }

    /// Creates a cache from application configuration.
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_config(config.max_capacity, config.ttl_secs)
    }

    /// Hashes the aggregation inputs.
    ///
    /// Covers the roster, each expense's payer, total and owed amounts, and
    /// the strict flag. The parallel threshold does not change the result
    /// and is left out.
    #[must_use]
    pub fn input_hash(
        roster: &[MemberId],
        expenses: &[SplitExpense],
        options: &AggregationOptions,
    ) -> String {
        let mut hasher = Sha256::new();

        hasher.update((roster.len() as u64).to_le_bytes());
        for member_id in roster {
            hasher.update(member_id.as_bytes());
        }

        hasher.update((expenses.len() as u64).to_le_bytes());
        for expense in expenses {
            hasher.update(expense.expense_id.as_bytes());
            hasher.update(expense.payer_id.as_bytes());
            hasher.update(expense.total_amount.minor_units().to_le_bytes());
            hasher.update((expense.split.len() as u64).to_le_bytes());
            for line in &expense.split {
                hasher.update(line.member_id.as_bytes());
                hasher.update(line.owed_amount.minor_units().to_le_bytes());
            }
        }

        hasher.update([u8::from(options.strict_mode)]);
        format!("{:x}", hasher.finalize())
    }

    /// Aggregates a group's balances, returning a cached report if the
    /// inputs are unchanged.
    ///
    /// Soft-deleted expenses are left out before hashing, so deleting an
    /// expense changes the key.
    ///
    /// # Errors
    ///
    /// Same as [`BalanceAggregator::aggregate`]. Errors are not cached.
    pub fn balances_cached(
        &self,
        group_id: GroupId,
        roster: &[MemberId],
        expenses: &[Expense],
        options: &AggregationOptions,
    ) -> Result<CachedReport, BalanceError> {
        let active = active_split_expenses(expenses);
        let key = (group_id, Self::input_hash(roster, &active, options));

        if let Some(report) = self.cache.get(&key) {
            debug!(%group_id, "balance cache hit");
            return Ok(CachedReport {
                report,
                cached: true,
            });
        }

        let report = Arc::new(BalanceAggregator::aggregate(roster, &active, options)?);
        self.cache.insert(key, Arc::clone(&report));

        Ok(CachedReport {
            report,
            cached: false,
        })
    }

    /// Drops every cached report of one group.
    pub fn invalidate_group(&self, group_id: GroupId) {
        if let Err(err) = self
            .cache
            .invalidate_entries_if(move |(cached_group, _), _| *cached_group == group_id)
        {
            warn!(%group_id, error = %err, "failed to invalidate group balances");
        }
    }

    /// Invalidates all cached entries.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Returns the number of entries currently in the cache.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs cache maintenance tasks.
    ///
    /// Moka evicts expired entries on its own; calling this reclaims memory
    /// sooner and makes counts exact.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl Default for CalculationCache {
    fn default() -> Self {
        Self::new()
    }
}
