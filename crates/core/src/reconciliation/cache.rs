//! Live report caching using Moka.
//!
//! Memoizes reports per `(from, to)` for a short TTL. Every ledger write
//! must call [`LiveReportCache::invalidate_all`].

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use moka::sync::Cache;
use tourbook_shared::LedgerConfig;

use super::types::ReconciliationReport;

/// Cache of live reconciliation reports.
#[derive(Clone)]
pub struct LiveReportCache {
    cache: Cache<(NaiveDate, NaiveDate), Arc<ReconciliationReport>>,
}

impl LiveReportCache {
    /// Creates a cache holding at most `max_capacity` reports for `ttl_secs`.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();
        Self { cache }
    }

    /// Creates a cache sized from the ledger configuration.
    #[must_use]
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::with_config(config.live_cache_capacity, config.live_cache_ttl_secs)
    }

    /// Returns the cached report for the range, if any.
    #[must_use]
    pub fn get(&self, from: NaiveDate, to: NaiveDate) -> Option<Arc<ReconciliationReport>> {
        self.cache.get(&(from, to))
    }

    /// Stores a report for the range.
    pub fn insert(&self, from: NaiveDate, to: NaiveDate, report: Arc<ReconciliationReport>) {
        self.cache.insert((from, to), report);
    }

    /// Drops every cached report.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Returns the number of cached reports.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl std::fmt::Debug for LiveReportCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveReportCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation::{ReconciliationEngine, ReportInput};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn test_insert_get_and_invalidate() {
        let cache = LiveReportCache::with_config(10, 60);
        let report =
            ReconciliationEngine::run(&ReportInput::default(), day(1), day(31)).unwrap();

        assert!(cache.get(day(1), day(31)).is_none());
        cache.insert(day(1), day(31), Arc::new(report.clone()));
        assert_eq!(cache.get(day(1), day(31)).as_deref(), Some(&report));
        assert!(cache.get(day(2), day(31)).is_none());

        cache.invalidate_all();
        assert!(cache.get(day(1), day(31)).is_none());
    }

    #[test]
    fn test_from_config() {
        let cache = LiveReportCache::from_config(&LedgerConfig::default());
        assert_eq!(cache.entry_count(), 0);
    }
}
