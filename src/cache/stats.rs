//! Cache Statistics Module
//!
//! Counters for the LRU itself and for the cache-aside lookups built on it.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Structural counters of one [`LruCache`](crate::cache::LruCache).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// `get` calls that found their key
    pub hits: u64,
    /// `get` calls that did not
    pub misses: u64,
    /// Tail entries dropped to make room for a new key
    pub evictions: u64,
    /// Entries currently held
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// hits / (hits + misses), or 0.0 before the first `get`.
    pub fn hit_rate(&self) -> f64 {
        ratio(self.hits, self.hits + self.misses)
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Lookup Stats ==
/// How `resolve` calls on a cached directory ended.
///
/// Every call lands in exactly one bucket, except failures that are neither
/// a missing name nor an upstream error (lock poisoning), which are not
/// counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LookupStats {
    /// Answered from the LRU without any remote call
    pub cache_hits: u64,
    /// Resolved remotely and inserted into the LRU
    pub remote_fetches: u64,
    /// Primary or sub-region name absent from its code table
    pub not_found: u64,
    /// A remote call failed or returned an unusable value
    pub upstream_failures: u64,
}

impl LookupStats {
    pub fn total(&self) -> u64 {
        self.cache_hits + self.remote_fetches + self.not_found + self.upstream_failures
    }

    /// Share of all lookups served from the cache.
    pub fn cache_hit_rate(&self) -> f64 {
        ratio(self.cache_hits, self.total())
    }
}

/// Shared, lock-free counters behind [`LookupStats`].
#[derive(Debug, Default)]
pub struct LookupCounters {
    cache_hits: AtomicU64,
    remote_fetches: AtomicU64,
    not_found: AtomicU64,
    upstream_failures: AtomicU64,
}

impl LookupCounters {
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_remote_fetch(&self) {
        self.remote_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upstream_failure(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LookupStats {
        LookupStats {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            remote_fetches: self.remote_fetches.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
        }
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_before_any_get() {
        assert_eq!(CacheStats::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_lookup_counters_snapshot() {
        let counters = LookupCounters::default();
        counters.record_cache_hit();
        counters.record_cache_hit();
        counters.record_remote_fetch();
        counters.record_not_found();

        let stats = counters.snapshot();
        assert_eq!(stats.cache_hits, 2);
        assert_eq!(stats.remote_fetches, 1);
        assert_eq!(stats.not_found, 1);
        assert_eq!(stats.upstream_failures, 0);
        assert_eq!(stats.total(), 4);
        assert_eq!(stats.cache_hit_rate(), 0.5);
    }

    #[test]
    fn test_empty_lookup_stats() {
        let stats = LookupStats::default();
        assert_eq!(stats.total(), 0);
        assert_eq!(stats.cache_hit_rate(), 0.0);
    }
}
