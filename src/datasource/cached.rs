//! Cache-Aside Lookup
//!
//! Wraps a [`RemoteDirectory`] with an LRU cache of resolved values and two
//! never-evicted memo tables for the code resolution steps.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use chrono::Utc;
use tracing::{debug, info};

use crate::cache::{CacheStats, LookupCounters, LookupStats, LruCache};
use crate::datasource::{normalize_name, CodeTable, RegionKey, RemoteDirectory, ResolvedValue};
use crate::error::{AppError, Result};

// == Cached Directory ==
/// Cache-aside front for a remote directory.
///
/// Locks are only held to read or write local state, never across a remote
/// call, so two concurrent misses on one key may both fetch. The second write
/// overwrites the first with an equivalent value.
pub struct CachedDirectory<D> {
    directory: D,
    cache: Mutex<LruCache<RegionKey, ResolvedValue>>,
    primary_codes: RwLock<Option<Arc<CodeTable>>>,
    sub_codes: RwLock<HashMap<u32, Arc<CodeTable>>>,
    counters: LookupCounters,
}

impl<D: RemoteDirectory> CachedDirectory<D> {
    // == Constructor ==
    /// Creates a lookup caching at most `capacity` resolved values.
    pub fn new(capacity: usize, directory: D) -> Self {
        Self {
            directory,
            cache: Mutex::new(LruCache::new(capacity)),
            primary_codes: RwLock::new(None),
            sub_codes: RwLock::new(HashMap::new()),
            counters: LookupCounters::default(),
        }
    }

    // == Resolve ==
    /// Returns the value for a (primary, sub) region pair.
    ///
    /// Served from the cache when present. Otherwise both names are resolved
    /// to codes, the value is fetched, and the result is cached. Unknown names
    /// fail with [`AppError::NameNotFound`] and are not cached.
    pub fn resolve(&self, primary: &str, sub: &str) -> Result<ResolvedValue> {
        let key = RegionKey::new(primary, sub);

        let cached = self.lock_cache()?.get(&key);
        if let Some(value) = cached {
            self.counters.record_cache_hit();
            debug!("Cache hit for {}/{}", primary, sub);
            return Ok(value);
        }
        debug!("Cache miss for {}/{}", primary, sub);

        let fetched = self.fetch(primary, sub);
        match &fetched {
            Ok(_) => self.counters.record_remote_fetch(),
            Err(AppError::NameNotFound(_)) => self.counters.record_not_found(),
            Err(AppError::Upstream(_)) => self.counters.record_upstream_failure(),
            Err(_) => {}
        }

        let resolved = fetched?;
        self.lock_cache()?.set(key, resolved.clone());
        Ok(resolved)
    }

    fn fetch(&self, primary: &str, sub: &str) -> Result<ResolvedValue> {
        let primary_codes = self.primary_table()?;
        let primary_code = lookup(&primary_codes, primary, "primary region")?;
        let sub_codes = self.sub_table(primary_code)?;
        let sub_code = lookup(&sub_codes, sub, "sub-region")?;

        let raw = self.directory.fetch_value(primary_code, sub_code)?;
        let value = raw.trim().parse::<f64>().map_err(|_| {
            AppError::Upstream(format!(
                "Unparseable value '{}' for {}/{}",
                raw, primary, sub
            ))
        })?;

        Ok(ResolvedValue {
            value,
            primary: primary.to_string(),
            sub: sub.to_string(),
            retrieved_at: Utc::now(),
        })
    }

    // == Code Tables ==
    fn primary_table(&self) -> Result<Arc<CodeTable>> {
        let memo = self.primary_codes.read().map_err(poisoned)?.clone();
        if let Some(table) = memo {
            return Ok(table);
        }

        let fetched = Arc::new(normalize_table(self.directory.fetch_primary_codes()?));
        info!("Loaded {} primary region codes", fetched.len());

        let mut slot = self.primary_codes.write().map_err(poisoned)?;
        Ok(slot.get_or_insert(fetched).clone())
    }

    fn sub_table(&self, primary_code: u32) -> Result<Arc<CodeTable>> {
        let memo = self
            .sub_codes
            .read()
            .map_err(poisoned)?
            .get(&primary_code)
            .cloned();
        if let Some(table) = memo {
            return Ok(table);
        }

        let fetched = Arc::new(normalize_table(
            self.directory.fetch_sub_codes(primary_code)?,
        ));
        info!(
            "Loaded {} sub-region codes for primary code {}",
            fetched.len(),
            primary_code
        );

        let mut tables = self.sub_codes.write().map_err(poisoned)?;
        Ok(tables.entry(primary_code).or_insert(fetched).clone())
    }

    // == Introspection ==
    /// Number of `resolve` calls answered from the cache.
    pub fn hits(&self) -> u64 {
        self.counters.snapshot().cache_hits
    }

    /// Outcome counts of every `resolve` call so far.
    pub fn lookup_stats(&self) -> LookupStats {
        self.counters.snapshot()
    }

    /// Statistics of the underlying LRU cache.
    pub fn cache_stats(&self) -> Result<CacheStats> {
        Ok(self.lock_cache()?.stats())
    }

    /// Maximum number of cached values.
    pub fn capacity(&self) -> Result<usize> {
        Ok(self.lock_cache()?.capacity())
    }

    /// Cached keys from most to least recently used.
    pub fn cached_keys(&self) -> Result<Vec<RegionKey>> {
        Ok(self.lock_cache()?.keys())
    }

    /// The wrapped directory.
    pub fn directory(&self) -> &D {
        &self.directory
    }

    fn lock_cache(&self) -> Result<MutexGuard<'_, LruCache<RegionKey, ResolvedValue>>> {
        self.cache.lock().map_err(poisoned)
    }
}

fn poisoned<E>(_: E) -> AppError {
    AppError::Internal("lookup state lock poisoned".to_string())
}

fn normalize_table(table: CodeTable) -> CodeTable {
    table
        .into_iter()
        .map(|(name, code)| (normalize_name(&name), code))
        .collect()
}

fn lookup(table: &CodeTable, name: &str, kind: &str) -> Result<u32> {
    table
        .get(&normalize_name(name))
        .copied()
        .ok_or_else(|| AppError::NameNotFound(format!("{} '{}' not found", kind, name)))
}
