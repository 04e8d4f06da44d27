//! LRU Cache Module
//!
//! Fixed-capacity key/value cache with least-recently-used eviction.
//!
//! Recency is a doubly linked list stored in a slot arena: links are slot
//! indices rather than references, and two sentinel slots bound the list so
//! that insert, unlink, and move-to-front never special-case the ends.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::cache::{CacheEntry, CacheStats};

/// Sentinel slot before the most recently used entry.
const HEAD: usize = 0;
/// Sentinel slot after the least recently used entry.
const TAIL: usize = 1;

// == Slot ==
/// One arena slot. Sentinels never carry an entry.
#[derive(Debug)]
struct Slot<K, V> {
    prev: usize,
    next: usize,
    entry: Option<CacheEntry<K, V>>,
}

impl<K, V> Slot<K, V> {
    fn sentinel() -> Self {
        Self {
            prev: HEAD,
            next: TAIL,
            entry: None,
        }
    }
}

// == LRU Cache ==
/// Generic bounded cache with O(1) `get` and `set`.
///
/// - Front (after `HEAD`) = most recently used
/// - Back (before `TAIL`) = least recently used
///
/// Every key in `map` points at exactly one occupied slot in the list and
/// every occupied slot is reachable from `map`. Slots freed by eviction are
/// immediately reused for the incoming entry, so the arena never grows past
/// `capacity + 2`.
#[derive(Debug)]
pub struct LruCache<K, V> {
    /// Key to slot index
    map: HashMap<K, usize>,
    /// Arena; indices 0 and 1 are the sentinels
    slots: Vec<Slot<K, V>>,
    /// Maximum number of entries, fixed at construction
    capacity: usize,
    /// Performance statistics
    stats: CacheStats,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// A capacity of zero yields a cache that never retains anything.
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity.saturating_add(2).min(1024));
        slots.push(Slot::sentinel());
        slots.push(Slot::sentinel());

        Self {
            map: HashMap::new(),
            slots,
            capacity,
            stats: CacheStats::new(),
        }
    }

    // == Set ==
    /// Stores a value, making its key the most recently used.
    ///
    /// An existing key has its value replaced in place. A new key arriving
    /// when the cache is full first evicts the least recently used entry.
    pub fn set(&mut self, key: K, value: V) {
        if let Some(&idx) = self.map.get(&key) {
            if let Some(entry) = self.slots[idx].entry.as_mut() {
                entry.replace_value(value);
            }
            self.move_to_front(idx);
            return;
        }

        if self.capacity == 0 {
            return;
        }

        let entry = CacheEntry::new(key.clone(), value);
        let idx = if self.map.len() >= self.capacity {
            let victim = self.slots[TAIL].prev;
            self.unlink(victim);
            if let Some(evicted) = self.slots[victim].entry.take() {
                self.map.remove(&evicted.key);
                self.stats.record_eviction();
            }
            self.slots[victim].entry = Some(entry);
            victim
        } else {
            self.slots.push(Slot {
                prev: HEAD,
                next: TAIL,
                entry: Some(entry),
            });
            self.slots.len() - 1
        };

        self.link_front(idx);
        self.map.insert(key, idx);
        self.stats.set_total_entries(self.map.len());
    }

    // == Get ==
    /// Returns a copy of the value for `key`, promoting it to most recently used.
    ///
    /// A miss leaves the recency order untouched.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.map.get(key).copied() {
            Some(idx) => {
                self.move_to_front(idx);
                self.stats.record_hit();
                self.slots[idx].entry.as_ref().map(|e| e.value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Contains ==
    /// Checks for a key without touching recency or stats.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    // == Keys ==
    /// Returns the keys ordered from most to least recently used.
    pub fn keys(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.map.len());
        let mut cursor = self.slots[HEAD].next;
        while cursor != TAIL {
            if let Some(entry) = self.slots[cursor].entry.as_ref() {
                keys.push(entry.key.clone());
            }
            cursor = self.slots[cursor].next;
        }
        keys
    }

    // == Length ==
    /// Returns the current number of entries, always within `0..=capacity`.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    // == Capacity ==
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.map.len());
        stats
    }

    // == List Maintenance ==
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);
        self.slots[prev].next = next;
        self.slots[next].prev = prev;
    }

    fn link_front(&mut self, idx: usize) {
        let first = self.slots[HEAD].next;
        self.slots[idx].prev = HEAD;
        self.slots[idx].next = first;
        self.slots[first].prev = idx;
        self.slots[HEAD].next = idx;
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.slots[HEAD].next == idx {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_new() {
        let lru: LruCache<String, i32> = LruCache::new(3);
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.capacity(), 3);
    }

    #[test]
    fn test_lru_set_and_get() {
        let mut lru = LruCache::new(3);
        lru.set("a", 1);

        assert_eq!(lru.get("a"), Some(1));
        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn test_lru_overflow_evicts_first_inserted() {
        let mut lru = LruCache::new(2);
        lru.set("A", 1);
        lru.set("B", 2);
        lru.set("C", 3);

        assert_eq!(lru.get("A"), None);
        assert_eq!(lru.get("B"), Some(2));
        assert_eq!(lru.get("C"), Some(3));
        assert_eq!(lru.len(), 2);
    }

    #[test]
    fn test_lru_get_promotes_key() {
        let mut lru = LruCache::new(2);
        lru.set("A", 1);
        lru.set("B", 2);
        assert_eq!(lru.get("A"), Some(1));
        lru.set("C", 3);

        assert_eq!(lru.get("B"), None);
        assert_eq!(lru.get("A"), Some(1));
        assert_eq!(lru.get("C"), Some(3));
    }

    #[test]
    fn test_lru_overwrite_replaces_and_promotes() {
        let mut lru = LruCache::new(2);
        lru.set("A", 1);
        lru.set("B", 2);
        lru.set("A", 10);

        assert_eq!(lru.len(), 2);
        assert_eq!(lru.keys(), vec!["A", "B"]);

        // B is now the tail
        lru.set("C", 3);
        assert!(!lru.contains("B"));
        assert_eq!(lru.get("A"), Some(10));
    }

    #[test]
    fn test_lru_miss_does_not_reorder() {
        let mut lru = LruCache::new(3);
        lru.set("a", 1);
        lru.set("b", 2);
        let before = lru.keys();

        assert_eq!(lru.get("zzz"), None);
        assert_eq!(lru.keys(), before);
    }

    #[test]
    fn test_lru_keys_order() {
        let mut lru = LruCache::new(3);
        lru.set("a", 1);
        lru.set("b", 2);
        lru.set("c", 3);
        lru.get("a");

        assert_eq!(lru.keys(), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_lru_capacity_one() {
        let mut lru = LruCache::new(1);
        lru.set("a", 1);
        lru.set("b", 2);

        assert_eq!(lru.len(), 1);
        assert_eq!(lru.get("a"), None);
        assert_eq!(lru.get("b"), Some(2));
    }

    #[test]
    fn test_lru_capacity_zero_stores_nothing() {
        let mut lru = LruCache::new(0);
        lru.set("a", 1);

        assert!(lru.is_empty());
        assert_eq!(lru.get("a"), None);
    }

    #[test]
    fn test_lru_slots_reused_on_eviction() {
        let mut lru = LruCache::new(2);
        for i in 0..100 {
            lru.set(i, i * 2);
        }

        assert_eq!(lru.len(), 2);
        assert_eq!(lru.slots.len(), 4);
        assert_eq!(lru.keys(), vec![99, 98]);
    }

    #[test]
    fn test_lru_string_keys_borrowed_lookup() {
        let mut lru: LruCache<String, u32> = LruCache::new(2);
        lru.set("key".to_string(), 7);

        assert_eq!(lru.get("key"), Some(7));
        assert!(lru.contains("key"));
    }

    #[test]
    fn test_lru_stats() {
        let mut lru = LruCache::new(1);
        lru.set("a", 1);
        lru.get("a");
        lru.get("b");
        lru.set("b", 2);

        let stats = lru.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.total_entries, 1);
    }
}
