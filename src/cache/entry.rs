//! Cache Entry Module
//!
//! Defines the key/value payload stored in each occupied LRU slot.

// == Cache Entry ==
/// A single key/value pair held by the LRU cache.
///
/// The key is kept alongside the value so that evicting the tail slot can
/// also remove the matching map entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<K, V> {
    /// The key this entry is stored under
    pub key: K,
    /// The stored value
    pub value: V,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates a new cache entry.
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    // == Replace Value ==
    /// Swaps in a new value, returning the previous one.
    pub fn replace_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }
}
