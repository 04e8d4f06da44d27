//! Cache Module
//!
//! Provides a generic in-memory cache with fixed capacity and LRU eviction.

mod entry;
mod lru;
mod stats;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruCache;
pub use stats::{CacheStats, LookupCounters, LookupStats};
