//! Datasource Module
//!
//! Two-tier region lookup: a region name pair is resolved to a pair of
//! numeric codes, and the codes to a value, through a [`RemoteDirectory`].
//! [`CachedDirectory`] puts an LRU cache and code memoization in front of it.

mod cached;
mod census;
mod mock;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;

pub use cached::CachedDirectory;
pub use census::CensusDirectory;
pub use mock::{CallCounts, StaticDirectory};

/// Normalized region name to numeric code.
pub type CodeTable = HashMap<String, u32>;

// == Remote Directory ==
/// Remote source of region codes and values.
///
/// Every operation blocks until the remote side answers. Failures are
/// reported as [`AppError::Upstream`](crate::error::AppError::Upstream)
/// carrying the remote detail.
pub trait RemoteDirectory: Send + Sync {
    /// All primary regions and their codes.
    fn fetch_primary_codes(&self) -> Result<CodeTable>;

    /// All sub-regions within one primary region.
    fn fetch_sub_codes(&self, primary_code: u32) -> Result<CodeTable>;

    /// The raw value for one sub-region.
    fn fetch_value(&self, primary_code: u32, sub_code: u32) -> Result<String>;
}

impl<D: RemoteDirectory + ?Sized> RemoteDirectory for Box<D> {
    fn fetch_primary_codes(&self) -> Result<CodeTable> {
        (**self).fetch_primary_codes()
    }

    fn fetch_sub_codes(&self, primary_code: u32) -> Result<CodeTable> {
        (**self).fetch_sub_codes(primary_code)
    }

    fn fetch_value(&self, primary_code: u32, sub_code: u32) -> Result<String> {
        (**self).fetch_value(primary_code, sub_code)
    }
}

// == Name Normalization ==
/// Lowercases a region name and drops all whitespace.
///
/// "New York" and "newyork" normalize to the same key.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

// == Region Key ==
/// Cache key for a (primary, sub) region pair, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionKey {
    primary: String,
    sub: String,
}

impl RegionKey {
    pub fn new(primary: &str, sub: &str) -> Self {
        Self {
            primary: normalize_name(primary),
            sub: normalize_name(sub),
        }
    }
}

// == Resolved Value ==
/// A fetched value together with the names it was requested under.
///
/// Names keep the caller's original casing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedValue {
    #[serde(rename = "percentage")]
    pub value: f64,
    #[serde(rename = "state")]
    pub primary: String,
    #[serde(rename = "county")]
    pub sub: String,
    pub retrieved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("New York"), "newyork");
        assert_eq!(normalize_name("  Kings\t"), "kings");
        assert_eq!(normalize_name("already"), "already");
    }

    #[test]
    fn test_region_key_ignores_case() {
        let a = RegionKey::new("California", "Los Angeles");
        let b = RegionKey::new("CALIFORNIA", "los angeles");
        assert_eq!(a, b);

        let set: HashSet<RegionKey> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_region_key_distinguishes_pairs() {
        assert_ne!(
            RegionKey::new("Michigan", "Wayne"),
            RegionKey::new("Michigan", "Oakland")
        );
    }

    #[test]
    fn test_resolved_value_serialize() {
        let value = ResolvedValue {
            value: 81.5,
            primary: "Michigan".to_string(),
            sub: "Wayne".to_string(),
            retrieved_at: Utc::now(),
        };
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["percentage"], 81.5);
        assert_eq!(json["state"], "Michigan");
        assert_eq!(json["county"], "Wayne");
        assert!(json.get("retrieved_at").is_some());
    }
}
