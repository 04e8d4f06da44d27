//! Static Directory
//!
//! In-memory [`RemoteDirectory`] built from `[value, primary, sub]` rows.
//! Used for local runs without network access and in tests.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::info;

use crate::datasource::{normalize_name, CodeTable, RemoteDirectory};
use crate::error::{AppError, Result};

/// Snapshot of how often each directory operation was called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub primary: usize,
    pub sub: usize,
    pub value: usize,
}

// == Static Directory ==
/// Directory answering from fixed tables.
///
/// Codes are assigned from 1 in sorted order of the normalized names.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    primary: CodeTable,
    subs: HashMap<u32, CodeTable>,
    values: HashMap<(u32, u32), String>,
    primary_calls: AtomicUsize,
    sub_calls: AtomicUsize,
    value_calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl StaticDirectory {
    /// Builds the tables from `[value, primary, sub]` rows.
    ///
    /// A repeated (primary, sub) pair keeps the last value.
    pub fn from_rows<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = [S; 3]>,
        S: Into<String>,
    {
        let mut grouped: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for [value, primary, sub] in rows {
            let (primary, sub): (String, String) = (primary.into(), sub.into());
            grouped
                .entry(normalize_name(&primary))
                .or_default()
                .insert(normalize_name(&sub), value.into());
        }

        let mut directory = Self::default();
        for (primary_code, (primary, subs)) in (1u32..).zip(grouped) {
            directory.primary.insert(primary, primary_code);
            let table = directory.subs.entry(primary_code).or_default();
            for (sub_code, (sub, value)) in (1u32..).zip(subs) {
                table.insert(sub, sub_code);
                directory.values.insert((primary_code, sub_code), value);
            }
        }
        directory
    }

    /// Loads rows from a JSON array of `[value, primary, sub]` string arrays.
    ///
    /// Entries that do not have exactly three elements are skipped.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let rows: Vec<Vec<String>> = serde_json::from_str(&text).map_err(|e| {
            AppError::Internal(format!("Invalid mock data in {}: {}", path.display(), e))
        })?;

        let rows: Vec<[String; 3]> = rows.into_iter().filter_map(|r| r.try_into().ok()).collect();
        info!("Loaded {} mock rows from {}", rows.len(), path.display());
        Ok(Self::from_rows(rows))
    }

    /// Makes every operation fail with an upstream error while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            primary: self.primary_calls.load(Ordering::SeqCst),
            sub: self.sub_calls.load(Ordering::SeqCst),
            value: self.value_calls.load(Ordering::SeqCst),
        }
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(AppError::Upstream("Directory unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl RemoteDirectory for StaticDirectory {
    fn fetch_primary_codes(&self) -> Result<CodeTable> {
        self.primary_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.primary.clone())
    }

    fn fetch_sub_codes(&self, primary_code: u32) -> Result<CodeTable> {
        self.sub_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.subs.get(&primary_code).cloned().ok_or_else(|| {
            AppError::Upstream(format!("Unknown primary code {}", primary_code))
        })
    }

    fn fetch_value(&self, primary_code: u32, sub_code: u32) -> Result<String> {
        self.value_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.values
            .get(&(primary_code, sub_code))
            .cloned()
            .ok_or_else(|| {
                AppError::Upstream(format!(
                    "No value for codes {}/{}",
                    primary_code, sub_code
                ))
            })
    }
}
