//! Request DTOs for the server API
//!
//! Query-string parameters of each endpoint. Every field is optional at the
//! deserialization layer so that missing parameters produce a JSON error
//! envelope instead of a bare extractor rejection.

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::error::{AppError, Result};

/// Query for GET /loadcsv
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadQuery {
    /// Path relative to the data directory
    pub filepath: Option<String>,
    /// Whether the first line is a header (default: true)
    pub header: Option<String>,
}

impl LoadQuery {
    /// Validates the file path, returning it relative to the data directory.
    ///
    /// Absolute paths and `..` components are rejected.
    pub fn relative_path(&self) -> Result<PathBuf> {
        let raw = required(&self.filepath, "filepath")?;
        let path = Path::new(&raw);
        if !path.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(AppError::InvalidRequest(format!(
                "filepath '{}' must stay inside the data directory",
                raw
            )));
        }
        Ok(path.to_path_buf())
    }

    pub fn has_header(&self) -> bool {
        flag(&self.header, true)
    }
}

/// Query for GET /searchcsv
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    /// Value to look for
    pub query: Option<String>,
    /// Column index or header name
    pub column: Option<String>,
    #[serde(rename = "caseInsensitive")]
    pub case_insensitive: Option<String>,
    #[serde(rename = "substringMatch")]
    pub substring_match: Option<String>,
}

impl SearchQuery {
    pub fn value(&self) -> Result<String> {
        required(&self.query, "query")
    }

    /// Trimmed column selector, if one was given.
    pub fn column(&self) -> Option<&str> {
        self.column
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    pub fn case_sensitive(&self) -> bool {
        !flag(&self.case_insensitive, false)
    }

    pub fn substring_match(&self) -> bool {
        flag(&self.substring_match, false)
    }
}

/// Query for GET /broadband
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BroadbandQuery {
    pub state: Option<String>,
    pub county: Option<String>,
}

impl BroadbandQuery {
    /// Returns the (state, county) pair.
    pub fn region(&self) -> Result<(String, String)> {
        Ok((required(&self.state, "state")?, required(&self.county, "county")?))
    }
}

/// Trimmed value of a parameter that must be present and non-empty.
fn required(value: &Option<String>, name: &str) -> Result<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::InvalidRequest(format!("{} parameter is missing or empty", name)))
}

/// `true` only for the literal "true" (any case); `default` when absent.
fn flag(value: &Option<String>, default: bool) -> bool {
    match value {
        Some(v) => v.trim().eq_ignore_ascii_case("true"),
        None => default,
    }
}
