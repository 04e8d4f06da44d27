//! Response DTOs for the server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, LookupStats};
use crate::csv::RowError;
use crate::datasource::ResolvedValue;

const SUCCESS: &str = "success";

/// Response body for GET /loadcsv
#[derive(Debug, Clone, Serialize)]
pub struct LoadResponse {
    pub result: String,
    /// Path as given by the client
    pub filepath: String,
    /// Number of admitted rows
    pub rows: usize,
    /// Rows that were rejected during parsing
    pub errors: Vec<RowError>,
}

impl LoadResponse {
    pub fn new(filepath: impl Into<String>, rows: usize, errors: Vec<RowError>) -> Self {
        Self {
            result: SUCCESS.to_string(),
            filepath: filepath.into(),
            rows,
            errors,
        }
    }
}

/// Response body for GET /viewcsv and GET /searchcsv
#[derive(Debug, Clone, Serialize)]
pub struct RowsResponse {
    pub result: String,
    pub data: Vec<Vec<String>>,
}

impl RowsResponse {
    pub fn new(data: Vec<Vec<String>>) -> Self {
        Self {
            result: SUCCESS.to_string(),
            data,
        }
    }
}

/// Response body for GET /broadband
#[derive(Debug, Clone, Serialize)]
pub struct BroadbandResponse {
    pub result: String,
    pub data: ResolvedValue,
}

impl BroadbandResponse {
    pub fn new(data: ResolvedValue) -> Self {
        Self {
            result: SUCCESS.to_string(),
            data,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub result: String,
    /// Maximum number of cached lookups
    pub capacity: usize,
    /// Current number of cached lookups
    pub total_entries: usize,
    /// LRU hits
    pub hits: u64,
    /// LRU misses
    pub misses: u64,
    /// LRU evictions
    pub evictions: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// How broadband lookups ended
    pub lookups: LookupStats,
}

impl StatsResponse {
    pub fn new(capacity: usize, stats: &CacheStats, lookups: LookupStats) -> Self {
        Self {
            result: SUCCESS.to_string(),
            capacity,
            total_entries: stats.total_entries,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            hit_rate: stats.hit_rate(),
            lookups,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error category, e.g. "error_bad_request"
    pub result: String,
    /// Error message describing what went wrong
    pub message: String,
}

impl ErrorResponse {
    pub fn new(result: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            message: message.into(),
        }
    }
}
