//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Which remote directory backs the broadband lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasourceKind {
    /// Live census API over HTTP
    Census,
    /// Static rows loaded from a JSON file
    Mock,
}

impl FromStr for DatasourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "census" | "acs" => Ok(Self::Census),
            "mock" => Ok(Self::Mock),
            other => Err(format!("unknown datasource '{}'", other)),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Maximum number of resolved values held by the broadband cache
    pub cache_capacity: usize,
    /// Directory that `loadcsv` paths are resolved against
    pub data_dir: PathBuf,
    /// Remote directory implementation
    pub datasource: DatasourceKind,
    /// JSON rows used by the mock datasource
    pub mock_data_path: PathBuf,
    /// Base URL of the census API
    pub census_base_url: String,
    /// Per-request timeout for census calls, in seconds
    pub upstream_timeout: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3232)
    /// - `CACHE_CAPACITY` - Broadband cache entries (default: 30)
    /// - `DATA_DIR` - CSV directory (default: data)
    /// - `DATASOURCE` - `census` or `mock` (default: census)
    /// - `MOCK_DATA_PATH` - Mock rows file (default: data/acs_mock.json)
    /// - `CENSUS_BASE_URL` - Census API base (default: https://api.census.gov/data)
    /// - `UPSTREAM_TIMEOUT_SECS` - Census request timeout (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cache_capacity: parse_var("CACHE_CAPACITY").unwrap_or(defaults.cache_capacity),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            datasource: parse_var("DATASOURCE").unwrap_or(defaults.datasource),
            mock_data_path: env::var("MOCK_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.mock_data_path),
            census_base_url: env::var("CENSUS_BASE_URL").unwrap_or(defaults.census_base_url),
            upstream_timeout: parse_var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or(defaults.upstream_timeout),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3232,
            cache_capacity: 30,
            data_dir: PathBuf::from("data"),
            datasource: DatasourceKind::Census,
            mock_data_path: PathBuf::from("data/acs_mock.json"),
            census_base_url: "https://api.census.gov/data".to_string(),
            upstream_timeout: 10,
        }
    }
}
