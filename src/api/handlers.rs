//! API Handlers
//!
//! HTTP request handlers for each server endpoint.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use tokio::sync::RwLock;
use tracing::info;

use crate::config::{Config, DatasourceKind};
use crate::csv::{search, CsvParser, ParsedCsv, TrivialCreator};
use crate::datasource::{CachedDirectory, CensusDirectory, RemoteDirectory, StaticDirectory};
use crate::error::{AppError, Result};
use crate::models::{
    BroadbandQuery, BroadbandResponse, HealthResponse, LoadQuery, LoadResponse, RowsResponse,
    SearchQuery, StatsResponse,
};

/// Cache-aside broadband lookup over whichever directory is configured.
pub type SharedLookup = Arc<CachedDirectory<Box<dyn RemoteDirectory>>>;

/// The most recently loaded CSV file.
pub type LoadedCsv = ParsedCsv<Vec<String>>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Loaded CSV, replaced on every successful load
    pub csv: Arc<RwLock<Option<LoadedCsv>>>,
    /// Broadband lookup
    pub lookup: SharedLookup,
    /// Directory that load paths are resolved against
    pub data_dir: Arc<PathBuf>,
}

impl AppState {
    /// Creates a new AppState with nothing loaded.
    pub fn new(
        data_dir: impl Into<PathBuf>,
        lookup: CachedDirectory<Box<dyn RemoteDirectory>>,
    ) -> Self {
        Self {
            csv: Arc::new(RwLock::new(None)),
            lookup: Arc::new(lookup),
            data_dir: Arc::new(data_dir.into()),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the configured remote directory. The census client must not be
    /// created inside an async runtime.
    pub fn from_config(config: &Config) -> Result<Self> {
        let directory: Box<dyn RemoteDirectory> = match config.datasource {
            DatasourceKind::Census => Box::new(CensusDirectory::new(
                config.census_base_url.clone(),
                std::time::Duration::from_secs(config.upstream_timeout),
            )?),
            DatasourceKind::Mock => {
                Box::new(StaticDirectory::from_json_file(&config.mock_data_path)?)
            }
        };
        let lookup = CachedDirectory::new(config.cache_capacity, directory);
        Ok(Self::new(config.data_dir.clone(), lookup))
    }
}

/// Handler for GET /loadcsv
///
/// Parses a file from the data directory and makes it the current dataset.
pub async fn load_handler(
    State(state): State<AppState>,
    Query(query): Query<LoadQuery>,
) -> Result<Json<LoadResponse>> {
    let relative = query.relative_path()?;
    let has_header = query.has_header();
    let path = state.data_dir.join(&relative);

    let parsed = tokio::task::spawn_blocking(move || parse_file(&path, has_header))
        .await
        .map_err(|e| AppError::Internal(format!("Load task failed: {}", e)))??;

    let response = LoadResponse::new(
        relative.to_string_lossy(),
        parsed.rows.len(),
        parsed.errors.clone(),
    );
    info!(
        "Loaded {} ({} rows, {} errors)",
        response.filepath,
        response.rows,
        response.errors.len()
    );

    *state.csv.write().await = Some(parsed);
    Ok(Json(response))
}

fn parse_file(path: &Path, has_header: bool) -> Result<LoadedCsv> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => AppError::FileNotFound(path.display().to_string()),
        _ => AppError::SourceRead(e),
    })?;

    let mut parser = CsvParser::new(BufReader::new(file), has_header, TrivialCreator);
    parser.parse()?;
    Ok(parser.finish())
}

/// Handler for GET /viewcsv
///
/// Returns every admitted row of the loaded file.
pub async fn view_handler(State(state): State<AppState>) -> Result<Json<RowsResponse>> {
    let csv = state.csv.read().await;
    let loaded = csv.as_ref().ok_or_else(not_loaded)?;

    Ok(Json(RowsResponse::new(loaded.rows.clone())))
}

/// Handler for GET /searchcsv
///
/// Searches the loaded file by value, optionally within one column.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<RowsResponse>> {
    let csv = state.csv.read().await;
    let loaded = csv.as_ref().ok_or_else(not_loaded)?;

    let value = query.value()?;
    let column = resolve_column(query.column(), loaded)?;
    let rows = search(
        &loaded.rows,
        &value,
        column,
        query.case_sensitive(),
        query.substring_match(),
    );

    Ok(Json(RowsResponse::new(rows)))
}

/// Turns a column selector (index or header name) into a checked index.
fn resolve_column(column: Option<&str>, loaded: &LoadedCsv) -> Result<Option<usize>> {
    let Some(column) = column else {
        return Ok(None);
    };

    let index = match column.parse::<usize>() {
        Ok(index) => index,
        Err(_) => loaded
            .column_index(column)
            .ok_or_else(|| AppError::InvalidRequest(format!("Invalid column name: {}", column)))?,
    };

    let width = loaded
        .header
        .as_ref()
        .or_else(|| loaded.rows.first())
        .map_or(0, Vec::len);
    if index >= width {
        return Err(AppError::InvalidRequest(format!(
            "Column index {} out of range; file has {} columns",
            index, width
        )));
    }
    Ok(Some(index))
}

fn not_loaded() -> AppError {
    AppError::NotLoaded("load a CSV with /loadcsv first".to_string())
}

/// Handler for GET /broadband
///
/// Resolves a state/county pair through the cached census lookup.
pub async fn broadband_handler(
    State(state): State<AppState>,
    Query(query): Query<BroadbandQuery>,
) -> Result<Json<BroadbandResponse>> {
    let (primary, sub) = query.region()?;
    let lookup = Arc::clone(&state.lookup);

    // Directory calls block on network I/O
    let data = tokio::task::spawn_blocking(move || lookup.resolve(&primary, &sub))
        .await
        .map_err(|e| AppError::Internal(format!("Lookup task failed: {}", e)))??;

    Ok(Json(BroadbandResponse::new(data)))
}

/// Handler for GET /stats
///
/// Returns broadband cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.lookup.cache_stats()?;
    let capacity = state.lookup.capacity()?;

    let lookups = state.lookup.lookup_stats();

    Ok(Json(StatsResponse::new(capacity, &stats, lookups)))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn test_state(dir: &tempfile::TempDir) -> AppState {
        let directory: Box<dyn RemoteDirectory> = Box::new(StaticDirectory::from_rows([
            ["81.5", "Michigan", "Wayne"],
            ["63.1", "California", "Riverside"],
        ]));
        AppState::new(dir.path(), CachedDirectory::new(2, directory))
    }

    fn load_query(path: &str) -> LoadQuery {
        LoadQuery {
            filepath: Some(path.to_string()),
            header: None,
        }
    }

    fn search_query(value: &str, column: Option<&str>) -> SearchQuery {
        SearchQuery {
            query: Some(value.to_string()),
            column: column.map(str::to_string),
            ..Default::default()
        }
    }

    async fn loaded_state() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("people.csv"),
            "Name,Age,Job\nColin,19,Student\nThao,52,Doctor\nBad,row\n",
        )
        .unwrap();
        let state = test_state(&dir);
        let loaded = load_handler(State(state.clone()), Query(load_query("people.csv")))
            .await
            .unwrap();
        assert_eq!(loaded.rows, 2);
        (dir, state)
    }

    #[tokio::test]
    async fn test_load_and_view() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("people.csv"), "Name,Age\nAlice,30\nBob,41\n").unwrap();
        let state = test_state(&dir);

        let response = load_handler(State(state.clone()), Query(load_query("people.csv")))
            .await
            .unwrap();
        assert_eq!(response.rows, 2);
        assert!(response.errors.is_empty());

        let view = view_handler(State(state)).await.unwrap();
        assert_eq!(view.data.len(), 2);
        assert_eq!(view.data[0], vec!["Alice".to_string(), "30".to_string()]);
    }

    #[tokio::test]
    async fn test_load_reports_row_errors() {
        let (_dir, state) = loaded_state().await;
        let csv = state.csv.read().await;
        let loaded = csv.as_ref().unwrap();

        assert_eq!(loaded.rows.len(), 2);
        assert_eq!(loaded.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let result = load_handler(State(state), Query(load_query("nope.csv"))).await;
        assert!(matches!(result, Err(AppError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_view_before_load() {
        let dir = tempfile::tempdir().unwrap();
        let result = view_handler(State(test_state(&dir))).await;
        assert!(matches!(result, Err(AppError::NotLoaded(_))));
    }

    #[tokio::test]
    async fn test_search_by_column_name_and_index() {
        let (_dir, state) = loaded_state().await;

        let by_name = search_handler(State(state.clone()), Query(search_query("Doctor", Some("Job"))))
            .await
            .unwrap();
        assert_eq!(by_name.data.len(), 1);

        let by_index = search_handler(State(state), Query(search_query("Doctor", Some("2"))))
            .await
            .unwrap();
        assert_eq!(by_index.data, by_name.data);
    }

    #[tokio::test]
    async fn test_search_invalid_column() {
        let (_dir, state) = loaded_state().await;

        let result =
            search_handler(State(state.clone()), Query(search_query("x", Some("Salary")))).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));

        let result = search_handler(State(state), Query(search_query("x", Some("3")))).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_search_case_insensitive_substring() {
        let (_dir, state) = loaded_state().await;
        let query = SearchQuery {
            query: Some("O".to_string()),
            column: None,
            case_insensitive: Some("true".to_string()),
            substring_match: Some("true".to_string()),
        };

        let found = search_handler(State(state), Query(query)).await.unwrap();
        assert_eq!(found.data.len(), 2);
    }

    #[tokio::test]
    async fn test_broadband_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let query = BroadbandQuery {
            state: Some("Michigan".to_string()),
            county: Some("Wayne".to_string()),
        };

        let first = broadband_handler(State(state.clone()), Query(query.clone()))
            .await
            .unwrap();
        assert_eq!(first.data.value, 81.5);
        let second = broadband_handler(State(state.clone()), Query(query))
            .await
            .unwrap();
        assert_eq!(second.data, first.data);

        let stats = stats_handler(State(state)).await.unwrap();
        assert_eq!(stats.result, "success");
        assert_eq!(stats.lookups.cache_hits, 1);
        assert_eq!(stats.lookups.remote_fetches, 1);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.capacity, 2);
    }

    #[tokio::test]
    async fn test_broadband_unknown_county() {
        let dir = tempfile::tempdir().unwrap();
        let query = BroadbandQuery {
            state: Some("Michigan".to_string()),
            county: Some("Nowhere".to_string()),
        };

        let result = broadband_handler(State(test_state(&dir)), Query(query)).await;
        assert!(matches!(result, Err(AppError::NameNotFound(_))));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
