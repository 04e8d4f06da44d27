//! API Routes
//!
//! Configures the Axum router with all server endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    broadband_handler, health_handler, load_handler, search_handler, stats_handler, view_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /loadcsv` - Parse a file from the data directory
/// - `GET /viewcsv` - Return the loaded rows
/// - `GET /searchcsv` - Search the loaded rows
/// - `GET /broadband` - Cached broadband lookup for a state/county
/// - `GET /stats` - Broadband cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/loadcsv", get(load_handler))
        .route("/viewcsv", get(view_handler))
        .route("/searchcsv", get(search_handler))
        .route("/broadband", get(broadband_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
