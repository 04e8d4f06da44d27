//! Request and Response models for the server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! query-string extraction and JSON response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{BroadbandQuery, LoadQuery, SearchQuery};
pub use responses::{
    BroadbandResponse, ErrorResponse, HealthResponse, LoadResponse, RowsResponse, StatsResponse,
};
