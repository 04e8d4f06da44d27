//! Error types for the CSV and broadband server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == App Error Enum ==
/// Unified error type for the server.
///
/// Per-row parse failures are not represented here; they are collected as
/// [`RowError`](crate::csv::RowError) values and never abort a parse.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed request argument
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A CSV operation was requested before any file was loaded
    #[error("No CSV loaded: {0}")]
    NotLoaded(String),

    /// The requested CSV file does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// The underlying text source could not be read
    #[error("Error reading source: {0}")]
    SourceRead(#[from] std::io::Error),

    /// A region name could not be resolved to a code
    #[error("Name not found: {0}")]
    NameNotFound(String),

    /// The remote directory returned a failure
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Result code reported in the JSON error envelope.
    pub fn result_code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) | AppError::NotLoaded(_) | AppError::NameNotFound(_) => {
                "error_bad_request"
            }
            AppError::FileNotFound(_) | AppError::Upstream(_) => "error_datasource",
            AppError::SourceRead(_) | AppError::Internal(_) => "error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) | AppError::NotLoaded(_) | AppError::NameNotFound(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::FileNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::SourceRead(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse::new(self.result_code(), self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the server.
pub type Result<T> = std::result::Result<T, AppError>;
