//! CSV Broadband - CSV search server with a cached census lookup
//!
//! Loads delimited text into rows, answers value/substring searches over
//! them, and resolves state/county broadband coverage through an LRU cache
//! in front of the census API.

pub mod api;
pub mod cache;
pub mod config;
pub mod csv;
pub mod datasource;
pub mod error;
pub mod models;

pub use api::AppState;
pub use config::Config;
pub use error::{AppError, Result};
