//! API Module
//!
//! HTTP handlers and routing for the CSV and broadband REST API.
//!
//! # Endpoints
//! - `GET /loadcsv?filepath=&header=` - Parse a CSV file
//! - `GET /viewcsv` - Return the loaded rows
//! - `GET /searchcsv?query=&column=&caseInsensitive=&substringMatch=` - Search rows
//! - `GET /broadband?state=&county=` - Cached broadband lookup
//! - `GET /stats` - Broadband cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
