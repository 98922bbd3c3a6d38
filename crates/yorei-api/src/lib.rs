//! yorei-api crate
//!
//! Web server exposing yorei usage-example lookup as HTTP API.
//! The database is built beforehand with the `yorei` library and opened read-only.
//!
//! ## Endpoints
//! - `POST /search` - Ranked usage example search
//! - `GET /health` - Health Check
//!
//! ## Usage Example
//! ```bash
//! YOREI_DB_PATH=yorei.sqlite cargo run -p yorei-api
//! curl -X POST http://127.0.0.1:5540/search \
//!   -H "Content-Type: application/json" \
//!   -d '{"query": "先生", "mode": "entry", "limit": 10}'
//! ```

pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod service;

pub use api::AppState;
pub use config::Config;
pub use errors::{ApiError, ApiErrorKind};
pub use models::{SearchRequest, SearchResponse, UsageExampleDto};
pub use service::YoreiApiServiceFull;
