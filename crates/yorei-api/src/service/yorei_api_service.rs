//! Usage Example Search Service

use std::path::{Path, PathBuf};
use std::time::Instant;

use yorei::lookup::LookupEngine;
use yorei::store::Store;

use crate::config::{Config, MAX_QUERY_LENGTH};
use crate::errors::{ApiError, Result};
use crate::models::{SearchRequest, SearchResponse, UsageExampleDto};

/// Common interface for the search service
///
/// This trait allows swapping production implementation (`YoreiApiServiceFull`) with
/// test stubs/mocks.
pub trait YoreiApiService: Send + Sync {
  /// Runs one paged lookup
  ///
  /// # Errors
  /// - Input error (blank query, length exceeded, etc.)
  /// - Internal error
  fn search(&self, request: SearchRequest) -> Result<SearchResponse>;
}

/// Validates the query of a request and returns it trimmed
///
/// # Errors
/// - If the query is blank
/// - If the query exceeds maximum length
pub fn validate_query(query: &str) -> Result<&str> {
  let bytes = query.len();
  if bytes > MAX_QUERY_LENGTH {
    return Err(ApiError::query_too_long(bytes, MAX_QUERY_LENGTH));
  }
  let trimmed = query.trim();
  if trimmed.is_empty() {
    return Err(ApiError::invalid_input("Query is empty"));
  }
  Ok(trimmed)
}

/// Usage Example Search Service
///
/// Opens a read-only store per request so that lookups never contend with the
/// connection of an importer writing the same file.
#[derive(Debug, Clone)]
pub struct YoreiApiServiceFull {
  db_path: PathBuf,
  default_limit: usize,
  max_limit: usize,
}

impl YoreiApiServiceFull {
  /// Initializes the service
  ///
  /// # Errors
  /// Returns an error if the database cannot be opened
  pub fn new(config: &Config) -> Result<Self> {
    // Open once up front so a wrong path fails at startup
    Store::open_read_only(&config.db_path).map_err(|e| {
      ApiError::config(format!("Failed to open database {}: {}", config.db_path.display(), e))
    })?;

    Ok(Self {
      db_path: config.db_path.clone(),
      default_limit: config.default_limit,
      max_limit: config.max_limit,
    })
  }

  /// Database the service reads
  #[must_use]
  pub fn db_path(&self) -> &Path {
    &self.db_path
  }

  /// Runs one paged lookup
  ///
  /// # Errors
  /// - If the query is blank
  /// - If the query exceeds maximum length
  /// - If the store cannot be read
  pub fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
    let query = validate_query(&request.query)?;

    // Start measuring processing time
    let start = Instant::now();

    let store = Store::open_read_only(&self.db_path)?;
    let engine = LookupEngine::new(&store, self.default_limit, self.max_limit);
    let list = engine.search(
      query,
      request.mode.unwrap_or_default(),
      request.limit,
      request.offset.unwrap_or(0),
    )?;
    let results = list.iter().map(UsageExampleDto::from_result).collect();

    // End measuring processing time
    let elapsed_ms = start.elapsed().as_millis() as u64;

    Ok(SearchResponse {
      total: list.total,
      results,
      elapsed_ms,
    })
  }
}

/// Production implementation of trait `YoreiApiService`
impl YoreiApiService for YoreiApiServiceFull {
  fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
    // Note: Writing `self.search(...)` would recursively call the trait method,
    // so explicitly call the inherent method.
    YoreiApiServiceFull::search(self, request)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn validate_query_trims() {
    assert_eq!(validate_query("  先生 ").unwrap(), "先生");
  }

  #[test]
  fn validate_query_rejects_blank() {
    let err = validate_query("   ").unwrap_err();
    assert_eq!(err.code(), "invalid_input");
  }

  #[test]
  fn validate_query_rejects_long() {
    let err = validate_query(&"a".repeat(MAX_QUERY_LENGTH + 1)).unwrap_err();
    assert_eq!(err.code(), "query_too_long");
  }

  #[test]
  fn missing_database_is_a_config_error() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let config = Config::new("127.0.0.1:0", temp_dir.path().join("missing.sqlite"), 20, 100).unwrap();

    let err = YoreiApiServiceFull::new(&config).unwrap_err();
    assert_eq!(err.code(), "config_error");
  }

  #[test]
  fn empty_store_answers_with_no_results() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let db_path = temp_dir.path().join("yorei.sqlite");
    Store::open(&db_path).unwrap();

    let config = Config::new("127.0.0.1:0", &db_path, 20, 100).unwrap();
    let service = YoreiApiServiceFull::new(&config).unwrap();
    let response = service.search(SearchRequest::new("先生")).unwrap();
    assert_eq!(response.total, 0);
    assert!(response.results.is_empty());
  }
}
