//! Config loading from environment variables

use std::path::PathBuf;

use super::constants::{DEFAULT_BIND_ADDR, DEFAULT_DB_PATH, DEFAULT_LIMIT, MAX_LIMIT};
use crate::errors::ApiError;

/// API Server Configuration
#[derive(Debug, Clone)]
pub struct Config {
  /// Bind address (e.g. "127.0.0.1:5540")
  pub bind_addr: String,
  /// SQLite database built by a yorei import
  pub db_path: PathBuf,
  /// Page size when a request gives none
  pub default_limit: usize,
  /// Upper bound for a requested page size
  pub max_limit: usize,
}

impl Config {
  /// Loads configuration from environment variables
  ///
  /// - `YOREI_API_BIND_ADDR` (default `127.0.0.1:5540`)
  /// - `YOREI_DB_PATH` (default `yorei.sqlite`)
  /// - `YOREI_API_DEFAULT_LIMIT` / `YOREI_API_MAX_LIMIT` (default 20 / 100)
  ///
  /// # Errors
  /// Returns an error if environment variable values are invalid
  pub fn from_env() -> crate::errors::Result<Self> {
    let bind_addr = std::env::var("YOREI_API_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let db_path = std::env::var("YOREI_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    let default_limit = limit_from_env("YOREI_API_DEFAULT_LIMIT", DEFAULT_LIMIT)?;
    let max_limit = limit_from_env("YOREI_API_MAX_LIMIT", MAX_LIMIT)?;

    Self::new(bind_addr, db_path, default_limit, max_limit)
  }

  /// Builds and checks a configuration
  ///
  /// # Errors
  /// Returns an error if `default_limit` is 0 or exceeds `max_limit`
  pub fn new(
    bind_addr: impl Into<String>,
    db_path: impl Into<PathBuf>,
    default_limit: usize,
    max_limit: usize,
  ) -> crate::errors::Result<Self> {
    if default_limit == 0 || default_limit > max_limit {
      return Err(ApiError::config(format!(
        "Invalid limits: default {default_limit}, max {max_limit}"
      )));
    }
    Ok(Self {
      bind_addr: bind_addr.into(),
      db_path: db_path.into(),
      default_limit,
      max_limit,
    })
  }
}

fn limit_from_env(name: &str, default: usize) -> crate::errors::Result<usize> {
  match std::env::var(name) {
    Ok(value) => parse_limit(name, &value),
    Err(_) => Ok(default),
  }
}

fn parse_limit(name: &str, value: &str) -> crate::errors::Result<usize> {
  value
    .trim()
    .parse()
    .map_err(|_| ApiError::config(format!("{name} must be a positive integer: {value}")))
}
