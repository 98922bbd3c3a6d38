//! API State Definition

use std::sync::Arc;

use crate::config::Config;
use crate::service::YoreiApiService;

/// Application State
///
/// State shared across the entire server.
/// Contains configuration and service.
#[derive(Clone)]
pub struct AppState {
  /// Configuration
  pub config: Config,
  /// Usage example search service
  ///
  /// - Production: `Arc::new(YoreiApiServiceFull::new(&config)?)`
  /// - Test: `Arc::new(StubYoreiApiService)`
  pub service: Arc<dyn YoreiApiService>,
}

impl AppState {
  /// Creates a new AppState
  #[must_use]
  pub fn new(config: Config, service: Arc<dyn YoreiApiService>) -> Self {
    Self { config, service }
  }
}
