//! errors module
pub mod error_definition;

/// Re-export major error types
pub use error_definition::{
  ConfigError, DictionaryError, ElisionError, ImportError, ImportResult, LookupError, StoreError, StoreResult,
  TokenizerError, YoreiError, YoreiResult,
};
