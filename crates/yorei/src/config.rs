// crates/yorei/src/config.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use vibrato_rkyv::dictionary::PresetDictionaryKind;

use crate::errors::ConfigError;
use crate::models::{MorphemeType, REFERENCE_LIST_ID, UeListId};

/// Top-level configuration for yorei.
#[derive(Debug, Clone, Deserialize)]
pub struct YoreiConfig {
  /// [dictionary] section
  pub dictionary: DictionaryConfig,
  /// [database] section
  pub database: DatabaseConfig,
  /// [import] section
  pub import: ImportConfig,
  /// [search] section
  pub search: SearchConfig,
  /// [logging] section
  pub logging: LoggingConfig,
}

/// [dictionary] section configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DictionaryConfig {
  /// Preset dictionary type: "ipadic" | "unidic-cwj" | "unidic-csj"
  pub preset: DictionaryPreset,
  /// Dictionary cache directory.
  ///
  /// `None` leaves the choice to `DictionaryManager` (OS cache directory).
  #[serde(default)]
  pub cache_dir: Option<PathBuf>,
}

/// Preset dictionary type.
///
/// `PresetDictionaryKind` belongs to vibrato-rkyv and has no `Deserialize`; the orphan
/// rule forbids adding one here, so configuration files name presets through this enum
/// and `From<DictionaryPreset> for PresetDictionaryKind` converts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DictionaryPreset {
  /// IpaDic: The smallest
  Ipadic,
  /// Unidic for written language
  UnidicCwj,
  /// Unidic for spoken language
  UnidicCsj,
}

/// [database] section configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
  /// SQLite database file (e.g., "/opt/yorei/data/yorei.sqlite")
  pub path: PathBuf,
}

/// [import] section configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
  /// Completed top-level records (entries / corpus usage examples) per transaction
  pub batch_commit_size: usize,
  /// List that receives corpus usage examples and drives `expr_count`
  #[serde(default = "default_reference_list_id")]
  pub reference_list_id: i64,
  /// Managed media storage; media copy is disabled when omitted
  #[serde(default)]
  pub media_dir: Option<PathBuf>,
  /// Morpheme types dropped by the tokenizer
  #[serde(default = "default_skip_types")]
  pub skip_types: Vec<MorphemeType>,
}

fn default_reference_list_id() -> i64 {
  REFERENCE_LIST_ID.get()
}

fn default_skip_types() -> Vec<MorphemeType> {
  MorphemeType::ALL.into_iter().filter(|kind| kind.is_skipped_by_default()).collect()
}

/// [search] section configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
  /// Default search result limit
  pub default_limit: usize,
  /// Maximum search result limit
  pub max_limit: usize,
}

/// [logging] section configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
  /// Log level: "trace" | "debug" | "info" | "warn" | "error"
  pub level: LogLevel,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
  /// trace
  Trace,

  /// debug
  Debug,

  /// info
  Info,

  /// warn
  Warn,

  ///error
  Error,
}

impl LogLevel {
  /// Directive string understood by `tracing_subscriber::EnvFilter`.
  pub fn as_directive(&self) -> &'static str {
    match self {
      LogLevel::Trace => "trace",
      LogLevel::Debug => "debug",
      LogLevel::Info => "info",
      LogLevel::Warn => "warn",
      LogLevel::Error => "error",
    }
  }
}

impl YoreiConfig {
  /// Configuration with defaults around a database file.
  ///
  /// IPADIC in the OS cache directory, batches of 1000 records, 20 results per page
  /// (100 at most), no media storage, `info` logging.
  pub fn with_database(path: impl Into<PathBuf>) -> Self {
    Self {
      dictionary: DictionaryConfig {
        preset: DictionaryPreset::Ipadic,
        cache_dir: None,
      },
      database: DatabaseConfig { path: path.into() },
      import: ImportConfig {
        batch_commit_size: 1_000,
        reference_list_id: default_reference_list_id(),
        media_dir: None,
        skip_types: default_skip_types(),
      },
      search: SearchConfig {
        default_limit: 20,
        max_limit: 100,
      },
      logging: LoggingConfig {
        level: LogLevel::Info,
      },
    }
  }
}

// ===== Accessor Methods =====

impl YoreiConfig {
  /// Returns the preset dictionary type to pass to DictionaryManager.
  pub fn dictionary_preset(&self) -> PresetDictionaryKind {
    self.dictionary.preset.into()
  }

  /// Returns the configured dictionary cache directory.
  ///
  /// `None` if unspecified.
  pub fn dictionary_cache_dir(&self) -> Option<&Path> {
    self.dictionary.cache_dir.as_deref()
  }

  /// Returns the SQLite database file.
  pub fn database_path(&self) -> &Path {
    &self.database.path
  }

  /// Returns the batch commit size.
  pub fn batch_commit_size(&self) -> usize {
    self.import.batch_commit_size
  }

  /// Returns the reference list id.
  pub fn reference_list_id(&self) -> UeListId {
    UeListId(self.import.reference_list_id)
  }

  /// Returns the managed media directory, if any.
  pub fn media_dir(&self) -> Option<&Path> {
    self.import.media_dir.as_deref()
  }

  /// Returns the morpheme types dropped by the tokenizer.
  pub fn skip_types(&self) -> &[MorphemeType] {
    &self.import.skip_types
  }

  /// Returns the default search result limit.
  pub fn default_search_limit(&self) -> usize {
    self.search.default_limit
  }

  /// Returns the maximum search result limit.
  pub fn max_search_limit(&self) -> usize {
    self.search.max_limit
  }

  /// Resolves a requested page size: default when absent, clamped to `max_limit`.
  pub fn effective_limit(&self, requested: Option<usize>) -> usize {
    requested.unwrap_or(self.search.default_limit).min(self.search.max_limit)
  }

  /// Returns the log level.
  pub fn log_level(&self) -> LogLevel {
    self.logging.level
  }

  /// Validates the configuration.
  ///
  /// # Validation Items
  /// - `search.default_limit` >= 1
  /// - `search.max_limit` >= `search.default_limit`
  /// - `import.batch_commit_size` >= 1
  /// - `import.reference_list_id` >= 1
  /// - `database.path` is not a directory and its parent exists or can be created
  /// - `import.media_dir` is a directory or can be created
  /// - `dictionary.cache_dir` is a directory or can be created
  ///
  /// # Errors
  /// Returns the first failing check as a `ConfigError`.
  pub fn validate(&self) -> Result<(), ConfigError> {
    // search.default_limit >= 1
    if self.search.default_limit < 1 {
      return Err(ConfigError::InvalidSearchDefaultLimit {
        actual: self.search.default_limit,
      });
    }

    // search.max_limit >= search.default_limit
    if self.search.max_limit < self.search.default_limit {
      return Err(ConfigError::InvalidSearchMaxLimit {
        default_limit: self.search.default_limit,
        max_limit: self.search.max_limit,
      });
    }

    // import.batch_commit_size >= 1
    if self.import.batch_commit_size < 1 {
      return Err(ConfigError::InvalidBatchCommitSize {
        actual: self.import.batch_commit_size,
      });
    }

    // import.reference_list_id >= 1
    if self.import.reference_list_id < 1 {
      return Err(ConfigError::InvalidReferenceListId {
        actual: self.import.reference_list_id,
      });
    }

    // database.path must name a file
    let db_path = &self.database.path;
    if db_path.as_os_str().is_empty() || db_path.is_dir() {
      return Err(ConfigError::InvalidDatabasePath { path: db_path.clone() });
    }
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty() && !p.exists()) {
      std::fs::create_dir_all(parent).map_err(|e| ConfigError::DatabaseDirCreationFailed {
        path: parent.to_path_buf(),
        source: Arc::new(e),
      })?;
    }

    // import.media_dir exists as a directory or can be created
    if let Some(media_dir) = &self.import.media_dir {
      ensure_dir(
        media_dir,
        |path| ConfigError::InvalidMediaDir { path },
        |path, source| ConfigError::MediaDirCreationFailed { path, source },
      )?;
    }

    // dictionary.cache_dir exists as a directory or can be created
    if let Some(cache_dir) = &self.dictionary.cache_dir {
      ensure_dir(
        cache_dir,
        |path| ConfigError::InvalidDictionaryCacheDir { path },
        |path, source| ConfigError::DictionaryCacheDirCreationFailed { path, source },
      )?;
    }

    Ok(())
  }
}

/// Accepts an existing directory, creates a missing one, rejects anything else.
fn ensure_dir(
  dir: &Path,
  not_a_dir: impl FnOnce(PathBuf) -> ConfigError,
  creation_failed: impl FnOnce(PathBuf, Arc<std::io::Error>) -> ConfigError,
) -> Result<(), ConfigError> {
  if dir.exists() {
    if !dir.is_dir() {
      return Err(not_a_dir(dir.to_path_buf()));
    }
    return Ok(());
  }

  std::fs::create_dir_all(dir).map_err(|e| creation_failed(dir.to_path_buf(), Arc::new(e)))
}

// ===== Convert library types to types usable in this crate =====
//
// DictionaryPreset (configuration) -> PresetDictionaryKind (vibrato-rkyv).

impl From<DictionaryPreset> for PresetDictionaryKind {
  fn from(preset: DictionaryPreset) -> Self {
    match preset {
      DictionaryPreset::Ipadic => PresetDictionaryKind::Ipadic,
      DictionaryPreset::UnidicCwj => PresetDictionaryKind::UnidicCwj,
      DictionaryPreset::UnidicCsj => PresetDictionaryKind::UnidicCsj,
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test Module
// ─────────────────────────────────────────────────────────────────────────────
