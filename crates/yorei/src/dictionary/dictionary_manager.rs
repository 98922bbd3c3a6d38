//! Dictionary Management Module
//!
//! Loads the vibrato-rkyv system dictionary the import pipeline tokenizes with.
//! Preset dictionaries (IPADIC, UniDic) are downloaded on first use into a cache
//! directory and loaded from there afterwards; a compiled local dictionary file can be
//! loaded directly instead.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use tracing::info;
use vibrato_rkyv::Dictionary;
use vibrato_rkyv::dictionary::LoadMode;
use vibrato_rkyv::dictionary::PresetDictionaryKind;

use crate::errors::DictionaryError;
use crate::tokenizer::{FeatureLayout, VibratoTokenizer};

/// Where the dictionary comes from
#[derive(Debug, Clone)]
enum DictionarySource {
  /// Preset downloaded into the cache directory
  Preset(PresetDictionaryKind),
  /// Compiled dictionary file on disk
  Local(PathBuf),
}

/// Dictionary manager for vibrato-rkyv
pub struct DictionaryManager {
  /// Dictionary cache directory
  cache_dir: PathBuf,

  source: DictionarySource,

  /// Loaded dictionary, initialized once on first load.
  /// DictionaryError implements Clone so a failed load is cached as well.
  dictionary: OnceLock<Result<Arc<Dictionary>, DictionaryError>>,
}

impl DictionaryManager {
  /// Returns the path of the cache directory
  pub fn cache_dir(&self) -> &Path {
    &self.cache_dir
  }

  /// Preset dictionary cached in the OS default cache directory
  pub fn with_preset(preset_kind: PresetDictionaryKind) -> Result<Self, DictionaryError> {
    Ok(Self::with_preset_in(preset_kind, default_cache_dir()?))
  }

  /// Preset dictionary cached in `cache_dir`
  pub fn with_preset_in(preset_kind: PresetDictionaryKind, cache_dir: impl Into<PathBuf>) -> Self {
    Self {
      cache_dir: cache_dir.into(),
      source: DictionarySource::Preset(preset_kind),
      dictionary: OnceLock::new(),
    }
  }

  /// Local compiled dictionary file
  pub fn from_local_path<P: AsRef<Path>>(path: P) -> Result<Self, DictionaryError> {
    let path = path.as_ref().to_path_buf();

    if !path.is_file() {
      return Err(DictionaryError::DictionaryNotFound(path.display().to_string()));
    }

    let cache_dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));

    Ok(Self {
      cache_dir,
      source: DictionarySource::Local(path),
      dictionary: OnceLock::new(),
    })
  }

  /// Load dictionary
  ///
  /// - Loads (and downloads, for presets) on the first call
  /// - Returns a clone of `Arc<Dictionary>` from the second call onwards
  /// - A first-call error is cached and returned on every later call
  pub fn load(&self) -> Result<Arc<Dictionary>, DictionaryError> {
    self.dictionary.get_or_init(|| self.load_inner().map(Arc::new)).clone()
  }

  /// Tokenizer over the shared dictionary, reading features in the source's layout
  pub fn tokenizer(&self) -> Result<VibratoTokenizer, DictionaryError> {
    Ok(VibratoTokenizer::from_shared_dictionary(self.load()?).with_layout(self.feature_layout()))
  }

  /// Feature layout of the managed dictionary; local files are read as IPADIC
  pub fn feature_layout(&self) -> FeatureLayout {
    match &self.source {
      DictionarySource::Preset(preset_kind) => FeatureLayout::for_preset(*preset_kind),
      DictionarySource::Local(_) => FeatureLayout::Ipadic,
    }
  }

  fn load_inner(&self) -> Result<Dictionary, DictionaryError> {
    match &self.source {
      DictionarySource::Local(path) => {
        info!(path = %path.display(), "Loading local dictionary");
        Dictionary::from_path(path, LoadMode::TrustCache).map_err(|e| DictionaryError::VibratoLoad(Arc::new(e)))
      }
      DictionarySource::Preset(preset_kind) => self.load_from_preset(*preset_kind),
    }
  }

  /// Downloads the preset on the first run, loads it from the cache afterwards
  fn load_from_preset(&self, preset_kind: PresetDictionaryKind) -> Result<Dictionary, DictionaryError> {
    std::fs::create_dir_all(&self.cache_dir).map_err(|e| DictionaryError::CacheDirCreationFailed(Arc::new(e)))?;

    let dict_dir = self.cache_dir.join(preset_kind.name());
    info!(preset = preset_kind.name(), dir = %dict_dir.display(), "Loading preset dictionary");

    Dictionary::from_preset_with_download(preset_kind, &dict_dir)
      .map_err(|e| DictionaryError::PresetDictDownloadFailed(Arc::new(e)))
  }
}

/// Returns the default cache directory path according to the OS
///
/// | OS      | Example Path                               |
/// |---------|--------------------------------------------|
/// | Linux   | `~/.cache/yorei/dict`                      |
/// | macOS   | `~/Library/Caches/yorei/dict`              |
/// | Windows | `C:\Users\{user}\AppData\Local\yorei\dict` |
pub fn default_cache_dir() -> Result<PathBuf, DictionaryError> {
  let base = dirs::cache_dir().ok_or(DictionaryError::CacheDirNotFound)?;

  Ok(base.join("yorei").join("dict"))
}

/// `vibrato_rkyv::Dictionary` has no `Debug`; show only whether it is loaded.
impl fmt::Debug for DictionaryManager {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DictionaryManager")
      .field("cache_dir", &self.cache_dir)
      .field("source", &self.source)
      .field("dictionary_initialized", &self.dictionary.get().is_some())
      .finish()
  }
}
