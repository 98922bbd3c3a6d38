//! sources モジュール
//!
//! 取り込み元文書を検証し、トラバーサルプロトコルの順にイベントを発行する。
pub mod corpus_document;
pub mod dictionary_document;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::{ImportError, ImportResult};
use crate::importer::pipeline::ImportOptions;
use crate::importer::visitor::ImportVisitor;

/// 再エクスポート
pub use corpus_document::{CorpusDocument, CorpusNote, FieldMapping};
pub use dictionary_document::{
  DefinitionRecord, DictionaryDocument, EntryRecord, LibraryHeader, UsageExampleRecord,
};

/// 取り込み元
///
/// `traverse` は最初のイベントを発行する前に文書全体を検証する。
pub trait ImportSource {
  /// 検証後、全イベントを `visitor` に発行する
  fn traverse(&self, visitor: &mut dyn ImportVisitor) -> ImportResult<()>;

  /// この取り込み元で既定とするステージ構成
  fn default_options(&self) -> ImportOptions {
    ImportOptions::default()
  }

  /// メディアファイルの取り込み元ディレクトリ
  fn media_dir(&self) -> Option<&Path> {
    None
  }
}

pub(crate) fn read_document(path: &Path) -> ImportResult<String> {
  std::fs::read_to_string(path).map_err(|e| ImportError::SourceIo {
    path: PathBuf::from(path),
    source: Arc::new(e),
  })
}

pub(crate) fn parse_document<T: serde::de::DeserializeOwned>(json: &str) -> ImportResult<T> {
  serde_json::from_str(json).map_err(|e| ImportError::SourceParse(Arc::new(e)))
}

pub(crate) fn invalid(reason: impl Into<String>) -> ImportError {
  ImportError::InvalidSource { reason: reason.into() }
}
