//! エラー定義

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// 設定（YoreiConfig）関連のエラー
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum ConfigError {
  /// search.default_limit < 1
  #[error("search.default_limit は 1 以上である必要があります: actual={actual}")]
  InvalidSearchDefaultLimit {
    /// 実際に指定された値
    actual: usize,
  },

  /// search.max_limit < search.default_limit
  #[error(
    "search.max_limit は search.default_limit 以上である必要があります: \
     default_limit={default_limit}, max_limit={max_limit}"
  )]
  InvalidSearchMaxLimit {
    /// search.default_limit
    default_limit: usize,
    /// search.max_limit
    max_limit: usize,
  },

  /// import.batch_commit_size < 1
  #[error("import.batch_commit_size は 1 以上である必要があります: actual={actual}")]
  InvalidBatchCommitSize {
    /// 実際に指定された値
    actual: usize,
  },

  /// import.reference_list_id < 1
  #[error("import.reference_list_id は 1 以上である必要があります: actual={actual}")]
  InvalidReferenceListId {
    /// 実際に指定された値
    actual: i64,
  },

  /// database.path がディレクトリを指している
  #[error("database.path はファイルを指す必要があります: path={path:?}")]
  InvalidDatabasePath {
    /// 不正なパス
    path: PathBuf,
  },

  /// database.path の親ディレクトリの作成に失敗
  #[error("データベースディレクトリの作成に失敗しました: path={path:?}, error={source}")]
  DatabaseDirCreationFailed {
    /// 作成しようとしたパス
    path: PathBuf,
    /// 元となった IO エラー
    #[source]
    source: Arc<io::Error>,
  },

  /// import.media_dir が「存在するディレクトリ」でない
  #[error("import.media_dir がディレクトリではありません: path={path:?}")]
  InvalidMediaDir {
    /// 不正なパス
    path: PathBuf,
  },

  /// import.media_dir の作成に失敗
  #[error("import.media_dir の作成に失敗しました: path={path:?}, error={source}")]
  MediaDirCreationFailed {
    /// 作成しようとしたパス
    path: PathBuf,
    /// 元となった IO エラー
    #[source]
    source: Arc<io::Error>,
  },

  /// dictionary.cache_dir が「存在するディレクトリ」でない（ファイルである等）
  #[error("dictionary.cache_dir がディレクトリではありません: path={path:?}")]
  InvalidDictionaryCacheDir {
    /// 不正なパス
    path: PathBuf,
  },

  /// dictionary.cache_dir の作成に失敗
  #[error("dictionary.cache_dir の作成に失敗しました: path={path:?}, error={source}")]
  DictionaryCacheDirCreationFailed {
    /// 作成しようとしたパス
    path: PathBuf,
    /// 元となった IO エラー
    #[source]
    source: Arc<io::Error>,
  },
}

/// 辞書関連のエラー
/// Vibrato では mecab, ipadic, unidic 等の辞書を使用可能
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum DictionaryError {
  /// キャッシュディレクトリーが見つからない
  #[error("辞書キャッシュディレクトリーが見つかりません")]
  CacheDirNotFound,

  /// キャッシュディレクトリーの作成失敗
  #[error("辞書キャッシュディレクトリーの作成に失敗しました: {0}")]
  CacheDirCreationFailed(Arc<io::Error>),

  /// 指定された辞書が見つからない
  #[error("指定された辞書が見つかりません: {0}")]
  DictionaryNotFound(String),

  /// vibrato-rkyv による辞書のロード失敗
  #[error("vibrato-rkyv 辞書ロードエラー: {0}")]
  VibratoLoad(Arc<dyn std::error::Error + Send + Sync + 'static>),

  /// vibrato-rkyv のプリセット辞書のダウンロード失敗
  #[error("vibrato-rkyv プリセット辞書ダウンロード失敗: {0}")]
  PresetDictDownloadFailed(Arc<dyn std::error::Error + Send + Sync + 'static>),
}

/// トークナイザー関連エラー
///
/// 解析そのもの（`parse`）は失敗しない。ここに並ぶのは構築時のエラーのみ。
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum TokenizerError {
  /// 辞書起因のエラー
  #[error("辞書エラー: {0}")]
  Dictionary(#[from] DictionaryError),

  /// レキシコンの登録内容が不正
  #[error("レキシコンのエントリが不正です: surface={surface:?}, reason={reason}")]
  InvalidLexiconEntry {
    /// 対象の表層形
    surface: String,
    /// 不正の理由
    reason: String,
  },
}

/// ストア（SQLite）関連のエラー
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum StoreError {
  /// rusqlite のエラー
  #[error("SQLite エラー: {0}")]
  Sqlite(Arc<rusqlite::Error>),

  /// データベースファイル周りの IO エラー
  #[error("データベースパスが不正: {path}: {source}")]
  Io {
    /// 問題が発生したパス
    path: PathBuf,
    /// 発生した I/O エラー
    #[source]
    source: Arc<io::Error>,
  },

  /// extra / raw リスト等の JSON 列の変換失敗
  #[error("JSON 列の変換に失敗しました: column={column}, error={source}")]
  Json {
    /// 対象の列名
    column: &'static str,
    /// 元となった JSON エラー
    #[source]
    source: Arc<serde_json::Error>,
  },

  /// 列挙型に対応しない整数値が格納されていた
  #[error("不正な値が格納されています: table={table}, column={column}, value={value}")]
  InvalidValue {
    /// テーブル名
    table: &'static str,
    /// 列名
    column: &'static str,
    /// 格納されていた値
    value: i64,
  },

  /// 指定 ID の行が存在しない
  #[error("行が見つかりません: table={table}, id={id}")]
  NotFound {
    /// テーブル名
    table: &'static str,
    /// 検索した ID
    id: i64,
  },
}

impl From<rusqlite::Error> for StoreError {
  fn from(err: rusqlite::Error) -> Self {
    StoreError::Sqlite(Arc::new(err))
  }
}

/// インポート関連のエラー
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum ImportError {
  /// ソース文書の構造的な不備（走査前の検証で検出）
  #[error("ソース文書が不正です: {reason}")]
  InvalidSource {
    /// 不正の理由
    reason: String,
  },

  /// ソース文書の JSON 解析失敗
  #[error("ソース文書の解析に失敗しました: {0}")]
  SourceParse(Arc<serde_json::Error>),

  /// ソース文書の読み込み失敗
  #[error("ソース文書を読み込めません: path={path:?}, error={source}")]
  SourceIo {
    /// 読み込もうとしたパス
    path: PathBuf,
    /// 元となった IO エラー
    #[source]
    source: Arc<io::Error>,
  },

  /// イベント順序の違反
  #[error("イベント順序が不正です: event={event}, reason={reason}")]
  Protocol {
    /// 受信したイベント
    event: &'static str,
    /// 違反の内容
    reason: &'static str,
  },

  /// ストア起因のエラー
  #[error("ストアエラー: {0}")]
  Store(#[from] StoreError),
}

/// 空欄省略形式（J-J1）の見出し語展開エラー
///
/// 呼び出し側は生の見出し語にフォールバックするため、インポートは中断しない。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ElisionError {
  /// 漢字表記の `―` に対応するかな要素が足りない
  #[error("かな要素が不足しています: kanji={kanji}, kana={kana}, required={required}, available={available}")]
  MissingKanaComponent {
    /// 展開対象の漢字表記
    kanji: String,
    /// 参照したかな表記
    kana: String,
    /// 必要な要素数
    required: usize,
    /// 実際の要素数
    available: usize,
  },
}

/// 検索関連エラー
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum LookupError {
  /// ストア起因のエラー
  #[error("ストアエラー: {0}")]
  Store(#[from] StoreError),

  /// 非同期検索ワーカーの起動失敗
  #[error("検索ワーカーを起動できません: {0}")]
  WorkerSpawn(Arc<io::Error>),
}

/// 統合エラー
/// 本クレートの外部に公開するエラー用 API はこのエラーを返すこと
/// `YoreiResult<T>` = `Result<T, YoreiError>` として使用する
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum YoreiError {
  /// 設定エラー
  #[error(transparent)]
  Config(#[from] ConfigError),

  /// 辞書関連エラー
  #[error(transparent)]
  Dictionary(#[from] DictionaryError),

  /// トークナイザー関連エラー
  #[error(transparent)]
  Tokenizer(#[from] TokenizerError),

  /// ストア関連エラー
  #[error(transparent)]
  Store(#[from] StoreError),

  /// インポート関連エラー
  #[error(transparent)]
  Import(#[from] ImportError),

  /// 検索関連エラー
  #[error(transparent)]
  Lookup(#[from] LookupError),
}

/// yorei クレートの標準 Result 型エイリアス
pub type YoreiResult<T> = Result<T, YoreiError>;

/// ストア層の Result 型エイリアス
pub type StoreResult<T> = Result<T, StoreError>;

/// インポート層の Result 型エイリアス
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rusqlite_error_converts_into_store_error() {
    let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(err, StoreError::Sqlite(_)));
    assert!(err.to_string().contains("SQLite"));
  }

  #[test]
  fn store_error_is_transparent_in_yorei_error() {
    let store = StoreError::NotFound {
      table: "expressions",
      id: 7,
    };
    let message = store.to_string();
    let err: YoreiError = store.into();
    assert_eq!(err.to_string(), message);
  }

  #[test]
  fn import_error_wraps_store_error() {
    let err: ImportError = StoreError::NotFound {
      table: "libraries",
      id: 1,
    }
    .into();
    assert!(matches!(err, ImportError::Store(StoreError::NotFound { .. })));
  }
}
