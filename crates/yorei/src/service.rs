// crates/yorei/src/service.rs

//! YoreiService: yorei クレートの統合ファサード。
//!
//! - 辞書管理 (DictionaryManager) とトークナイザー
//! - ストア (Store)
//! - 取り込み (ImportPipeline) と検索 (LookupEngine)
//!
//! アプリケーションからは、この構造体だけを意識すればよい。

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::config::YoreiConfig;
use crate::definition_tree::DefinitionTree;
use crate::dictionary::DictionaryManager;
use crate::errors::YoreiResult;
use crate::importer::{GraphBuilder, ImportPipeline, ImportReport, ImportSource, MediaCopier};
use crate::lookup::{AsyncLookup, EntryResultList, LookupEngine, SearchMode, UeResultList};
use crate::models::EntryId;
use crate::store::Store;
use crate::tokenizer::MorphemeTokenizer;

/// yorei クレートの統合ファサード。
///
/// 書き込みは単一の接続で行う。並行検索には [`YoreiService::async_lookup`] を使う。
pub struct YoreiService {
  config: YoreiConfig,
  store: Store,
  graph: GraphBuilder,
  dictionary_manager: Option<DictionaryManager>,
}

impl YoreiService {
  /// 初期化（設定検証 + 辞書ロード + ストア open）
  ///
  /// # 処理フロー
  /// 1. 設定の妥当性を検証
  /// 2. DictionaryManager を構築し VibratoTokenizer を作る（`skip_types` を適用）
  /// 3. ストアを開く（無ければ作成）
  ///
  /// # エラー
  /// - 設定が不正
  /// - 辞書ロード失敗
  /// - ストアのオープン失敗
  pub fn init(config: &YoreiConfig) -> YoreiResult<Self> {
    config.validate()?;

    let manager = match config.dictionary_cache_dir() {
      Some(dir) => DictionaryManager::with_preset_in(config.dictionary_preset(), dir),
      None => DictionaryManager::with_preset(config.dictionary_preset())?,
    };
    let tokenizer = manager.tokenizer()?.with_skip(config.skip_types().to_vec());

    let mut service = Self::open(config, Arc::new(tokenizer))?;
    service.dictionary_manager = Some(manager);
    Ok(service)
  }

  /// 外部から与えたトークナイザーで初期化する（辞書のダウンロードを伴わない）。
  pub fn with_tokenizer(config: &YoreiConfig, tokenizer: Arc<dyn MorphemeTokenizer>) -> YoreiResult<Self> {
    config.validate()?;
    Self::open(config, tokenizer)
  }

  fn open(config: &YoreiConfig, tokenizer: Arc<dyn MorphemeTokenizer>) -> YoreiResult<Self> {
    let store = Store::open(config.database_path())?;
    info!(path = %config.database_path().display(), "YoreiService initialized");
    Ok(Self {
      config: config.clone(),
      store,
      graph: GraphBuilder::new(tokenizer),
      dictionary_manager: None,
    })
  }

  /// 取り込み元を 1 回分ストアへ書き込む。
  ///
  /// ステージは取り込み元の既定（コーパスなら再利用 + 参照リスト）に従う。
  /// メディアは取り込み元と `import.media_dir` の両方があるときだけコピーする。
  pub fn import(&self, source: &dyn ImportSource) -> YoreiResult<ImportReport> {
    let mut pipeline = ImportPipeline::new(&self.store, self.graph.clone())
      .with_batch_commit_size(self.config.batch_commit_size())
      .with_options(source.default_options(), self.config.reference_list_id());
    if let (Some(from), Some(to)) = (source.media_dir(), self.config.media_dir()) {
      pipeline = pipeline.with_media(MediaCopier::new(from, to));
    }

    let report = pipeline.run(source)?;
    info!(
      libraries_created = report.libraries_created,
      libraries_updated = report.libraries_updated,
      entries = report.entries,
      usage_examples = report.usage_examples_created,
      duplicates = report.usage_examples_duplicate,
      "Import completed"
    );
    Ok(report)
  }

  /// 用例を検索する（希少度順、`limit` は `search.max_limit` で丸める）。
  pub fn search(&self, query: &str, mode: SearchMode, limit: Option<usize>, offset: usize) -> YoreiResult<UeResultList> {
    Ok(self.engine().search(query, mode, limit, offset)?)
  }

  /// 見出し語が一致する項目を検索する。
  pub fn lookup_entries(&self, query: &str, limit: Option<usize>, offset: usize) -> YoreiResult<EntryResultList> {
    Ok(self.engine().lookup_entries(query, limit, offset)?)
  }

  /// 項目の定義ツリーを返す。
  pub fn definition_tree(&self, entry_id: EntryId) -> YoreiResult<DefinitionTree> {
    Ok(DefinitionTree::new(self.store.definitions_of_entry(entry_id)?))
  }

  /// 別スレッドで検索するためのディスパッチャを返す。
  pub fn async_lookup(&self) -> AsyncLookup {
    AsyncLookup::new(
      self.config.database_path(),
      self.config.default_search_limit(),
      self.config.max_search_limit(),
    )
  }

  fn engine(&self) -> LookupEngine<'_> {
    LookupEngine::new(
      &self.store,
      self.config.default_search_limit(),
      self.config.max_search_limit(),
    )
  }

  // ===== アクセサ =====

  /// 設定を返す。
  pub fn config(&self) -> &YoreiConfig {
    &self.config
  }

  /// ストアへの参照を返す。
  pub fn store(&self) -> &Store {
    &self.store
  }

  /// 内部の DictionaryManager への参照を返す（`init` で構築した場合のみ）。
  pub fn dictionary_manager(&self) -> Option<&DictionaryManager> {
    self.dictionary_manager.as_ref()
  }
}

impl fmt::Debug for YoreiService {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("YoreiService")
      .field("database", &self.config.database_path())
      .field("has_dictionary", &self.dictionary_manager.is_some())
      .finish_non_exhaustive()
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// テストモジュール
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::errors::{ConfigError, YoreiError};
  use crate::importer::CorpusDocument;
  use crate::models::MorphemeType;
  use crate::tokenizer::LexiconTokenizer;

  // ─── テスト用ヘルパー関数 ───────────────────────────────────────────────────

  fn tokenizer() -> Arc<dyn MorphemeTokenizer> {
    Arc::new(
      LexiconTokenizer::new()
        .with_word("猫", "猫", "ねこ", MorphemeType::Noun)
        .with_word("が", "が", "が", MorphemeType::Particle)
        .with_word("好き", "好き", "すき", MorphemeType::Adjective),
    )
  }

  fn create_service() -> (tempfile::TempDir, YoreiService) {
    let temp_dir = tempfile::TempDir::new().expect("一時ディレクトリ作成失敗");
    let config = YoreiConfig::with_database(temp_dir.path().join("yorei.sqlite"));
    let service = YoreiService::with_tokenizer(&config, tokenizer()).expect("YoreiService 初期化失敗");
    (temp_dir, service)
  }

  // ─── 初期化テスト ──────────────────────────────────────────────────────────

  #[test]
  fn service_initializes_with_injected_tokenizer() {
    let (temp_dir, service) = create_service();
    assert!(temp_dir.path().join("yorei.sqlite").exists());
    assert!(service.dictionary_manager().is_none());
  }

  #[test]
  fn service_rejects_invalid_config() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let mut config = YoreiConfig::with_database(temp_dir.path().join("yorei.sqlite"));
    config.search.default_limit = 0;

    let err = YoreiService::with_tokenizer(&config, tokenizer()).unwrap_err();
    assert!(matches!(err, YoreiError::Config(ConfigError::InvalidSearchDefaultLimit { .. })));
  }

  // ─── 取り込み・検索テスト ──────────────────────────────────────────────────

  #[test]
  fn corpus_import_is_searchable_by_morpheme() {
    let (_temp_dir, service) = create_service();
    let corpus = CorpusDocument::from_json_str(
      r#"{"deck": "Core", "notes": [{"fields": {"Expression": "猫が好き", "Meaning": "I like cats"}}]}"#,
    )
    .unwrap();

    let report = service.import(&corpus).unwrap();
    assert_eq!(report.usage_examples_created, 1);

    let results = service.search("猫", SearchMode::Expression, None, 0).unwrap();
    assert_eq!(results.total, 1);
    let first = &results.results[0];
    assert_eq!(first.expression(), "猫が好き");
    assert_eq!(first.meaning(), Some("I like cats"));
    assert_eq!(first.source_line(), "Corpus Core");
  }

  #[test]
  fn async_lookup_targets_the_service_database() {
    let (temp_dir, service) = create_service();
    assert_eq!(service.async_lookup().db_path(), temp_dir.path().join("yorei.sqlite"));
  }
}
