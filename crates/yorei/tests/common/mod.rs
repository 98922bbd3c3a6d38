//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use yorei::YoreiConfig;
use yorei::YoreiService;
use yorei::importer::{CorpusDocument, DictionaryDocument, GraphBuilder};
use yorei::models::MorphemeType;
use yorei::store::Store;
use yorei::tokenizer::LexiconTokenizer;

/// Small lexicon covering every fixture sentence.
pub fn lexicon() -> LexiconTokenizer {
  LexiconTokenizer::new()
    .with_word("先生", "先生", "せんせい", MorphemeType::Noun)
    .with_word("が", "が", "が", MorphemeType::Particle)
    .with_word("は", "は", "は", MorphemeType::Particle)
    .with_word("の", "の", "の", MorphemeType::Particle)
    .with_word("来た", "来る", "きた", MorphemeType::Verb)
    .with_word("猫", "猫", "ねこ", MorphemeType::Noun)
    .with_word("犬", "犬", "いぬ", MorphemeType::Noun)
    .with_word("好き", "好き", "すき", MorphemeType::Adjective)
    .with_word("面白い", "面白い", "おもしろい", MorphemeType::Adjective)
    .with_word("映画", "映画", "えいが", MorphemeType::Noun)
    .with_word("教える", "教える", "おしえる", MorphemeType::Verb)
    .with_word("人", "人", "ひと", MorphemeType::Noun)
    .with_word("医者", "医者", "いしゃ", MorphemeType::Noun)
    .with_word("生えた", "生える", "はえた", MorphemeType::Verb)
    .with_word("黴", "黴", "かび", MorphemeType::Noun)
}

/// Graph builder over [`lexicon`].
pub fn graph() -> GraphBuilder {
  GraphBuilder::new(Arc::new(lexicon()))
}

/// Fresh in-memory store.
pub fn memory_store() -> Store {
  Store::open_in_memory().expect("in-memory store")
}

/// Service over a database file in `dir`, driven by [`lexicon`].
pub fn service_in(dir: &Path) -> YoreiService {
  service_with(YoreiConfig::with_database(dir.join("yorei.sqlite")))
}

/// Service for an explicit configuration, driven by [`lexicon`].
pub fn service_with(config: YoreiConfig) -> YoreiService {
  YoreiService::with_tokenizer(&config, Arc::new(lexicon())).expect("service")
}

/// Two entries: 先生 with a nested definition, 面白い with one example.
pub const DICTIONARY_JSON: &str = r#"{
  "library": {"name": "テスト辞典", "alias": "TJ"},
  "entries": [
    {
      "kana": ["せんせい"],
      "kanji": ["先生"],
      "definition": {
        "number": 1,
        "text": "教える人",
        "usage_examples": [{"expression": "先生が来た", "meaning": "The teacher came."}],
        "definitions": [
          {"number": 1, "text": "医者", "usage_examples": [{"expression": "面白い先生"}]}
        ]
      }
    },
    {
      "kana": ["おもしろい"],
      "kanji": ["面白い"],
      "definition": {"number": 1, "text": "楽しい", "usage_examples": [{"expression": "面白い", "type": "phrase"}]}
    }
  ]
}"#;

/// Parsed [`DICTIONARY_JSON`].
pub fn dictionary() -> DictionaryDocument {
  DictionaryDocument::from_json_str(DICTIONARY_JSON).expect("dictionary fixture")
}

/// Corpus deck named `deck` holding one note per expression.
pub fn corpus(deck: &str, expressions: &[&str]) -> CorpusDocument {
  let notes: Vec<serde_json::Value> = expressions
    .iter()
    .map(|expression| serde_json::json!({"fields": {"Expression": expression}}))
    .collect();
  let json = serde_json::json!({"deck": deck, "notes": notes});
  CorpusDocument::from_json_str(&json.to_string()).expect("corpus fixture")
}

/// `SELECT COUNT(*) FROM <table>`.
pub fn count_rows(store: &Store, table: &str) -> i64 {
  store
    .connection()
    .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
    .expect("count query")
}
