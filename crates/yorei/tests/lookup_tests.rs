//! Lookup integration tests
//!
//! Imports fixtures into an on-disk store through [`yorei::YoreiService`] and queries
//! them through every lookup path.

mod common;

use std::sync::mpsc;

use yorei::definition_tree::HtmlTreeRenderer;
use yorei::furigana::Segment;
use yorei::importer::DictionaryDocument;
use yorei::lookup::{LookupRequest, QueryKind, classify};
use yorei::{SearchMode, YoreiService};

use common::{corpus, dictionary, service_in};

// ─── Test Helpers ─────────────────────────────────────────────────────

fn populated(dir: &std::path::Path) -> YoreiService {
  let service = service_in(dir);
  service.import(&dictionary()).unwrap();
  service
}

/// Dictionary whose only entry has the kanji headword spelled in kana.
fn kana_spelled_kanji() -> DictionaryDocument {
  DictionaryDocument::from_json_str(
    r#"{
      "library": {"name": "紛らわしい辞典"},
      "entries": [{
        "kana": ["べつのよみ"],
        "kanji": ["せんせい"],
        "definition": {"text": "罠", "usage_examples": [{"expression": "猫が来た"}]}
      }]
    }"#,
  )
  .unwrap()
}

// ─── Entry path ───────────────────────────────────────────────────────

#[test]
fn kanji_query_finds_entry_examples_with_provenance() {
  let temp_dir = tempfile::TempDir::new().unwrap();
  let service = populated(temp_dir.path());

  let results = service.search("先生", SearchMode::Entry, None, 0).unwrap();
  assert_eq!(results.total, 2);

  let came = results.iter().find(|r| r.expression() == "先生が来た").expect("先生が来た");
  assert_eq!(came.meaning(), Some("The teacher came."));
  assert_eq!(came.source_line(), "テスト辞典 → せんせい[先生] → (1) 教える人");
  assert_eq!(came.library_breadcrumbs(), vec!["テスト辞典".to_string()]);
}

#[test]
fn nested_definition_shows_its_ancestry_and_falls_back_as_meaning() {
  let temp_dir = tempfile::TempDir::new().unwrap();
  let service = populated(temp_dir.path());

  let results = service.search("先生", SearchMode::Entry, None, 0).unwrap();
  let nested = results.iter().find(|r| r.expression() == "面白い先生").expect("面白い先生");
  assert_eq!(nested.source_line(), "テスト辞典 → せんせい[先生] → (1) 教える人 → (1) 医者");
  assert_eq!(
    nested.definition_breadcrumbs(),
    vec!["(1) 教える人".to_string(), "(1) 医者".to_string()]
  );

  assert_eq!(nested.meaning(), None);
  assert_eq!(nested.meaning_for_view().as_deref(), Some("せんせい[先生]: 医者"));
  assert!(nested.to_html().contains("せんせい[先生]: 医者"));
}

#[test]
fn kana_query_uses_only_the_kana_headwords() {
  let temp_dir = tempfile::TempDir::new().unwrap();
  let service = populated(temp_dir.path());
  service.import(&kana_spelled_kanji()).unwrap();

  assert_eq!(classify("せんせい"), QueryKind::Kana);
  let results = service.search("せんせい", SearchMode::Entry, None, 0).unwrap();

  assert_eq!(results.total, 2);
  assert!(results.iter().all(|r| r.expression() != "猫が来た"));
  assert!(results.iter().all(|r| r.entry_breadcrumbs() == vec!["せんせい[先生]".to_string()]));
}

#[test]
fn unknown_and_blank_queries_are_empty() {
  let temp_dir = tempfile::TempDir::new().unwrap();
  let service = populated(temp_dir.path());

  assert_eq!(service.search("ねこ", SearchMode::Entry, None, 0).unwrap().total, 0);
  assert_eq!(service.search("   ", SearchMode::Entry, None, 0).unwrap().total, 0);
}

// ─── Expression and definition paths ────────────────────────────────

#[test]
fn expression_query_shows_furigana_for_sensei() {
  let temp_dir = tempfile::TempDir::new().unwrap();
  let service = service_in(temp_dir.path());
  service.import(&corpus("Core", &["先生"])).unwrap();

  let results = service.search("先生", SearchMode::Expression, None, 0).unwrap();
  assert_eq!(results.total, 1);

  let furigana = results.results[0].furigana();
  assert_eq!(
    furigana.segments,
    vec![Segment::Ruby {
      base: "先生".to_string(),
      reading: "せんせい".to_string()
    }]
  );
  assert_eq!(furigana.plain_text(), "先生");
  assert!(results.to_html().contains("<ruby>先生<rp>（</rp><rt>せんせい</rt><rp>）</rp></ruby>"));
}

#[test]
fn corpus_examples_list_every_linked_definition() {
  let temp_dir = tempfile::TempDir::new().unwrap();
  let service = populated(temp_dir.path());
  service.import(&corpus("Core", &["面白い"])).unwrap();

  let results = service.search("面白い", SearchMode::Expression, None, 0).unwrap();
  // 面白い (shared by both libraries) and 面白い先生
  assert_eq!(results.total, 3);
  let shared: Vec<_> = results.iter().filter(|r| r.expression() == "面白い").collect();
  assert_eq!(shared.len(), 2);
  assert!(shared.iter().any(|r| r.source_line() == "Corpus Core"));
}

#[test]
fn definition_query_reaches_elided_entries() {
  let temp_dir = tempfile::TempDir::new().unwrap();
  let service = service_in(temp_dir.path());
  let dict = DictionaryDocument::from_json_str(
    r#"{
      "library": {"name": "国語辞典"},
      "entries": [{
        "format": "J-J1",
        "kana": ["あか-パンかび"],
        "kanji": ["赤―黴"],
        "definition": {"number": 1, "text": "黴の一種", "usage_examples": [{"expression": "―が生えた"}]}
      }]
    }"#,
  )
  .unwrap();
  service.import(&dict).unwrap();

  let results = service.search("黴", SearchMode::Definition, None, 0).unwrap();
  assert_eq!(results.total, 1);
  assert_eq!(results.results[0].expression(), "―が生えた");
  assert_eq!(results.results[0].display_expression(), "赤パン黴が生えた");

  let by_headword = service.search("赤パン黴", SearchMode::Entry, None, 0).unwrap();
  assert_eq!(by_headword.total, 1);
}

// ─── Paging ───────────────────────────────────────────────────────────

#[test]
fn pages_partition_the_ranked_results() {
  let temp_dir = tempfile::TempDir::new().unwrap();
  let service = service_in(temp_dir.path());
  service
    .import(&corpus("Core", &["猫", "猫が好き", "猫は猫", "猫の映画", "猫が来た"]))
    .unwrap();

  let mut seen = Vec::new();
  let mut scores = Vec::new();
  for offset in [0, 2, 4] {
    let page = service.search("猫", SearchMode::Expression, Some(2), offset).unwrap();
    assert_eq!(page.total, 5);
    for result in &page {
      seen.push(result.id());
      scores.push(result.score());
    }
  }

  seen.sort();
  seen.dedup();
  assert_eq!(seen.len(), 5);
  assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]), "{scores:?}");
  assert!(service.search("猫", SearchMode::Expression, Some(2), 6).unwrap().is_empty());
}

#[test]
fn limit_is_clamped_to_the_maximum() {
  let temp_dir = tempfile::TempDir::new().unwrap();
  let mut config = yorei::YoreiConfig::with_database(temp_dir.path().join("yorei.sqlite"));
  config.search.default_limit = 1;
  config.search.max_limit = 2;
  let service = common::service_with(config);
  service.import(&corpus("Core", &["猫", "猫が好き", "猫の映画"])).unwrap();

  assert_eq!(service.search("猫", SearchMode::Expression, None, 0).unwrap().len(), 1);
  assert_eq!(service.search("猫", SearchMode::Expression, Some(50), 0).unwrap().len(), 2);
}

// ─── Entries and definition trees ───────────────────────────────────

#[test]
fn entry_lookup_and_definition_tree() {
  let temp_dir = tempfile::TempDir::new().unwrap();
  let service = populated(temp_dir.path());

  let entries = service.lookup_entries("せんせい", None, 0).unwrap();
  assert_eq!(entries.total, 1);
  let entry = &entries.entries[0];
  assert_eq!(entry.breadcrumb(), "せんせい[先生]");

  let tree = service.definition_tree(entry.id).unwrap();
  let html = HtmlTreeRenderer::render(&tree);
  let lines: Vec<&str> = html.split("<br/>").collect();
  assert_eq!(lines.len(), 2);
  assert!(lines[0].contains("教える人"));
  assert!(lines[1].starts_with("&nbsp;&nbsp;&nbsp;&nbsp;<span"));
}

// ─── Async dispatch ───────────────────────────────────────────────────

#[test]
fn async_lookup_delivers_the_latest_query() {
  let temp_dir = tempfile::TempDir::new().unwrap();
  let service = populated(temp_dir.path());
  let lookup = service.async_lookup();
  let (tx, rx) = mpsc::channel();

  let first_tx = tx.clone();
  let first = lookup
    .submit(LookupRequest::new("面白い", SearchMode::Entry), move |result| {
      let _ = first_tx.send(("first", result.map(|list| list.total)));
    })
    .unwrap();
  let second = lookup
    .submit(LookupRequest::new("先生", SearchMode::Entry), move |result| {
      let _ = tx.send(("second", result.map(|list| list.total)));
    })
    .unwrap();
  assert!(second.generation() > first.generation());

  let _ = first.join();
  assert!(second.join());

  let delivered: Vec<_> = rx.iter().collect();
  let (label, total) = delivered.last().cloned().expect("a delivery");
  assert_eq!(label, "second");
  assert_eq!(total.unwrap(), 2);
}

#[test]
fn cancelled_lookup_is_not_delivered() {
  let temp_dir = tempfile::TempDir::new().unwrap();
  let service = populated(temp_dir.path());
  let lookup = service.async_lookup();
  let generation = lookup.generation().advance();

  lookup.cancel();
  let mut delivered = false;
  assert!(!lookup.generation().deliver_if_current(generation, (), |_| delivered = true));
  assert!(!delivered);
}
