//! Import integration tests
//!
//! Dictionary and corpus documents are imported through the full pipeline with a lexicon
//! tokenizer, then the store is inspected directly.

mod common;

use std::fs;

use yorei::YoreiConfig;
use yorei::errors::{ImportError, YoreiError};
use yorei::importer::{CorpusDocument, DictionaryDocument, ImportPipeline, ImportVisitor, ReferenceListStage};
use yorei::models::{ELISION_ENTRY_FORMAT, EntryId, LibraryType, MorphemeType, REFERENCE_LIST_ID};

use common::{corpus, count_rows, dictionary, graph, memory_store, service_in, service_with};

// ─── Identity and idempotence ─────────────────────────────────────────

#[test]
fn reimporting_converges_on_the_same_rows() {
  let store = memory_store();
  let source = corpus("Core", &["猫が好き", "先生が来た"]);

  let first = ImportPipeline::for_source(&store, graph(), &source).run(&source).unwrap();
  let expressions = count_rows(&store, "expressions");
  let morphemes = count_rows(&store, "morphemes");
  let compositions = count_rows(&store, "expression_consists_of");

  let second = ImportPipeline::for_source(&store, graph(), &source).run(&source).unwrap();

  assert_eq!(first.usage_examples_created, 2);
  assert_eq!(second.usage_examples_created, 0);
  assert_eq!(second.usage_examples_duplicate, 2);
  assert_eq!(second.libraries_updated, 1);
  assert_eq!(count_rows(&store, "expressions"), expressions);
  assert_eq!(count_rows(&store, "morphemes"), morphemes);
  assert_eq!(count_rows(&store, "expression_consists_of"), compositions);
  assert_eq!(count_rows(&store, "libraries"), 1);
}

#[test]
fn shared_expression_text_is_stored_once() {
  let store = memory_store();
  let dict = dictionary();
  ImportPipeline::for_source(&store, graph(), &dict).run(&dict).unwrap();
  let deck = corpus("Core", &["面白い"]);
  ImportPipeline::for_source(&store, graph(), &deck).run(&deck).unwrap();

  let expression = store.find_expression("面白い").unwrap().expect("expression row");
  let owners: Vec<i64> = store
    .connection()
    .prepare("SELECT library_id FROM usage_examples WHERE expression_id = ?1 ORDER BY library_id")
    .unwrap()
    .query_map([expression.id.get()], |row| row.get(0))
    .unwrap()
    .collect::<Result<_, _>>()
    .unwrap();
  assert_eq!(owners.len(), 2);
  assert_ne!(owners[0], owners[1]);
}

#[test]
fn composition_spans_cover_the_expression_text() {
  let store = memory_store();
  let deck = corpus("Core", &["先生が来た。"]);
  ImportPipeline::for_source(&store, graph(), &deck).run(&deck).unwrap();

  let expression = store.find_expression("先生が来た。").unwrap().unwrap();
  let chars: Vec<char> = expression.text.chars().collect();
  let spans = store.expression_compositions(expression.id).unwrap();

  // 。 is a symbol and skipped by default
  assert_eq!(spans.len(), 3);
  for span in &spans {
    let literal: String = chars[span.position..span.position + span.length].iter().collect();
    assert_eq!(literal, span.conjugation);
  }
  let verb = store.find_morpheme("来る", MorphemeType::Verb).unwrap();
  assert!(verb.is_some(), "verbs are stored by base form");
}

// ─── Reference list and frequency ───────────────────────────────────

#[test]
fn new_reference_example_counts_its_morpheme_once() {
  let store = memory_store();
  let deck = corpus("Core", &["猫"]);
  ImportPipeline::for_source(&store, graph(), &deck).run(&deck).unwrap();

  let cat = store.find_morpheme("猫", MorphemeType::Noun).unwrap().unwrap();
  assert_eq!(cat.expr_count, Some(1));
  assert_eq!(store.list_members(REFERENCE_LIST_ID).unwrap().len(), 1);

  // a second deck with the same sentence adds a member but not a count
  let other = corpus("Extra", &["猫"]);
  ImportPipeline::for_source(&store, graph(), &other).run(&other).unwrap();
  let cat = store.find_morpheme("猫", MorphemeType::Noun).unwrap().unwrap();
  assert_eq!(cat.expr_count, Some(1));
  assert_eq!(store.list_members(REFERENCE_LIST_ID).unwrap().len(), 2);
}

#[test]
fn counts_grow_with_distinct_expressions() {
  let store = memory_store();
  let deck = corpus("Core", &["猫", "猫が好き", "猫が好き", "犬が好き"]);
  ImportPipeline::for_source(&store, graph(), &deck).run(&deck).unwrap();

  let count = |surface: &str, kind| store.find_morpheme(surface, kind).unwrap().unwrap().expr_count;
  assert_eq!(count("猫", MorphemeType::Noun), Some(2));
  assert_eq!(count("好き", MorphemeType::Adjective), Some(2));
  assert_eq!(count("犬", MorphemeType::Noun), Some(1));
}

#[test]
fn dictionary_examples_stay_out_of_the_reference_list_by_default() {
  let store = memory_store();
  let dict = dictionary();
  let report = ImportPipeline::for_source(&store, graph(), &dict).run(&dict).unwrap();

  assert_eq!(report.entries, 2);
  assert_eq!(report.usage_examples_created, 3);
  assert!(store.list_members(REFERENCE_LIST_ID).unwrap().is_empty());
  let sensei = store.find_morpheme("先生", MorphemeType::Noun).unwrap().unwrap();
  assert_eq!(sensei.expr_count, None);
}

#[test]
fn reference_stage_composes_with_a_dictionary_import() {
  let store = memory_store();
  let dict = dictionary();
  ImportPipeline::new(&store, graph())
    .with_stage(Box::new(ReferenceListStage::new(REFERENCE_LIST_ID)))
    .run(&dict)
    .unwrap();

  assert_eq!(store.list_members(REFERENCE_LIST_ID).unwrap().len(), 3);
  // 先生が来た and 面白い先生
  let sensei = store.find_morpheme("先生", MorphemeType::Noun).unwrap().unwrap();
  assert_eq!(sensei.expr_count, Some(2));
}

#[test]
fn batch_commits_keep_counts_with_their_list_links() {
  let store = memory_store();
  let deck = corpus("Core", &["猫が好き", "犬が好き"]);

  // two records committed one by one, then the import dies
  {
    let mut pipeline = ImportPipeline::for_source(&store, graph(), &deck).with_batch_commit_size(1);
    pipeline.open_library(LibraryType::Corpus).unwrap();
    pipeline.library_name(&deck.library_name()).unwrap();
    pipeline.finish_library().unwrap();
    for text in ["猫が好き", "犬が好き"] {
      pipeline.open_usage_example(None).unwrap();
      pipeline.usage_example_expression(text).unwrap();
      pipeline.close_usage_example(None).unwrap();
    }
    assert!(pipeline.construct_definition().is_err());
  }

  assert_eq!(store.list_members(REFERENCE_LIST_ID).unwrap().len(), 2);
  let count = |surface: &str, kind| store.find_morpheme(surface, kind).unwrap().unwrap().expr_count;
  assert_eq!(count("猫", MorphemeType::Noun), Some(1));
  assert_eq!(count("好き", MorphemeType::Adjective), Some(2));

  // a full re-run neither loses nor double counts
  ImportPipeline::for_source(&store, graph(), &deck)
    .with_batch_commit_size(1)
    .run(&deck)
    .unwrap();
  assert_eq!(store.list_members(REFERENCE_LIST_ID).unwrap().len(), 2);
  assert_eq!(count("猫", MorphemeType::Noun), Some(1));
  assert_eq!(count("犬", MorphemeType::Noun), Some(1));
  assert_eq!(count("好き", MorphemeType::Adjective), Some(2));
}

// ─── Dictionary structure ───────────────────────────────────────────

#[test]
fn definitions_form_a_tree_under_their_entry() {
  let store = memory_store();
  let dict = dictionary();
  ImportPipeline::for_source(&store, graph(), &dict).run(&dict).unwrap();

  assert!(store.find_morpheme("せんせい", MorphemeType::KanaEntry).unwrap().is_some());
  assert!(store.find_morpheme("先生", MorphemeType::KanjiEntry).unwrap().is_some());

  let definitions = store.definitions_of_entry(EntryId(1)).unwrap();
  assert_eq!(definitions.len(), 2);
  assert_eq!(definitions[0].parent_id, None);
  assert_eq!(definitions[1].parent_id, Some(definitions[0].id));
  assert_eq!(definitions[1].breadcrumb(), "(1) 医者");
}

#[test]
fn elided_headwords_are_expanded() {
  let store = memory_store();
  let dict = DictionaryDocument::from_json_str(&format!(
    r#"{{
      "library": {{"name": "国語辞典"}},
      "entries": [{{
        "format": "{ELISION_ENTRY_FORMAT}",
        "kana": ["あか-パンかび"],
        "kanji": ["赤―黴"],
        "definition": {{"text": "黴の一種", "usage_examples": [{{"expression": "―が生えた"}}]}}
      }}]
    }}"#
  ))
  .unwrap();
  let report = ImportPipeline::for_source(&store, graph(), &dict).run(&dict).unwrap();

  assert_eq!(report.headword_fallbacks, 0);
  assert!(store.find_morpheme("あかパンかび", MorphemeType::KanaEntry).unwrap().is_some());
  assert!(store.find_morpheme("赤パン黴", MorphemeType::KanjiEntry).unwrap().is_some());

  let entry = store.entry(EntryId(1)).unwrap();
  assert_eq!(entry.kana_raw, Some(vec!["あか-パンかび".to_string()]));
  assert_eq!(entry.breadcrumb(), "あか-パンかび[赤―黴]");

  // definition texts of elision entries are decomposed too
  let definitions = store.definitions_of_entry(entry.id).unwrap();
  assert!(!store.definition_compositions(definitions[0].id).unwrap().is_empty());
}

#[test]
fn invalid_document_commits_nothing() {
  let store = memory_store();
  let dict = DictionaryDocument::from_json_str(
    r#"{"library": {"name": "壊れた辞典"}, "entries": [{"kana": [], "kanji": []}]}"#,
  )
  .unwrap();

  let err = ImportPipeline::for_source(&store, graph(), &dict).run(&dict).unwrap_err();
  assert!(matches!(err, ImportError::InvalidSource { .. }));
  assert_eq!(count_rows(&store, "libraries"), 0);
}

// ─── Service and media ──────────────────────────────────────────────

#[test]
fn service_copies_media_of_new_examples() {
  let temp_dir = tempfile::TempDir::new().unwrap();
  let deck_media = temp_dir.path().join("deck.media");
  fs::create_dir_all(&deck_media).unwrap();
  fs::write(deck_media.join("neko.mp3"), b"mp3").unwrap();

  let mut config = YoreiConfig::with_database(temp_dir.path().join("yorei.sqlite"));
  config.import.media_dir = Some(temp_dir.path().join("media"));
  let service = service_with(config);

  let deck = CorpusDocument::from_json_str(
    r#"{
      "deck": "Audio",
      "mapping": {"expression": "Expression", "sound": "Audio"},
      "notes": [
        {"fields": {"Expression": "猫", "Audio": "[sound:neko.mp3]"}},
        {"fields": {"Expression": "犬", "Audio": "[sound:inu.mp3]"}}
      ]
    }"#,
  )
  .unwrap()
  .with_media_dir(&deck_media);

  let report = service.import(&deck).unwrap();
  assert_eq!(report.media_copied, 1);
  assert_eq!(report.media_missing, 1);
  assert!(temp_dir.path().join("media").join("neko.mp3").exists());
}

#[test]
fn service_wraps_import_errors() {
  let temp_dir = tempfile::TempDir::new().unwrap();
  let service = service_in(temp_dir.path());
  let deck = corpus("", &["猫"]);

  let err = service.import(&deck).unwrap_err();
  assert!(matches!(err, YoreiError::Import(ImportError::InvalidSource { .. })));
}
