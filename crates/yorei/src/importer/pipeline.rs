//! Import pipeline: stages, base builder and transaction policy behind one visitor.

use tracing::{debug, info, warn};

use crate::errors::{ImportError, ImportResult};
use crate::importer::builder::DictionaryBuilder;
use crate::importer::context::ImportContext;
use crate::importer::events::{EventKind, ImportEvent};
use crate::importer::graph_builder::GraphBuilder;
use crate::importer::media::MediaCopier;
use crate::importer::report::ImportReport;
use crate::importer::sources::ImportSource;
use crate::importer::stages::{ImportStage, LibraryUpsertStage, ReferenceListStage, StageFlow};
use crate::importer::visitor::ImportVisitor;
use crate::models::{Extra, LibraryType, REFERENCE_LIST_ID, UeListId};
use crate::store::Store;

/// Completed top-level records between two commits when not configured.
pub const DEFAULT_BATCH_COMMIT_SIZE: usize = 1000;

/// Which optional stages an import runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportOptions {
  /// Reuse a library with the same name
  pub upsert_library: bool,
  /// Link usage examples into the reference list and maintain `expr_count`
  pub reference_list: bool,
}

/// Visitor that writes a traversal into the store.
///
/// Owns one transaction: `BEGIN` on the first event, `COMMIT` + `BEGIN` every
/// `batch_commit_size` completed top-level records (after every stage's
/// [`ImportStage::on_batch_commit`]), `COMMIT` on `finish`. Any error rolls
/// the open transaction back and fails every later event.
pub struct ImportPipeline<'s> {
  ctx: ImportContext<'s>,
  builder: DictionaryBuilder,
  stages: Vec<Box<dyn ImportStage>>,
  batch_commit_size: usize,
  completed_records: usize,
  in_transaction: bool,
  finished: bool,
  failed: Option<ImportError>,
}

impl<'s> ImportPipeline<'s> {
  /// Pipeline with no stages.
  pub fn new(store: &'s Store, graph: GraphBuilder) -> Self {
    Self {
      ctx: ImportContext::new(store, graph),
      builder: DictionaryBuilder,
      stages: Vec::new(),
      batch_commit_size: DEFAULT_BATCH_COMMIT_SIZE,
      completed_records: 0,
      in_transaction: false,
      finished: false,
      failed: None,
    }
  }

  /// Commit interval in completed top-level records (at least 1).
  pub fn with_batch_commit_size(mut self, size: usize) -> Self {
    self.batch_commit_size = size.max(1);
    self
  }

  /// Copies media of new usage examples.
  pub fn with_media(mut self, copier: MediaCopier) -> Self {
    self.ctx.media = Some(copier);
    self
  }

  /// Appends a stage; stages run in insertion order.
  pub fn with_stage(mut self, stage: Box<dyn ImportStage>) -> Self {
    self.stages.push(stage);
    self
  }

  /// Appends the stages `options` enables, upsert first.
  pub fn with_options(self, options: ImportOptions, reference_list_id: UeListId) -> Self {
    let mut pipeline = self;
    if options.upsert_library {
      pipeline = pipeline.with_stage(Box::new(LibraryUpsertStage));
    }
    if options.reference_list {
      pipeline = pipeline.with_stage(Box::new(ReferenceListStage::new(reference_list_id)));
    }
    pipeline
  }

  /// Pipeline configured for `source`, targeting the default reference list.
  pub fn for_source(store: &'s Store, graph: GraphBuilder, source: &dyn ImportSource) -> Self {
    Self::new(store, graph).with_options(source.default_options(), REFERENCE_LIST_ID)
  }

  /// Shared context, for inspection.
  pub fn context(&self) -> &ImportContext<'s> {
    &self.ctx
  }

  /// Report so far.
  pub fn report(&self) -> &ImportReport {
    self.ctx.report()
  }

  /// Whether `finish` was processed.
  pub fn is_finished(&self) -> bool {
    self.finished
  }

  /// Traverses `source` into the store and returns the report.
  pub fn run(mut self, source: &dyn ImportSource) -> ImportResult<ImportReport> {
    source.traverse(&mut self)?;
    if !self.finished {
      return Err(ImportError::Protocol {
        event: EventKind::Finish.name(),
        reason: "traversal ended without finish",
      });
    }
    Ok(self.ctx.report.clone())
  }

  fn dispatch(&mut self, event: ImportEvent<'_>) -> ImportResult<()> {
    if let Some(err) = &self.failed {
      return Err(err.clone());
    }
    match self.process(&event) {
      Ok(()) => Ok(()),
      Err(err) => {
        warn!(event = event.kind().name(), error = %err, "Import failed, rolling back");
        self.abort();
        self.failed = Some(err.clone());
        Err(err)
      }
    }
  }

  fn process(&mut self, event: &ImportEvent<'_>) -> ImportResult<()> {
    let kind = event.kind();
    if self.finished {
      return Err(ImportError::Protocol {
        event: kind.name(),
        reason: "import already finished",
      });
    }
    if !self.in_transaction {
      self.ctx.store.begin()?;
      self.in_transaction = true;
    }

    let mut consumed = false;
    for stage in self.stages.iter_mut().filter(|stage| stage.intercepts(kind)) {
      if stage.before(&mut self.ctx, event)? == StageFlow::Consumed {
        debug!(stage = stage.name(), event = kind.name(), "Event consumed");
        consumed = true;
        break;
      }
    }
    if !consumed {
      self.builder.apply(&mut self.ctx, event)?;
    }
    for stage in self.stages.iter_mut().filter(|stage| stage.intercepts(kind)) {
      stage.after(&mut self.ctx, event)?;
    }

    match kind {
      EventKind::Finish => {
        self.ctx.store.commit()?;
        self.in_transaction = false;
        self.finished = true;
        let report = &self.ctx.report;
        info!(
          entries = report.entries,
          definitions = report.definitions,
          usage_examples = report.usage_examples_created,
          duplicates = report.usage_examples_duplicate,
          "Import finished"
        );
      }
      EventKind::CloseDefinition | EventKind::CloseUsageExample if self.ctx.definitions.is_empty() => {
        self.completed_records += 1;
        if self.completed_records % self.batch_commit_size == 0 {
          for stage in self.stages.iter_mut() {
            stage.on_batch_commit(&mut self.ctx)?;
          }
          self.ctx.store.commit()?;
          self.ctx.store.begin()?;
          debug!(records = self.completed_records, "Batch committed");
        }
      }
      _ => {}
    }
    Ok(())
  }

  fn abort(&mut self) {
    if self.in_transaction {
      if let Err(e) = self.ctx.store.rollback() {
        warn!(error = %e, "Rollback failed");
      }
      self.in_transaction = false;
    }
  }
}

impl Drop for ImportPipeline<'_> {
  fn drop(&mut self) {
    self.abort();
  }
}

impl std::fmt::Debug for ImportPipeline<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ImportPipeline")
      .field("stages", &self.stages.iter().map(|s| s.name()).collect::<Vec<_>>())
      .field("batch_commit_size", &self.batch_commit_size)
      .field("completed_records", &self.completed_records)
      .field("finished", &self.finished)
      .finish()
  }
}

impl ImportVisitor for ImportPipeline<'_> {
  fn open_library(&mut self, kind: LibraryType) -> ImportResult<()> {
    self.dispatch(ImportEvent::OpenLibrary { kind })
  }
  fn library_name(&mut self, name: &str) -> ImportResult<()> {
    self.dispatch(ImportEvent::LibraryName(name))
  }
  fn library_alias(&mut self, alias: &str) -> ImportResult<()> {
    self.dispatch(ImportEvent::LibraryAlias(alias))
  }
  fn library_dump_version(&mut self, version: &str) -> ImportResult<()> {
    self.dispatch(ImportEvent::LibraryDumpVersion(version))
  }
  fn library_convert_version(&mut self, version: &str) -> ImportResult<()> {
    self.dispatch(ImportEvent::LibraryConvertVersion(version))
  }
  fn library_date(&mut self, date: &str) -> ImportResult<()> {
    self.dispatch(ImportEvent::LibraryDate(date))
  }
  fn library_extra(&mut self, extra: &Extra) -> ImportResult<()> {
    self.dispatch(ImportEvent::LibraryExtra(extra))
  }
  fn finish_library(&mut self) -> ImportResult<()> {
    self.dispatch(ImportEvent::FinishLibrary)
  }

  fn open_entry(&mut self, number: Option<i64>) -> ImportResult<()> {
    self.dispatch(ImportEvent::OpenEntry { number })
  }
  fn entry_format(&mut self, format: &str) -> ImportResult<()> {
    self.dispatch(ImportEvent::EntryFormat(format))
  }
  fn entry_kana_raw(&mut self, kana: &[String]) -> ImportResult<()> {
    self.dispatch(ImportEvent::EntryKanaRaw(kana))
  }
  fn entry_kanji_raw(&mut self, kanji: &[String]) -> ImportResult<()> {
    self.dispatch(ImportEvent::EntryKanjiRaw(kanji))
  }
  fn entry_accent(&mut self, accent: &str) -> ImportResult<()> {
    self.dispatch(ImportEvent::EntryAccent(accent))
  }
  fn entry_extra(&mut self, extra: &Extra) -> ImportResult<()> {
    self.dispatch(ImportEvent::EntryExtra(extra))
  }
  fn construct_entry(&mut self) -> ImportResult<()> {
    self.dispatch(ImportEvent::ConstructEntry)
  }
  fn entry_kana(&mut self, kana: &[String]) -> ImportResult<()> {
    self.dispatch(ImportEvent::EntryKana(kana))
  }
  fn entry_kanji(&mut self, kanji: &[String]) -> ImportResult<()> {
    self.dispatch(ImportEvent::EntryKanji(kanji))
  }

  fn open_definition(&mut self, number: Option<i64>) -> ImportResult<()> {
    self.dispatch(ImportEvent::OpenDefinition { number })
  }
  fn definition_group(&mut self, group: &str) -> ImportResult<()> {
    self.dispatch(ImportEvent::DefinitionGroup(group))
  }
  fn definition_text(&mut self, text: &str) -> ImportResult<()> {
    self.dispatch(ImportEvent::DefinitionText(text))
  }
  fn definition_extra(&mut self, extra: &Extra) -> ImportResult<()> {
    self.dispatch(ImportEvent::DefinitionExtra(extra))
  }
  fn construct_definition(&mut self) -> ImportResult<()> {
    self.dispatch(ImportEvent::ConstructDefinition)
  }
  fn finish_definition_associations(&mut self) -> ImportResult<()> {
    self.dispatch(ImportEvent::FinishDefinitionAssociations)
  }
  fn close_definition(&mut self) -> ImportResult<()> {
    self.dispatch(ImportEvent::CloseDefinition)
  }

  fn open_usage_example(&mut self, ue_type: Option<&str>) -> ImportResult<()> {
    self.dispatch(ImportEvent::OpenUsageExample { ue_type })
  }
  fn usage_example_expression(&mut self, expression: &str) -> ImportResult<()> {
    self.dispatch(ImportEvent::UsageExampleExpression(expression))
  }
  fn usage_example_reading(&mut self, reading: &str) -> ImportResult<()> {
    self.dispatch(ImportEvent::UsageExampleReading(reading))
  }
  fn usage_example_meaning(&mut self, meaning: &str) -> ImportResult<()> {
    self.dispatch(ImportEvent::UsageExampleMeaning(meaning))
  }
  fn usage_example_sound(&mut self, sound: &str) -> ImportResult<()> {
    self.dispatch(ImportEvent::UsageExampleSound(sound))
  }
  fn usage_example_image(&mut self, image: &str) -> ImportResult<()> {
    self.dispatch(ImportEvent::UsageExampleImage(image))
  }
  fn usage_example_extra(&mut self, extra: &Extra) -> ImportResult<()> {
    self.dispatch(ImportEvent::UsageExampleExtra(extra))
  }
  fn usage_example_validated(&mut self, validated: bool) -> ImportResult<()> {
    self.dispatch(ImportEvent::UsageExampleValidated(validated))
  }
  fn close_usage_example(&mut self, number: Option<i64>) -> ImportResult<()> {
    self.dispatch(ImportEvent::CloseUsageExample { number })
  }

  fn finish(&mut self) -> ImportResult<()> {
    self.dispatch(ImportEvent::Finish)
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test Module
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::models::{MorphemeType, REFERENCE_LIST_ID};
  use crate::tokenizer::LexiconTokenizer;

  // ─── Test Helpers ───

  fn graph() -> GraphBuilder {
    let tokenizer = LexiconTokenizer::new()
      .with_word("先生", "先生", "せんせい", MorphemeType::Noun)
      .with_word("猫", "猫", "ねこ", MorphemeType::Noun)
      .with_word("が", "が", "が", MorphemeType::Particle)
      .with_word("来た", "来る", "きた", MorphemeType::Verb);
    GraphBuilder::new(Arc::new(tokenizer))
  }

  fn count(store: &Store, table: &str) -> i64 {
    store
      .connection()
      .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
      .unwrap()
  }

  fn open_library(pipeline: &mut ImportPipeline<'_>, kind: LibraryType, name: &str) {
    pipeline.open_library(kind).unwrap();
    pipeline.library_name(name).unwrap();
    pipeline.finish_library().unwrap();
  }

  fn corpus_example(pipeline: &mut ImportPipeline<'_>, text: &str) {
    pipeline.open_usage_example(None).unwrap();
    pipeline.usage_example_expression(text).unwrap();
    pipeline.close_usage_example(None).unwrap();
  }

  /// One entry with a root definition, a child definition and one example on each.
  fn nested_entry(pipeline: &mut ImportPipeline<'_>) {
    pipeline.open_entry(Some(1)).unwrap();
    pipeline.construct_entry().unwrap();
    pipeline.entry_kana(&["せんせい".to_string()]).unwrap();
    pipeline.entry_kanji(&["先生".to_string()]).unwrap();

    pipeline.open_definition(Some(1)).unwrap();
    pipeline.definition_text("教える人").unwrap();
    pipeline.construct_definition().unwrap();
    pipeline.open_usage_example(Some("sentence")).unwrap();
    pipeline.usage_example_expression("先生が来た").unwrap();
    pipeline.close_usage_example(None).unwrap();
    pipeline.finish_definition_associations().unwrap();

    pipeline.open_definition(Some(2)).unwrap();
    pipeline.definition_text("医者").unwrap();
    pipeline.construct_definition().unwrap();
    pipeline.open_usage_example(None).unwrap();
    pipeline.usage_example_expression("先生").unwrap();
    pipeline.close_usage_example(Some(5)).unwrap();
    pipeline.finish_definition_associations().unwrap();
    pipeline.close_definition().unwrap();

    pipeline.close_definition().unwrap();
  }

  // ─────────────────────────────────────────────────────────────────────────

  #[test]
  fn definition_stack_parents_children() {
    let store = Store::open_in_memory().unwrap();
    let mut pipeline = ImportPipeline::new(&store, graph());
    open_library(&mut pipeline, LibraryType::Dictionary, "辞書");
    nested_entry(&mut pipeline);
    pipeline.finish().unwrap();
    drop(pipeline);

    let entry_id = store.connection().query_row("SELECT id FROM entries", [], |row| row.get(0)).unwrap();
    let definitions = store.definitions_of_entry(entry_id).unwrap();
    assert_eq!(definitions.len(), 2);
    assert_eq!(definitions[0].parent_id, None);
    assert_eq!(definitions[1].parent_id, Some(definitions[0].id));

    let number: i64 = store
      .connection()
      .query_row(
        "SELECT number FROM definition_has_ues WHERE definition_id = ?1",
        [definitions[1].id.get()],
        |row| row.get(0),
      )
      .unwrap();
    assert_eq!(number, 5);
  }

  #[test]
  fn base_builder_does_not_link_reference_list() {
    let store = Store::open_in_memory().unwrap();
    let mut pipeline = ImportPipeline::new(&store, graph());
    open_library(&mut pipeline, LibraryType::Corpus, "deck");
    corpus_example(&mut pipeline, "猫が来た");
    pipeline.finish().unwrap();
    drop(pipeline);

    assert_eq!(count(&store, "usage_examples"), 1);
    assert_eq!(count(&store, "ue_part_of_list"), 0);
    assert_eq!(store.find_morpheme("猫", MorphemeType::Noun).unwrap().unwrap().expr_count, None);
  }

  #[test]
  fn reference_stage_alone_links_and_counts() {
    let store = Store::open_in_memory().unwrap();
    let mut pipeline = ImportPipeline::new(&store, graph())
      .with_options(ImportOptions { upsert_library: false, reference_list: true }, REFERENCE_LIST_ID);
    open_library(&mut pipeline, LibraryType::Corpus, "deck");
    corpus_example(&mut pipeline, "猫が来た");
    corpus_example(&mut pipeline, "猫が来た");
    pipeline.finish().unwrap();
    assert_eq!(pipeline.report().usage_examples_duplicate, 1);
    drop(pipeline);

    assert_eq!(count(&store, "ue_part_of_list"), 1);
    assert_eq!(store.find_morpheme("猫", MorphemeType::Noun).unwrap().unwrap().expr_count, Some(1));
  }

  #[test]
  fn upsert_stage_alone_reuses_library_by_name() {
    let store = Store::open_in_memory().unwrap();
    for _ in 0..2 {
      let mut pipeline = ImportPipeline::new(&store, graph())
        .with_options(ImportOptions { upsert_library: true, reference_list: false }, REFERENCE_LIST_ID);
      open_library(&mut pipeline, LibraryType::Corpus, "deck");
      corpus_example(&mut pipeline, "猫");
      pipeline.finish().unwrap();
    }

    assert_eq!(count(&store, "libraries"), 1);
    assert_eq!(count(&store, "usage_examples"), 1);
    let date: Option<String> = store.connection().query_row("SELECT date FROM libraries", [], |row| row.get(0)).unwrap();
    assert_eq!(date.map(|d| d.len()), Some(10));
  }

  #[test]
  fn without_upsert_each_run_creates_a_library() {
    let store = Store::open_in_memory().unwrap();
    for _ in 0..2 {
      let mut pipeline = ImportPipeline::new(&store, graph());
      open_library(&mut pipeline, LibraryType::Corpus, "deck");
      pipeline.finish().unwrap();
    }
    assert_eq!(count(&store, "libraries"), 2);
  }

  #[test]
  fn protocol_violation_rolls_back_and_poisons() {
    let store = Store::open_in_memory().unwrap();
    let mut pipeline = ImportPipeline::new(&store, graph());
    open_library(&mut pipeline, LibraryType::Dictionary, "辞書");
    pipeline.open_entry(None).unwrap();
    pipeline.construct_entry().unwrap();

    let err = pipeline.construct_definition().unwrap_err();
    assert!(matches!(err, ImportError::Protocol { event: "construct-definition", .. }));
    assert!(pipeline.finish().is_err());
    drop(pipeline);

    assert!(!store.in_transaction());
    assert_eq!(count(&store, "libraries"), 0);
    assert_eq!(count(&store, "entries"), 0);
  }

  #[test]
  fn entries_require_a_finished_library() {
    let store = Store::open_in_memory().unwrap();
    let mut pipeline = ImportPipeline::new(&store, graph());
    pipeline.open_library(LibraryType::Dictionary).unwrap();
    assert!(matches!(pipeline.open_entry(None), Err(ImportError::Protocol { .. })));
  }

  #[test]
  fn batch_commit_flushes_staged_frequency() {
    let store = Store::open_in_memory().unwrap();
    let mut pipeline = ImportPipeline::new(&store, graph())
      .with_options(ImportOptions { upsert_library: false, reference_list: true }, REFERENCE_LIST_ID)
      .with_batch_commit_size(1);
    open_library(&mut pipeline, LibraryType::Corpus, "deck");
    corpus_example(&mut pipeline, "猫が来た");
    assert_eq!(pipeline.report().frequency_rows, 3);

    // nothing pending is lost with the pipeline
    drop(pipeline);
    assert_eq!(count(&store, "ue_part_of_list"), 1);
    assert_eq!(store.find_morpheme("猫", MorphemeType::Noun).unwrap().unwrap().expr_count, Some(1));
  }

  #[test]
  fn batches_commit_completed_records() {
    let store = Store::open_in_memory().unwrap();
    let mut pipeline = ImportPipeline::new(&store, graph()).with_batch_commit_size(2);
    open_library(&mut pipeline, LibraryType::Corpus, "deck");
    corpus_example(&mut pipeline, "猫");
    corpus_example(&mut pipeline, "先生");
    corpus_example(&mut pipeline, "猫が来た");

    // the first two are committed; dropping the pipeline discards the third
    drop(pipeline);
    assert_eq!(count(&store, "usage_examples"), 2);
  }
}
