//! Composable import stages.
//!
//! A stage sees the events it intercepts before and after the base builder. Stages run
//! in the order they were added to the pipeline; a stage that consumes an event hides it
//! from the stages after it and from the builder, but every intercepting stage still gets
//! its `after` call.

use tracing::info;

use crate::errors::ImportResult;
use crate::importer::context::{IMPORT_VERSION, ImportContext};
use crate::importer::events::{EventKind, ImportEvent};
use crate::importer::frequency::FrequencyMaintainer;
use crate::models::{REFERENCE_LIST_NAME, UeListId, UeListType};

/// Outcome of [`ImportStage::before`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageFlow {
  /// Let the remaining stages and the builder handle the event
  Forward,
  /// The event is fully handled
  Consumed,
}

/// Hook around the base builder.
pub trait ImportStage: Send {
  /// Stage name for logs.
  fn name(&self) -> &'static str;

  /// Whether this stage wants to see `kind`.
  fn intercepts(&self, kind: EventKind) -> bool;

  /// Runs before the builder.
  fn before(&mut self, ctx: &mut ImportContext<'_>, event: &ImportEvent<'_>) -> ImportResult<StageFlow> {
    let _ = (ctx, event);
    Ok(StageFlow::Forward)
  }

  /// Runs after the builder.
  fn after(&mut self, ctx: &mut ImportContext<'_>, event: &ImportEvent<'_>) -> ImportResult<()> {
    let _ = (ctx, event);
    Ok(())
  }

  /// Runs right before the pipeline commits a batch. Work a stage holds back must reach
  /// the store here, inside the transaction being committed.
  fn on_batch_commit(&mut self, ctx: &mut ImportContext<'_>) -> ImportResult<()> {
    let _ = ctx;
    Ok(())
  }
}

fn today() -> String {
  chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Reuses a library with the same name instead of creating a duplicate.
///
/// Version fields are refreshed from the header; the date defaults to today.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibraryUpsertStage;

impl ImportStage for LibraryUpsertStage {
  fn name(&self) -> &'static str {
    "library-upsert"
  }

  fn intercepts(&self, kind: EventKind) -> bool {
    kind == EventKind::FinishLibrary
  }

  fn before(&mut self, ctx: &mut ImportContext<'_>, event: &ImportEvent<'_>) -> ImportResult<StageFlow> {
    let mut draft = ctx.take_library_draft(event.kind())?;
    if draft.date.is_none() {
      draft.date = Some(today());
    }
    let mut row = draft.to_new_library(None)?;
    let store = ctx.store();

    match store.find_library_id_by_name(&row.name)? {
      Some(id) => {
        let existing = store.library(id)?;
        row.id = Some(id);
        row.alias = row.alias.or(existing.alias);
        row.dump_version = row.dump_version.or(existing.dump_version);
        row.convert_version = row.convert_version.or(existing.convert_version);
        row.import_version = Some(IMPORT_VERSION.to_string());
        if row.extra.is_empty() {
          row.extra = existing.extra;
        }
        store.insert_or_replace_library(&row)?;
        ctx.set_library_id(id);
        ctx.report_mut().record_library_updated();
        info!(library = %row.name, id = %id, "Library reused");
      }
      None => {
        let id = store.insert_or_replace_library(&row)?;
        ctx.set_library_id(id);
        ctx.report_mut().record_library_created();
        info!(library = %row.name, id = %id, "Library created");
      }
    }
    Ok(StageFlow::Consumed)
  }
}

/// Links every imported usage example into a reference list and keeps the morpheme
/// `expr_count` of that list current.
#[derive(Debug)]
pub struct ReferenceListStage {
  list_id: UeListId,
  maintainer: FrequencyMaintainer,
}

impl ReferenceListStage {
  /// Stage over `list_id`.
  pub fn new(list_id: UeListId) -> Self {
    Self {
      list_id,
      maintainer: FrequencyMaintainer::new(),
    }
  }

  /// Target list.
  pub fn list_id(&self) -> UeListId {
    self.list_id
  }

  /// Applies staged increments; list links and their counts land in the same commit.
  fn flush(&mut self, ctx: &mut ImportContext<'_>) -> ImportResult<()> {
    let rows = self.maintainer.commit(ctx.store())?;
    ctx.report_mut().record_frequency_commit(rows);
    Ok(())
  }
}

impl ImportStage for ReferenceListStage {
  fn name(&self) -> &'static str {
    "reference-list"
  }

  fn intercepts(&self, kind: EventKind) -> bool {
    matches!(
      kind,
      EventKind::OpenLibrary | EventKind::CloseUsageExample | EventKind::Finish
    )
  }

  fn before(&mut self, ctx: &mut ImportContext<'_>, event: &ImportEvent<'_>) -> ImportResult<StageFlow> {
    if event.kind() == EventKind::OpenLibrary {
      ctx.store().ensure_ue_list(self.list_id, REFERENCE_LIST_NAME, UeListType::System)?;
    }
    Ok(StageFlow::Forward)
  }

  fn after(&mut self, ctx: &mut ImportContext<'_>, event: &ImportEvent<'_>) -> ImportResult<()> {
    match event.kind() {
      EventKind::CloseUsageExample => {
        if let Some(created) = ctx.last_usage_example() {
          let store = ctx.store();
          let staged = self.maintainer.stage(store, self.list_id, created.expression_id)?;
          store.link_to_list(self.list_id, created.id)?;
          ctx.report_mut().record_staged(staged);
        }
      }
      EventKind::Finish => self.flush(ctx)?,
      _ => {}
    }
    Ok(())
  }

  fn on_batch_commit(&mut self, ctx: &mut ImportContext<'_>) -> ImportResult<()> {
    self.flush(ctx)
  }
}
