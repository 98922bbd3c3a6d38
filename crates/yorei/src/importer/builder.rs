//! Base builder: turns traversal events into store rows.

use tracing::{debug, info, warn};

use crate::errors::ImportResult;
use crate::importer::context::{
  protocol, DefinitionFrame, EntryFrame, ImportContext, LibraryDraft, UsageExampleDraft, CreatedUsageExample,
};
use crate::importer::elision::{expand_kanji, normalize_kana};
use crate::importer::events::{EventKind, ImportEvent};
use crate::models::{MorphemeType, DEFAULT_ENTRY_FORMAT, ELISION_ENTRY_FORMAT};
use crate::store::{NewDefinition, NewEntry, NewUsageExample};

/// Handles every event with the default semantics.
///
/// Stages run around it and may consume an event so that this builder never sees it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DictionaryBuilder;

impl DictionaryBuilder {
  /// Applies one event to the context.
  pub fn apply(&self, ctx: &mut ImportContext<'_>, event: &ImportEvent<'_>) -> ImportResult<()> {
    let kind = event.kind();
    match *event {
      // ─── Library ───────────────────────────────────────────────────────
      ImportEvent::OpenLibrary { kind: library_kind } => {
        if ctx.library.is_some() || ctx.library_id.is_some() {
          return Err(protocol(kind, "library already opened"));
        }
        ctx.library = Some(LibraryDraft::new(library_kind));
      }
      ImportEvent::LibraryName(name) => library(ctx, kind)?.name = Some(name.to_string()),
      ImportEvent::LibraryAlias(alias) => library(ctx, kind)?.alias = Some(alias.to_string()),
      ImportEvent::LibraryDumpVersion(v) => library(ctx, kind)?.dump_version = Some(v.to_string()),
      ImportEvent::LibraryConvertVersion(v) => library(ctx, kind)?.convert_version = Some(v.to_string()),
      ImportEvent::LibraryDate(date) => library(ctx, kind)?.date = Some(date.to_string()),
      ImportEvent::LibraryExtra(extra) => library(ctx, kind)?.extra = extra.clone(),
      ImportEvent::FinishLibrary => {
        let draft = ctx.take_library_draft(kind)?;
        let row = draft.to_new_library(None)?;
        let id = ctx.store.insert_or_replace_library(&row)?;
        ctx.set_library_id(id);
        ctx.report.record_library_created();
        info!(library = %row.name, id = %id, "Library created");
      }

      // ─── Entry ─────────────────────────────────────────────────────────
      ImportEvent::OpenEntry { number } => {
        if ctx.library_id.is_none() {
          return Err(protocol(kind, "library not finished"));
        }
        if !ctx.definitions.is_empty() || ctx.usage_example.is_some() {
          return Err(protocol(kind, "previous record still open"));
        }
        let mut frame = EntryFrame::default();
        frame.draft.number = number;
        ctx.entry = Some(frame);
        ctx.last_usage_example = None;
      }
      ImportEvent::EntryFormat(format) => entry_draft(ctx, kind)?.draft.format = Some(format.to_string()),
      ImportEvent::EntryKanaRaw(kana) => entry_draft(ctx, kind)?.draft.kana_raw = Some(kana.to_vec()),
      ImportEvent::EntryKanjiRaw(kanji) => entry_draft(ctx, kind)?.draft.kanji_raw = Some(kanji.to_vec()),
      ImportEvent::EntryAccent(accent) => entry_draft(ctx, kind)?.draft.accent = Some(accent.to_string()),
      ImportEvent::EntryExtra(extra) => entry_draft(ctx, kind)?.draft.extra = extra.clone(),
      ImportEvent::ConstructEntry => construct_entry(ctx, kind)?,
      ImportEvent::EntryKana(kana) => entry_kana(ctx, kind, kana)?,
      ImportEvent::EntryKanji(kanji) => entry_kanji(ctx, kind, kanji)?,

      // ─── Definition ────────────────────────────────────────────────────
      ImportEvent::OpenDefinition { number } => {
        if !ctx.entry.as_ref().is_some_and(|entry| entry.id.is_some()) {
          return Err(protocol(kind, "entry not constructed"));
        }
        if ctx.definitions.top().is_some_and(|top| top.id.is_none()) {
          return Err(protocol(kind, "parent definition not constructed"));
        }
        if ctx.usage_example.is_some() {
          return Err(protocol(kind, "usage example still open"));
        }
        let mut frame = DefinitionFrame::default();
        frame.draft.number = number;
        ctx.definitions.push(frame);
      }
      ImportEvent::DefinitionGroup(group) => definition_draft(ctx, kind)?.draft.group = Some(group.to_string()),
      ImportEvent::DefinitionText(text) => definition_draft(ctx, kind)?.draft.text = Some(text.to_string()),
      ImportEvent::DefinitionExtra(extra) => definition_draft(ctx, kind)?.draft.extra = extra.clone(),
      ImportEvent::ConstructDefinition => construct_definition(ctx, kind)?,
      ImportEvent::FinishDefinitionAssociations => {
        let store = ctx.store;
        let frame = ctx
          .definitions
          .top_mut()
          .ok_or_else(|| protocol(kind, "no open definition"))?;
        let id = frame.id.ok_or_else(|| protocol(kind, "definition not constructed"))?;
        store.bulk_insert_definition_ues(id, &frame.ue_links)?;
        frame.ue_links.clear();
      }
      ImportEvent::CloseDefinition => {
        let frame = ctx
          .definitions
          .pop()
          .ok_or_else(|| protocol(kind, "no open definition"))?;
        let id = frame.id.ok_or_else(|| protocol(kind, "definition not constructed"))?;
        if !frame.ue_links.is_empty() {
          ctx.store.bulk_insert_definition_ues(id, &frame.ue_links)?;
        }
      }

      // ─── Usage example ─────────────────────────────────────────────────
      ImportEvent::OpenUsageExample { ue_type } => {
        if ctx.library_id.is_none() {
          return Err(protocol(kind, "library not finished"));
        }
        if ctx.usage_example.is_some() {
          return Err(protocol(kind, "usage example already open"));
        }
        if ctx.definitions.top().is_some_and(|top| top.id.is_none()) {
          return Err(protocol(kind, "definition not constructed"));
        }
        ctx.usage_example = Some(UsageExampleDraft::new(ue_type));
        ctx.last_usage_example = None;
      }
      ImportEvent::UsageExampleExpression(text) => ue_draft(ctx, kind)?.expression = Some(text.to_string()),
      ImportEvent::UsageExampleReading(text) => ue_draft(ctx, kind)?.reading = Some(text.to_string()),
      ImportEvent::UsageExampleMeaning(text) => ue_draft(ctx, kind)?.meaning = Some(text.to_string()),
      ImportEvent::UsageExampleSound(name) => ue_draft(ctx, kind)?.sound = Some(name.to_string()),
      ImportEvent::UsageExampleImage(name) => ue_draft(ctx, kind)?.image = Some(name.to_string()),
      ImportEvent::UsageExampleExtra(extra) => ue_draft(ctx, kind)?.extra = extra.clone(),
      ImportEvent::UsageExampleValidated(validated) => ue_draft(ctx, kind)?.validated = validated,
      ImportEvent::CloseUsageExample { number } => close_usage_example(ctx, kind, number)?,

      ImportEvent::Finish => {
        if ctx.library.is_some() {
          return Err(protocol(kind, "library header not finished"));
        }
        if !ctx.definitions.is_empty() || ctx.usage_example.is_some() {
          return Err(protocol(kind, "record still open"));
        }
        ctx.entry = None;
        let refreshed = ctx.store.refresh_def_counts()?;
        debug!(morphemes = refreshed, "Definition counters refreshed");
      }
    }
    Ok(())
  }
}

fn library<'c>(ctx: &'c mut ImportContext<'_>, kind: EventKind) -> ImportResult<&'c mut LibraryDraft> {
  ctx.library.as_mut().ok_or_else(|| protocol(kind, "no open library"))
}

fn entry_draft<'c>(ctx: &'c mut ImportContext<'_>, kind: EventKind) -> ImportResult<&'c mut EntryFrame> {
  match ctx.entry.as_mut() {
    Some(entry) if entry.id.is_none() => Ok(entry),
    Some(_) => Err(protocol(kind, "entry already constructed")),
    None => Err(protocol(kind, "no open entry")),
  }
}

fn definition_draft<'c>(ctx: &'c mut ImportContext<'_>, kind: EventKind) -> ImportResult<&'c mut DefinitionFrame> {
  match ctx.definitions.top_mut() {
    Some(frame) if frame.id.is_none() => Ok(frame),
    Some(_) => Err(protocol(kind, "definition already constructed")),
    None => Err(protocol(kind, "no open definition")),
  }
}

fn ue_draft<'c>(ctx: &'c mut ImportContext<'_>, kind: EventKind) -> ImportResult<&'c mut UsageExampleDraft> {
  ctx.usage_example.as_mut().ok_or_else(|| protocol(kind, "no open usage example"))
}

fn construct_entry(ctx: &mut ImportContext<'_>, kind: EventKind) -> ImportResult<()> {
  let library_id = ctx.library_id.ok_or_else(|| protocol(kind, "library not finished"))?;
  let store = ctx.store;
  let frame = entry_draft(ctx, kind)?;

  let format = frame.draft.format.clone().unwrap_or_else(|| DEFAULT_ENTRY_FORMAT.to_string());
  let elision = format == ELISION_ENTRY_FORMAT;
  let format_id = store.insert_or_ignore_entry_format(&format)?;
  let id = store.insert_entry(&NewEntry {
    library_id,
    format_id,
    number: frame.draft.number,
    kana_raw: if elision { frame.draft.kana_raw.clone() } else { None },
    kanji_raw: if elision { frame.draft.kanji_raw.clone() } else { None },
    accent: frame.draft.accent.clone(),
    extra: frame.draft.extra.clone(),
  })?;
  frame.id = Some(id);
  frame.elision = elision;
  ctx.report.record_entry();
  debug!(entry_id = %id, format = %format, "Entry constructed");
  Ok(())
}

fn constructed_entry<'c>(ctx: &'c mut ImportContext<'_>, kind: EventKind) -> ImportResult<&'c mut EntryFrame> {
  match ctx.entry.as_mut() {
    Some(entry) if entry.id.is_some() => Ok(entry),
    _ => Err(protocol(kind, "entry not constructed")),
  }
}

fn entry_kana(ctx: &mut ImportContext<'_>, kind: EventKind, kana: &[String]) -> ImportResult<()> {
  let frame = constructed_entry(ctx, kind)?;
  let (entry_id, elision) = (frame.id, frame.elision);
  frame.kana = kana.to_vec();
  let entry_id = entry_id.ok_or_else(|| protocol(kind, "entry not constructed"))?;

  let mut morphemes = Vec::with_capacity(kana.len());
  for raw in kana {
    let surface = if elision { normalize_kana(raw) } else { raw.trim().to_string() };
    if surface.is_empty() {
      continue;
    }
    morphemes.push(ctx.session.lookup_or_create_morpheme(ctx.store, &surface, MorphemeType::KanaEntry)?);
  }
  ctx.store.bulk_insert_entry_kana(entry_id, &morphemes)?;
  Ok(())
}

fn entry_kanji(ctx: &mut ImportContext<'_>, kind: EventKind, kanji: &[String]) -> ImportResult<()> {
  let frame = constructed_entry(ctx, kind)?;
  let entry_id = frame.id.ok_or_else(|| protocol(kind, "entry not constructed"))?;
  let elision = frame.elision;
  let first_kana = frame
    .draft
    .kana_raw
    .as_ref()
    .and_then(|raw| raw.first())
    .or_else(|| frame.kana.first())
    .cloned()
    .unwrap_or_default();

  let mut morphemes = Vec::with_capacity(kanji.len());
  for raw in kanji {
    let surface = if elision {
      match expand_kanji(raw, &first_kana) {
        Ok(expanded) => expanded,
        Err(e) => {
          warn!(kanji = %raw, kana = %first_kana, error = %e, "Kanji headword kept as written");
          ctx.report.record_headword_fallback();
          raw.clone()
        }
      }
    } else {
      raw.trim().to_string()
    };
    if surface.is_empty() {
      continue;
    }
    morphemes.push(ctx.session.lookup_or_create_morpheme(ctx.store, &surface, MorphemeType::KanjiEntry)?);
  }
  ctx.store.bulk_insert_entry_kanji(entry_id, &morphemes)?;
  Ok(())
}

fn construct_definition(ctx: &mut ImportContext<'_>, kind: EventKind) -> ImportResult<()> {
  let entry_id = ctx
    .entry
    .as_ref()
    .and_then(|entry| entry.id)
    .ok_or_else(|| protocol(kind, "entry not constructed"))?;
  let elision = ctx.in_elision_entry();
  let parent_id = ctx.definitions.parent_of_top();
  let store = ctx.store;

  let frame = definition_draft(ctx, kind)?;
  let id = store.insert_definition(&NewDefinition {
    entry_id,
    parent_id,
    number: frame.draft.number,
    group: frame.draft.group.clone(),
    text: frame.draft.text.clone(),
    extra: frame.draft.extra.clone(),
  })?;
  frame.id = Some(id);
  let text = frame.draft.text.clone();
  ctx.report.record_definition();

  if elision && let Some(text) = text.filter(|t| !t.trim().is_empty()) {
    let rows = ctx.graph.import_definition_text(&mut ctx.session, store, id, &text)?;
    debug!(definition_id = %id, compositions = rows, "Definition decomposed");
  }
  Ok(())
}

fn close_usage_example(ctx: &mut ImportContext<'_>, kind: EventKind, number: Option<i64>) -> ImportResult<()> {
  let draft = ctx
    .usage_example
    .take()
    .ok_or_else(|| protocol(kind, "no open usage example"))?;
  let library_id = ctx.library_id.ok_or_else(|| protocol(kind, "library not finished"))?;
  let expression = draft
    .expression
    .as_deref()
    .filter(|text| !text.trim().is_empty())
    .ok_or_else(|| protocol(kind, "usage example has no expression"))?;

  let store = ctx.store;
  let (expression_id, expression_new) = ctx.graph.import_expression(&mut ctx.session, store, expression)?;
  if expression_new {
    ctx.report.record_expression_created();
  }

  let type_id = store.insert_or_ignore_ue_type(&draft.ue_type)?;
  let (id, is_new) = store.insert_or_ignore_usage_example(&NewUsageExample {
    expression_id,
    library_id,
    type_id,
    meaning: draft.meaning.clone(),
    reading: draft.reading.clone(),
    sound: draft.sound.clone(),
    image: draft.image.clone(),
    extra: draft.extra.clone(),
    is_validated: draft.validated,
  })?;
  ctx.report.record_usage_example(is_new);

  if is_new && let Some(copier) = ctx.media.as_ref() {
    for name in [draft.sound.as_deref(), draft.image.as_deref()].into_iter().flatten() {
      ctx.report.record_media(copier.copy(name));
    }
  }

  if let Some(frame) = ctx.definitions.top_mut() {
    if frame.id.is_none() {
      return Err(protocol(kind, "definition not constructed"));
    }
    let number = number.unwrap_or(frame.ue_links.len() as i64 + 1);
    frame.ue_links.push((id, number));
  }

  ctx.last_usage_example = Some(CreatedUsageExample {
    id,
    expression_id,
    is_new,
  });
  debug!(usage_example_id = %id, is_new, expression = %expression, "Usage example imported");
  Ok(())
}
