//! Shared state of one import: drafts, the definition stack and the store handles.

use crate::errors::{ImportError, ImportResult};
use crate::importer::events::EventKind;
use crate::importer::graph_builder::GraphBuilder;
use crate::importer::media::MediaCopier;
use crate::importer::report::ImportReport;
use crate::importer::session::ImportSession;
use crate::models::{
  DefinitionId, EntryId, ExpressionId, Extra, LibraryId, LibraryType, UsageExampleId, DEFAULT_UE_TYPE,
};
use crate::store::{NewLibrary, Store};

/// Version stamped into `libraries.import_version`.
pub const IMPORT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) fn protocol(event: EventKind, reason: &'static str) -> ImportError {
  ImportError::Protocol {
    event: event.name(),
    reason,
  }
}

/// Library header collected between `open-library` and `finish-library`.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryDraft {
  /// Dictionary or corpus
  pub kind: LibraryType,
  /// Name
  pub name: Option<String>,
  /// Alias
  pub alias: Option<String>,
  /// Date
  pub date: Option<String>,
  /// Upstream dump version
  pub dump_version: Option<String>,
  /// Converter version
  pub convert_version: Option<String>,
  /// Extras
  pub extra: Extra,
}

impl LibraryDraft {
  /// Empty header of the given kind.
  pub fn new(kind: LibraryType) -> Self {
    Self {
      kind,
      name: None,
      alias: None,
      date: None,
      dump_version: None,
      convert_version: None,
      extra: Extra::new(),
    }
  }

  /// Insert row for this header; the library must be named.
  pub fn to_new_library(&self, id: Option<LibraryId>) -> ImportResult<NewLibrary> {
    let name = self
      .name
      .clone()
      .filter(|name| !name.trim().is_empty())
      .ok_or_else(|| protocol(EventKind::FinishLibrary, "library has no name"))?;
    Ok(NewLibrary {
      id,
      name,
      kind: self.kind,
      alias: self.alias.clone(),
      date: self.date.clone(),
      dump_version: self.dump_version.clone(),
      convert_version: self.convert_version.clone(),
      import_version: Some(IMPORT_VERSION.to_string()),
      extra: self.extra.clone(),
    })
  }
}

/// Entry fields collected before `construct-entry`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryDraft {
  /// Format name
  pub format: Option<String>,
  /// Sequence number
  pub number: Option<i64>,
  /// Raw kana headwords
  pub kana_raw: Option<Vec<String>>,
  /// Raw kanji headwords
  pub kanji_raw: Option<Vec<String>>,
  /// Pitch accent
  pub accent: Option<String>,
  /// Extras
  pub extra: Extra,
}

/// The entry being imported.
#[derive(Debug, Clone, Default)]
pub struct EntryFrame {
  /// Collected fields
  pub draft: EntryDraft,
  /// Row id once constructed
  pub id: Option<EntryId>,
  /// Blank-elision format
  pub elision: bool,
  /// Kana headwords as received, first one drives kanji expansion
  pub kana: Vec<String>,
}

/// Definition fields collected before `construct-definition`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinitionDraft {
  /// Sequence number among siblings
  pub number: Option<i64>,
  /// Group label
  pub group: Option<String>,
  /// Text
  pub text: Option<String>,
  /// Extras
  pub extra: Extra,
}

/// One open definition.
#[derive(Debug, Clone, Default)]
pub struct DefinitionFrame {
  /// Collected fields
  pub draft: DefinitionDraft,
  /// Row id once constructed
  pub id: Option<DefinitionId>,
  /// Usage-example links not yet flushed
  pub ue_links: Vec<(UsageExampleId, i64)>,
}

/// Open definitions, innermost last.
#[derive(Debug, Clone, Default)]
pub struct DefinitionStack {
  frames: Vec<DefinitionFrame>,
}

impl DefinitionStack {
  /// Pushes a new innermost definition.
  pub fn push(&mut self, frame: DefinitionFrame) {
    self.frames.push(frame);
  }

  /// Removes the innermost definition.
  pub fn pop(&mut self) -> Option<DefinitionFrame> {
    self.frames.pop()
  }

  /// Innermost definition.
  pub fn top(&self) -> Option<&DefinitionFrame> {
    self.frames.last()
  }

  /// Innermost definition, mutable.
  pub fn top_mut(&mut self) -> Option<&mut DefinitionFrame> {
    self.frames.last_mut()
  }

  /// Id of the nearest constructed definition below the innermost one.
  pub fn parent_of_top(&self) -> Option<DefinitionId> {
    let below = self.frames.len().checked_sub(1)?;
    self.frames[..below].iter().rev().find_map(|frame| frame.id)
  }

  /// Number of open definitions.
  pub fn depth(&self) -> usize {
    self.frames.len()
  }

  /// Whether no definition is open.
  pub fn is_empty(&self) -> bool {
    self.frames.is_empty()
  }
}

/// Usage-example fields collected before `close-usage-example`.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageExampleDraft {
  /// Upper-cased type name
  pub ue_type: String,
  /// Sentence
  pub expression: Option<String>,
  /// Reading
  pub reading: Option<String>,
  /// Translation / gloss
  pub meaning: Option<String>,
  /// Sound file name
  pub sound: Option<String>,
  /// Image file name
  pub image: Option<String>,
  /// Extras
  pub extra: Extra,
  /// Validation flag
  pub validated: bool,
}

impl UsageExampleDraft {
  /// Draft with the type upper-cased, `UNKNOWN` when absent.
  pub fn new(ue_type: Option<&str>) -> Self {
    let ue_type = ue_type
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .unwrap_or(DEFAULT_UE_TYPE)
      .to_uppercase();
    Self {
      ue_type,
      expression: None,
      reading: None,
      meaning: None,
      sound: None,
      image: None,
      extra: Extra::new(),
      validated: true,
    }
  }
}

/// Usage example persisted by the last `close-usage-example`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedUsageExample {
  /// Row id
  pub id: UsageExampleId,
  /// Referenced expression
  pub expression_id: ExpressionId,
  /// Whether this import created the row
  pub is_new: bool,
}

/// State shared by the base builder and every stage.
#[derive(Debug)]
pub struct ImportContext<'s> {
  pub(crate) store: &'s Store,
  pub(crate) session: ImportSession,
  pub(crate) graph: GraphBuilder,
  pub(crate) report: ImportReport,
  pub(crate) library: Option<LibraryDraft>,
  pub(crate) library_id: Option<LibraryId>,
  pub(crate) entry: Option<EntryFrame>,
  pub(crate) definitions: DefinitionStack,
  pub(crate) usage_example: Option<UsageExampleDraft>,
  pub(crate) last_usage_example: Option<CreatedUsageExample>,
  pub(crate) media: Option<MediaCopier>,
}

impl<'s> ImportContext<'s> {
  /// Fresh context with an empty session.
  pub fn new(store: &'s Store, graph: GraphBuilder) -> Self {
    Self {
      store,
      session: ImportSession::new(),
      graph,
      report: ImportReport::default(),
      library: None,
      library_id: None,
      entry: None,
      definitions: DefinitionStack::default(),
      usage_example: None,
      last_usage_example: None,
      media: None,
    }
  }

  /// Store being written.
  pub fn store(&self) -> &'s Store {
    self.store
  }

  /// Morpheme / expression cache.
  pub fn session_mut(&mut self) -> &mut ImportSession {
    &mut self.session
  }

  /// Report so far.
  pub fn report(&self) -> &ImportReport {
    &self.report
  }

  /// Report so far, mutable.
  pub fn report_mut(&mut self) -> &mut ImportReport {
    &mut self.report
  }

  /// Id of the finished library.
  pub fn library_id(&self) -> Option<LibraryId> {
    self.library_id
  }

  /// Open library header.
  pub fn library_draft(&self) -> Option<&LibraryDraft> {
    self.library.as_ref()
  }

  /// Takes the open library header for persisting.
  pub fn take_library_draft(&mut self, event: EventKind) -> ImportResult<LibraryDraft> {
    self.library.take().ok_or_else(|| protocol(event, "no open library"))
  }

  /// Records the persisted library; entries and usage examples attach to it.
  pub fn set_library_id(&mut self, id: LibraryId) {
    self.library_id = Some(id);
  }

  /// Open definitions.
  pub fn definitions(&self) -> &DefinitionStack {
    &self.definitions
  }

  /// Usage example persisted by the last `close-usage-example`, if any.
  pub fn last_usage_example(&self) -> Option<CreatedUsageExample> {
    self.last_usage_example
  }

  /// Whether the current entry uses the blank-elision format.
  pub fn in_elision_entry(&self) -> bool {
    self.entry.as_ref().is_some_and(|entry| entry.elision)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn constructed(id: i64) -> DefinitionFrame {
    DefinitionFrame {
      id: Some(DefinitionId(id)),
      ..DefinitionFrame::default()
    }
  }

  #[test]
  fn parent_is_nearest_constructed_frame_below_top() {
    let mut stack = DefinitionStack::default();
    assert_eq!(stack.parent_of_top(), None);

    stack.push(constructed(1));
    assert_eq!(stack.parent_of_top(), None);

    stack.push(constructed(2));
    stack.push(DefinitionFrame::default());
    assert_eq!(stack.parent_of_top(), Some(DefinitionId(2)));

    stack.pop();
    stack.pop();
    stack.push(DefinitionFrame::default());
    assert_eq!(stack.parent_of_top(), Some(DefinitionId(1)));
    assert_eq!(stack.depth(), 2);
  }

  #[test]
  fn usage_example_type_is_upper_cased_with_default() {
    assert_eq!(UsageExampleDraft::new(Some("sentence")).ue_type, "SENTENCE");
    assert_eq!(UsageExampleDraft::new(None).ue_type, "UNKNOWN");
    assert_eq!(UsageExampleDraft::new(Some("  ")).ue_type, "UNKNOWN");
    assert!(UsageExampleDraft::new(None).validated);
  }

  #[test]
  fn unnamed_library_cannot_be_persisted() {
    let draft = LibraryDraft::new(LibraryType::Dictionary);
    assert!(matches!(draft.to_new_library(None), Err(ImportError::Protocol { .. })));

    let mut named = draft;
    named.name = Some("大辞林".to_string());
    let row = named.to_new_library(None).unwrap();
    assert_eq!(row.import_version.as_deref(), Some(IMPORT_VERSION));
  }
}
