//! Import traversal events.
//!
//! A source emits, per library:
//!
//! ```text
//! open-library → {name | alias | dump-version | convert-version | date | extra}*
//!   → finish-library → (entry | usage-example)* → finish
//! ```
//!
//! An entry is `open-entry → format → [kana-raw] → [kanji-raw] → [accent] → [extra] →
//! construct-entry → kana → kanji → definition*`; a definition is `open-definition →
//! [group] → [text] → [extra] → construct-definition → usage-example* →
//! finish-definition-associations → definition* → close-definition`.

use crate::models::{Extra, LibraryType};

/// One traversal event, borrowed from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportEvent<'a> {
  /// Starts the library header
  OpenLibrary {
    /// Dictionary or corpus
    kind: LibraryType,
  },
  /// Library name
  LibraryName(&'a str),
  /// Library alias
  LibraryAlias(&'a str),
  /// Upstream dump version
  LibraryDumpVersion(&'a str),
  /// Converter version
  LibraryConvertVersion(&'a str),
  /// Library date
  LibraryDate(&'a str),
  /// Library extras
  LibraryExtra(&'a Extra),
  /// Ends the library header; the library row exists afterwards
  FinishLibrary,

  /// Starts an entry
  OpenEntry {
    /// Sequence number within the library
    number: Option<i64>,
  },
  /// Entry format name
  EntryFormat(&'a str),
  /// Raw kana headwords
  EntryKanaRaw(&'a [String]),
  /// Raw kanji headwords
  EntryKanjiRaw(&'a [String]),
  /// Pitch accent
  EntryAccent(&'a str),
  /// Entry extras
  EntryExtra(&'a Extra),
  /// Persists the entry row
  ConstructEntry,
  /// Kana headwords of the constructed entry
  EntryKana(&'a [String]),
  /// Kanji headwords of the constructed entry
  EntryKanji(&'a [String]),

  /// Starts a definition below the current one
  OpenDefinition {
    /// Sequence number among siblings
    number: Option<i64>,
  },
  /// Group label
  DefinitionGroup(&'a str),
  /// Definition text
  DefinitionText(&'a str),
  /// Definition extras
  DefinitionExtra(&'a Extra),
  /// Persists the definition row
  ConstructDefinition,
  /// Flushes usage-example links of the current definition
  FinishDefinitionAssociations,
  /// Ends the current definition
  CloseDefinition,

  /// Starts a usage example
  OpenUsageExample {
    /// Type name, upper-cased on import
    ue_type: Option<&'a str>,
  },
  /// Example sentence
  UsageExampleExpression(&'a str),
  /// Reading supplied by the source
  UsageExampleReading(&'a str),
  /// Translation / gloss
  UsageExampleMeaning(&'a str),
  /// Sound file name
  UsageExampleSound(&'a str),
  /// Image file name
  UsageExampleImage(&'a str),
  /// Usage-example extras
  UsageExampleExtra(&'a Extra),
  /// Validation flag
  UsageExampleValidated(bool),
  /// Persists the usage example
  CloseUsageExample {
    /// Link number inside a definition; ignored outside one
    number: Option<i64>,
  },

  /// Ends the traversal
  Finish,
}

/// Payload-free event discriminant, used by stages to declare interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum EventKind {
  OpenLibrary,
  LibraryName,
  LibraryAlias,
  LibraryDumpVersion,
  LibraryConvertVersion,
  LibraryDate,
  LibraryExtra,
  FinishLibrary,
  OpenEntry,
  EntryFormat,
  EntryKanaRaw,
  EntryKanjiRaw,
  EntryAccent,
  EntryExtra,
  ConstructEntry,
  EntryKana,
  EntryKanji,
  OpenDefinition,
  DefinitionGroup,
  DefinitionText,
  DefinitionExtra,
  ConstructDefinition,
  FinishDefinitionAssociations,
  CloseDefinition,
  OpenUsageExample,
  UsageExampleExpression,
  UsageExampleReading,
  UsageExampleMeaning,
  UsageExampleSound,
  UsageExampleImage,
  UsageExampleExtra,
  UsageExampleValidated,
  CloseUsageExample,
  Finish,
}

impl EventKind {
  /// Protocol name used in logs and errors.
  pub fn name(self) -> &'static str {
    match self {
      EventKind::OpenLibrary => "open-library",
      EventKind::LibraryName => "library-name",
      EventKind::LibraryAlias => "library-alias",
      EventKind::LibraryDumpVersion => "library-dump-version",
      EventKind::LibraryConvertVersion => "library-convert-version",
      EventKind::LibraryDate => "library-date",
      EventKind::LibraryExtra => "library-extra",
      EventKind::FinishLibrary => "finish-library",
      EventKind::OpenEntry => "open-entry",
      EventKind::EntryFormat => "entry-format",
      EventKind::EntryKanaRaw => "entry-kana-raw",
      EventKind::EntryKanjiRaw => "entry-kanji-raw",
      EventKind::EntryAccent => "entry-accent",
      EventKind::EntryExtra => "entry-extra",
      EventKind::ConstructEntry => "construct-entry",
      EventKind::EntryKana => "entry-kana",
      EventKind::EntryKanji => "entry-kanji",
      EventKind::OpenDefinition => "open-definition",
      EventKind::DefinitionGroup => "definition-group",
      EventKind::DefinitionText => "definition-text",
      EventKind::DefinitionExtra => "definition-extra",
      EventKind::ConstructDefinition => "construct-definition",
      EventKind::FinishDefinitionAssociations => "finish-definition-associations",
      EventKind::CloseDefinition => "close-definition",
      EventKind::OpenUsageExample => "open-usage-example",
      EventKind::UsageExampleExpression => "usage-example-expression",
      EventKind::UsageExampleReading => "usage-example-reading",
      EventKind::UsageExampleMeaning => "usage-example-meaning",
      EventKind::UsageExampleSound => "usage-example-sound",
      EventKind::UsageExampleImage => "usage-example-image",
      EventKind::UsageExampleExtra => "usage-example-extra",
      EventKind::UsageExampleValidated => "usage-example-validated",
      EventKind::CloseUsageExample => "close-usage-example",
      EventKind::Finish => "finish",
    }
  }
}

impl ImportEvent<'_> {
  /// Discriminant of this event.
  pub fn kind(&self) -> EventKind {
    match self {
      ImportEvent::OpenLibrary { .. } => EventKind::OpenLibrary,
      ImportEvent::LibraryName(_) => EventKind::LibraryName,
      ImportEvent::LibraryAlias(_) => EventKind::LibraryAlias,
      ImportEvent::LibraryDumpVersion(_) => EventKind::LibraryDumpVersion,
      ImportEvent::LibraryConvertVersion(_) => EventKind::LibraryConvertVersion,
      ImportEvent::LibraryDate(_) => EventKind::LibraryDate,
      ImportEvent::LibraryExtra(_) => EventKind::LibraryExtra,
      ImportEvent::FinishLibrary => EventKind::FinishLibrary,
      ImportEvent::OpenEntry { .. } => EventKind::OpenEntry,
      ImportEvent::EntryFormat(_) => EventKind::EntryFormat,
      ImportEvent::EntryKanaRaw(_) => EventKind::EntryKanaRaw,
      ImportEvent::EntryKanjiRaw(_) => EventKind::EntryKanjiRaw,
      ImportEvent::EntryAccent(_) => EventKind::EntryAccent,
      ImportEvent::EntryExtra(_) => EventKind::EntryExtra,
      ImportEvent::ConstructEntry => EventKind::ConstructEntry,
      ImportEvent::EntryKana(_) => EventKind::EntryKana,
      ImportEvent::EntryKanji(_) => EventKind::EntryKanji,
      ImportEvent::OpenDefinition { .. } => EventKind::OpenDefinition,
      ImportEvent::DefinitionGroup(_) => EventKind::DefinitionGroup,
      ImportEvent::DefinitionText(_) => EventKind::DefinitionText,
      ImportEvent::DefinitionExtra(_) => EventKind::DefinitionExtra,
      ImportEvent::ConstructDefinition => EventKind::ConstructDefinition,
      ImportEvent::FinishDefinitionAssociations => EventKind::FinishDefinitionAssociations,
      ImportEvent::CloseDefinition => EventKind::CloseDefinition,
      ImportEvent::OpenUsageExample { .. } => EventKind::OpenUsageExample,
      ImportEvent::UsageExampleExpression(_) => EventKind::UsageExampleExpression,
      ImportEvent::UsageExampleReading(_) => EventKind::UsageExampleReading,
      ImportEvent::UsageExampleMeaning(_) => EventKind::UsageExampleMeaning,
      ImportEvent::UsageExampleSound(_) => EventKind::UsageExampleSound,
      ImportEvent::UsageExampleImage(_) => EventKind::UsageExampleImage,
      ImportEvent::UsageExampleExtra(_) => EventKind::UsageExampleExtra,
      ImportEvent::UsageExampleValidated(_) => EventKind::UsageExampleValidated,
      ImportEvent::CloseUsageExample { .. } => EventKind::CloseUsageExample,
      ImportEvent::Finish => EventKind::Finish,
    }
  }
}
