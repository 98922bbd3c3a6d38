//! JSON corpus documents shaped like flashcard-deck exports.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ImportResult;
use crate::importer::media::{parse_image_field, parse_sound_field};
use crate::importer::pipeline::ImportOptions;
use crate::importer::sources::{ImportSource, invalid, parse_document, read_document};
use crate::importer::visitor::ImportVisitor;
use crate::models::LibraryType;

fn default_expression_field() -> String {
  "Expression".to_string()
}

fn default_meaning_field() -> Option<String> {
  Some("Meaning".to_string())
}

/// Which note fields feed which usage-example columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
  /// Sentence field
  #[serde(default = "default_expression_field")]
  pub expression: String,
  /// Translation field
  #[serde(default = "default_meaning_field")]
  pub meaning: Option<String>,
  /// Field holding a `[sound:…]` tag
  #[serde(default)]
  pub sound: Option<String>,
  /// Field holding an `<img>` tag
  #[serde(default)]
  pub image: Option<String>,
}

impl Default for FieldMapping {
  fn default() -> Self {
    Self {
      expression: default_expression_field(),
      meaning: default_meaning_field(),
      sound: None,
      image: None,
    }
  }
}

/// One note of the deck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusNote {
  /// Field name → field text
  #[serde(default)]
  pub fields: BTreeMap<String, String>,
}

/// A deck of notes imported as a corpus library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusDocument {
  /// Library name; `Corpus <deck>` when absent
  #[serde(default)]
  pub name: Option<String>,
  /// Deck name
  pub deck: String,
  /// Field mapping
  #[serde(default)]
  pub mapping: FieldMapping,
  /// Notes in order
  #[serde(default)]
  pub notes: Vec<CorpusNote>,
  #[serde(skip)]
  media_dir: Option<PathBuf>,
}

impl CorpusDocument {
  /// Parses a JSON document.
  pub fn from_json_str(json: &str) -> ImportResult<Self> {
    parse_document(json)
  }

  /// Reads a JSON document; a sibling `<stem>.media` folder becomes the media source.
  pub fn from_path(path: impl AsRef<Path>) -> ImportResult<Self> {
    let path = path.as_ref();
    let mut doc = Self::from_json_str(&read_document(path)?)?;
    let media = path.with_extension("media");
    if media.is_dir() {
      doc.media_dir = Some(media);
    }
    Ok(doc)
  }

  /// Sets the folder media file names are resolved against.
  pub fn with_media_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.media_dir = Some(dir.into());
    self
  }

  /// Library name used for the import.
  pub fn library_name(&self) -> String {
    self
      .name
      .clone()
      .filter(|name| !name.trim().is_empty())
      .unwrap_or_else(|| format!("Corpus {}", self.deck))
  }

  /// Structural checks run before any event is emitted.
  pub fn validate(&self) -> ImportResult<()> {
    if self.deck.trim().is_empty() && self.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
      return Err(invalid("corpus has neither a name nor a deck"));
    }
    if self.mapping.expression.trim().is_empty() {
      return Err(invalid("expression field mapping is empty"));
    }
    Ok(())
  }

  fn field<'a>(note: &'a CorpusNote, name: Option<&str>) -> Option<&'a str> {
    let value = note.fields.get(name?)?.trim();
    (!value.is_empty()).then_some(value)
  }
}

impl ImportSource for CorpusDocument {
  fn traverse(&self, visitor: &mut dyn ImportVisitor) -> ImportResult<()> {
    self.validate()?;

    visitor.open_library(LibraryType::Corpus)?;
    visitor.library_name(&self.library_name())?;
    visitor.finish_library()?;

    let mapping = &self.mapping;
    for (idx, note) in self.notes.iter().enumerate() {
      let Some(expression) = Self::field(note, Some(&mapping.expression)) else {
        debug!(note = idx, field = %mapping.expression, "Note without expression skipped");
        continue;
      };

      visitor.open_usage_example(None)?;
      visitor.usage_example_expression(expression)?;
      if let Some(meaning) = Self::field(note, mapping.meaning.as_deref()) {
        visitor.usage_example_meaning(meaning)?;
      }
      if let Some(sound) = Self::field(note, mapping.sound.as_deref()).and_then(parse_sound_field) {
        visitor.usage_example_sound(&sound)?;
      }
      if let Some(image) = Self::field(note, mapping.image.as_deref()).and_then(parse_image_field) {
        visitor.usage_example_image(&image)?;
      }
      visitor.close_usage_example(None)?;
    }

    visitor.finish()
  }

  fn default_options(&self) -> ImportOptions {
    ImportOptions {
      upsert_library: true,
      reference_list: true,
    }
  }

  fn media_dir(&self) -> Option<&Path> {
    self.media_dir.as_deref()
  }
}
