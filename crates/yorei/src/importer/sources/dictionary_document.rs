//! JSON dictionary documents.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ImportResult;
use crate::importer::sources::{ImportSource, invalid, parse_document, read_document};
use crate::importer::visitor::ImportVisitor;
use crate::models::{Extra, LibraryType};

/// Library header of a dictionary document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryHeader {
  /// Library name
  pub name: String,
  /// Short alias
  #[serde(default)]
  pub alias: Option<String>,
  /// Upstream dump version
  #[serde(default)]
  pub dump_version: Option<String>,
  /// Converter version
  #[serde(default)]
  pub convert_version: Option<String>,
  /// Source date
  #[serde(default)]
  pub date: Option<String>,
  /// Named extras
  #[serde(default)]
  pub extra: Extra,
}

/// One usage example of a definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageExampleRecord {
  /// Type name
  #[serde(default, rename = "type")]
  pub ue_type: Option<String>,
  /// Sentence
  pub expression: String,
  /// Reading
  #[serde(default)]
  pub reading: Option<String>,
  /// Translation / gloss
  #[serde(default)]
  pub meaning: Option<String>,
  /// Sound file name
  #[serde(default)]
  pub sound: Option<String>,
  /// Image file name
  #[serde(default)]
  pub image: Option<String>,
  /// Named extras
  #[serde(default)]
  pub extra: Extra,
  /// Validation flag (default true)
  #[serde(default)]
  pub validated: Option<bool>,
  /// Link number inside the definition
  #[serde(default)]
  pub number: Option<i64>,
}

/// A definition with its examples and subdefinitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionRecord {
  /// Sequence number among siblings
  #[serde(default)]
  pub number: Option<i64>,
  /// Group label
  #[serde(default)]
  pub group: Option<String>,
  /// Definition text
  #[serde(default)]
  pub text: Option<String>,
  /// Named extras
  #[serde(default)]
  pub extra: Extra,
  /// Usage examples in order
  #[serde(default)]
  pub usage_examples: Vec<UsageExampleRecord>,
  /// Subdefinitions in order
  #[serde(default)]
  pub definitions: Vec<DefinitionRecord>,
}

/// One headword entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
  /// Format name (`J-E1` when absent)
  #[serde(default)]
  pub format: Option<String>,
  /// Sequence number within the library
  #[serde(default)]
  pub number: Option<i64>,
  /// Kana headwords as written
  #[serde(default)]
  pub kana: Vec<String>,
  /// Kanji headwords as written
  #[serde(default)]
  pub kanji: Vec<String>,
  /// Pitch accent
  #[serde(default)]
  pub accent: Option<String>,
  /// Named extras
  #[serde(default)]
  pub extra: Extra,
  /// Root definition
  #[serde(default)]
  pub definition: DefinitionRecord,
}

/// A whole dictionary: header plus entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DictionaryDocument {
  /// Library header
  pub library: LibraryHeader,
  /// Entries in order
  #[serde(default)]
  pub entries: Vec<EntryRecord>,
}

impl DictionaryDocument {
  /// Parses a JSON document.
  pub fn from_json_str(json: &str) -> ImportResult<Self> {
    parse_document(json)
  }

  /// Reads and parses a JSON document file.
  pub fn from_path(path: impl AsRef<Path>) -> ImportResult<Self> {
    Self::from_json_str(&read_document(path.as_ref())?)
  }

  /// Structural checks run before any event is emitted.
  pub fn validate(&self) -> ImportResult<()> {
    if self.library.name.trim().is_empty() {
      return Err(invalid("library name is empty"));
    }
    for (idx, entry) in self.entries.iter().enumerate() {
      let has_headword = entry.kana.iter().chain(&entry.kanji).any(|h| !h.trim().is_empty());
      if !has_headword {
        return Err(invalid(format!("entry #{} has no kana and no kanji headword", idx + 1)));
      }
      validate_definition(&entry.definition, idx + 1)?;
    }
    Ok(())
  }
}

fn validate_definition(definition: &DefinitionRecord, entry_no: usize) -> ImportResult<()> {
  if definition.usage_examples.iter().any(|ue| ue.expression.trim().is_empty()) {
    return Err(invalid(format!("entry #{entry_no} has a usage example with an empty expression")));
  }
  definition
    .definitions
    .iter()
    .try_for_each(|child| validate_definition(child, entry_no))
}

fn visit_definition(visitor: &mut dyn ImportVisitor, definition: &DefinitionRecord) -> ImportResult<()> {
  visitor.open_definition(definition.number)?;
  if let Some(group) = &definition.group {
    visitor.definition_group(group)?;
  }
  if let Some(text) = &definition.text {
    visitor.definition_text(text)?;
  }
  if !definition.extra.is_empty() {
    visitor.definition_extra(&definition.extra)?;
  }
  visitor.construct_definition()?;

  for ue in &definition.usage_examples {
    visitor.open_usage_example(ue.ue_type.as_deref())?;
    visitor.usage_example_expression(&ue.expression)?;
    if let Some(reading) = &ue.reading {
      visitor.usage_example_reading(reading)?;
    }
    if let Some(meaning) = &ue.meaning {
      visitor.usage_example_meaning(meaning)?;
    }
    if let Some(sound) = &ue.sound {
      visitor.usage_example_sound(sound)?;
    }
    if let Some(image) = &ue.image {
      visitor.usage_example_image(image)?;
    }
    if !ue.extra.is_empty() {
      visitor.usage_example_extra(&ue.extra)?;
    }
    if let Some(validated) = ue.validated {
      visitor.usage_example_validated(validated)?;
    }
    visitor.close_usage_example(ue.number)?;
  }
  visitor.finish_definition_associations()?;

  for child in &definition.definitions {
    visit_definition(visitor, child)?;
  }
  visitor.close_definition()
}

impl ImportSource for DictionaryDocument {
  fn traverse(&self, visitor: &mut dyn ImportVisitor) -> ImportResult<()> {
    self.validate()?;

    let header = &self.library;
    visitor.open_library(LibraryType::Dictionary)?;
    visitor.library_name(&header.name)?;
    if let Some(alias) = &header.alias {
      visitor.library_alias(alias)?;
    }
    if let Some(version) = &header.dump_version {
      visitor.library_dump_version(version)?;
    }
    if let Some(version) = &header.convert_version {
      visitor.library_convert_version(version)?;
    }
    if let Some(date) = &header.date {
      visitor.library_date(date)?;
    }
    if !header.extra.is_empty() {
      visitor.library_extra(&header.extra)?;
    }
    visitor.finish_library()?;

    for entry in &self.entries {
      visitor.open_entry(entry.number)?;
      if let Some(format) = &entry.format {
        visitor.entry_format(format)?;
      }
      if !entry.kana.is_empty() {
        visitor.entry_kana_raw(&entry.kana)?;
      }
      if !entry.kanji.is_empty() {
        visitor.entry_kanji_raw(&entry.kanji)?;
      }
      if let Some(accent) = &entry.accent {
        visitor.entry_accent(accent)?;
      }
      if !entry.extra.is_empty() {
        visitor.entry_extra(&entry.extra)?;
      }
      visitor.construct_entry()?;
      visitor.entry_kana(&entry.kana)?;
      visitor.entry_kanji(&entry.kanji)?;
      visit_definition(visitor, &entry.definition)?;
    }

    visitor.finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::errors::ImportError;

  /// Records event names in order.
  #[derive(Default)]
  struct Recorder(Vec<&'static str>);

  impl ImportVisitor for Recorder {
    fn open_library(&mut self, _: LibraryType) -> ImportResult<()> {
      self.0.push("open-library");
      Ok(())
    }
    fn finish_library(&mut self) -> ImportResult<()> {
      self.0.push("finish-library");
      Ok(())
    }
    fn construct_entry(&mut self) -> ImportResult<()> {
      self.0.push("construct-entry");
      Ok(())
    }
    fn construct_definition(&mut self) -> ImportResult<()> {
      self.0.push("construct-definition");
      Ok(())
    }
    fn close_usage_example(&mut self, _: Option<i64>) -> ImportResult<()> {
      self.0.push("close-usage-example");
      Ok(())
    }
    fn close_definition(&mut self) -> ImportResult<()> {
      self.0.push("close-definition");
      Ok(())
    }
    fn finish(&mut self) -> ImportResult<()> {
      self.0.push("finish");
      Ok(())
    }
  }

  const DOCUMENT: &str = r#"{
    "library": {"name": "テスト辞典", "dump_version": "1"},
    "entries": [{
      "kana": ["せんせい"],
      "kanji": ["先生"],
      "definition": {
        "text": "教える人",
        "usage_examples": [{"type": "sentence", "expression": "先生が来た"}],
        "definitions": [{"number": 1, "text": "医者"}]
      }
    }]
  }"#;

  #[test]
  fn parses_nested_definitions() {
    let doc = DictionaryDocument::from_json_str(DOCUMENT).unwrap();
    assert_eq!(doc.library.dump_version.as_deref(), Some("1"));
    assert_eq!(doc.entries[0].definition.usage_examples[0].ue_type.as_deref(), Some("sentence"));
    assert_eq!(doc.entries[0].definition.definitions[0].number, Some(1));
  }

  #[test]
  fn traversal_follows_protocol_order() {
    let doc = DictionaryDocument::from_json_str(DOCUMENT).unwrap();
    let mut recorder = Recorder::default();
    doc.traverse(&mut recorder).unwrap();
    assert_eq!(
      recorder.0,
      vec![
        "open-library",
        "finish-library",
        "construct-entry",
        "construct-definition",
        "close-usage-example",
        "construct-definition",
        "close-definition",
        "close-definition",
        "finish",
      ]
    );
  }

  #[test]
  fn invalid_documents_emit_nothing() {
    let cases = [
      r#"{"library": {"name": " "}}"#,
      r#"{"library": {"name": "x"}, "entries": [{"kana": [], "kanji": [""]}]}"#,
      r#"{"library": {"name": "x"}, "entries": [{"kana": ["a"],
          "definition": {"definitions": [{"usage_examples": [{"expression": ""}]}]}}]}"#,
    ];
    for json in cases {
      let doc = DictionaryDocument::from_json_str(json).unwrap();
      let mut recorder = Recorder::default();
      let err = doc.traverse(&mut recorder).unwrap_err();
      assert!(matches!(err, ImportError::InvalidSource { .. }), "{json}");
      assert!(recorder.0.is_empty());
    }
  }

  #[test]
  fn malformed_json_is_a_parse_error() {
    let err = DictionaryDocument::from_json_str("{").unwrap_err();
    assert!(matches!(err, ImportError::SourceParse(_)));
  }
}
