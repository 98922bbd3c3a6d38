//! Source-facing visitor trait.

use crate::errors::ImportResult;
use crate::models::{Extra, LibraryType};

/// Receiver of the traversal protocol described in [`crate::importer::events`].
///
/// Every method defaults to a no-op so that partial visitors (dry runs, counters) only
/// implement what they need.
#[allow(unused_variables)]
pub trait ImportVisitor {
  /// `open-library`
  fn open_library(&mut self, kind: LibraryType) -> ImportResult<()> {
    Ok(())
  }
  /// `library-name`
  fn library_name(&mut self, name: &str) -> ImportResult<()> {
    Ok(())
  }
  /// `library-alias`
  fn library_alias(&mut self, alias: &str) -> ImportResult<()> {
    Ok(())
  }
  /// `library-dump-version`
  fn library_dump_version(&mut self, version: &str) -> ImportResult<()> {
    Ok(())
  }
  /// `library-convert-version`
  fn library_convert_version(&mut self, version: &str) -> ImportResult<()> {
    Ok(())
  }
  /// `library-date`
  fn library_date(&mut self, date: &str) -> ImportResult<()> {
    Ok(())
  }
  /// `library-extra`
  fn library_extra(&mut self, extra: &Extra) -> ImportResult<()> {
    Ok(())
  }
  /// `finish-library`
  fn finish_library(&mut self) -> ImportResult<()> {
    Ok(())
  }

  /// `open-entry`
  fn open_entry(&mut self, number: Option<i64>) -> ImportResult<()> {
    Ok(())
  }
  /// `entry-format`
  fn entry_format(&mut self, format: &str) -> ImportResult<()> {
    Ok(())
  }
  /// `entry-kana-raw`
  fn entry_kana_raw(&mut self, kana: &[String]) -> ImportResult<()> {
    Ok(())
  }
  /// `entry-kanji-raw`
  fn entry_kanji_raw(&mut self, kanji: &[String]) -> ImportResult<()> {
    Ok(())
  }
  /// `entry-accent`
  fn entry_accent(&mut self, accent: &str) -> ImportResult<()> {
    Ok(())
  }
  /// `entry-extra`
  fn entry_extra(&mut self, extra: &Extra) -> ImportResult<()> {
    Ok(())
  }
  /// `construct-entry`
  fn construct_entry(&mut self) -> ImportResult<()> {
    Ok(())
  }
  /// `entry-kana`
  fn entry_kana(&mut self, kana: &[String]) -> ImportResult<()> {
    Ok(())
  }
  /// `entry-kanji`
  fn entry_kanji(&mut self, kanji: &[String]) -> ImportResult<()> {
    Ok(())
  }

  /// `open-definition`
  fn open_definition(&mut self, number: Option<i64>) -> ImportResult<()> {
    Ok(())
  }
  /// `definition-group`
  fn definition_group(&mut self, group: &str) -> ImportResult<()> {
    Ok(())
  }
  /// `definition-text`
  fn definition_text(&mut self, text: &str) -> ImportResult<()> {
    Ok(())
  }
  /// `definition-extra`
  fn definition_extra(&mut self, extra: &Extra) -> ImportResult<()> {
    Ok(())
  }
  /// `construct-definition`
  fn construct_definition(&mut self) -> ImportResult<()> {
    Ok(())
  }
  /// `finish-definition-associations`
  fn finish_definition_associations(&mut self) -> ImportResult<()> {
    Ok(())
  }
  /// `close-definition`
  fn close_definition(&mut self) -> ImportResult<()> {
    Ok(())
  }

  /// `open-usage-example`
  fn open_usage_example(&mut self, ue_type: Option<&str>) -> ImportResult<()> {
    Ok(())
  }
  /// `usage-example-expression`
  fn usage_example_expression(&mut self, expression: &str) -> ImportResult<()> {
    Ok(())
  }
  /// `usage-example-reading`
  fn usage_example_reading(&mut self, reading: &str) -> ImportResult<()> {
    Ok(())
  }
  /// `usage-example-meaning`
  fn usage_example_meaning(&mut self, meaning: &str) -> ImportResult<()> {
    Ok(())
  }
  /// `usage-example-sound`
  fn usage_example_sound(&mut self, sound: &str) -> ImportResult<()> {
    Ok(())
  }
  /// `usage-example-image`
  fn usage_example_image(&mut self, image: &str) -> ImportResult<()> {
    Ok(())
  }
  /// `usage-example-extra`
  fn usage_example_extra(&mut self, extra: &Extra) -> ImportResult<()> {
    Ok(())
  }
  /// `usage-example-validated`
  fn usage_example_validated(&mut self, validated: bool) -> ImportResult<()> {
    Ok(())
  }
  /// `close-usage-example`
  fn close_usage_example(&mut self, number: Option<i64>) -> ImportResult<()> {
    Ok(())
  }

  /// `finish`
  fn finish(&mut self) -> ImportResult<()> {
    Ok(())
  }
}
