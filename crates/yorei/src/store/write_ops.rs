//! Persistence writes used by the import pipeline.
//!
//! `insert_or_ignore_*` return `(id, is_new)`: a unique-key conflict is resolved by an
//! equality read, never reported as an error.

use rusqlite::{OptionalExtension, params};

use crate::errors::StoreResult;
use crate::models::{
  Composition, DefinitionId, EntryFormatId, EntryId, ExpressionId, Extra, LibraryId, LibraryType,
  MorphemeId, MorphemeStatus, MorphemeType, UeListId, UeListType, UeTypeId, UsageExampleId,
};
use crate::store::database::Store;
use crate::store::sql_types::to_json;

/// Library row for [`Store::insert_or_replace_library`].
///
/// `id: None` creates a new row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLibrary {
  /// Existing row to replace
  pub id: Option<LibraryId>,
  /// Display name
  pub name: String,
  /// Dictionary or corpus
  pub kind: LibraryType,
  /// Short alias
  pub alias: Option<String>,
  /// Source date
  pub date: Option<String>,
  /// Upstream dump version
  pub dump_version: Option<String>,
  /// Converter version
  pub convert_version: Option<String>,
  /// Importer version
  pub import_version: Option<String>,
  /// Named extras
  pub extra: Extra,
}

/// Entry row for [`Store::insert_entry`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
  /// Owning library
  pub library_id: LibraryId,
  /// Entry format
  pub format_id: EntryFormatId,
  /// Sequence number within the library
  pub number: Option<i64>,
  /// Raw kana headwords (elision format)
  pub kana_raw: Option<Vec<String>>,
  /// Raw kanji headwords (elision format)
  pub kanji_raw: Option<Vec<String>>,
  /// Pitch accent
  pub accent: Option<String>,
  /// Named extras
  pub extra: Extra,
}

/// Definition row for [`Store::insert_definition`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewDefinition {
  /// Owning entry
  pub entry_id: EntryId,
  /// Parent definition (must already exist)
  pub parent_id: Option<DefinitionId>,
  /// Sibling number
  pub number: Option<i64>,
  /// Group label
  pub group: Option<String>,
  /// Definition text
  pub text: Option<String>,
  /// Named extras
  pub extra: Extra,
}

/// Usage-example row for [`Store::insert_or_ignore_usage_example`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewUsageExample {
  /// Referenced expression
  pub expression_id: ExpressionId,
  /// Owning library
  pub library_id: LibraryId,
  /// Usage-example type
  pub type_id: UeTypeId,
  /// Translation
  pub meaning: Option<String>,
  /// Reading
  pub reading: Option<String>,
  /// Sound file name
  pub sound: Option<String>,
  /// Image file name
  pub image: Option<String>,
  /// Named extras
  pub extra: Extra,
  /// Validated flag
  pub is_validated: bool,
}

impl Store {
  /// Expression by text.
  pub fn insert_or_ignore_expression(&self, text: &str) -> StoreResult<(ExpressionId, bool)> {
    let inserted = self
      .conn
      .prepare_cached("INSERT OR IGNORE INTO expressions (expression) VALUES (?1)")?
      .execute(params![text])?;
    if inserted == 1 {
      return Ok((ExpressionId(self.conn.last_insert_rowid()), true));
    }

    let id = self
      .conn
      .prepare_cached("SELECT id FROM expressions WHERE expression = ?1")?
      .query_row(params![text], |row| row.get(0))?;
    Ok((id, false))
  }

  /// Morpheme by `(surface, kind)`; `status` applies only to a new row.
  pub fn insert_or_ignore_morpheme(
    &self,
    surface: &str,
    kind: MorphemeType,
    status: MorphemeStatus,
  ) -> StoreResult<(MorphemeId, bool)> {
    let inserted = self
      .conn
      .prepare_cached("INSERT OR IGNORE INTO morphemes (morpheme, type, status) VALUES (?1, ?2, ?3)")?
      .execute(params![surface, kind.code(), status.code()])?;
    if inserted == 1 {
      return Ok((MorphemeId(self.conn.last_insert_rowid()), true));
    }

    let id = self
      .conn
      .prepare_cached("SELECT id FROM morphemes WHERE morpheme = ?1 AND type = ?2")?
      .query_row(params![surface, kind.code()], |row| row.get(0))?;
    Ok((id, false))
  }

  /// Entry format by name.
  pub fn insert_or_ignore_entry_format(&self, name: &str) -> StoreResult<EntryFormatId> {
    self
      .conn
      .prepare_cached("INSERT OR IGNORE INTO entry_formats (name) VALUES (?1)")?
      .execute(params![name])?;
    let id = self
      .conn
      .prepare_cached("SELECT id FROM entry_formats WHERE name = ?1")?
      .query_row(params![name], |row| row.get(0))?;
    Ok(id)
  }

  /// Usage-example type by (already upper-cased) name.
  pub fn insert_or_ignore_ue_type(&self, name: &str) -> StoreResult<UeTypeId> {
    self
      .conn
      .prepare_cached("INSERT OR IGNORE INTO ue_types (name) VALUES (?1)")?
      .execute(params![name])?;
    let id = self
      .conn
      .prepare_cached("SELECT id FROM ue_types WHERE name = ?1")?
      .query_row(params![name], |row| row.get(0))?;
    Ok(id)
  }

  /// Usage example by `(library_id, expression_id)`.
  ///
  /// An existing row is returned untouched.
  pub fn insert_or_ignore_usage_example(&self, ue: &NewUsageExample) -> StoreResult<(UsageExampleId, bool)> {
    let extra = to_json("extra", &ue.extra)?;
    let inserted = self
      .conn
      .prepare_cached(
        "INSERT OR IGNORE INTO usage_examples \
         (expression_id, library_id, type_id, meaning, reading, sound, image, extra, is_validated) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
      )?
      .execute(params![
        ue.expression_id,
        ue.library_id,
        ue.type_id,
        ue.meaning,
        ue.reading,
        ue.sound,
        ue.image,
        extra,
        ue.is_validated,
      ])?;
    if inserted == 1 {
      return Ok((UsageExampleId(self.conn.last_insert_rowid()), true));
    }

    let id = self
      .conn
      .prepare_cached("SELECT id FROM usage_examples WHERE library_id = ?1 AND expression_id = ?2")?
      .query_row(params![ue.library_id, ue.expression_id], |row| row.get(0))?;
    Ok((id, false))
  }

  /// Creates a library, or overwrites every column of `library.id`.
  pub fn insert_or_replace_library(&self, library: &NewLibrary) -> StoreResult<LibraryId> {
    let extra = to_json("extra", &library.extra)?;
    self.conn.execute(
      "INSERT INTO libraries \
       (id, name, type, alias, date, dump_version, convert_version, import_version, extra) \
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
       ON CONFLICT(id) DO UPDATE SET \
         name = excluded.name, type = excluded.type, alias = excluded.alias, \
         date = excluded.date, dump_version = excluded.dump_version, \
         convert_version = excluded.convert_version, import_version = excluded.import_version, \
         extra = excluded.extra",
      params![
        library.id,
        library.name,
        library.kind.code(),
        library.alias,
        library.date,
        library.dump_version,
        library.convert_version,
        library.import_version,
        extra,
      ],
    )?;

    Ok(match library.id {
      Some(id) => id,
      None => LibraryId(self.conn.last_insert_rowid()),
    })
  }

  /// Appends an entry.
  pub fn insert_entry(&self, entry: &NewEntry) -> StoreResult<EntryId> {
    let kana_raw = entry.kana_raw.as_ref().map(|raw| to_json("kana_raw", raw)).transpose()?;
    let kanji_raw = entry.kanji_raw.as_ref().map(|raw| to_json("kanji_raw", raw)).transpose()?;
    let extra = to_json("extra", &entry.extra)?;

    self
      .conn
      .prepare_cached(
        "INSERT INTO entries (library_id, format_id, number, kana_raw, kanji_raw, accent, extra) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
      )?
      .execute(params![
        entry.library_id,
        entry.format_id,
        entry.number,
        kana_raw,
        kanji_raw,
        entry.accent,
        extra,
      ])?;
    Ok(EntryId(self.conn.last_insert_rowid()))
  }

  /// Appends a definition.
  pub fn insert_definition(&self, definition: &NewDefinition) -> StoreResult<DefinitionId> {
    let extra = to_json("extra", &definition.extra)?;
    self
      .conn
      .prepare_cached(
        "INSERT INTO definitions (entry_id, parent_id, number, group_name, definition, extra) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      )?
      .execute(params![
        definition.entry_id,
        definition.parent_id,
        definition.number,
        definition.group,
        definition.text,
        extra,
      ])?;
    Ok(DefinitionId(self.conn.last_insert_rowid()))
  }

  /// Composition rows of an expression. Rows already present are kept.
  pub fn bulk_insert_expression_compositions(
    &self,
    expression_id: ExpressionId,
    compositions: &[Composition],
  ) -> StoreResult<usize> {
    let mut stmt = self.conn.prepare_cached(
      "INSERT OR IGNORE INTO expression_consists_of \
       (expression_id, morpheme_id, position, word_length, conjugation, reading) \
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    let mut inserted = 0;
    for c in compositions {
      inserted += stmt.execute(params![
        expression_id,
        c.morpheme_id,
        c.position as i64,
        c.length as i64,
        c.conjugation,
        c.reading,
      ])?;
    }
    Ok(inserted)
  }

  /// Composition rows of a definition text. Rows already present are kept.
  pub fn bulk_insert_definition_compositions(
    &self,
    definition_id: DefinitionId,
    compositions: &[Composition],
  ) -> StoreResult<usize> {
    let mut stmt = self.conn.prepare_cached(
      "INSERT OR IGNORE INTO definition_consists_of \
       (definition_id, morpheme_id, position, word_length, conjugation, reading) \
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    let mut inserted = 0;
    for c in compositions {
      inserted += stmt.execute(params![
        definition_id,
        c.morpheme_id,
        c.position as i64,
        c.length as i64,
        c.conjugation,
        c.reading,
      ])?;
    }
    Ok(inserted)
  }

  /// Kana headwords of an entry, numbered from 1 in slice order.
  pub fn bulk_insert_entry_kana(&self, entry_id: EntryId, morphemes: &[MorphemeId]) -> StoreResult<()> {
    let mut stmt = self
      .conn
      .prepare_cached("INSERT OR IGNORE INTO entry_has_kana (entry_id, morpheme_id, number) VALUES (?1, ?2, ?3)")?;
    for (idx, morpheme_id) in morphemes.iter().enumerate() {
      stmt.execute(params![entry_id, morpheme_id, (idx + 1) as i64])?;
    }
    Ok(())
  }

  /// Kanji headwords of an entry, numbered from 1 in slice order.
  pub fn bulk_insert_entry_kanji(&self, entry_id: EntryId, morphemes: &[MorphemeId]) -> StoreResult<()> {
    let mut stmt = self
      .conn
      .prepare_cached("INSERT OR IGNORE INTO entry_has_kanji (entry_id, morpheme_id, number) VALUES (?1, ?2, ?3)")?;
    for (idx, morpheme_id) in morphemes.iter().enumerate() {
      stmt.execute(params![entry_id, morpheme_id, (idx + 1) as i64])?;
    }
    Ok(())
  }

  /// Links usage examples to a definition with their numbers.
  pub fn bulk_insert_definition_ues(
    &self,
    definition_id: DefinitionId,
    links: &[(UsageExampleId, i64)],
  ) -> StoreResult<()> {
    let mut stmt = self.conn.prepare_cached(
      "INSERT OR IGNORE INTO definition_has_ues (usage_example_id, definition_id, number) VALUES (?1, ?2, ?3)",
    )?;
    for (ue_id, number) in links {
      stmt.execute(params![ue_id, definition_id, number])?;
    }
    Ok(())
  }

  /// Creates a list row when missing.
  pub fn ensure_ue_list(&self, list_id: UeListId, name: &str, kind: UeListType) -> StoreResult<()> {
    self.conn.execute(
      "INSERT OR IGNORE INTO ue_lists (id, name, type_id) VALUES (?1, ?2, ?3)",
      params![list_id, name, kind.code()],
    )?;
    Ok(())
  }

  /// Adds a usage example to a list; returns whether the link is new.
  pub fn link_to_list(&self, list_id: UeListId, ue_id: UsageExampleId) -> StoreResult<bool> {
    let inserted = self
      .conn
      .prepare_cached("INSERT OR IGNORE INTO ue_part_of_list (ue_list_id, usage_example_id) VALUES (?1, ?2)")?
      .execute(params![list_id, ue_id])?;
    Ok(inserted == 1)
  }

  /// Adds each `(morpheme, increment)` to `expr_count` in one prepared batch.
  ///
  /// Returns the number of rows touched.
  pub fn bulk_increment_expr_count(&self, increments: &[(MorphemeId, i64)]) -> StoreResult<usize> {
    let mut stmt = self
      .conn
      .prepare_cached("UPDATE morphemes SET expr_count = COALESCE(expr_count, 0) + ?1 WHERE id = ?2")?;
    let mut touched = 0;
    for (morpheme_id, increment) in increments {
      touched += stmt.execute(params![increment, morpheme_id])?;
    }
    Ok(touched)
  }

  /// Sets `def_count` of every morpheme to the number of definitions containing it.
  pub fn refresh_def_counts(&self) -> StoreResult<usize> {
    let touched = self.conn.execute(
      "UPDATE morphemes SET def_count = \
       (SELECT COUNT(DISTINCT definition_id) FROM definition_consists_of c WHERE c.morpheme_id = morphemes.id) \
       WHERE id IN (SELECT morpheme_id FROM definition_consists_of)",
      [],
    )?;
    Ok(touched)
  }

  /// Library with this exact name, if any (lowest id wins).
  pub fn find_library_id_by_name(&self, name: &str) -> StoreResult<Option<LibraryId>> {
    let id = self
      .conn
      .prepare_cached("SELECT id FROM libraries WHERE name = ?1 ORDER BY id LIMIT 1")?
      .query_row(params![name], |row| row.get(0))
      .optional()?;
    Ok(id)
  }

  /// Number of members of `list_id` whose expression is `expression_id`.
  pub fn count_list_members_with_expression(
    &self,
    list_id: UeListId,
    expression_id: ExpressionId,
  ) -> StoreResult<i64> {
    let count = self
      .conn
      .prepare_cached(
        "SELECT COUNT(*) FROM ue_part_of_list p \
         JOIN usage_examples ue ON ue.id = p.usage_example_id \
         WHERE p.ue_list_id = ?1 AND ue.expression_id = ?2",
      )?
      .query_row(params![list_id, expression_id], |row| row.get(0))?;
    Ok(count)
  }

  /// Distinct morphemes of an expression's composition.
  pub fn expression_morpheme_ids(&self, expression_id: ExpressionId) -> StoreResult<Vec<MorphemeId>> {
    let mut stmt = self.conn.prepare_cached(
      "SELECT DISTINCT morpheme_id FROM expression_consists_of WHERE expression_id = ?1 ORDER BY morpheme_id",
    )?;
    let ids = stmt
      .query_map(params![expression_id], |row| row.get(0))?
      .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
  }
}
