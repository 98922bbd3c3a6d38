//! Row reads used by lookups and result materialization.

use rusqlite::{OptionalExtension, Row, params};

use crate::errors::{StoreError, StoreResult};
use crate::models::{
  Composition, Definition, DefinitionId, Entry, EntryId, Expression, ExpressionId, Library, LibraryId,
  LibraryType, Morpheme, MorphemeId, MorphemeStatus, MorphemeType, UsageExample, UsageExampleId,
};
use crate::store::database::Store;
use crate::store::sql_types::{from_json, from_json_opt};

/// Raw definition columns; JSON decoding happens outside the row closure.
struct DefinitionRow {
  id: DefinitionId,
  entry_id: EntryId,
  parent_id: Option<DefinitionId>,
  number: Option<i64>,
  group: Option<String>,
  text: Option<String>,
  extra: String,
}

impl DefinitionRow {
  const COLUMNS: &'static str = "d.id, d.entry_id, d.parent_id, d.number, d.group_name, d.definition, d.extra";

  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id: row.get(0)?,
      entry_id: row.get(1)?,
      parent_id: row.get(2)?,
      number: row.get(3)?,
      group: row.get(4)?,
      text: row.get(5)?,
      extra: row.get(6)?,
    })
  }

  fn into_definition(self) -> StoreResult<Definition> {
    Ok(Definition {
      id: self.id,
      entry_id: self.entry_id,
      parent_id: self.parent_id,
      number: self.number,
      group: self.group,
      text: self.text,
      extra: from_json("extra", &self.extra)?,
    })
  }
}

fn library_kind(code: i64) -> StoreResult<LibraryType> {
  LibraryType::from_code(code).ok_or(StoreError::InvalidValue {
    table: "libraries",
    column: "type",
    value: code,
  })
}

fn morpheme_kind(code: i64) -> StoreResult<MorphemeType> {
  MorphemeType::from_code(code).ok_or(StoreError::InvalidValue {
    table: "morphemes",
    column: "type",
    value: code,
  })
}

fn morpheme_status(code: i64) -> StoreResult<MorphemeStatus> {
  MorphemeStatus::from_code(code).ok_or(StoreError::InvalidValue {
    table: "morphemes",
    column: "status",
    value: code,
  })
}

impl Store {
  /// Library by id.
  pub fn library(&self, id: LibraryId) -> StoreResult<Library> {
    type LibraryRow = (
      String,
      i64,
      Option<String>,
      Option<String>,
      Option<String>,
      Option<String>,
      Option<String>,
      String,
    );
    let row: Option<LibraryRow> = self
      .conn
      .prepare_cached(
        "SELECT name, type, alias, date, dump_version, convert_version, import_version, extra \
         FROM libraries WHERE id = ?1",
      )?
      .query_row(params![id], |row| {
        Ok((
          row.get(0)?,
          row.get(1)?,
          row.get(2)?,
          row.get(3)?,
          row.get(4)?,
          row.get(5)?,
          row.get(6)?,
          row.get(7)?,
        ))
      })
      .optional()?;
    let (name, kind, alias, date, dump_version, convert_version, import_version, extra) =
      row.ok_or(StoreError::NotFound {
        table: "libraries",
        id: id.get(),
      })?;

    Ok(Library {
      id,
      name,
      kind: library_kind(kind)?,
      alias,
      date,
      dump_version,
      convert_version,
      import_version,
      extra: from_json("extra", &extra)?,
    })
  }

  /// Entry by id, with its headword associations ordered by number.
  pub fn entry(&self, id: EntryId) -> StoreResult<Entry> {
    type EntryRow = (LibraryId, String, Option<i64>, Option<String>, Option<String>, Option<String>, String);
    let row: Option<EntryRow> = self
      .conn
      .prepare_cached(
        "SELECT en.library_id, f.name, en.number, en.kana_raw, en.kanji_raw, en.accent, en.extra \
         FROM entries en JOIN entry_formats f ON f.id = en.format_id WHERE en.id = ?1",
      )?
      .query_row(params![id], |row| {
        Ok((
          row.get(0)?,
          row.get(1)?,
          row.get(2)?,
          row.get(3)?,
          row.get(4)?,
          row.get(5)?,
          row.get(6)?,
        ))
      })
      .optional()?;
    let (library_id, format, number, kana_raw, kanji_raw, accent, extra) = row.ok_or(StoreError::NotFound {
      table: "entries",
      id: id.get(),
    })?;

    Ok(Entry {
      id,
      library_id,
      format,
      number,
      kana_raw: from_json_opt("kana_raw", kana_raw.as_deref())?,
      kanji_raw: from_json_opt("kanji_raw", kanji_raw.as_deref())?,
      accent,
      extra: from_json("extra", &extra)?,
      kana: self.entry_headwords("entry_has_kana", id)?,
      kanji: self.entry_headwords("entry_has_kanji", id)?,
    })
  }

  fn entry_headwords(&self, table: &'static str, id: EntryId) -> StoreResult<Vec<String>> {
    let sql = format!(
      "SELECT m.morpheme FROM {table} h JOIN morphemes m ON m.id = h.morpheme_id \
       WHERE h.entry_id = ?1 ORDER BY h.number"
    );
    let mut stmt = self.conn.prepare_cached(&sql)?;
    let words = stmt
      .query_map(params![id], |row| row.get(0))?
      .collect::<Result<Vec<String>, _>>()?;
    Ok(words)
  }

  /// Definition by id.
  pub fn definition(&self, id: DefinitionId) -> StoreResult<Definition> {
    let sql = format!("SELECT {} FROM definitions d WHERE d.id = ?1", DefinitionRow::COLUMNS);
    let row = self
      .conn
      .prepare_cached(&sql)?
      .query_row(params![id], DefinitionRow::from_row)
      .optional()?
      .ok_or(StoreError::NotFound {
        table: "definitions",
        id: id.get(),
      })?;
    row.into_definition()
  }

  /// Definitions of an entry in construction (pre-order) order.
  pub fn definitions_of_entry(&self, entry_id: EntryId) -> StoreResult<Vec<Definition>> {
    let sql = format!(
      "SELECT {} FROM definitions d WHERE d.entry_id = ?1 ORDER BY d.id",
      DefinitionRow::COLUMNS
    );
    self.collect_definitions(&sql, entry_id.get())
  }

  /// Definitions a usage example is linked to.
  pub fn definitions_of_usage_example(&self, ue_id: UsageExampleId) -> StoreResult<Vec<Definition>> {
    let sql = format!(
      "SELECT {} FROM definitions d JOIN definition_has_ues dh ON dh.definition_id = d.id \
       WHERE dh.usage_example_id = ?1 ORDER BY d.id",
      DefinitionRow::COLUMNS
    );
    self.collect_definitions(&sql, ue_id.get())
  }

  fn collect_definitions(&self, sql: &str, key: i64) -> StoreResult<Vec<Definition>> {
    let mut stmt = self.conn.prepare_cached(sql)?;
    let rows = stmt
      .query_map(params![key], DefinitionRow::from_row)?
      .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(DefinitionRow::into_definition).collect()
  }

  /// Usage examples linked to a definition, ordered by link number.
  pub fn usage_examples_of_definition(&self, definition_id: DefinitionId) -> StoreResult<Vec<UsageExampleId>> {
    let mut stmt = self.conn.prepare_cached(
      "SELECT usage_example_id FROM definition_has_ues WHERE definition_id = ?1 \
       ORDER BY number, usage_example_id",
    )?;
    let ids = stmt
      .query_map(params![definition_id], |row| row.get(0))?
      .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
  }

  /// Usage example by id, together with its expression.
  pub fn usage_example(&self, id: UsageExampleId) -> StoreResult<(UsageExample, Expression)> {
    type UeRow = (
      ExpressionId,
      String,
      LibraryId,
      String,
      Option<String>,
      Option<String>,
      Option<String>,
      Option<String>,
      String,
      bool,
    );
    let row: Option<UeRow> = self
      .conn
      .prepare_cached(
        "SELECT ue.expression_id, e.expression, ue.library_id, t.name, ue.meaning, ue.reading, \
         ue.sound, ue.image, ue.extra, ue.is_validated \
         FROM usage_examples ue \
         JOIN expressions e ON e.id = ue.expression_id \
         JOIN ue_types t ON t.id = ue.type_id \
         WHERE ue.id = ?1",
      )?
      .query_row(params![id], |row| {
        Ok((
          row.get(0)?,
          row.get(1)?,
          row.get(2)?,
          row.get(3)?,
          row.get(4)?,
          row.get(5)?,
          row.get(6)?,
          row.get(7)?,
          row.get(8)?,
          row.get(9)?,
        ))
      })
      .optional()?;
    let (expression_id, text, library_id, ue_type, meaning, reading, sound, image, extra, is_validated) =
      row.ok_or(StoreError::NotFound {
        table: "usage_examples",
        id: id.get(),
      })?;

    Ok((
      UsageExample {
        id,
        expression_id,
        library_id,
        ue_type,
        meaning,
        reading,
        sound,
        image,
        extra: from_json("extra", &extra)?,
        is_validated,
      },
      Expression { id: expression_id, text },
    ))
  }

  /// Morpheme by id.
  pub fn morpheme(&self, id: MorphemeId) -> StoreResult<Morpheme> {
    let row: Option<(String, i64, i64, Option<i64>, Option<i64>)> = self
      .conn
      .prepare_cached("SELECT morpheme, type, status, expr_count, def_count FROM morphemes WHERE id = ?1")?
      .query_row(params![id], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
      })
      .optional()?;
    let (surface, kind, status, expr_count, def_count) = row.ok_or(StoreError::NotFound {
      table: "morphemes",
      id: id.get(),
    })?;

    Ok(Morpheme {
      id,
      surface,
      kind: morpheme_kind(kind)?,
      status: morpheme_status(status)?,
      expr_count,
      def_count,
    })
  }

  /// Morpheme by its unique key.
  pub fn find_morpheme(&self, surface: &str, kind: MorphemeType) -> StoreResult<Option<Morpheme>> {
    let id: Option<MorphemeId> = self
      .conn
      .prepare_cached("SELECT id FROM morphemes WHERE morpheme = ?1 AND type = ?2")?
      .query_row(params![surface, kind.code()], |row| row.get(0))
      .optional()?;
    id.map(|id| self.morpheme(id)).transpose()
  }

  /// Expression by its text.
  pub fn find_expression(&self, text: &str) -> StoreResult<Option<Expression>> {
    let id: Option<ExpressionId> = self
      .conn
      .prepare_cached("SELECT id FROM expressions WHERE expression = ?1")?
      .query_row(params![text], |row| row.get(0))
      .optional()?;
    Ok(id.map(|id| Expression {
      id,
      text: text.to_string(),
    }))
  }

  /// Composition of an expression, ordered by position.
  pub fn expression_compositions(&self, expression_id: ExpressionId) -> StoreResult<Vec<Composition>> {
    self.compositions(
      "SELECT morpheme_id, position, word_length, conjugation, reading FROM expression_consists_of \
       WHERE expression_id = ?1 ORDER BY position, morpheme_id",
      expression_id.get(),
    )
  }

  /// Composition of a definition text, ordered by position.
  pub fn definition_compositions(&self, definition_id: DefinitionId) -> StoreResult<Vec<Composition>> {
    self.compositions(
      "SELECT morpheme_id, position, word_length, conjugation, reading FROM definition_consists_of \
       WHERE definition_id = ?1 ORDER BY position, morpheme_id",
      definition_id.get(),
    )
  }

  fn compositions(&self, sql: &str, owner: i64) -> StoreResult<Vec<Composition>> {
    let mut stmt = self.conn.prepare_cached(sql)?;
    let rows = stmt
      .query_map(params![owner], |row| {
        Ok(Composition {
          morpheme_id: row.get(0)?,
          position: row.get::<_, i64>(1)?.max(0) as usize,
          length: row.get::<_, i64>(2)?.max(0) as usize,
          conjugation: row.get(3)?,
          reading: row.get(4)?,
        })
      })?
      .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
  }

  /// Composition rows of an expression joined with each morpheme's `expr_count`.
  pub fn expression_composition_counts(&self, expression_id: ExpressionId) -> StoreResult<Vec<Option<i64>>> {
    let mut stmt = self.conn.prepare_cached(
      "SELECT m.expr_count FROM expression_consists_of c JOIN morphemes m ON m.id = c.morpheme_id \
       WHERE c.expression_id = ?1 ORDER BY c.position",
    )?;
    let counts = stmt
      .query_map(params![expression_id], |row| row.get(0))?
      .collect::<Result<Vec<_>, _>>()?;
    Ok(counts)
  }

  /// Members of a list, in id order.
  pub fn list_members(&self, list_id: crate::models::UeListId) -> StoreResult<Vec<UsageExampleId>> {
    let mut stmt = self
      .conn
      .prepare_cached("SELECT usage_example_id FROM ue_part_of_list WHERE ue_list_id = ?1 ORDER BY usage_example_id")?;
    let ids = stmt
      .query_map(params![list_id], |row| row.get(0))?
      .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
  }
}
