//! Ranked lookup queries.
//!
//! Count and page share one `FROM ... WHERE` fragment per path so totals and pages always
//! agree. Pages are ordered by the rarity score computed in SQL:
//!
//! `char_len(expression) / 100 + Σ max(0, 3 - COALESCE(expr_count, 0)) / 3`
//!
//! with ties broken by usage-example id, then definition id.

use rusqlite::params;

use crate::errors::StoreResult;
use crate::models::{DefinitionId, EntryId, UsageExampleId};
use crate::store::database::Store;

/// Score expression over `e` (expressions) shared by every lookup path.
const SCORE_SQL: &str = "(length(e.expression) / 100.0 + COALESCE((\
   SELECT SUM(MAX(0, 3 - COALESCE(m.expr_count, 0)) / 3.0) \
   FROM expression_consists_of c JOIN morphemes m ON m.id = c.morpheme_id \
   WHERE c.expression_id = e.id), 0))";

/// Which relation a lookup query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupFilter<'q> {
  /// Entries whose kana headword equals the query
  EntryKana(&'q str),
  /// Entries whose kanji headword equals the query
  EntryKanji(&'q str),
  /// Usage examples whose expression contains the morpheme
  ExpressionMorpheme(&'q str),
  /// Usage examples linked to definitions whose text contains the morpheme
  DefinitionMorpheme(&'q str),
}

impl LookupFilter<'_> {
  fn query(&self) -> &str {
    match self {
      LookupFilter::EntryKana(q)
      | LookupFilter::EntryKanji(q)
      | LookupFilter::ExpressionMorpheme(q)
      | LookupFilter::DefinitionMorpheme(q) => q,
    }
  }

  /// `FROM ... WHERE` fragment binding the query as `?1`; exposes `ue`, `e` and the
  /// entry / definition id columns.
  fn source(&self) -> (&'static str, &'static str, &'static str) {
    match self {
      LookupFilter::EntryKana(_) => (
        "FROM entry_has_kana h \
         JOIN morphemes m0 ON m0.id = h.morpheme_id \
         JOIN definitions d ON d.entry_id = h.entry_id \
         JOIN definition_has_ues dh ON dh.definition_id = d.id \
         JOIN usage_examples ue ON ue.id = dh.usage_example_id \
         JOIN expressions e ON e.id = ue.expression_id \
         WHERE m0.morpheme = ?1",
        "h.entry_id",
        "d.id",
      ),
      LookupFilter::EntryKanji(_) => (
        "FROM entry_has_kanji h \
         JOIN morphemes m0 ON m0.id = h.morpheme_id \
         JOIN definitions d ON d.entry_id = h.entry_id \
         JOIN definition_has_ues dh ON dh.definition_id = d.id \
         JOIN usage_examples ue ON ue.id = dh.usage_example_id \
         JOIN expressions e ON e.id = ue.expression_id \
         WHERE m0.morpheme = ?1",
        "h.entry_id",
        "d.id",
      ),
      LookupFilter::ExpressionMorpheme(_) => (
        "FROM usage_examples ue \
         JOIN expressions e ON e.id = ue.expression_id \
         WHERE EXISTS (SELECT 1 FROM expression_consists_of c0 \
           JOIN morphemes m0 ON m0.id = c0.morpheme_id \
           WHERE c0.expression_id = e.id AND m0.morpheme = ?1)",
        "NULL",
        "NULL",
      ),
      LookupFilter::DefinitionMorpheme(_) => (
        "FROM definitions d \
         JOIN definition_has_ues dh ON dh.definition_id = d.id \
         JOIN usage_examples ue ON ue.id = dh.usage_example_id \
         JOIN expressions e ON e.id = ue.expression_id \
         WHERE EXISTS (SELECT 1 FROM definition_consists_of c0 \
           JOIN morphemes m0 ON m0.id = c0.morpheme_id \
           WHERE c0.definition_id = d.id AND m0.morpheme = ?1)",
        "d.entry_id",
        "d.id",
      ),
    }
  }

  fn distinct_rows_sql(&self) -> String {
    let (source, entry_col, definition_col) = self.source();
    format!(
      "SELECT DISTINCT ue.id AS ue_id, {entry_col} AS entry_id, {definition_col} AS definition_id, \
       {SCORE_SQL} AS score {source}"
    )
  }
}

/// One ranked lookup row before materialization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookupRow {
  /// Matched usage example
  pub usage_example_id: UsageExampleId,
  /// Entry the match came through (entry and definition paths)
  pub entry_id: Option<EntryId>,
  /// Definition the match came through (entry and definition paths)
  pub definition_id: Option<DefinitionId>,
  /// Rarity score computed by the query
  pub score: f64,
}

impl Store {
  /// Number of rows [`Store::lookup_page`] can return for `filter`.
  pub fn lookup_count(&self, filter: LookupFilter<'_>) -> StoreResult<usize> {
    let sql = format!("SELECT COUNT(*) FROM ({})", filter.distinct_rows_sql());
    let count: i64 = self
      .conn
      .prepare_cached(&sql)?
      .query_row(params![filter.query()], |row| row.get(0))?;
    Ok(count.max(0) as usize)
  }

  /// One page of ranked rows for `filter`.
  pub fn lookup_page(&self, filter: LookupFilter<'_>, limit: usize, offset: usize) -> StoreResult<Vec<LookupRow>> {
    let sql = format!(
      "SELECT ue_id, entry_id, definition_id, score FROM ({}) \
       ORDER BY score DESC, ue_id, definition_id LIMIT ?2 OFFSET ?3",
      filter.distinct_rows_sql()
    );
    let mut stmt = self.conn.prepare_cached(&sql)?;
    let rows = stmt
      .query_map(params![filter.query(), limit as i64, offset as i64], |row| {
        Ok(LookupRow {
          usage_example_id: row.get(0)?,
          entry_id: row.get(1)?,
          definition_id: row.get(2)?,
          score: row.get(3)?,
        })
      })?
      .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
  }

  /// Number of entries whose kana (or kanji) headword equals `query`.
  pub fn entry_count(&self, query: &str, kana: bool) -> StoreResult<usize> {
    let sql = format!(
      "SELECT COUNT(DISTINCT h.entry_id) FROM {} h JOIN morphemes m ON m.id = h.morpheme_id \
       WHERE m.morpheme = ?1",
      headword_table(kana)
    );
    let count: i64 = self
      .conn
      .prepare_cached(&sql)?
      .query_row(params![query], |row| row.get(0))?;
    Ok(count.max(0) as usize)
  }

  /// One page of entries whose kana (or kanji) headword equals `query`, in id order.
  pub fn entry_page(&self, query: &str, kana: bool, limit: usize, offset: usize) -> StoreResult<Vec<EntryId>> {
    let sql = format!(
      "SELECT DISTINCT h.entry_id FROM {} h JOIN morphemes m ON m.id = h.morpheme_id \
       WHERE m.morpheme = ?1 ORDER BY h.entry_id LIMIT ?2 OFFSET ?3",
      headword_table(kana)
    );
    let mut stmt = self.conn.prepare_cached(&sql)?;
    let ids = stmt
      .query_map(params![query, limit as i64, offset as i64], |row| row.get(0))?
      .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
  }
}

fn headword_table(kana: bool) -> &'static str {
  if kana { "entry_has_kana" } else { "entry_has_kanji" }
}
