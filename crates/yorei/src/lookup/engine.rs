//! Lookup engine
//!
//! Resolves a query to ranked usage examples. Counting and paging run in SQL with the same
//! filter, so `total` always describes the pages; only the requested page is materialized.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::LookupError;
use crate::models::{Definition, Entry, Library, LibraryId};
use crate::store::{LookupFilter, LookupRow, Store};

use super::classify::{QueryKind, classify};
use super::results::{EntryResultList, Provenance, UeResult, UeResultList};

/// Relation a query is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
  /// Entry headwords (kana or kanji, by query script)
  #[default]
  Entry,
  /// Morphemes of usage-example expressions
  Expression,
  /// Morphemes of definition texts
  Definition,
}

impl SearchMode {
  fn filter(self, query: &str) -> LookupFilter<'_> {
    match (self, classify(query)) {
      (SearchMode::Entry, QueryKind::Kana) => LookupFilter::EntryKana(query),
      (SearchMode::Entry, QueryKind::Kanji) => LookupFilter::EntryKanji(query),
      (SearchMode::Expression, _) => LookupFilter::ExpressionMorpheme(query),
      (SearchMode::Definition, _) => LookupFilter::DefinitionMorpheme(query),
    }
  }
}

/// Read-side engine over one store connection.
#[derive(Debug)]
pub struct LookupEngine<'s> {
  store: &'s Store,
  default_limit: usize,
  max_limit: usize,
}

impl<'s> LookupEngine<'s> {
  /// Creates an engine; `limit` requests are clamped to `max_limit`.
  pub fn new(store: &'s Store, default_limit: usize, max_limit: usize) -> Self {
    Self {
      store,
      default_limit,
      max_limit,
    }
  }

  fn effective_limit(&self, limit: Option<usize>) -> usize {
    limit.unwrap_or(self.default_limit).min(self.max_limit)
  }

  /// One ranked page of usage examples for `query`.
  ///
  /// The query is trimmed; a blank query returns an empty list without touching the store.
  pub fn search(
    &self,
    query: &str,
    mode: SearchMode,
    limit: Option<usize>,
    offset: usize,
  ) -> Result<UeResultList, LookupError> {
    let query = query.trim();
    if query.is_empty() {
      debug!("Blank query, nothing to look up");
      return Ok(UeResultList::empty());
    }

    let limit = self.effective_limit(limit);
    let filter = mode.filter(query);
    let total = self.store.lookup_count(filter)?;
    let rows = if limit == 0 || offset >= total {
      Vec::new()
    } else {
      self.store.lookup_page(filter, limit, offset)?
    };

    let results = rows
      .iter()
      .map(|row| self.materialize(row))
      .collect::<Result<Vec<_>, _>>()?;

    info!(
      query = %query,
      mode = ?mode,
      total,
      returned = results.len(),
      offset,
      "Lookup completed"
    );
    Ok(UeResultList { total, results })
  }

  /// Loads everything a result needs for one ranked row.
  fn materialize(&self, row: &LookupRow) -> Result<UeResult, LookupError> {
    let (usage_example, expression) = self.store.usage_example(row.usage_example_id)?;
    let compositions = self.store.expression_compositions(expression.id)?;
    let composition_counts = self.store.expression_composition_counts(expression.id)?;

    let (entries, definitions) = match (row.entry_id, row.definition_id) {
      (Some(entry_id), Some(definition_id)) => (
        vec![self.store.entry(entry_id)?],
        vec![self.store.definition(definition_id)?],
      ),
      _ => {
        let definitions = self.store.definitions_of_usage_example(usage_example.id)?;
        let entries = self.entries_of(&definitions)?;
        (entries, definitions)
      }
    };
    let libraries = self.libraries_of(usage_example.library_id, &entries)?;
    let ancestors = match definitions.as_slice() {
      [definition] => self.ancestors_of(definition)?,
      _ => Vec::new(),
    };

    Ok(UeResult::new(
      usage_example,
      expression,
      compositions,
      composition_counts,
      Provenance {
        libraries,
        entries,
        definitions,
        ancestors,
      },
    ))
  }

  /// Parent chain of `definition`, root first.
  fn ancestors_of(&self, definition: &Definition) -> Result<Vec<Definition>, LookupError> {
    let mut seen = HashSet::from([definition.id]);
    let mut chain = Vec::new();
    let mut parent = definition.parent_id;
    while let Some(id) = parent {
      if !seen.insert(id) {
        break;
      }
      let ancestor = self.store.definition(id)?;
      parent = ancestor.parent_id;
      chain.push(ancestor);
    }
    chain.reverse();
    Ok(chain)
  }

  fn entries_of(&self, definitions: &[Definition]) -> Result<Vec<Entry>, LookupError> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for definition in definitions {
      if seen.insert(definition.entry_id) {
        entries.push(self.store.entry(definition.entry_id)?);
      }
    }
    Ok(entries)
  }

  fn libraries_of(&self, own: LibraryId, entries: &[Entry]) -> Result<Vec<Library>, LookupError> {
    let mut seen = HashSet::new();
    let mut libraries = Vec::new();
    for id in std::iter::once(own).chain(entries.iter().map(|entry| entry.library_id)) {
      if seen.insert(id) {
        libraries.push(self.store.library(id)?);
      }
    }
    Ok(libraries)
  }

  /// One page of entries whose headword equals `query`, kana or kanji by script.
  pub fn lookup_entries(&self, query: &str, limit: Option<usize>, offset: usize) -> Result<EntryResultList, LookupError> {
    let query = query.trim();
    if query.is_empty() {
      return Ok(EntryResultList::default());
    }

    let kana = classify(query) == QueryKind::Kana;
    let limit = self.effective_limit(limit);
    let total = self.store.entry_count(query, kana)?;
    let entries = if limit == 0 || offset >= total {
      Vec::new()
    } else {
      self
        .store
        .entry_page(query, kana, limit, offset)?
        .into_iter()
        .map(|id| self.store.entry(id))
        .collect::<Result<Vec<_>, _>>()?
    };

    debug!(query = %query, kana, total, returned = entries.len(), "Entry lookup completed");
    Ok(EntryResultList { total, entries })
  }
}
