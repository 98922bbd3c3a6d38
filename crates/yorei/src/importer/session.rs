//! Session-scoped morpheme and expression cache.

use std::collections::HashMap;

use tracing::debug;

use crate::errors::StoreResult;
use crate::models::{ExpressionId, MorphemeId, MorphemeStatus, MorphemeType};
use crate::store::Store;

/// Memoizes `(surface, type) → morpheme` and `text → expression` for one import.
///
/// Every miss goes through the store's insert-or-ignore, so a cached id is always a
/// committed or in-transaction row. Discard the session after a rollback.
#[derive(Debug, Default)]
pub struct ImportSession {
  morphemes: HashMap<(String, MorphemeType), MorphemeId>,
  expressions: HashMap<String, ExpressionId>,
}

impl ImportSession {
  /// Empty session.
  pub fn new() -> Self {
    Self::default()
  }

  /// Morpheme id for `(surface, kind)`, created with status `auto` when missing.
  pub fn lookup_or_create_morpheme(
    &mut self,
    store: &Store,
    surface: &str,
    kind: MorphemeType,
  ) -> StoreResult<MorphemeId> {
    let key = (surface.to_string(), kind);
    if let Some(&id) = self.morphemes.get(&key) {
      return Ok(id);
    }

    let (id, is_new) = store.insert_or_ignore_morpheme(surface, kind, MorphemeStatus::Auto)?;
    if is_new {
      debug!(morpheme = surface, kind = ?kind, id = %id, "Morpheme created");
    }
    self.morphemes.insert(key, id);
    Ok(id)
  }

  /// Expression id for `text` and whether this call created the row.
  ///
  /// A cache hit always reports `false`.
  pub fn lookup_or_create_expression(&mut self, store: &Store, text: &str) -> StoreResult<(ExpressionId, bool)> {
    if let Some(&id) = self.expressions.get(text) {
      return Ok((id, false));
    }

    let (id, is_new) = store.insert_or_ignore_expression(text)?;
    self.expressions.insert(text.to_string(), id);
    Ok((id, is_new))
  }

  /// Number of cached morphemes.
  pub fn morpheme_count(&self) -> usize {
    self.morphemes.len()
  }

  /// Number of cached expressions.
  pub fn expression_count(&self) -> usize {
    self.expressions.len()
  }
}
