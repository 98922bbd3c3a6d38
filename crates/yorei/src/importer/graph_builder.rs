//! Token sequence → composition rows.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::errors::StoreResult;
use crate::importer::session::ImportSession;
use crate::models::{Composition, DefinitionId, ExpressionId};
use crate::store::Store;
use crate::tokenizer::MorphemeTokenizer;

/// Decomposes texts into morpheme compositions and persists them.
///
/// Never touches expression or definition rows beyond their composition tables.
#[derive(Clone)]
pub struct GraphBuilder {
  tokenizer: Arc<dyn MorphemeTokenizer>,
}

impl GraphBuilder {
  /// Builder over a shared tokenizer.
  pub fn new(tokenizer: Arc<dyn MorphemeTokenizer>) -> Self {
    Self { tokenizer }
  }

  /// Tokenizer in use.
  pub fn tokenizer(&self) -> &Arc<dyn MorphemeTokenizer> {
    &self.tokenizer
  }

  /// Composition rows of `text`, sorted by position; morphemes resolved by `(base, kind)`.
  pub fn decompose(&self, session: &mut ImportSession, store: &Store, text: &str) -> StoreResult<Vec<Composition>> {
    let mut rows = Vec::new();
    for token in self.tokenizer.parse(text) {
      let morpheme_id = session.lookup_or_create_morpheme(store, &token.base, token.kind)?;
      rows.push(Composition {
        morpheme_id,
        position: token.position,
        length: token.length,
        conjugation: token.surface,
        reading: token.reading,
      });
    }
    rows.sort_by_key(|row| row.position);
    Ok(rows)
  }

  /// Expression for `text`; its composition is stored when the row is new.
  pub fn import_expression(
    &self,
    session: &mut ImportSession,
    store: &Store,
    text: &str,
  ) -> StoreResult<(ExpressionId, bool)> {
    let (expression_id, is_new) = session.lookup_or_create_expression(store, text)?;
    if is_new {
      let rows = self.decompose(session, store, text)?;
      let inserted = store.bulk_insert_expression_compositions(expression_id, &rows)?;
      debug!(expression = text, id = %expression_id, compositions = inserted, "Expression decomposed");
    }
    Ok((expression_id, is_new))
  }

  /// Stores the composition of a definition text.
  pub fn import_definition_text(
    &self,
    session: &mut ImportSession,
    store: &Store,
    definition_id: DefinitionId,
    text: &str,
  ) -> StoreResult<usize> {
    let rows = self.decompose(session, store, text)?;
    store.bulk_insert_definition_compositions(definition_id, &rows)
  }
}

impl fmt::Debug for GraphBuilder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("GraphBuilder").finish_non_exhaustive()
  }
}
