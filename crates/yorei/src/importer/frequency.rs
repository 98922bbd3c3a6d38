//! Reference-list frequency maintenance.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::errors::StoreResult;
use crate::models::{ExpressionId, MorphemeId, UeListId};
use crate::store::Store;

/// Batches `expr_count` increments for expressions entering the reference list.
///
/// `stage` must run before the new usage example is linked into the list, otherwise the
/// expression is already counted as a member and nothing is staged.
#[derive(Debug, Default)]
pub struct FrequencyMaintainer {
  pending: BTreeMap<MorphemeId, i64>,
}

impl FrequencyMaintainer {
  /// Maintainer with nothing pending.
  pub fn new() -> Self {
    Self::default()
  }

  /// Stages the distinct morphemes of `expression_id` unless the list already holds an
  /// example with that expression. Returns the number of morphemes staged.
  pub fn stage(&mut self, store: &Store, list_id: UeListId, expression_id: ExpressionId) -> StoreResult<usize> {
    if store.count_list_members_with_expression(list_id, expression_id)? > 0 {
      return Ok(0);
    }

    let morphemes = store.expression_morpheme_ids(expression_id)?;
    for &morpheme_id in &morphemes {
      *self.pending.entry(morpheme_id).or_insert(0) += 1;
    }
    debug!(expression_id = %expression_id, morphemes = morphemes.len(), "Expression staged");
    Ok(morphemes.len())
  }

  /// Applies pending increments and clears them. Returns the number of rows touched.
  pub fn commit(&mut self, store: &Store) -> StoreResult<usize> {
    if self.pending.is_empty() {
      return Ok(0);
    }

    let increments: Vec<(MorphemeId, i64)> = self.pending.iter().map(|(&id, &n)| (id, n)).collect();
    let touched = store.bulk_increment_expr_count(&increments)?;
    self.pending.clear();
    info!(rows = touched, "Frequency counters committed");
    Ok(touched)
  }

  /// Number of morphemes with a pending increment.
  pub fn pending_len(&self) -> usize {
    self.pending.len()
  }
}
