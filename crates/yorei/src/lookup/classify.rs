//! Query script classification.

use serde::{Deserialize, Serialize};

use crate::tokenizer::kana::is_kana;

/// Script class of a lookup query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
  /// Only hiragana, katakana and whitespace
  Kana,
  /// Anything else: kanji, Latin, mixed scripts
  Kanji,
}

/// Kana iff the query is non-empty and every char is kana or whitespace.
pub fn classify(query: &str) -> QueryKind {
  if !query.is_empty() && query.chars().all(|c| is_kana(c) || c.is_whitespace()) {
    QueryKind::Kana
  } else {
    QueryKind::Kanji
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kana_queries() {
    assert_eq!(classify("せんせい"), QueryKind::Kana);
    assert_eq!(classify("スポーツ"), QueryKind::Kana);
    assert_eq!(classify("ねこ いぬ"), QueryKind::Kana);
  }

  #[test]
  fn everything_else_takes_the_kanji_path() {
    assert_eq!(classify("先生"), QueryKind::Kanji);
    assert_eq!(classify("お見舞い"), QueryKind::Kanji);
    assert_eq!(classify("sensei"), QueryKind::Kanji);
    assert_eq!(classify(""), QueryKind::Kanji);
  }
}
