//! Tokenizer contract: text in, ordered morpheme tokens out.

use std::sync::Arc;

use serde::Serialize;

use crate::models::MorphemeType;

/// One morpheme produced by a tokenizer.
///
/// `position` and `length` count chars of the parsed text, the same unit the store
/// uses for composition spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MorphemeToken {
  /// Literal substring of the input
  pub surface: String,
  /// Dictionary base form
  pub base: String,
  /// Hiragana reading of the surface
  pub reading: String,
  /// Char length of the surface
  pub length: usize,
  /// Char offset of the surface in the input
  pub position: usize,
  /// Grammatical type
  pub kind: MorphemeType,
}

/// Owned, ordered, single-pass token sequence.
///
/// - No lifetime parameters (fully owned type)
/// - Consumes the token sequence sequentially with `IntoIter`
#[derive(Debug)]
pub struct MorphemeStream {
  tokens: std::vec::IntoIter<MorphemeToken>,
}

impl MorphemeStream {
  /// Stream over already collected tokens.
  pub fn new(tokens: Vec<MorphemeToken>) -> Self {
    Self {
      tokens: tokens.into_iter(),
    }
  }

  /// Stream with no tokens.
  pub fn empty() -> Self {
    Self::new(Vec::new())
  }
}

impl Iterator for MorphemeStream {
  type Item = MorphemeToken;

  fn next(&mut self) -> Option<Self::Item> {
    self.tokens.next()
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    self.tokens.size_hint()
  }
}

impl ExactSizeIterator for MorphemeStream {}

/// Morphological analyzer consumed by the importer.
///
/// Implementations hold no per-call state, never fail on malformed input and return an
/// empty stream for empty text.
pub trait MorphemeTokenizer: Send + Sync {
  /// Splits `text` into morpheme tokens.
  fn parse(&self, text: &str) -> MorphemeStream;
}

impl<T: MorphemeTokenizer + ?Sized> MorphemeTokenizer for Arc<T> {
  fn parse(&self, text: &str) -> MorphemeStream {
    (**self).parse(text)
  }
}

/// Byte offset → char offset table for one input string.
///
/// Engines report byte ranges; the store needs char positions. Built once per parse.
#[derive(Debug)]
pub struct CharOffsets {
  byte_starts: Vec<usize>,
}

impl CharOffsets {
  /// Indexes the char boundaries of `text`.
  pub fn new(text: &str) -> Self {
    Self {
      byte_starts: text.char_indices().map(|(byte, _)| byte).collect(),
    }
  }

  /// Char offset of the char boundary at `byte`.
  ///
  /// `byte == text.len()` maps to the char count.
  pub fn char_offset(&self, byte: usize) -> usize {
    self.byte_starts.partition_point(|&start| start < byte)
  }
}
