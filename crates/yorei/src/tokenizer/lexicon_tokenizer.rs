//! Greedy longest-match tokenizer over an in-memory lexicon
//!
//! Runs without a downloaded dictionary; imports and lookups driven by it are fully
//! deterministic.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::errors::TokenizerError;
use crate::models::MorphemeType;
use crate::tokenizer::kana::katakana_to_hiragana;
use crate::tokenizer::morpheme_token::{MorphemeStream, MorphemeToken, MorphemeTokenizer};

/// One lexicon word.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LexiconEntry {
  /// Literal form matched in the input
  pub surface: String,
  /// Dictionary base form (defaults to the surface)
  #[serde(default)]
  pub base: Option<String>,
  /// Reading in kana (defaults to the surface)
  #[serde(default)]
  pub reading: Option<String>,
  /// Grammatical type
  pub kind: MorphemeType,
}

#[derive(Debug, Clone)]
struct Word {
  base: String,
  reading: String,
  kind: MorphemeType,
}

/// Longest-match tokenizer.
///
/// Characters no lexicon word covers become one-char tokens: punctuation and whitespace
/// typed [`MorphemeType::Symbol`], everything else [`MorphemeType::Other`].
#[derive(Debug, Clone)]
pub struct LexiconTokenizer {
  words: HashMap<String, Word>,
  /// Longest surface in chars, bounds the match window
  max_chars: usize,
  skip: Vec<MorphemeType>,
}

impl Default for LexiconTokenizer {
  fn default() -> Self {
    Self::new()
  }
}

impl LexiconTokenizer {
  /// Empty lexicon.
  pub fn new() -> Self {
    Self {
      words: HashMap::new(),
      max_chars: 0,
      skip: MorphemeType::ALL.into_iter().filter(|kind| kind.is_skipped_by_default()).collect(),
    }
  }

  /// Builds a lexicon from entries, rejecting empty surfaces.
  pub fn from_entries(entries: impl IntoIterator<Item = LexiconEntry>) -> Result<Self, TokenizerError> {
    let mut tokenizer = Self::new();
    for entry in entries {
      if entry.surface.is_empty() {
        return Err(TokenizerError::InvalidLexiconEntry {
          surface: entry.surface,
          reason: "surface is empty".to_string(),
        });
      }
      let base = entry.base.unwrap_or_else(|| entry.surface.clone());
      let reading = entry.reading.unwrap_or_else(|| entry.surface.clone());
      tokenizer.insert(&entry.surface, &base, &reading, entry.kind);
    }
    Ok(tokenizer)
  }

  /// Adds a word (builder style).
  pub fn with_word(mut self, surface: &str, base: &str, reading: &str, kind: MorphemeType) -> Self {
    self.insert(surface, base, reading, kind);
    self
  }

  /// Replaces the set of morpheme types dropped from the output.
  pub fn with_skip(mut self, skip: Vec<MorphemeType>) -> Self {
    self.skip = skip;
    self
  }

  /// Adds or replaces a word. Empty surfaces are ignored.
  pub fn insert(&mut self, surface: &str, base: &str, reading: &str, kind: MorphemeType) {
    if surface.is_empty() {
      return;
    }
    self.max_chars = self.max_chars.max(surface.chars().count());
    self.words.insert(
      surface.to_string(),
      Word {
        base: base.to_string(),
        reading: katakana_to_hiragana(reading),
        kind,
      },
    );
  }

  /// Number of words.
  pub fn len(&self) -> usize {
    self.words.len()
  }

  /// Whether the lexicon has no words.
  pub fn is_empty(&self) -> bool {
    self.words.is_empty()
  }

  fn longest_match(&self, chars: &[char], start: usize) -> Option<(usize, &Word)> {
    let window = self.max_chars.min(chars.len() - start);
    (1..=window).rev().find_map(|len| {
      let candidate: String = chars[start..start + len].iter().collect();
      self.words.get(&candidate).map(|word| (len, word))
    })
  }
}

fn is_symbol(c: char) -> bool {
  c.is_whitespace()
    || c.is_ascii_punctuation()
    || matches!(
      c,
      '。' | '、' | '・' | '「' | '」' | '『' | '』' | '（' | '）' | '！' | '？' | '，' | '．' | '…' | '〜' | '―'
    )
}

impl MorphemeTokenizer for LexiconTokenizer {
  fn parse(&self, text: &str) -> MorphemeStream {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut position = 0;

    while position < chars.len() {
      let token = match self.longest_match(&chars, position) {
        Some((length, word)) => MorphemeToken {
          surface: chars[position..position + length].iter().collect(),
          base: word.base.clone(),
          reading: word.reading.clone(),
          length,
          position,
          kind: word.kind,
        },
        None => {
          let c = chars[position];
          MorphemeToken {
            surface: c.to_string(),
            base: c.to_string(),
            reading: katakana_to_hiragana(&c.to_string()),
            length: 1,
            position,
            kind: if is_symbol(c) {
              MorphemeType::Symbol
            } else {
              MorphemeType::Other
            },
          }
        }
      };

      position += token.length;
      if !self.skip.contains(&token.kind) {
        tokens.push(token);
      }
    }

    debug!(input_text = %text, kept_tokens = tokens.len(), "Lexicon analysis completed");
    MorphemeStream::new(tokens)
  }
}
