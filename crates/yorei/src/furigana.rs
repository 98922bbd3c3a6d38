//! Furigana alignment
//!
//! Reconciles an expression with the readings of its composition spans. Spans whose
//! literal already reads as written stay plain; the others are trimmed to the part that
//! differs (`食べる` / `たべる` → `食` with `た`) and emitted as ruby.

use serde::Serialize;
use tracing::warn;

use crate::models::{Composition, ExpressionId, MorphemeId};
use crate::tokenizer::kana::{is_numeral_text, katakana_to_hiragana};

/// One piece of aligned output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
  /// Text shown as is
  Plain {
    /// Text
    text: String,
  },
  /// Text with a reading above it
  Ruby {
    /// Written form
    base: String,
    /// Hiragana reading
    reading: String,
  },
}

/// A span that could not be placed: it overlaps an earlier span or runs past the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpanOverlap {
  /// Morpheme of the rejected span
  pub morpheme_id: MorphemeId,
  /// Expression being aligned
  pub expression_id: ExpressionId,
  /// Char offset of the rejected span
  pub position: usize,
}

/// Aligned expression.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Furigana {
  /// Segments in text order
  pub segments: Vec<Segment>,
  /// Spans skipped during alignment
  pub overlaps: Vec<SpanOverlap>,
}

impl Furigana {
  /// Aligns `expression` with its composition rows.
  pub fn align(expression_id: ExpressionId, expression: &str, spans: &[Composition]) -> Self {
    let chars: Vec<char> = expression.chars().collect();
    let mut ordered: Vec<&Composition> = spans.iter().collect();
    ordered.sort_by_key(|span| span.position);

    let mut furigana = Furigana::default();
    let mut cursor = 0;
    for span in ordered {
      let end = span.position + span.length;
      if cursor > span.position || end > chars.len() {
        warn!(
          morpheme_id = %span.morpheme_id,
          expression_id = %expression_id,
          position = span.position,
          "Composition span overlaps or overruns the expression"
        );
        furigana.overlaps.push(SpanOverlap {
          morpheme_id: span.morpheme_id,
          expression_id,
          position: span.position,
        });
        continue;
      }

      if cursor < span.position {
        furigana.push_plain(chars[cursor..span.position].iter().collect());
      }
      let literal: String = chars[span.position..end].iter().collect();
      furigana.push_span(literal, &span.reading);
      cursor = end;
    }

    if cursor < chars.len() {
      furigana.push_plain(chars[cursor..].iter().collect());
    }
    furigana
  }

  fn push_plain(&mut self, text: String) {
    if text.is_empty() {
      return;
    }
    if let Some(Segment::Plain { text: last }) = self.segments.last_mut() {
      last.push_str(&text);
    } else {
      self.segments.push(Segment::Plain { text });
    }
  }

  fn push_span(&mut self, literal: String, reading: &str) {
    let reads_as_written =
      literal == reading || katakana_to_hiragana(&literal) == katakana_to_hiragana(reading) || is_numeral_text(&literal);
    if reads_as_written || reading.is_empty() {
      self.push_plain(literal);
      return;
    }

    let base: Vec<char> = literal.chars().collect();
    let read: Vec<char> = reading.chars().collect();
    let prefix = base.iter().zip(&read).take_while(|(a, b)| a == b).count();
    let limit = (base.len() - prefix).min(read.len() - prefix);
    let suffix = base
      .iter()
      .rev()
      .zip(read.iter().rev())
      .take(limit)
      .take_while(|(a, b)| a == b)
      .count();

    let base_middle: String = base[prefix..base.len() - suffix].iter().collect();
    let read_middle: String = read[prefix..read.len() - suffix].iter().collect();
    if base_middle.is_empty() || read_middle.is_empty() {
      self.push_plain(literal);
      return;
    }

    self.push_plain(base[..prefix].iter().collect());
    self.segments.push(Segment::Ruby {
      base: base_middle,
      reading: read_middle,
    });
    self.push_plain(base[base.len() - suffix..].iter().collect());
  }

  /// The expression text, without readings.
  pub fn plain_text(&self) -> String {
    self
      .segments
      .iter()
      .map(|segment| match segment {
        Segment::Plain { text } => text.as_str(),
        Segment::Ruby { base, .. } => base.as_str(),
      })
      .collect()
  }

  /// HTML with `<ruby>` markup; text is escaped.
  pub fn to_html(&self) -> String {
    let mut html = String::new();
    for segment in &self.segments {
      match segment {
        Segment::Plain { text } => html.push_str(&escape_html(text)),
        Segment::Ruby { base, reading } => {
          html.push_str("<ruby>");
          html.push_str(&escape_html(base));
          html.push_str("<rp>（</rp><rt>");
          html.push_str(&escape_html(reading));
          html.push_str("</rt><rp>）</rp></ruby>");
        }
      }
    }
    html
  }

  /// Whether any segment carries a reading.
  pub fn has_ruby(&self) -> bool {
    self.segments.iter().any(|segment| matches!(segment, Segment::Ruby { .. }))
  }
}

/// Escapes text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      '"' => escaped.push_str("&quot;"),
      '\'' => escaped.push_str("&#39;"),
      _ => escaped.push(c),
    }
  }
  escaped
}
