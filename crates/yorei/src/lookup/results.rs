//! Materialized lookup results.

use std::sync::OnceLock;

use crate::furigana::{Furigana, escape_html};
use crate::importer::elision::replace_blanks;
use crate::models::{
  Composition, Definition, ELISION_ENTRY_FORMAT, Entry, Expression, Library, UsageExample, UsageExampleId,
};

/// Rarity score: `char_len / 100 + Σ max(0, 3 - expr_count) / 3` over composition rows.
pub fn rarity_score(expression: &str, composition_counts: &[Option<i64>]) -> f64 {
  let length = expression.chars().count() as f64 / 100.0;
  let rarity: f64 = composition_counts
    .iter()
    .map(|count| (3 - count.unwrap_or(0)).max(0) as f64 / 3.0)
    .sum();
  length + rarity
}

/// Where a usage example comes from: libraries, entries and definitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Provenance {
  /// Distinct libraries, the example's own first
  pub libraries: Vec<Library>,
  /// Distinct entries
  pub entries: Vec<Entry>,
  /// Distinct definitions
  pub definitions: Vec<Definition>,
  /// Parents of a lone definition, root first
  pub ancestors: Vec<Definition>,
}

fn single_or_multiple(labels: Vec<String>, multiple: &str) -> Option<String> {
  match labels.len() {
    0 => None,
    1 => labels.into_iter().next(),
    _ => Some(multiple.to_string()),
  }
}

/// One ranked usage example.
#[derive(Debug)]
pub struct UeResult {
  usage_example: UsageExample,
  expression: Expression,
  compositions: Vec<Composition>,
  composition_counts: Vec<Option<i64>>,
  provenance: Provenance,
  score: OnceLock<f64>,
  furigana: OnceLock<Furigana>,
}

impl UeResult {
  /// Assembles a result from loaded rows.
  pub fn new(
    usage_example: UsageExample,
    expression: Expression,
    compositions: Vec<Composition>,
    composition_counts: Vec<Option<i64>>,
    provenance: Provenance,
  ) -> Self {
    Self {
      usage_example,
      expression,
      compositions,
      composition_counts,
      provenance,
      score: OnceLock::new(),
      furigana: OnceLock::new(),
    }
  }

  /// Usage-example row id.
  pub fn id(&self) -> UsageExampleId {
    self.usage_example.id
  }

  /// Usage-example row.
  pub fn usage_example(&self) -> &UsageExample {
    &self.usage_example
  }

  /// Stored expression text.
  pub fn expression(&self) -> &str {
    &self.expression.text
  }

  /// Expression with elided headwords restored when it comes from a `J-J1` entry.
  pub fn display_expression(&self) -> String {
    let elided = self
      .provenance
      .entries
      .iter()
      .find(|entry| entry.format == ELISION_ENTRY_FORMAT);
    let Some(entry) = elided else {
      return self.expression.text.clone();
    };
    let kana = entry.kana_raw.as_ref().and_then(|raw| raw.first()).or_else(|| entry.kana.first());
    let kanji = entry.kanji_raw.as_ref().and_then(|raw| raw.first());
    match kana {
      Some(kana) => replace_blanks(&self.expression.text, kana, kanji.map(String::as_str)),
      None => self.expression.text.clone(),
    }
  }

  /// Translation / gloss.
  pub fn meaning(&self) -> Option<&str> {
    self.usage_example.meaning.as_deref()
  }

  /// Meaning to show on a card.
  ///
  /// Without a stored meaning, a dictionary example falls back to `entry: definition text`
  /// when it hangs off exactly one definition.
  pub fn meaning_for_view(&self) -> Option<String> {
    if let Some(meaning) = self.meaning() {
      return Some(meaning.to_string());
    }
    let ([entry], [definition]) = (self.provenance.entries.as_slice(), self.provenance.definitions.as_slice()) else {
      return None;
    };
    let text = definition.text.as_deref().unwrap_or_default().replace(['\n', '\r'], " ");
    Some(format!("{}: {}", entry.breadcrumb(), text.trim()))
  }

  /// Reading supplied by the source.
  pub fn reading(&self) -> Option<&str> {
    self.usage_example.reading.as_deref()
  }

  /// Sound file name.
  pub fn sound(&self) -> Option<&str> {
    self.usage_example.sound.as_deref()
  }

  /// Image file name.
  pub fn image(&self) -> Option<&str> {
    self.usage_example.image.as_deref()
  }

  /// Composition rows of the expression.
  pub fn compositions(&self) -> &[Composition] {
    &self.compositions
  }

  /// Libraries, entries and definitions of the example.
  pub fn provenance(&self) -> &Provenance {
    &self.provenance
  }

  /// Library breadcrumbs.
  pub fn library_breadcrumbs(&self) -> Vec<String> {
    self.provenance.libraries.iter().map(Library::breadcrumb).collect()
  }

  /// Entry breadcrumbs.
  pub fn entry_breadcrumbs(&self) -> Vec<String> {
    self.provenance.entries.iter().map(Entry::breadcrumb).collect()
  }

  /// Definition breadcrumbs; a lone definition is preceded by its ancestry, root first.
  pub fn definition_breadcrumbs(&self) -> Vec<String> {
    match self.provenance.definitions.as_slice() {
      [definition] => self
        .provenance
        .ancestors
        .iter()
        .chain(std::iter::once(definition))
        .map(Definition::breadcrumb)
        .collect(),
      definitions => definitions.iter().map(Definition::breadcrumb).collect(),
    }
  }

  /// `library → entry → d1 → … → dn`; several values collapse to `(Multiple …)`.
  ///
  /// Definitions are only shown below a single entry.
  pub fn source_line(&self) -> String {
    let mut parts: Vec<String> = single_or_multiple(self.library_breadcrumbs(), "(Multiple libraries)")
      .into_iter()
      .collect();
    if let Some(entry) = single_or_multiple(self.entry_breadcrumbs(), "(Multiple entries)") {
      parts.push(entry);
      if self.provenance.entries.len() == 1 {
        match self.provenance.definitions.len() {
          0 => {}
          1 => parts.extend(self.definition_breadcrumbs()),
          _ => parts.push("(Multiple definitions)".to_string()),
        }
      }
    }
    parts.join(" → ")
  }

  /// Rarity score, computed on first use.
  pub fn score(&self) -> f64 {
    *self
      .score
      .get_or_init(|| rarity_score(&self.expression.text, &self.composition_counts))
  }

  /// Furigana of the expression, aligned on first use.
  pub fn furigana(&self) -> &Furigana {
    self
      .furigana
      .get_or_init(|| Furigana::align(self.expression.id, &self.expression.text, &self.compositions))
  }

  /// Card markup: furigana, meaning and source line.
  pub fn to_html(&self) -> String {
    let mut html = String::from(r#"<div class="usage_example">"#);
    html.push_str(r#"<div class="expression">"#);
    html.push_str(&self.furigana().to_html());
    html.push_str("</div>");
    if let Some(meaning) = self.meaning_for_view().filter(|m| !m.trim().is_empty()) {
      html.push_str(r#"<div class="meaning">"#);
      html.push_str(&escape_html(&meaning));
      html.push_str("</div>");
    }
    html.push_str(r#"<div class="source">"#);
    html.push_str(&escape_html(&self.source_line()));
    html.push_str("</div></div>");
    html
  }
}

/// One page of results with the total over all pages.
#[derive(Debug, Default)]
pub struct UeResultList {
  /// Rows matching the query over all pages
  pub total: usize,
  /// This page, best first
  pub results: Vec<UeResult>,
}

impl UeResultList {
  /// Empty list.
  pub fn empty() -> Self {
    Self::default()
  }

  /// Number of results on this page.
  pub fn len(&self) -> usize {
    self.results.len()
  }

  /// Whether this page is empty.
  pub fn is_empty(&self) -> bool {
    self.results.is_empty()
  }

  /// Results on this page.
  pub fn iter(&self) -> std::slice::Iter<'_, UeResult> {
    self.results.iter()
  }

  /// All cards of this page.
  pub fn to_html(&self) -> String {
    self.results.iter().map(UeResult::to_html).collect::<Vec<_>>().join("\n")
  }
}

impl<'a> IntoIterator for &'a UeResultList {
  type Item = &'a UeResult;
  type IntoIter = std::slice::Iter<'a, UeResult>;

  fn into_iter(self) -> Self::IntoIter {
    self.results.iter()
  }
}

/// One page of entries with the total over all pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryResultList {
  /// Matching entries over all pages
  pub total: usize,
  /// This page, in id order
  pub entries: Vec<Entry>,
}
