//! Response Model Definition

use serde::Serialize;
use yorei::UeResult;
use yorei::furigana::Segment;

/// Usage Example Search Response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
  /// Number of matches before paging
  pub total: usize,
  /// Requested page, rarest first
  pub results: Vec<UsageExampleDto>,
  /// Elapsed time (milliseconds)
  pub elapsed_ms: u64,
}

/// Usage Example (DTO)
///
/// Flattened from [`UeResult`] for API response.
#[derive(Debug, Clone, Serialize)]
pub struct UsageExampleDto {
  /// Usage example id
  pub id: i64,
  /// Stored expression text
  pub expression: String,
  /// Expression with elided headword parts filled in
  pub display_expression: String,
  /// Translation or gloss
  #[serde(skip_serializing_if = "Option::is_none")]
  pub meaning: Option<String>,
  /// Reading as given by the source
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reading: Option<String>,
  /// Sound file name
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sound: Option<String>,
  /// Image file name
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image: Option<String>,
  /// "library → entry → definition" line
  pub source: String,
  /// Library breadcrumbs
  pub libraries: Vec<String>,
  /// Entry breadcrumbs
  pub entries: Vec<String>,
  /// Definition breadcrumbs
  pub definitions: Vec<String>,
  /// Furigana segments
  pub furigana: Vec<Segment>,
  /// Furigana as ruby markup
  pub furigana_html: String,
  /// Rarity score (higher is rarer)
  pub score: f64,
}

impl UsageExampleDto {
  /// Convert from a lookup result
  #[must_use]
  pub fn from_result(result: &UeResult) -> Self {
    let furigana = result.furigana();
    Self {
      id: result.id().get(),
      expression: result.expression().to_string(),
      display_expression: result.display_expression(),
      meaning: result.meaning_for_view(),
      reading: result.reading().map(str::to_string),
      sound: result.sound().map(str::to_string),
      image: result.image().map(str::to_string),
      source: result.source_line(),
      libraries: result.library_breadcrumbs(),
      entries: result.entry_breadcrumbs(),
      definitions: result.definition_breadcrumbs(),
      furigana: furigana.segments.clone(),
      furigana_html: furigana.to_html(),
      score: result.score(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn search_response_serialization() {
    let response = SearchResponse {
      total: 0,
      results: Vec::new(),
      elapsed_ms: 42,
    };

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"total\":0"));
    assert!(json.contains("\"results\":[]"));
    assert!(json.contains("\"elapsed_ms\":42"));
  }

  #[test]
  fn empty_optionals_are_omitted() {
    let dto = UsageExampleDto {
      id: 1,
      expression: "猫".to_string(),
      display_expression: "猫".to_string(),
      meaning: None,
      reading: None,
      sound: None,
      image: None,
      source: "Corpus Core".to_string(),
      libraries: vec!["Corpus Core".to_string()],
      entries: Vec::new(),
      definitions: Vec::new(),
      furigana: vec![Segment::Ruby {
        base: "猫".to_string(),
        reading: "ねこ".to_string(),
      }],
      furigana_html: String::new(),
      score: 1.01,
    };

    let json = serde_json::to_value(&dto).unwrap();
    assert!(json.get("meaning").is_none());
    assert_eq!(json["furigana"][0]["kind"], "ruby");
    assert_eq!(json["furigana"][0]["reading"], "ねこ");
  }
}
