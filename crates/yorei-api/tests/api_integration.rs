//! API統合テスト
//!
//! Router 経由で HTTP エンドポイントの振る舞いを検証する。
//! 大半はスタブサービスを使い、最後に実データベースを使う経路を 1 本通す。

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode},
  response::Response,
};
use tower::ServiceExt;

use yorei::importer::{CorpusDocument, DictionaryDocument};
use yorei::models::MorphemeType;
use yorei::tokenizer::LexiconTokenizer;
use yorei::{YoreiConfig, YoreiService};
use yorei_api::{
  api::{AppState, create_router},
  config::Config,
  errors::Result as ApiResult,
  models::{SearchRequest, SearchResponse},
  service::{YoreiApiService, YoreiApiServiceFull, validate_query},
};

/// 統合テスト用の軽量スタブサービス
///
/// - 空クエリ: `invalid_input` エラー
/// - それ以外: 件数 0 と 0ms を返す（`total` にはクエリの文字数を入れる）
struct StubYoreiApiService;

impl YoreiApiService for StubYoreiApiService {
  fn search(&self, request: SearchRequest) -> ApiResult<SearchResponse> {
    let query = validate_query(&request.query)?;
    Ok(SearchResponse {
      total: query.chars().count(),
      results: Vec::new(),
      elapsed_ms: 0,
    })
  }
}

fn test_config() -> Config {
  Config::new("127.0.0.1:0", "yorei.sqlite", 20, 100).unwrap()
}

/// テスト用の Router を構築する
fn test_app() -> Router {
  let service: Arc<dyn YoreiApiService> = Arc::new(StubYoreiApiService);
  create_router(AppState::new(test_config(), service))
}

fn post_json(body: impl Into<Body>) -> Request<Body> {
  Request::builder()
    .method("POST")
    .uri("/search")
    .header("content-type", "application/json")
    .body(body.into())
    .unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
  let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("read body");
  serde_json::from_slice(&body_bytes).expect("body should be valid json")
}

// ============================================================================
// 正常系テスト
// ============================================================================

#[tokio::test]
async fn health_check_returns_ok() {
  let app = test_app();

  let response = app
    .oneshot(Request::builder().method("GET").uri("/health").body(Body::empty()).unwrap())
    .await
    .expect("request should succeed");

  assert_eq!(response.status(), StatusCode::OK);

  let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("read body");
  assert_eq!(body_bytes.as_ref(), b"OK");
}

#[tokio::test]
async fn post_search_success_returns_200() {
  let payload = serde_json::json!({ "query": " 先生 ", "mode": "expression" });

  let response = test_app().oneshot(post_json(payload.to_string())).await.expect("request should succeed");
  assert_eq!(response.status(), StatusCode::OK);

  let json = body_json(response).await;
  // trimmed before it reaches the service
  assert_eq!(json["total"], 2);
  assert!(json["results"].as_array().is_some());
  assert!(json.get("elapsed_ms").is_some());
}

// ============================================================================
// 異常系テスト（サービスエラー）
// ============================================================================

#[tokio::test]
async fn post_search_blank_query_returns_400() {
  let payload = serde_json::json!({ "query": "   " });

  let response = test_app().oneshot(post_json(payload.to_string())).await.expect("request should succeed");
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);

  let json = body_json(response).await;
  assert_eq!(json["error"]["code"], "invalid_input");
}

#[tokio::test]
async fn post_search_long_query_returns_400() {
  let payload = serde_json::json!({ "query": "猫".repeat(400) });

  let response = test_app().oneshot(post_json(payload.to_string())).await.expect("request should succeed");
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);

  let json = body_json(response).await;
  assert_eq!(json["error"]["code"], "query_too_long");
}

// ============================================================================
// JSON パースエラーテスト（Axum 側）
// ============================================================================

#[tokio::test]
async fn post_search_invalid_json_returns_client_error() {
  let response = test_app().oneshot(post_json("{ invalid json")).await.expect("request should succeed");

  // Axum の Json extractor が返すステータス（400 or 422 等）を許容
  assert!(
    response.status().is_client_error(),
    "expected 4xx, got: {}",
    response.status()
  );
}

#[tokio::test]
async fn post_search_missing_query_field_returns_client_error() {
  let payload = serde_json::json!({ "foo": "bar" });

  let response = test_app().oneshot(post_json(payload.to_string())).await.expect("request should succeed");
  assert!(
    response.status().is_client_error(),
    "expected 4xx, got: {}",
    response.status()
  );
}

#[tokio::test]
async fn post_search_unknown_mode_returns_client_error() {
  let payload = serde_json::json!({ "query": "猫", "mode": "fuzzy" });

  let response = test_app().oneshot(post_json(payload.to_string())).await.expect("request should succeed");
  assert!(response.status().is_client_error());
}

// ============================================================================
// 実データベース
// ============================================================================

#[tokio::test]
async fn post_search_reads_an_imported_store() {
  let temp_dir = tempfile::TempDir::new().unwrap();
  let db_path = temp_dir.path().join("yorei.sqlite");
  {
    let tokenizer = LexiconTokenizer::new()
      .with_word("猫", "猫", "ねこ", MorphemeType::Noun)
      .with_word("が", "が", "が", MorphemeType::Particle)
      .with_word("好き", "好き", "すき", MorphemeType::Adjective);
    let service = YoreiService::with_tokenizer(&YoreiConfig::with_database(&db_path), Arc::new(tokenizer)).unwrap();
    let deck = CorpusDocument::from_json_str(
      r#"{"deck": "Core", "notes": [{"fields": {"Expression": "猫が好き", "Meaning": "I like cats"}}]}"#,
    )
    .unwrap();
    service.import(&deck).unwrap();
  }

  let config = Config::new("127.0.0.1:0", &db_path, 20, 100).unwrap();
  let service: Arc<dyn YoreiApiService> = Arc::new(YoreiApiServiceFull::new(&config).unwrap());
  let app = create_router(AppState::new(config, service));

  let payload = serde_json::json!({ "query": "猫", "mode": "expression" });
  let response = app.oneshot(post_json(payload.to_string())).await.expect("request should succeed");
  assert_eq!(response.status(), StatusCode::OK);

  let json = body_json(response).await;
  assert_eq!(json["total"], 1);
  let first = &json["results"][0];
  assert_eq!(first["expression"], "猫が好き");
  assert_eq!(first["meaning"], "I like cats");
  assert_eq!(first["source"], "Corpus Core");
  assert!(first["furigana_html"].as_str().unwrap().contains("<rt>ねこ</rt>"));
}

#[tokio::test]
async fn post_search_shows_the_definition_when_a_dictionary_example_has_no_meaning() {
  let temp_dir = tempfile::TempDir::new().unwrap();
  let db_path = temp_dir.path().join("yorei.sqlite");
  {
    let tokenizer = LexiconTokenizer::new()
      .with_word("猫", "猫", "ねこ", MorphemeType::Noun)
      .with_word("が", "が", "が", MorphemeType::Particle)
      .with_word("来た", "来る", "きた", MorphemeType::Verb);
    let service = YoreiService::with_tokenizer(&YoreiConfig::with_database(&db_path), Arc::new(tokenizer)).unwrap();
    let dictionary = DictionaryDocument::from_json_str(
      r#"{
        "library": {"name": "動物辞典"},
        "entries": [{
          "kana": ["ねこ"],
          "kanji": ["猫"],
          "definition": {"number": 1, "text": "小さな動物", "usage_examples": [{"expression": "猫が来た"}]}
        }]
      }"#,
    )
    .unwrap();
    service.import(&dictionary).unwrap();
  }

  let config = Config::new("127.0.0.1:0", &db_path, 20, 100).unwrap();
  let service: Arc<dyn YoreiApiService> = Arc::new(YoreiApiServiceFull::new(&config).unwrap());
  let app = create_router(AppState::new(config, service));

  let payload = serde_json::json!({ "query": "猫", "mode": "entry" });
  let response = app.oneshot(post_json(payload.to_string())).await.expect("request should succeed");
  assert_eq!(response.status(), StatusCode::OK);

  let json = body_json(response).await;
  assert_eq!(json["total"], 1);
  let first = &json["results"][0];
  assert_eq!(first["meaning"], "ねこ[猫]: 小さな動物");
  assert_eq!(first["source"], "動物辞典 → ねこ[猫] → (1) 小さな動物");
}
