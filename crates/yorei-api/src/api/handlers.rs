//! HTTPハンドラー定義

use axum::{Json, extract::State};
use tracing::{debug, error, info};

use crate::errors::ApiError;
use crate::models::{SearchRequest, SearchResponse};

use super::state::AppState;

/// POST /search エンドポイント
///
/// 見出し語・形態素に一致する用例を希少度順に返す。
///
/// # Request Body
/// ```json
/// { "query": "先生", "mode": "entry", "limit": 20, "offset": 0 }
/// ```
///
/// # Response
/// - 200 OK: 検索成功（該当なしを含む）
/// - 400 Bad Request: 入力エラー（空クエリ、クエリ長超過）
/// - 500 Internal Server Error: 内部エラー
pub async fn post_search(
  State(state): State<AppState>,
  Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
  debug!(query_len = request.query.len(), mode = ?request.mode, "検索リクエストを受信");

  // SQLite の読み出しはブロッキングのため spawn_blocking で実行
  let service = state.service.clone();

  let response =
    tokio::task::spawn_blocking(move || service.search(request)).await.map_err(|e| {
      error!(error = %e, "spawn_blocking エラー");
      ApiError::internal("処理の実行に失敗しました")
    })??;

  info!(
    total = response.total,
    returned = response.results.len(),
    elapsed_ms = response.elapsed_ms,
    "検索完了"
  );

  Ok(Json(response))
}

/// ヘルスチェックエンドポイント
///
/// サーバーが稼働しているかを確認する。
pub async fn health_check() -> &'static str {
  "OK"
}
