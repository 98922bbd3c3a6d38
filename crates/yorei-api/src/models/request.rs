//! リクエストモデル定義

use serde::Deserialize;
use yorei::SearchMode;

/// 用例検索リクエスト
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
  /// 検索語（見出し語・形態素）
  pub query: String,
  /// 検索対象（省略時は見出し語）
  #[serde(default)]
  pub mode: Option<SearchMode>,
  /// 1 ページの件数（省略時はサーバー既定値）
  #[serde(default)]
  pub limit: Option<usize>,
  /// 読み飛ばす件数
  #[serde(default)]
  pub offset: Option<usize>,
}

impl SearchRequest {
  /// 見出し語検索のリクエストを作成
  #[must_use]
  pub fn new(query: impl Into<String>) -> Self {
    Self {
      query: query.into(),
      mode: None,
      limit: None,
      offset: None,
    }
  }
}
