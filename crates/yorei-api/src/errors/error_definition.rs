//! APIエラー定義

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use yorei::errors::{LookupError, StoreError, YoreiError};

/// エラーの種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
  /// 入力値が無効
  InvalidInput,
  /// クエリが長すぎる
  QueryTooLong,
  /// 内部エラー
  Internal,
  /// 設定エラー
  Config,
}

impl ApiErrorKind {
  /// エラーコードを取得
  #[must_use]
  pub fn code(&self) -> &'static str {
    match self {
      Self::InvalidInput => "invalid_input",
      Self::QueryTooLong => "query_too_long",
      Self::Internal => "internal_error",
      Self::Config => "config_error",
    }
  }

  /// HTTPステータスコードを取得
  #[must_use]
  pub fn status(&self) -> StatusCode {
    match self {
      Self::InvalidInput | Self::QueryTooLong => StatusCode::BAD_REQUEST,
      Self::Internal | Self::Config => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

/// APIエラー
#[derive(Debug, Error)]
pub enum ApiError {
  /// 入力値が無効
  #[error("入力値が無効です: {0}")]
  InvalidInput(String),

  /// クエリが長すぎる
  #[error("クエリが長すぎます: {0} バイト（最大: {1} バイト）")]
  QueryTooLong(usize, usize),

  /// 内部エラー
  #[error("内部エラー: {0}")]
  Internal(String),

  /// 設定エラー
  #[error("設定エラー: {0}")]
  Config(String),
}

impl ApiError {
  /// エラーの種類を取得
  #[must_use]
  pub fn kind(&self) -> ApiErrorKind {
    match self {
      Self::InvalidInput(_) => ApiErrorKind::InvalidInput,
      Self::QueryTooLong(_, _) => ApiErrorKind::QueryTooLong,
      Self::Internal(_) => ApiErrorKind::Internal,
      Self::Config(_) => ApiErrorKind::Config,
    }
  }

  /// エラーコードを取得
  #[must_use]
  pub fn code(&self) -> &'static str {
    self.kind().code()
  }

  /// HTTPステータスコードを取得
  #[must_use]
  pub fn status(&self) -> StatusCode {
    self.kind().status()
  }

  /// 無効な入力エラーを作成
  #[must_use]
  pub fn invalid_input(message: impl Into<String>) -> Self {
    Self::InvalidInput(message.into())
  }

  /// クエリ長超過エラーを作成
  #[must_use]
  pub fn query_too_long(actual: usize, max: usize) -> Self {
    Self::QueryTooLong(actual, max)
  }

  /// 内部エラーを作成
  #[must_use]
  pub fn internal(message: impl Into<String>) -> Self {
    Self::Internal(message.into())
  }

  /// 設定エラーを作成
  #[must_use]
  pub fn config(message: impl Into<String>) -> Self {
    Self::Config(message.into())
  }
}

/// エラーレスポンスのJSON構造
#[derive(Serialize)]
struct ErrorResponse {
  error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
  code: &'static str,
  message: String,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = ErrorResponse {
      error: ErrorBody {
        code: self.code(),
        message: self.to_string(),
      },
    };

    (status, Json(body)).into_response()
  }
}

/// YoreiError から ApiError への変換
///
/// データベースが開けない・見つからない場合は設定の問題として扱う。
impl From<YoreiError> for ApiError {
  fn from(err: YoreiError) -> Self {
    match err {
      YoreiError::Config(_) | YoreiError::Dictionary(_) | YoreiError::Tokenizer(_) => {
        ApiError::config(err.to_string())
      }
      YoreiError::Store(StoreError::Io { .. })
      | YoreiError::Lookup(LookupError::Store(StoreError::Io { .. })) => {
        ApiError::config(format!("database unavailable: {err}"))
      }
      YoreiError::Store(_) | YoreiError::Import(_) | YoreiError::Lookup(_) => {
        ApiError::internal(err.to_string())
      }
      // #[non_exhaustive] な enum のため、将来追加されるバリアントに対応
      _ => ApiError::internal(format!("unknown error: {err}")),
    }
  }
}

impl From<LookupError> for ApiError {
  fn from(err: LookupError) -> Self {
    YoreiError::from(err).into()
  }
}

impl From<StoreError> for ApiError {
  fn from(err: StoreError) -> Self {
    YoreiError::from(err).into()
  }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, ApiError>;
