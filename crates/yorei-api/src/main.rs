//! yorei-api サーバーエントリーポイント

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use yorei_api::ApiError;
use yorei_api::api::{AppState, run_server};
use yorei_api::config::Config;
use yorei_api::service::YoreiApiServiceFull;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
  // ロギングの初期化（RUST_LOG 未設定時は info）
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with(tracing_subscriber::fmt::layer())
    .init();

  // 設定の読み込み
  let config = Config::from_env()?;
  tracing::info!(db_path = %config.db_path.display(), "設定を読み込みました");

  // サービスの初期化
  let service = Arc::new(YoreiApiServiceFull::new(&config)?);
  tracing::info!("用例検索サービスを初期化しました");

  // アプリケーション状態の作成
  let state = AppState::new(config, service);

  // サーバー起動
  run_server(state).await
}
