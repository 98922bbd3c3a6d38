//! logging モジュール
//!
//! tracing-subscriber の fmt レイヤーを EnvFilter 付きで登録する。

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LogLevel;

/// ログレベルから EnvFilter を組み立てる。
///
/// `RUST_LOG` が設定されていればそちらを優先する。
pub fn env_filter(level: LogLevel) -> EnvFilter {
  EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_directive()))
}

/// グローバルな subscriber を登録する。
///
/// 既に登録済みの場合（テストから複数回呼ばれた場合など）は何もしない。
pub fn init_logging(level: LogLevel) {
  let _ = tracing_subscriber::registry()
    .with(tracing_subscriber::fmt::layer())
    .with(env_filter(level))
    .try_init();
}
