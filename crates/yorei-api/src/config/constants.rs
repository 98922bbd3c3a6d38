//! API設定の定数定義

/// クエリの最大長（バイト単位）
///
/// 見出し語・形態素の検索語として十分な長さ。
/// 巨大な入力による無駄な検索を防ぐための制限。
pub const MAX_QUERY_LENGTH: usize = 1_024;

/// デフォルトのバインドアドレス
///
/// 開発環境での利用を想定した localhost の標準ポート。
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5540";

/// デフォルトのデータベースファイル
pub const DEFAULT_DB_PATH: &str = "yorei.sqlite";

/// 件数未指定時の 1 ページあたりの件数
pub const DEFAULT_LIMIT: usize = 20;

/// 1 ページあたりの最大件数
pub const MAX_LIMIT: usize = 100;
