//! yorei 用例検索ライブラリー
//!
//! 辞書・コーパスの用例を形態素グラフとして SQLite に格納し、見出し語や形態素から
//! 希少度順に検索する。形態素解析には vibrato-rkyv を用いる。

/// 設定モジュール - YoreiConfig 等の設定構造体を定義
pub mod config;

/// 定義ツリーモジュール - 定義の親子関係の走査と HTML 描画
pub mod definition_tree;

/// 辞書モジュール - 形態素解析用辞書の管理・ロード機能を提供
pub mod dictionary;

/// エラーモジュール - YoreiError, YoreiResult 等のエラー型を定義
pub mod errors;

/// ふりがなモジュール - 表記と読みの対応付け
pub mod furigana;

/// 取り込みモジュール - 辞書・コーパスを形態素グラフとしてストアへ書き込む
pub mod importer;

/// ログモジュール - tracing-subscriber の初期化
pub mod logging;

/// 検索モジュール - 見出し語・形態素による用例検索
pub mod lookup;

/// データモデルモジュール - Library, Entry, Morpheme 等のデータ構造を定義
pub mod models;

/// サービスモジュール - YoreiService 等の上位レベル API を提供
pub mod service;

/// ストアモジュール - rusqlite による永続化
pub mod store;

/// トークナイザーモジュール - 形態素解析トークナイザー
pub mod tokenizer;

/// 再エクスポート
pub use config::YoreiConfig;
pub use errors::{YoreiError, YoreiResult};
pub use lookup::{SearchMode, UeResult, UeResultList};
pub use service::YoreiService;
