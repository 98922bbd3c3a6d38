//! store モジュール
//!
//! SQLite（rusqlite）による永続化。スキーマ作成はこのモジュール内部に閉じている。
mod database;
mod lookup_queries;
mod read_ops;
mod schema;
mod sql_types;
mod write_ops;

/// 再エクスポート
pub use database::Store;
pub use lookup_queries::{LookupFilter, LookupRow};
pub use write_ops::{NewDefinition, NewEntry, NewLibrary, NewUsageExample};
