//! lookup モジュール
//!
//! 見出し語・用例・定義文の形態素から用例を検索し、希少度順にページングして返す。

pub mod async_lookup;
pub mod classify;
pub mod engine;
pub mod results;

/// 主要な型を再エクスポート
pub use async_lookup::{AsyncLookup, Generation, LookupRequest, LookupTicket};
pub use classify::{QueryKind, classify};
pub use engine::{LookupEngine, SearchMode};
pub use results::{EntryResultList, Provenance, UeResult, UeResultList, rarity_score};
