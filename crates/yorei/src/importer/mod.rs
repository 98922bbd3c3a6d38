//! importer モジュール
//!
//! 取り込み元のトラバーサルを形態素グラフとしてストアへ書き込む。
//! ステージ（ライブラリ再利用・参照リスト）と基本ビルダーは同じ [`ImportContext`] を共有する。

pub mod builder;
pub mod context;
pub mod elision;
pub mod events;
pub mod frequency;
pub mod graph_builder;
pub mod media;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod sources;
pub mod stages;
pub mod visitor;

/// 主要な型を再エクスポート
pub use builder::DictionaryBuilder;
pub use context::{
  CreatedUsageExample, DefinitionFrame, DefinitionStack, EntryFrame, IMPORT_VERSION, ImportContext, LibraryDraft,
  UsageExampleDraft,
};
pub use elision::{expand_kanji, normalize_kana, replace_blanks};
pub use events::{EventKind, ImportEvent};
pub use frequency::FrequencyMaintainer;
pub use graph_builder::GraphBuilder;
pub use media::{MediaCopier, parse_image_field, parse_sound_field};
pub use pipeline::{DEFAULT_BATCH_COMMIT_SIZE, ImportOptions, ImportPipeline};
pub use report::ImportReport;
pub use session::ImportSession;
pub use sources::{CorpusDocument, DictionaryDocument, ImportSource};
pub use stages::{ImportStage, LibraryUpsertStage, ReferenceListStage, StageFlow};
pub use visitor::ImportVisitor;
