//! models モジュール
pub mod model_definition;

/// 主要な型を再エクスポート
pub use model_definition::{
  Composition, DEFAULT_ENTRY_FORMAT, DEFAULT_UE_TYPE, Definition, DefinitionId, ELISION_ENTRY_FORMAT,
  Entry, EntryFormatId, EntryId, Expression, ExpressionId, Extra, Library, LibraryId, LibraryType,
  Morpheme, MorphemeId, MorphemeStatus, MorphemeType, REFERENCE_LIST_ID, REFERENCE_LIST_NAME,
  UeListId, UeListType, UeTypeId, UsageExample, UsageExampleId,
};
