//! Data Model Definition
//!
//! Row types of the morpheme-indexed store. Every entity is created by the importer
//! and treated as immutable afterwards, except the morpheme counters.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Named free-form extras attached to libraries, entries, definitions and usage examples.
///
/// Persisted as a JSON object (`{"name": "text", ...}`); `BTreeMap` keeps the encoding
/// stable across runs.
pub type Extra = BTreeMap<String, String>;

macro_rules! row_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl $name {
      /// Raw row id.
      pub fn get(self) -> i64 {
        self.0
      }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
      }
    }
  };
}

row_id!(
  /// `libraries.id`
  LibraryId
);
row_id!(
  /// `entries.id`
  EntryId
);
row_id!(
  /// `entry_formats.id`
  EntryFormatId
);
row_id!(
  /// `definitions.id`
  DefinitionId
);
row_id!(
  /// `expressions.id`
  ExpressionId
);
row_id!(
  /// `morphemes.id`
  MorphemeId
);
row_id!(
  /// `usage_examples.id`
  UsageExampleId
);
row_id!(
  /// `ue_types.id`
  UeTypeId
);
row_id!(
  /// `ue_lists.id`
  UeListId
);

/// Id of the distinguished reference list ("Known Examples"), seeded with the schema.
pub const REFERENCE_LIST_ID: UeListId = UeListId(1);

/// Name of the reference list.
pub const REFERENCE_LIST_NAME: &str = "Known Examples";

/// Entry format name used when a source does not specify one.
pub const DEFAULT_ENTRY_FORMAT: &str = "J-E1";

/// Blank-elision entry format name.
pub const ELISION_ENTRY_FORMAT: &str = "J-J1";

/// Usage-example type name used when a source does not specify one.
pub const DEFAULT_UE_TYPE: &str = "UNKNOWN";

/// Grammatical type of a morpheme.
///
/// The integer codes are what the store persists; they never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorphemeType {
  /// BOS/EOS sentence-boundary marker
  SentenceBoundary,
  /// 感動詞
  Interjection,
  /// 副詞
  Adverb,
  /// 連体詞
  PreNounAdjectival,
  /// 名詞
  Noun,
  /// 助動詞
  AuxiliaryVerb,
  /// 動詞
  Verb,
  /// 助詞
  Particle,
  /// 接頭詞
  Prefix,
  /// 形容詞
  Adjective,
  /// 接続詞
  Conjunction,
  /// フィラー
  Filler,
  /// 記号
  Symbol,
  /// その他
  Other,
  /// Synthetic tag for a kanji headword component
  KanjiEntry,
  /// Synthetic tag for a kana headword component
  KanaEntry,
}

impl MorphemeType {
  /// All types in code order.
  pub const ALL: [MorphemeType; 16] = [
    MorphemeType::SentenceBoundary,
    MorphemeType::Interjection,
    MorphemeType::Adverb,
    MorphemeType::PreNounAdjectival,
    MorphemeType::Noun,
    MorphemeType::AuxiliaryVerb,
    MorphemeType::Verb,
    MorphemeType::Particle,
    MorphemeType::Prefix,
    MorphemeType::Adjective,
    MorphemeType::Conjunction,
    MorphemeType::Filler,
    MorphemeType::Symbol,
    MorphemeType::Other,
    MorphemeType::KanjiEntry,
    MorphemeType::KanaEntry,
  ];

  /// Persisted integer code.
  pub fn code(self) -> i64 {
    match self {
      MorphemeType::SentenceBoundary => 0,
      MorphemeType::Interjection => 1,
      MorphemeType::Adverb => 2,
      MorphemeType::PreNounAdjectival => 3,
      MorphemeType::Noun => 4,
      MorphemeType::AuxiliaryVerb => 5,
      MorphemeType::Verb => 6,
      MorphemeType::Particle => 7,
      MorphemeType::Prefix => 8,
      MorphemeType::Adjective => 9,
      MorphemeType::Conjunction => 10,
      MorphemeType::Filler => 11,
      MorphemeType::Symbol => 12,
      MorphemeType::Other => 13,
      MorphemeType::KanjiEntry => 14,
      MorphemeType::KanaEntry => 15,
    }
  }

  /// Inverse of [`code`](Self::code).
  pub fn from_code(code: i64) -> Option<Self> {
    Self::ALL.iter().copied().find(|kind| kind.code() == code)
  }

  /// Maps the part-of-speech field (first feature column) of an IPADIC or UniDic token.
  ///
  /// UniDic-only tags are folded into the closest IPADIC category.
  pub fn from_part_of_speech(pos: &str) -> Self {
    match pos {
      "BOS/EOS" => MorphemeType::SentenceBoundary,
      "感動詞" => MorphemeType::Interjection,
      "副詞" => MorphemeType::Adverb,
      "連体詞" => MorphemeType::PreNounAdjectival,
      "名詞" | "代名詞" => MorphemeType::Noun,
      "助動詞" => MorphemeType::AuxiliaryVerb,
      "動詞" => MorphemeType::Verb,
      "助詞" => MorphemeType::Particle,
      "接頭詞" | "接頭辞" => MorphemeType::Prefix,
      "形容詞" | "形状詞" => MorphemeType::Adjective,
      "接続詞" => MorphemeType::Conjunction,
      "フィラー" => MorphemeType::Filler,
      "記号" | "補助記号" | "空白" => MorphemeType::Symbol,
      _ => MorphemeType::Other,
    }
  }

  /// Whether tokens of this type are dropped by tokenizers unless configured otherwise.
  pub fn is_skipped_by_default(self) -> bool {
    matches!(self, MorphemeType::SentenceBoundary | MorphemeType::Symbol)
  }
}

/// Learning status of a morpheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorphemeStatus {
  /// Tagged automatically at import
  Auto,
  /// Explicitly unknown
  Unknown,
  /// Explicitly known
  Known,
}

impl MorphemeStatus {
  /// Persisted integer code.
  pub fn code(self) -> i64 {
    match self {
      MorphemeStatus::Auto => 1,
      MorphemeStatus::Unknown => 2,
      MorphemeStatus::Known => 3,
    }
  }

  /// Inverse of [`code`](Self::code).
  pub fn from_code(code: i64) -> Option<Self> {
    match code {
      1 => Some(MorphemeStatus::Auto),
      2 => Some(MorphemeStatus::Unknown),
      3 => Some(MorphemeStatus::Known),
      _ => None,
    }
  }
}

/// Kind of library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LibraryType {
  /// Headword dictionary
  Dictionary,
  /// Example-sentence corpus (flashcard decks etc.)
  Corpus,
}

impl LibraryType {
  /// Persisted integer code.
  pub fn code(self) -> i64 {
    match self {
      LibraryType::Dictionary => 1,
      LibraryType::Corpus => 2,
    }
  }

  /// Inverse of [`code`](Self::code).
  pub fn from_code(code: i64) -> Option<Self> {
    match code {
      1 => Some(LibraryType::Dictionary),
      2 => Some(LibraryType::Corpus),
      _ => None,
    }
  }
}

/// Kind of usage-example list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UeListType {
  /// Created by the user
  User,
  /// Maintained by the system (the reference list)
  System,
}

impl UeListType {
  /// Persisted integer code.
  pub fn code(self) -> i64 {
    match self {
      UeListType::User => 1,
      UeListType::System => 2,
    }
  }
}

/// A named source collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Library {
  /// Row id
  pub id: LibraryId,
  /// Unique-by-convention display name
  pub name: String,
  /// Dictionary or corpus
  pub kind: LibraryType,
  /// Short alias
  pub alias: Option<String>,
  /// Source date (ISO-8601 for imports that stamp it)
  pub date: Option<String>,
  /// Version of the upstream dump
  pub dump_version: Option<String>,
  /// Version of the converter that produced the importable document
  pub convert_version: Option<String>,
  /// Version of the importer
  pub import_version: Option<String>,
  /// Named extras
  #[serde(default)]
  pub extra: Extra,
}

impl Library {
  /// Breadcrumb label: the library name.
  pub fn breadcrumb(&self) -> String {
    self.name.clone()
  }
}

/// A headword unit owned by a library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
  /// Row id
  pub id: EntryId,
  /// Owning library
  pub library_id: LibraryId,
  /// Format name (`J-E1`, `J-J1`, ...)
  pub format: String,
  /// Sequence number within the library, when the source has one
  pub number: Option<i64>,
  /// Raw kana headwords as written in the source (elision format only)
  pub kana_raw: Option<Vec<String>>,
  /// Raw kanji headwords as written in the source (elision format only)
  pub kanji_raw: Option<Vec<String>>,
  /// Pitch accent notation
  pub accent: Option<String>,
  /// Named extras
  #[serde(default)]
  pub extra: Extra,
  /// Normalized kana headwords, ordered by association number
  pub kana: Vec<String>,
  /// Normalized kanji headwords, ordered by association number
  pub kanji: Vec<String>,
}

impl Entry {
  /// Breadcrumb label: `かな・かな[漢字・漢字]`.
  ///
  /// Raw lists win over normalized associations so that elided headwords show as written.
  pub fn breadcrumb(&self) -> String {
    let kana = self.kana_raw.as_deref().unwrap_or(&self.kana);
    let kanji = self.kanji_raw.as_deref().unwrap_or(&self.kanji);

    let mut label = kana.join("・");
    if !kanji.is_empty() {
      label.push('[');
      label.push_str(&kanji.join("・"));
      label.push(']');
    }
    label
  }
}

/// A definition node; definitions form a tree through `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
  /// Row id
  pub id: DefinitionId,
  /// Owning entry
  pub entry_id: EntryId,
  /// Parent definition, `None` for a root
  pub parent_id: Option<DefinitionId>,
  /// Sequence number among siblings
  pub number: Option<i64>,
  /// Optional group label
  pub group: Option<String>,
  /// Definition text
  pub text: Option<String>,
  /// Named extras
  #[serde(default)]
  pub extra: Extra,
}

impl Definition {
  /// Breadcrumb label: `(number) text` on one line, or `(No definition)`.
  pub fn breadcrumb(&self) -> String {
    let text = self.text.as_deref().map(str::trim).unwrap_or_default();
    if text.is_empty() {
      return "(No definition)".to_string();
    }

    let one_line = text.replace("\r\n", " ").replace(['\n', '\r'], " ");
    match self.number {
      Some(number) => format!("({number}) {one_line}"),
      None => one_line,
    }
  }
}

/// A canonical expression text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
  /// Row id
  pub id: ExpressionId,
  /// Text, unique across the store
  pub text: String,
}

/// A canonical (surface, type) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Morpheme {
  /// Row id
  pub id: MorphemeId,
  /// Dictionary base form
  pub surface: String,
  /// Grammatical type
  pub kind: MorphemeType,
  /// Learning status
  pub status: MorphemeStatus,
  /// Number of distinct reference-list expressions containing this morpheme
  pub expr_count: Option<i64>,
  /// Number of definitions containing this morpheme
  pub def_count: Option<i64>,
}

/// One composition row: an owner text decomposed into a morpheme span.
///
/// `position` and `length` count Unicode scalar values of the owner text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
  /// Resolved morpheme
  pub morpheme_id: MorphemeId,
  /// Char offset in the owner text
  pub position: usize,
  /// Char length of the span
  pub length: usize,
  /// Literal (conjugated) substring
  pub conjugation: String,
  /// Hiragana reading of the literal substring
  pub reading: String,
}

/// An example sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageExample {
  /// Row id
  pub id: UsageExampleId,
  /// Referenced expression
  pub expression_id: ExpressionId,
  /// Owning library
  pub library_id: LibraryId,
  /// Type name (upper case)
  pub ue_type: String,
  /// Translation / gloss
  pub meaning: Option<String>,
  /// Reading supplied by the source
  pub reading: Option<String>,
  /// Sound file name in managed media storage
  pub sound: Option<String>,
  /// Image file name in managed media storage
  pub image: Option<String>,
  /// Named extras
  #[serde(default)]
  pub extra: Extra,
  /// Whether the source marked the example as validated
  pub is_validated: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Test Module
// ─────────────────────────────────────────────────────────────────────────────
