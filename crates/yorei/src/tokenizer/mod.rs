//! tokenizer モジュール
pub mod kana;
pub mod lexicon_tokenizer;
pub mod morpheme_token;
pub mod vibrato_tokenizer;

/// 再エクスポート
pub use lexicon_tokenizer::{LexiconEntry, LexiconTokenizer};
pub use morpheme_token::{CharOffsets, MorphemeStream, MorphemeToken, MorphemeTokenizer};
pub use vibrato_tokenizer::{FeatureLayout, VibratoTokenizer, token_from_feature};
