//! VibratoTokenizer 用統合テスト
//!
//! 辞書キャッシュが必要（事前に `cargo test -- --ignored` で辞書ダウンロード済みであること）。
//! キャッシュが無い場合は各テストをスキップする。

use vibrato_rkyv::dictionary::PresetDictionaryKind;
use yorei::dictionary::DictionaryManager;
use yorei::models::MorphemeType;
use yorei::tokenizer::{MorphemeToken, MorphemeTokenizer, VibratoTokenizer};

// ─── Test Helpers ─────────────────────────────────────────────────────

fn cached_tokenizer() -> Option<VibratoTokenizer> {
  let manager = DictionaryManager::with_preset(PresetDictionaryKind::Ipadic).ok()?;
  if !manager.cache_dir().join(PresetDictionaryKind::Ipadic.name()).exists() {
    eprintln!("辞書キャッシュが存在しないためスキップ");
    return None;
  }
  manager.tokenizer().ok()
}

fn tokens(tokenizer: &VibratoTokenizer, text: &str) -> Vec<MorphemeToken> {
  tokenizer.parse(text).collect()
}

/// 基本的な文が形態素列になり、読みがひらがなに正規化されることを確認。
#[test]
fn tokenize_basic_sentence() {
  let Some(tokenizer) = cached_tokenizer() else {
    return;
  };

  let tokens = tokens(&tokenizer, "先生が来た。");
  assert!(!tokens.is_empty(), "トークンが空です");

  let sensei = tokens.iter().find(|t| t.surface == "先生").expect("「先生」が含まれていません");
  assert_eq!(sensei.reading, "せんせい");
  assert_eq!(sensei.kind, MorphemeType::Noun);

  // 句点は記号として既定で除外される
  assert!(tokens.iter().all(|t| t.kind != MorphemeType::Symbol));
}

/// 活用語は基本形を持つことを確認。
#[test]
fn verbs_carry_their_base_form() {
  let Some(tokenizer) = cached_tokenizer() else {
    return;
  };

  let tokens = tokens(&tokenizer, "食べた");
  let verb = tokens.iter().find(|t| t.kind == MorphemeType::Verb).expect("動詞が含まれていません");
  assert_eq!(verb.base, "食べる");
}

/// 位置と長さが文字（コードポイント）単位であることを確認。
#[test]
fn verify_char_offsets() {
  let Some(tokenizer) = cached_tokenizer() else {
    return;
  };

  let text = "東京タワーは高い";
  let chars: Vec<char> = text.chars().collect();
  let mut previous_end = 0;
  for token in tokens(&tokenizer, text) {
    assert!(token.position >= previous_end, "トークンが逆順です: {:?}", token);
    assert!(token.position + token.length <= chars.len());

    let slice: String = chars[token.position..token.position + token.length].iter().collect();
    assert_eq!(slice, token.surface, "オフセットスライスがトークンテキストと一致しません");
    previous_end = token.position + token.length;
  }
}
