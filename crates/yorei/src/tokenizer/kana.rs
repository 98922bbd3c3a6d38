//! Kana / kanji character classes and script folding.

/// Hiragana block (U+3040–U+309F).
pub fn is_hiragana(c: char) -> bool {
  ('\u{3040}'..='\u{309F}').contains(&c)
}

/// Katakana block (U+30A0–U+30FF).
pub fn is_katakana(c: char) -> bool {
  ('\u{30A0}'..='\u{30FF}').contains(&c)
}

/// Either kana block.
pub fn is_kana(c: char) -> bool {
  is_hiragana(c) || is_katakana(c)
}

/// CJK unified ideographs as covered by the lookup classifier (U+4E00–U+9FBF).
pub fn is_kanji(c: char) -> bool {
  ('\u{4E00}'..='\u{9FBF}').contains(&c)
}

/// Folds katakana into hiragana; every other character is kept as is.
///
/// `ァ`..`ヶ` shift down by 0x60, the iteration marks `ヽ` `ヾ` map to `ゝ` `ゞ`.
/// The prolonged sound mark `ー` has no hiragana counterpart and is kept.
pub fn katakana_to_hiragana(text: &str) -> String {
  text
    .chars()
    .map(|c| match c {
      '\u{30A1}'..='\u{30F6}' | '\u{30FD}'..='\u{30FE}' => {
        char::from_u32(c as u32 - 0x60).unwrap_or(c)
      }
      _ => c,
    })
    .collect()
}

/// Whether `c` is a numeral: ASCII or full-width digit, or an ideographic digit.
pub fn is_numeral(c: char) -> bool {
  c.is_ascii_digit()
    || ('０'..='９').contains(&c)
    || matches!(
      c,
      '〇' | '一' | '二' | '三' | '四' | '五' | '六' | '七' | '八' | '九' | '十' | '百' | '千' | '万' | '億' | '兆'
    )
}

/// Non-empty text made only of numerals.
pub fn is_numeral_text(text: &str) -> bool {
  !text.is_empty() && text.chars().all(is_numeral)
}
