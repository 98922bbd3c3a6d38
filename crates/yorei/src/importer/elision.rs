//! Blank-elision (`J-J1`) headword handling
//!
//! Elision dictionaries write headwords with markers: kana use `-` between components and
//! `・` / `∘` before the conjugated tail, kanji use `―` where a kana component stands in
//! for the written form (`あか-パンかび` / `赤―黴`). Example sentences abbreviate the
//! headword itself to `―`.

use crate::errors::ElisionError;

/// Markers dropped from kana headwords.
const KANA_MARKERS: [char; 3] = ['-', '・', '∘'];

/// Placeholder used in kanji headwords and example sentences.
const BLANK: char = '―';

fn is_boundary_hiragana(c: char) -> bool {
  ('ぁ'..='ん').contains(&c)
}

fn is_boundary_katakana(c: char) -> bool {
  ('ァ'..='ン').contains(&c) || c == 'ー'
}

/// Kana headword without elision markers.
pub fn normalize_kana(raw: &str) -> String {
  raw.chars().filter(|c| !KANA_MARKERS.contains(c)).collect()
}

/// Splits a kana headword into components at `-` and at every hiragana/katakana switch.
fn kana_components(kana: &str) -> Vec<String> {
  let chars: Vec<char> = kana.chars().collect();
  let mut hyphened = String::with_capacity(kana.len() + 4);
  for (idx, &c) in chars.iter().enumerate() {
    hyphened.push(c);
    if let Some(&next) = chars.get(idx + 1) {
      let switch = (is_boundary_hiragana(c) && is_boundary_katakana(next))
        || (is_boundary_katakana(c) && is_boundary_hiragana(next));
      if switch {
        hyphened.push('-');
      }
    }
  }
  hyphened.split('-').map(str::to_string).collect()
}

/// Expands the `―` placeholders of a kanji headword with the matching kana components.
///
/// Every `―` not at the start moves to the next component, and so does the first kanji
/// after a placeholder run. Fails when a placeholder needs a component the kana lacks.
pub fn expand_kanji(kanji: &str, kana: &str) -> Result<String, ElisionError> {
  let components = kana_components(kana);
  let missing = |required: usize| ElisionError::MissingKanaComponent {
    kanji: kanji.to_string(),
    kana: kana.to_string(),
    required,
    available: components.len(),
  };

  let mut expanded = String::with_capacity(kanji.len() * 2);
  let mut part = 0;
  let mut in_blank = false;
  for (idx, c) in kanji.chars().enumerate() {
    if c == BLANK {
      if idx != 0 {
        part += 1;
      }
      let component = components.get(part).ok_or_else(|| missing(part + 1))?;
      expanded.push_str(component);
      in_blank = true;
    } else {
      if in_blank {
        part += 1;
      }
      expanded.push(c);
      in_blank = false;
    }
  }

  if part + 1 > components.len() {
    return Err(missing(part + 1));
  }
  Ok(expanded)
}

/// Portion of a kana headword before its conjugation marker, markers removed.
fn kana_stem(raw: &str) -> String {
  let stem = raw.split(['・', '∘']).next().unwrap_or(raw);
  normalize_kana(stem)
}

/// Conjugated tail of a kana headword (after `・` / `∘`), markers removed.
fn kana_tail(raw: &str) -> Option<String> {
  raw.find(['・', '∘']).map(|idx| {
    let marker_len = raw[idx..].chars().next().map(char::len_utf8).unwrap_or(0);
    normalize_kana(&raw[idx + marker_len..])
  })
}

/// Restores abbreviated headwords in an example sentence.
///
/// `―・` and `―∘` stand for the stem, a bare `―` for the full headword. The kanji form is
/// used when the entry has one; when it cannot be expanded the sentence is returned as is.
pub fn replace_blanks(expression: &str, kana_raw: &str, kanji_raw: Option<&str>) -> String {
  if !expression.contains(BLANK) {
    return expression.to_string();
  }

  let (full, stem) = match kanji_raw {
    Some(kanji) => {
      let Ok(full) = expand_kanji(kanji, kana_raw) else {
        return expression.to_string();
      };
      let stem = match kana_tail(kana_raw) {
        Some(tail) if !tail.is_empty() => full.strip_suffix(tail.as_str()).unwrap_or(&full).to_string(),
        _ => full.clone(),
      };
      (full, stem)
    }
    None => (normalize_kana(kana_raw), kana_stem(kana_raw)),
  };

  expression
    .replace("―・", &stem)
    .replace("―∘", &stem)
    .replace(BLANK, &full)
}
