//! Morpheme tokenizer backed by vibrato

use std::sync::Arc;

use tracing::debug;
use vibrato_rkyv::Dictionary;
use vibrato_rkyv::Tokenizer as VibratoImpl;
use vibrato_rkyv::dictionary::PresetDictionaryKind;

use crate::models::MorphemeType;
use crate::tokenizer::kana::katakana_to_hiragana;
use crate::tokenizer::morpheme_token::{CharOffsets, MorphemeStream, MorphemeToken, MorphemeTokenizer};

/// Feature column holding the part of speech (both layouts)
const IDX_POS: usize = 0;

/// Column layout of the dictionary's feature strings.
///
/// IPADIC: `品詞,細分類1,細分類2,細分類3,活用型,活用形,原形,読み,発音`.
/// UniDic (cwj / csj 3.1): `pos1..pos4,cType,cForm,lForm,lemma,orth,pron,orthBase,pronBase,
/// goshu,iType,iForm,fType,fForm,iConType,fConType,type,kana,kanaBase,...`; `lForm` is the
/// katakana reading of the lemma, `kana` the katakana reading of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeatureLayout {
  /// MeCab IPADIC
  #[default]
  Ipadic,
  /// UniDic-cwj / UniDic-csj
  Unidic,
}

impl FeatureLayout {
  /// Layout of a vibrato-rkyv preset; every non-IPADIC preset is a UniDic build.
  pub fn for_preset(preset: PresetDictionaryKind) -> Self {
    match preset {
      PresetDictionaryKind::Ipadic => FeatureLayout::Ipadic,
      _ => FeatureLayout::Unidic,
    }
  }

  /// Column of the dictionary form.
  pub fn lemma_index(self) -> usize {
    match self {
      FeatureLayout::Ipadic => 6,
      FeatureLayout::Unidic => 7,
    }
  }

  /// Column of the katakana reading of the surface.
  pub fn reading_index(self) -> usize {
    match self {
      FeatureLayout::Ipadic => 7,
      FeatureLayout::Unidic => 20,
    }
  }
}

/// Japanese morpheme tokenizer using Vibrato-rkyv
///
/// - Stateless (only holds dictionary reference)
/// - `Clone + Send + Sync`
/// - Implements [`MorphemeTokenizer`]
#[derive(Clone)]
pub struct VibratoTokenizer {
  inner: VibratoImpl,
  skip: Vec<MorphemeType>,
  layout: FeatureLayout,
}

impl VibratoTokenizer {
  /// Constructs a tokenizer from an already loaded Dictionary
  ///
  /// Constructor corresponding to `vibrato_rkyv::Tokenizer::new(dict)`.
  pub fn from_dictionary(dict: Dictionary) -> Self {
    Self {
      inner: VibratoImpl::new(dict),
      skip: default_skip(),
      layout: FeatureLayout::default(),
    }
  }

  /// Constructs a tokenizer from a shared dictionary (`Arc<Dictionary>`).
  ///
  /// Use this when the dictionary is shared via `Arc`, such as `DictionaryManager::load()`.
  ///
  /// # Examples
  /// ```rust,no_run
  /// # use yorei::dictionary::DictionaryManager;
  /// # use yorei::tokenizer::VibratoTokenizer;
  /// # use vibrato_rkyv::dictionary::PresetDictionaryKind;
  /// let manager = DictionaryManager::with_preset(PresetDictionaryKind::Ipadic).unwrap();
  /// let dict = manager.load().unwrap();
  /// let tokenizer = VibratoTokenizer::from_shared_dictionary(dict);
  /// ```
  pub fn from_shared_dictionary(dict: Arc<Dictionary>) -> Self {
    Self {
      inner: VibratoImpl::from_shared_dictionary(dict),
      skip: default_skip(),
      layout: FeatureLayout::default(),
    }
  }

  /// Replaces the set of morpheme types dropped from the output.
  pub fn with_skip(mut self, skip: Vec<MorphemeType>) -> Self {
    self.skip = skip;
    self
  }

  /// Sets the feature column layout (IPADIC unless told otherwise).
  pub fn with_layout(mut self, layout: FeatureLayout) -> Self {
    self.layout = layout;
    self
  }

  /// Feature column layout in use.
  pub fn layout(&self) -> FeatureLayout {
    self.layout
  }
}

fn default_skip() -> Vec<MorphemeType> {
  MorphemeType::ALL.into_iter().filter(|kind| kind.is_skipped_by_default()).collect()
}

impl MorphemeTokenizer for VibratoTokenizer {
  fn parse(&self, text: &str) -> MorphemeStream {
    if text.is_empty() {
      return MorphemeStream::empty();
    }

    // worker holds lattice for analysis and calculation area.
    // Created each time
    let mut worker = self.inner.new_worker();
    worker.reset_sentence(text);
    worker.tokenize();

    debug!(input_text = %text, "Start morphological analysis");

    let offsets = CharOffsets::new(text);
    let mut tokens = Vec::with_capacity(worker.num_tokens());
    for token in worker.token_iter() {
      let surface = token.surface();
      let feature = token.feature();
      let range = token.range_byte();
      let position = offsets.char_offset(range.start);
      let length = offsets.char_offset(range.end) - position;

      let morpheme = token_from_feature(self.layout, surface, feature, position, length);
      let kept = !self.skip.contains(&morpheme.kind);

      debug!(
        surface = %surface,
        ?feature,
        start = range.start,
        end = range.end,
        kept,
        "Token"
      );

      if kept {
        tokens.push(morpheme);
      }
    }

    debug!(
      input_text = %text,
      total_tokens = worker.num_tokens(),
      kept_tokens = tokens.len(),
      "Morphological analysis completed"
    );

    MorphemeStream::new(tokens)
  }
}

/// Builds a [`MorphemeToken`] from one analyzer token.
///
/// Lemma and reading default to the surface when the dictionary leaves them as `*` or
/// omits the column (unknown words).
pub fn token_from_feature(
  layout: FeatureLayout,
  surface: &str,
  feature: &str,
  position: usize,
  length: usize,
) -> MorphemeToken {
  let fields: Vec<&str> = feature.split(',').collect();
  let column = |idx: usize| {
    fields
      .get(idx)
      .copied()
      .filter(|value| !value.is_empty() && *value != "*")
  };

  let kind = MorphemeType::from_part_of_speech(column(IDX_POS).unwrap_or_default());
  let base = column(layout.lemma_index()).unwrap_or(surface).to_string();
  let reading = katakana_to_hiragana(column(layout.reading_index()).unwrap_or(surface));

  MorphemeToken {
    surface: surface.to_string(),
    base,
    reading,
    length,
    position,
    kind,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ipadic(surface: &str, feature: &str) -> MorphemeToken {
    token_from_feature(FeatureLayout::Ipadic, surface, feature, 0, surface.chars().count())
  }

  fn unidic(surface: &str, feature: &str) -> MorphemeToken {
    token_from_feature(FeatureLayout::Unidic, surface, feature, 0, surface.chars().count())
  }

  /// IPADIC verb: lemma column holds the dictionary form
  #[test]
  fn ipadic_verb_uses_lemma_as_base() {
    let token = token_from_feature(FeatureLayout::Ipadic, "食べ", "動詞,自立,*,*,一段,連用形,食べる,タベ,タベ", 3, 2);
    assert_eq!(token.base, "食べる");
    assert_eq!(token.reading, "たべ");
    assert_eq!(token.kind, MorphemeType::Verb);
    assert_eq!((token.position, token.length), (3, 2));
  }

  #[test]
  fn ipadic_noun_reading_is_folded_to_hiragana() {
    let token = ipadic("先生", "名詞,一般,*,*,*,*,先生,センセイ,センセイ");
    assert_eq!(token.surface, "先生");
    assert_eq!(token.base, "先生");
    assert_eq!(token.reading, "せんせい");
    assert_eq!(token.kind, MorphemeType::Noun);
  }

  #[test]
  fn presets_choose_their_layout() {
    assert_eq!(FeatureLayout::for_preset(PresetDictionaryKind::Ipadic), FeatureLayout::Ipadic);
    assert_eq!(FeatureLayout::for_preset(PresetDictionaryKind::UnidicCwj), FeatureLayout::Unidic);
    assert_eq!(FeatureLayout::for_preset(PresetDictionaryKind::UnidicCsj), FeatureLayout::Unidic);
  }

  /// UniDic verb: lForm (column 6) is a reading, the lemma sits in column 7 and the surface
  /// reading in `kana` (column 20)
  #[test]
  fn unidic_verb_takes_lemma_and_surface_reading() {
    let token = unidic(
      "食べ",
      "動詞,一般,*,*,下一段-バ行,連用形-一般,タベル,食べる,食べ,タベ,食べる,タベル,和,*,*,*,*,*,*,用,タベ,タベル,タベ,タベル,2,C1,*,6273179342627361,22822",
    );
    assert_eq!(token.base, "食べる");
    assert_eq!(token.reading, "たべ");
    assert_eq!(token.kind, MorphemeType::Verb);
  }

  #[test]
  fn unidic_noun_is_not_keyed_on_its_reading() {
    let token = unidic(
      "先生",
      "名詞,普通名詞,一般,*,*,*,センセイ,先生,先生,センセー,先生,センセー,漢,*,*,*,*,*,*,体,センセイ,センセイ,センセイ,センセイ,3,C1,*,5844604164317696,21262",
    );
    assert_eq!(token.base, "先生");
    assert_eq!(token.reading, "せんせい");
    assert_eq!(token.kind, MorphemeType::Noun);
  }

  #[test]
  fn unidic_suffix_maps_to_other() {
    let token = unidic(
      "寺",
      "接尾辞,名詞的,一般,*,*,*,テラ,寺,寺,テラ,寺,テラ,和,*,*,*,*,*,*,接尾体,テラ,テラ,テラ,テラ,*,C3,*,6900187617976832,25103",
    );
    assert_eq!(token.base, "寺");
    assert_eq!(token.reading, "てら");
    assert_eq!(token.kind, MorphemeType::Other);
  }

  #[test]
  fn unidic_adjectival_noun_maps_to_adjective() {
    let token = unidic(
      "静か",
      "形状詞,一般,*,*,*,*,シズカ,静か,静か,シズカ,静か,シズカ,和,*,*,*,*,*,*,相,シズカ,シズカ,シズカ,シズカ,1,C2,*,4269093384725248,15531",
    );
    assert_eq!(token.kind, MorphemeType::Adjective);
    assert_eq!(token.base, "静か");
    assert_eq!(token.reading, "しずか");
  }

  #[test]
  fn unidic_punctuation_is_symbol() {
    let token = token_from_feature(
      FeatureLayout::Unidic,
      "。",
      "補助記号,句点,*,*,*,*,*,。,。,*,。,*,記号,*,*,*,*,*,*,補助,*,*,*,*,*,*,*,6880571302400,25",
      5,
      1,
    );
    assert_eq!(token.kind, MorphemeType::Symbol);
    assert_eq!(token.base, "。");
    // kana column is `*`: falls back to the surface
    assert_eq!(token.reading, "。");
  }

  /// Unknown words carry a short feature string
  #[test]
  fn missing_columns_fall_back_to_surface() {
    let token = ipadic("ヨレイ", "名詞,固有名詞,組織,*,*,*,*");
    assert_eq!(token.base, "ヨレイ");
    assert_eq!(token.reading, "よれい");
    assert_eq!(token.kind, MorphemeType::Noun);

    let token = unidic("ヨレイ", "名詞,普通名詞,一般,*,*,*");
    assert_eq!(token.base, "ヨレイ");
    assert_eq!(token.reading, "よれい");
  }

  #[test]
  fn particles_and_interjections_keep_their_type() {
    assert_eq!(ipadic("が", "助詞,格助詞,一般,*,*,*,が,ガ,ガ").kind, MorphemeType::Particle);
    assert_eq!(ipadic("はい", "感動詞,*,*,*,*,*,はい,ハイ,ハイ").kind, MorphemeType::Interjection);
    assert_eq!(ipadic("えー", "フィラー,*,*,*,*,*,えー,エー,エー").kind, MorphemeType::Filler);
  }

  #[test]
  fn default_skip_drops_boundaries_and_symbols() {
    assert_eq!(default_skip(), vec![MorphemeType::SentenceBoundary, MorphemeType::Symbol]);
  }
}
