//! インポート結果のレポート型定義
//!
//! 1 回のインポートで作成・重複判定された件数を集計します。

use serde::{Deserialize, Serialize};

/// インポートの集計結果
///
/// パイプラインが各イベントの処理中に記録し、`finish` 後に呼び出し側へ返す。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
  /// 新規作成されたライブラリ数
  pub libraries_created: usize,
  /// 名前一致で再利用（更新）されたライブラリ数
  pub libraries_updated: usize,
  /// 作成されたエントリ数
  pub entries: usize,
  /// 作成された定義数
  pub definitions: usize,
  /// 新規作成された用例数
  pub usage_examples_created: usize,
  /// 既存（同一ライブラリ・同一表現）だった用例数
  pub usage_examples_duplicate: usize,
  /// 新規作成された表現数
  pub expressions_created: usize,
  /// コピーしたメディアファイル数
  pub media_copied: usize,
  /// 見つからなかった（またはコピーに失敗した）メディアファイル数
  pub media_missing: usize,
  /// 見出し語の正規化に失敗し生の表記を使った回数
  pub headword_fallbacks: usize,
  /// 頻度メンテナへステージされた形態素数（延べ）
  pub staged_morphemes: usize,
  /// 頻度コミットで更新された形態素の行数
  pub frequency_rows: usize,
}

impl ImportReport {
  /// 重複なしで全用例が作成されたか
  pub fn is_all_created(&self) -> bool {
    self.usage_examples_duplicate == 0
  }

  /// ライブラリ作成を記録
  pub fn record_library_created(&mut self) {
    self.libraries_created += 1;
  }

  /// ライブラリ再利用を記録
  pub fn record_library_updated(&mut self) {
    self.libraries_updated += 1;
  }

  /// エントリ作成を記録
  pub fn record_entry(&mut self) {
    self.entries += 1;
  }

  /// 定義作成を記録
  pub fn record_definition(&mut self) {
    self.definitions += 1;
  }

  /// 用例の作成／重複を記録
  pub fn record_usage_example(&mut self, is_new: bool) {
    if is_new {
      self.usage_examples_created += 1;
    } else {
      self.usage_examples_duplicate += 1;
    }
  }

  /// 表現作成を記録
  pub fn record_expression_created(&mut self) {
    self.expressions_created += 1;
  }

  /// メディアのコピー結果を記録
  pub fn record_media(&mut self, copied: bool) {
    if copied {
      self.media_copied += 1;
    } else {
      self.media_missing += 1;
    }
  }

  /// 見出し語フォールバックを記録
  pub fn record_headword_fallback(&mut self) {
    self.headword_fallbacks += 1;
  }

  /// ステージされた形態素数を加算
  pub fn record_staged(&mut self, morphemes: usize) {
    self.staged_morphemes += morphemes;
  }

  /// 頻度コミットの更新行数を加算
  pub fn record_frequency_commit(&mut self, rows: usize) {
    self.frequency_rows += rows;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn usage_examples_split_into_created_and_duplicate() {
    let mut report = ImportReport::default();
    report.record_usage_example(true);
    report.record_usage_example(true);
    assert!(report.is_all_created());

    report.record_usage_example(false);
    assert_eq!(report.usage_examples_created, 2);
    assert_eq!(report.usage_examples_duplicate, 1);
    assert!(!report.is_all_created());
  }

  #[test]
  fn media_outcomes_are_counted_separately() {
    let mut report = ImportReport::default();
    report.record_media(true);
    report.record_media(false);
    report.record_media(false);
    assert_eq!(report.media_copied, 1);
    assert_eq!(report.media_missing, 2);
  }

  #[test]
  fn report_serializes_to_json() {
    let mut report = ImportReport::default();
    report.record_entry();
    report.record_staged(3);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["entries"], 1);
    assert_eq!(json["staged_morphemes"], 3);
  }
}
