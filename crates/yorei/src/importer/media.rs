//! Media markup parsing and copy into managed storage.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

static SOUND_PATTERN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\[sound:([^\]]+)\]").expect("static sound pattern"));

static IMAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?i)<img[^>]*\ssrc\s*=\s*(?:"([^"]+)"|'([^']+)'|([^\s"'>]+))"#).expect("static image pattern")
});

static REMOTE_PATTERN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)^(?:https?|ftp)://").expect("static remote pattern"));

fn local(name: &str) -> Option<String> {
  let name = name.trim();
  if name.is_empty() || REMOTE_PATTERN.is_match(name) {
    return None;
  }
  Some(name.to_string())
}

/// File name of a `[sound:…]` tag; remote URLs yield `None`.
pub fn parse_sound_field(text: &str) -> Option<String> {
  let captures = SOUND_PATTERN.captures(text)?;
  local(captures.get(1)?.as_str())
}

/// File name of the first `<img src=…>` (quoted or bare); remote URLs yield `None`.
pub fn parse_image_field(text: &str) -> Option<String> {
  let captures = IMAGE_PATTERN.captures(text)?;
  let name = captures.get(1).or_else(|| captures.get(2)).or_else(|| captures.get(3))?;
  local(name.as_str())
}

/// Copies media referenced by newly created usage examples.
///
/// IO failures never abort an import; they are logged and reported as `false`.
#[derive(Debug, Clone)]
pub struct MediaCopier {
  source_dir: PathBuf,
  dest_dir: PathBuf,
}

impl MediaCopier {
  /// Copier from the source's media folder into managed storage.
  pub fn new(source_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
    Self {
      source_dir: source_dir.into(),
      dest_dir: dest_dir.into(),
    }
  }

  /// Source media folder.
  pub fn source_dir(&self) -> &Path {
    &self.source_dir
  }

  /// Managed media storage.
  pub fn dest_dir(&self) -> &Path {
    &self.dest_dir
  }

  /// Copies `file_name`; returns whether the file landed in managed storage.
  pub fn copy(&self, file_name: &str) -> bool {
    // file names come from source markup; never let them leave the media folders
    let relative = Path::new(file_name);
    if relative.is_absolute() || relative.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
      debug!(file = file_name, "Media path rejected");
      return false;
    }

    let from = self.source_dir.join(relative);
    let to = self.dest_dir.join(relative);
    let copied = to
      .parent()
      .map_or(Ok(()), std::fs::create_dir_all)
      .and_then(|()| std::fs::copy(&from, &to));
    match copied {
      Ok(bytes) => {
        debug!(file = file_name, bytes, "Media copied");
        true
      }
      Err(e) => {
        debug!(file = file_name, error = %e, "Media copy skipped");
        false
      }
    }
  }
}
