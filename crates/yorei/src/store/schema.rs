//! SQLite schema of the morpheme-indexed store.
//!
//! Every statement is idempotent; opening an existing store re-runs it harmlessly.

/// Connection pragmas applied to writable connections.
pub(crate) const PRAGMAS: &str = "PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;";

/// Tables, indexes and the reference-list seed row.
pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS libraries (
  id              INTEGER PRIMARY KEY,
  name            TEXT NOT NULL,
  type            INTEGER NOT NULL,
  alias           TEXT,
  date            TEXT,
  dump_version    TEXT,
  convert_version TEXT,
  import_version  TEXT,
  extra           TEXT NOT NULL DEFAULT '{}'
);
CREATE INDEX IF NOT EXISTS idx_libraries_name ON libraries(name);

CREATE TABLE IF NOT EXISTS entry_formats (
  id   INTEGER PRIMARY KEY,
  name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS entries (
  id         INTEGER PRIMARY KEY,
  library_id INTEGER NOT NULL REFERENCES libraries(id),
  format_id  INTEGER NOT NULL REFERENCES entry_formats(id),
  number     INTEGER,
  kana_raw   TEXT,
  kanji_raw  TEXT,
  accent     TEXT,
  extra      TEXT NOT NULL DEFAULT '{}'
);
CREATE INDEX IF NOT EXISTS idx_entries_library ON entries(library_id);

CREATE TABLE IF NOT EXISTS definitions (
  id         INTEGER PRIMARY KEY,
  entry_id   INTEGER NOT NULL REFERENCES entries(id),
  parent_id  INTEGER REFERENCES definitions(id),
  number     INTEGER,
  group_name TEXT,
  definition TEXT,
  extra      TEXT NOT NULL DEFAULT '{}'
);
CREATE INDEX IF NOT EXISTS idx_definitions_entry ON definitions(entry_id);

CREATE TABLE IF NOT EXISTS expressions (
  id         INTEGER PRIMARY KEY,
  expression TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS morphemes (
  id         INTEGER PRIMARY KEY,
  morpheme   TEXT NOT NULL,
  type       INTEGER NOT NULL,
  status     INTEGER NOT NULL DEFAULT 1,
  expr_count INTEGER,
  def_count  INTEGER,
  UNIQUE (morpheme, type)
);

CREATE TABLE IF NOT EXISTS entry_has_kana (
  entry_id    INTEGER NOT NULL REFERENCES entries(id),
  morpheme_id INTEGER NOT NULL REFERENCES morphemes(id),
  number      INTEGER NOT NULL,
  PRIMARY KEY (entry_id, number)
);
CREATE INDEX IF NOT EXISTS idx_entry_has_kana_morpheme ON entry_has_kana(morpheme_id);

CREATE TABLE IF NOT EXISTS entry_has_kanji (
  entry_id    INTEGER NOT NULL REFERENCES entries(id),
  morpheme_id INTEGER NOT NULL REFERENCES morphemes(id),
  number      INTEGER NOT NULL,
  PRIMARY KEY (entry_id, number)
);
CREATE INDEX IF NOT EXISTS idx_entry_has_kanji_morpheme ON entry_has_kanji(morpheme_id);

CREATE TABLE IF NOT EXISTS expression_consists_of (
  expression_id INTEGER NOT NULL REFERENCES expressions(id),
  morpheme_id   INTEGER NOT NULL REFERENCES morphemes(id),
  position      INTEGER NOT NULL,
  word_length   INTEGER NOT NULL,
  conjugation   TEXT NOT NULL,
  reading       TEXT NOT NULL,
  PRIMARY KEY (expression_id, morpheme_id, position)
);
CREATE INDEX IF NOT EXISTS idx_expression_consists_of_morpheme ON expression_consists_of(morpheme_id);

CREATE TABLE IF NOT EXISTS definition_consists_of (
  definition_id INTEGER NOT NULL REFERENCES definitions(id),
  morpheme_id   INTEGER NOT NULL REFERENCES morphemes(id),
  position      INTEGER NOT NULL,
  word_length   INTEGER NOT NULL,
  conjugation   TEXT NOT NULL,
  reading       TEXT NOT NULL,
  PRIMARY KEY (definition_id, morpheme_id, position)
);
CREATE INDEX IF NOT EXISTS idx_definition_consists_of_morpheme ON definition_consists_of(morpheme_id);

CREATE TABLE IF NOT EXISTS ue_types (
  id   INTEGER PRIMARY KEY,
  name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS usage_examples (
  id            INTEGER PRIMARY KEY,
  expression_id INTEGER NOT NULL REFERENCES expressions(id),
  library_id    INTEGER NOT NULL REFERENCES libraries(id),
  type_id       INTEGER NOT NULL REFERENCES ue_types(id),
  meaning       TEXT,
  reading       TEXT,
  sound         TEXT,
  image         TEXT,
  extra         TEXT NOT NULL DEFAULT '{}',
  is_validated  INTEGER NOT NULL DEFAULT 1,
  UNIQUE (library_id, expression_id)
);
CREATE INDEX IF NOT EXISTS idx_usage_examples_expression ON usage_examples(expression_id);

CREATE TABLE IF NOT EXISTS definition_has_ues (
  usage_example_id INTEGER NOT NULL REFERENCES usage_examples(id),
  definition_id    INTEGER NOT NULL REFERENCES definitions(id),
  number           INTEGER,
  PRIMARY KEY (definition_id, usage_example_id)
);
CREATE INDEX IF NOT EXISTS idx_definition_has_ues_ue ON definition_has_ues(usage_example_id);

CREATE TABLE IF NOT EXISTS ue_lists (
  id      INTEGER PRIMARY KEY,
  name    TEXT NOT NULL,
  type_id INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS ue_part_of_list (
  ue_list_id       INTEGER NOT NULL REFERENCES ue_lists(id),
  usage_example_id INTEGER NOT NULL REFERENCES usage_examples(id),
  PRIMARY KEY (ue_list_id, usage_example_id)
);
CREATE INDEX IF NOT EXISTS idx_ue_part_of_list_ue ON ue_part_of_list(usage_example_id);

INSERT OR IGNORE INTO ue_lists (id, name, type_id) VALUES (1, 'Known Examples', 2);
"#;
