//! rusqlite conversions for row ids and JSON columns.

use std::sync::Arc;

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::{StoreError, StoreResult};
use crate::models::{
  DefinitionId, EntryFormatId, EntryId, ExpressionId, LibraryId, MorphemeId, UeListId, UeTypeId,
  UsageExampleId,
};

macro_rules! sql_row_id {
  ($($name:ident),* $(,)?) => {
    $(
      impl ToSql for $name {
        fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
          Ok(ToSqlOutput::from(self.0))
        }
      }

      impl FromSql for $name {
        fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
          i64::column_result(value).map($name)
        }
      }
    )*
  };
}

sql_row_id!(
  LibraryId,
  EntryId,
  EntryFormatId,
  DefinitionId,
  ExpressionId,
  MorphemeId,
  UsageExampleId,
  UeTypeId,
  UeListId,
);

/// Serializes a value for a JSON text column.
pub(crate) fn to_json<T: Serialize + ?Sized>(column: &'static str, value: &T) -> StoreResult<String> {
  serde_json::to_string(value).map_err(|e| StoreError::Json {
    column,
    source: Arc::new(e),
  })
}

/// Parses a JSON text column.
pub(crate) fn from_json<T: DeserializeOwned>(column: &'static str, text: &str) -> StoreResult<T> {
  serde_json::from_str(text).map_err(|e| StoreError::Json {
    column,
    source: Arc::new(e),
  })
}

/// Parses a nullable JSON text column.
pub(crate) fn from_json_opt<T: DeserializeOwned>(
  column: &'static str,
  text: Option<&str>,
) -> StoreResult<Option<T>> {
  text.map(|text| from_json(column, text)).transpose()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::Extra;
  use rusqlite::Connection;

  #[test]
  fn row_ids_bind_and_read_as_integers() {
    let conn = Connection::open_in_memory().unwrap();
    let id: MorphemeId = conn.query_row("SELECT ?1 + 1", [MorphemeId(41)], |row| row.get(0)).unwrap();
    assert_eq!(id, MorphemeId(42));
  }

  #[test]
  fn json_columns_round_trip_extra() {
    let mut extra = Extra::new();
    extra.insert("note".to_string(), "古語".to_string());
    let text = to_json("extra", &extra).unwrap();
    let parsed: Extra = from_json("extra", &text).unwrap();
    assert_eq!(parsed, extra);
  }

  #[test]
  fn malformed_json_reports_column() {
    let err = from_json::<Extra>("kana_raw", "[1,").unwrap_err();
    assert!(matches!(err, StoreError::Json { column: "kana_raw", .. }));
    assert_eq!(from_json_opt::<Vec<String>>("kana_raw", None).unwrap(), None);
  }
}
