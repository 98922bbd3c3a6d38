//! Store handle: connection lifecycle and transactions.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info};

use crate::errors::{StoreError, StoreResult};
use crate::store::schema::{PRAGMAS, SCHEMA};

/// SQLite-backed store.
///
/// Owns one connection. Writers open with [`Store::open`]; lookup workers open their own
/// handle with [`Store::open_read_only`], which never issues DDL.
pub struct Store {
  pub(crate) conn: Connection,
  path: Option<PathBuf>,
  read_only: bool,
}

impl Store {
  /// Opens (or creates) a store file and initializes the schema.
  pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty() && !p.exists()) {
      std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
        path: parent.to_path_buf(),
        source: Arc::new(e),
      })?;
    }

    let conn = Connection::open(path)?;
    conn.execute_batch(PRAGMAS)?;
    conn.execute_batch(SCHEMA)?;
    info!(path = %path.display(), "Store opened");

    Ok(Self {
      conn,
      path: Some(path.to_path_buf()),
      read_only: false,
    })
  }

  /// Private in-memory store with the schema applied.
  pub fn open_in_memory() -> StoreResult<Self> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    conn.execute_batch(SCHEMA)?;

    Ok(Self {
      conn,
      path: None,
      read_only: false,
    })
  }

  /// Read-only handle on an existing store file.
  pub fn open_read_only(path: impl AsRef<Path>) -> StoreResult<Self> {
    let path = path.as_ref();
    let conn = Connection::open_with_flags(
      path,
      OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI,
    )?;
    debug!(path = %path.display(), "Store opened read-only");

    Ok(Self {
      conn,
      path: Some(path.to_path_buf()),
      read_only: true,
    })
  }

  /// Backing file, `None` for in-memory stores.
  pub fn path(&self) -> Option<&Path> {
    self.path.as_deref()
  }

  /// Whether the handle was opened read-only.
  pub fn is_read_only(&self) -> bool {
    self.read_only
  }

  /// Raw connection, for ad-hoc reads.
  pub fn connection(&self) -> &Connection {
    &self.conn
  }

  // ─── Transactions ─────────────────────────────────────────────────────

  /// `BEGIN`
  pub fn begin(&self) -> StoreResult<()> {
    self.conn.execute_batch("BEGIN")?;
    Ok(())
  }

  /// `COMMIT`
  pub fn commit(&self) -> StoreResult<()> {
    self.conn.execute_batch("COMMIT")?;
    Ok(())
  }

  /// `ROLLBACK`; a no-op outside a transaction.
  pub fn rollback(&self) -> StoreResult<()> {
    if self.in_transaction() {
      self.conn.execute_batch("ROLLBACK")?;
    }
    Ok(())
  }

  /// Whether a transaction is open on this connection.
  pub fn in_transaction(&self) -> bool {
    !self.conn.is_autocommit()
  }
}

impl fmt::Debug for Store {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Store")
      .field("path", &self.path)
      .field("read_only", &self.read_only)
      .field("in_transaction", &self.in_transaction())
      .finish()
  }
}
