//! Background lookups with latest-query-wins delivery.
//!
//! Every submitted query takes a fresh generation number and runs on its own thread with
//! its own read-only connection. A result reaches the callback only if no newer query was
//! submitted (or [`AsyncLookup::cancel`] called) while it ran.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::errors::LookupError;
use crate::store::Store;

use super::engine::{LookupEngine, SearchMode};
use super::results::UeResultList;

/// Shared generation counter; only the newest generation is current.
#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

impl Generation {
  /// Starts a new generation and returns its number.
  pub fn advance(&self) -> u64 {
    self.0.fetch_add(1, Ordering::SeqCst) + 1
  }

  /// Newest generation number.
  pub fn current(&self) -> u64 {
    self.0.load(Ordering::SeqCst)
  }

  /// Whether `generation` is still the newest.
  pub fn is_current(&self, generation: u64) -> bool {
    self.current() == generation
  }

  /// Calls `deliver` with `value` when `generation` is current; returns whether it did.
  pub fn deliver_if_current<T>(&self, generation: u64, value: T, deliver: impl FnOnce(T)) -> bool {
    if self.is_current(generation) {
      deliver(value);
      true
    } else {
      debug!(generation, current = self.current(), "Dropping stale lookup result");
      false
    }
  }
}

/// Parameters of one lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
  /// Query text
  pub query: String,
  /// Path to match against
  pub mode: SearchMode,
  /// Page size, default when `None`
  pub limit: Option<usize>,
  /// Rows to skip
  pub offset: usize,
}

impl LookupRequest {
  /// First page of `query` in `mode`.
  pub fn new(query: impl Into<String>, mode: SearchMode) -> Self {
    Self {
      query: query.into(),
      mode,
      limit: None,
      offset: 0,
    }
  }
}

/// Handle to a submitted lookup.
#[derive(Debug)]
pub struct LookupTicket {
  generation: u64,
  handle: JoinHandle<bool>,
}

impl LookupTicket {
  /// Generation the lookup was submitted under.
  pub fn generation(&self) -> u64 {
    self.generation
  }

  /// Waits for the worker; `true` when its result was delivered.
  pub fn join(self) -> bool {
    self.handle.join().unwrap_or_else(|_| {
      warn!(generation = self.generation, "Lookup worker panicked");
      false
    })
  }
}

/// Dispatches lookups against a database file on worker threads.
#[derive(Debug, Clone)]
pub struct AsyncLookup {
  db_path: PathBuf,
  default_limit: usize,
  max_limit: usize,
  generation: Generation,
}

impl AsyncLookup {
  /// Lookups against `db_path` with the given page limits.
  pub fn new(db_path: impl Into<PathBuf>, default_limit: usize, max_limit: usize) -> Self {
    Self {
      db_path: db_path.into(),
      default_limit,
      max_limit,
      generation: Generation::default(),
    }
  }

  /// Database file workers open.
  pub fn db_path(&self) -> &Path {
    &self.db_path
  }

  /// Generation counter shared with the workers.
  pub fn generation(&self) -> &Generation {
    &self.generation
  }

  /// Makes every running lookup stale.
  pub fn cancel(&self) {
    let generation = self.generation.advance();
    debug!(generation, "Pending lookups cancelled");
  }

  /// Runs `request` on a new thread; `on_result` fires only if it is still the newest.
  pub fn submit<F>(&self, request: LookupRequest, on_result: F) -> Result<LookupTicket, LookupError>
  where
    F: FnOnce(Result<UeResultList, LookupError>) + Send + 'static,
  {
    let generation = self.generation.advance();
    let counter = self.generation.clone();
    let db_path = self.db_path.clone();
    let (default_limit, max_limit) = (self.default_limit, self.max_limit);

    let handle = thread::Builder::new()
      .name(format!("yorei-lookup-{generation}"))
      .spawn(move || {
        let result = Store::open_read_only(&db_path).map_err(LookupError::from).and_then(|store| {
          LookupEngine::new(&store, default_limit, max_limit).search(
            &request.query,
            request.mode,
            request.limit,
            request.offset,
          )
        });
        if let Err(e) = &result {
          warn!(generation, query = %request.query, error = %e, "Background lookup failed");
        }
        counter.deliver_if_current(generation, result, on_result)
      })
      .map_err(|e| LookupError::WorkerSpawn(Arc::new(e)))?;

    Ok(LookupTicket { generation, handle })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::mpsc;

  #[test]
  fn only_the_newest_generation_delivers() {
    let generation = Generation::default();
    let first = generation.advance();
    let second = generation.advance();
    assert!(!generation.is_current(first));

    let mut delivered = Vec::new();
    assert!(!generation.deliver_if_current(first, "old", |v| delivered.push(v)));
    assert!(generation.deliver_if_current(second, "new", |v| delivered.push(v)));
    assert_eq!(delivered, vec!["new"]);
  }

  #[test]
  fn cancel_makes_pending_results_stale() {
    let lookup = AsyncLookup::new("unused.sqlite", 10, 50);
    let pending = lookup.generation().advance();
    lookup.cancel();
    assert!(!lookup.generation().is_current(pending));
  }

  #[test]
  fn missing_database_reports_an_error_to_the_callback() {
    let dir = tempfile::tempdir().unwrap();
    let lookup = AsyncLookup::new(dir.path().join("absent.sqlite"), 10, 50);
    let (tx, rx) = mpsc::channel();

    let ticket = lookup
      .submit(LookupRequest::new("猫", SearchMode::Expression), move |result| {
        let _ = tx.send(result.is_err());
      })
      .unwrap();

    assert!(ticket.join());
    assert!(rx.recv().unwrap());
  }
}
