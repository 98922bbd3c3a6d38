//! Config module

mod constants;
mod env;

pub use constants::{DEFAULT_BIND_ADDR, DEFAULT_DB_PATH, DEFAULT_LIMIT, MAX_LIMIT, MAX_QUERY_LENGTH};
pub use env::Config;
