//! SQLite backend for the ministry record store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The database is a plain key-value
//! table; collections are opaque JSON documents to this crate.

mod path;
mod schema;
mod storage;

pub mod error;

pub use error::{Error, Result};
pub use path::expand_tilde;
pub use storage::SqliteStorage;

#[cfg(test)]
mod tests;
