//! SQLite backend for the marks gradebook.
//!
//! The database is used as a plain key-value store: the full gradebook is
//! one JSON value under a single key. Access goes through [`tokio_rusqlite`]
//! so queries run off the async runtime's worker threads.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{GRADEBOOK_KEY, SqliteStore};

#[cfg(test)]
mod tests;
