//! Core types and rules for the marks gradebook.
//!
//! This crate is free of database and terminal dependencies. It holds the
//! grade formula, the commit/sort/duplicate rules, the constrained field
//! edits, and the session state object driven by the UI.

pub mod error;
pub mod grade;
pub mod gradebook;
pub mod record;
pub mod session;
pub mod store;
pub mod summary;

pub use error::{Error, Result};
