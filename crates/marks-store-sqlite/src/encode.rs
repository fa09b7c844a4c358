//! Encoding and decoding helpers between domain types and the text stored
//! in SQLite columns.
//!
//! Timestamps are RFC 3339 strings; the gradebook is compact JSON.

use chrono::{DateTime, Utc};
use marks_core::gradebook::Gradebook;

use crate::Result;

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

// ─── Gradebook ───────────────────────────────────────────────────────────────

pub fn encode_book(book: &Gradebook) -> Result<String> { Ok(book.to_json()?) }

/// Decode a stored blob, falling back to an empty gradebook when the blob
/// does not match the expected shape.
pub fn decode_book_lossy(raw: &str) -> Gradebook {
  match Gradebook::from_json(raw) {
    Ok(book) => book,
    Err(e) => {
      tracing::warn!("stored gradebook is malformed, starting empty: {e}");
      Gradebook::new()
    }
  }
}
