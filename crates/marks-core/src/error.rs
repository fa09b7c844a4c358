//! Error types for `marks-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::record::{Category, Requirement};

#[derive(Debug, Error)]
pub enum Error {
  /// Another record with the same key still holds a passing grade.
  #[error("a course with the same subject already exists (failed courses excepted): {category} / {requirement} / {subject:?}")]
  Duplicate {
    category:    Category,
    requirement: Requirement,
    subject:     String,
  },

  #[error("record not found: {0}")]
  RecordNotFound(Uuid),

  #[error("invalid year: {0} (expected 1, 2 or 3)")]
  InvalidYear(u8),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
