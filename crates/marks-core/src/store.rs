//! The `GradebookStore` trait — the persistent key-value collaborator.
//!
//! The whole gradebook is stored as one serialised blob, read once at
//! startup and rewritten wholesale after each change. Backends live in their
//! own crates (e.g. `marks-store-sqlite`); the CLI depends only on this trait.

use std::future::Future;

use crate::gradebook::Gradebook;

/// Abstraction over a gradebook storage backend.
///
/// Writes are not required to be transactional across calls; a crash
/// between two writes loses at most the latest change.
pub trait GradebookStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Load the stored gradebook.
  ///
  /// An absent or undecodable blob yields an empty gradebook rather than an
  /// error; only backend failures are reported.
  fn load(&self) -> impl Future<Output = Result<Gradebook, Self::Error>> + Send + '_;

  /// Replace the stored gradebook with `book`.
  fn save<'a>(
    &'a self,
    book: &'a Gradebook,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// The stored blob exactly as persisted, if any.
  fn raw_blob(&self) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;
}
