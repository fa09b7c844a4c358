//! The gradebook: three academic years of course records.
//!
//! Mutations go through [`Gradebook::add_record`], [`Gradebook::edit`] and
//! [`Gradebook::remove`], which enforce the duplicate rule at mutation time.
//! Data loaded from storage is not re-validated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  grade::compute_grade,
  record::{CourseRecord, FieldEdit, compare_records},
  summary::YearSummary,
};

// ─── Year ────────────────────────────────────────────────────────────────────

/// An academic year. Serialised as its number so the blob reads
/// `{"1": [...], "2": [...], "3": [...]}`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Year {
  #[default]
  First,
  Second,
  Third,
}

impl Year {
  pub const ALL: [Year; 3] = [Year::First, Year::Second, Year::Third];

  pub fn number(self) -> u8 {
    match self {
      Self::First => 1,
      Self::Second => 2,
      Self::Third => 3,
    }
  }

  /// The following year, wrapping from the third back to the first.
  pub fn next(self) -> Self {
    match self {
      Self::First => Self::Second,
      Self::Second => Self::Third,
      Self::Third => Self::First,
    }
  }
}

impl TryFrom<u8> for Year {
  type Error = Error;

  fn try_from(n: u8) -> Result<Self> {
    match n {
      1 => Ok(Self::First),
      2 => Ok(Self::Second),
      3 => Ok(Self::Third),
      other => Err(Error::InvalidYear(other)),
    }
  }
}

impl From<Year> for u8 {
  fn from(year: Year) -> u8 { year.number() }
}

impl std::fmt::Display for Year {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.number())
  }
}

// ─── Duplicate check ─────────────────────────────────────────────────────────

/// Whether `candidate` collides with a record in `records` that still has a
/// passing (or no) grade. The record with id `exclude` is ignored, so an
/// edited record never collides with itself.
pub fn is_duplicate<'a>(
  candidate: &CourseRecord,
  records: impl IntoIterator<Item = &'a CourseRecord>,
  exclude: Option<Uuid>,
) -> bool {
  records.into_iter().any(|r| {
    Some(r.id) != exclude && r.same_course(candidate) && r.blocks_duplicates()
  })
}

// ─── Gradebook ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gradebook {
  years: BTreeMap<Year, Vec<CourseRecord>>,
}

impl Default for Gradebook {
  fn default() -> Self {
    Self {
      years: Year::ALL.into_iter().map(|y| (y, Vec::new())).collect(),
    }
  }
}

impl Gradebook {
  /// An empty gradebook with all three years present.
  pub fn new() -> Self { Self::default() }

  /// Decode a persisted blob. Missing years are filled in as empty.
  pub fn from_json(raw: &str) -> Result<Self> {
    let mut book: Self = serde_json::from_str(raw)?;
    for year in Year::ALL {
      book.years.entry(year).or_default();
    }
    Ok(book)
  }

  pub fn to_json(&self) -> Result<String> { Ok(serde_json::to_string(self)?) }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub fn records(&self, year: Year) -> &[CourseRecord] {
    self.years.get(&year).map(Vec::as_slice).unwrap_or_default()
  }

  /// Every record across all years.
  pub fn all_records(&self) -> impl Iterator<Item = &CourseRecord> {
    self.years.values().flatten()
  }

  pub fn find(&self, year: Year, id: Uuid) -> Option<&CourseRecord> {
    self.records(year).iter().find(|r| r.id == id)
  }

  pub fn len(&self) -> usize { self.years.values().map(Vec::len).sum() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  /// Aggregate row for `year`.
  pub fn summary(&self, year: Year) -> YearSummary {
    YearSummary::from_records(self.records(year))
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  /// Append a default record to `year` and return its id.
  ///
  /// Fails with [`Error::Duplicate`] when a default-looking record (Elective,
  /// Optional, empty subject) that has not failed already exists anywhere.
  pub fn add_record(&mut self, year: Year) -> Result<Uuid> {
    self.insert(year, CourseRecord::new())
  }

  /// Append `record` to `year` after the duplicate check.
  pub fn insert(&mut self, year: Year, record: CourseRecord) -> Result<Uuid> {
    if is_duplicate(&record, self.all_records(), None) {
      return Err(duplicate_error(&record));
    }
    let id = record.id;
    self.years.entry(year).or_default().push(record);
    tracing::debug!(%year, %id, "record added");
    Ok(id)
  }

  /// Remove a record from `year`, returning it if it was present.
  pub fn remove(&mut self, year: Year, id: Uuid) -> Option<CourseRecord> {
    let rows = self.years.get_mut(&year)?;
    let idx = rows.iter().position(|r| r.id == id)?;
    tracing::debug!(%year, %id, "record removed");
    Some(rows.remove(idx))
  }

  /// Apply a field edit to record `id` in `year`.
  ///
  /// Identity edits (category, requirement, subject) are rejected with
  /// [`Error::Duplicate`] when they would collide with another passing record;
  /// the stored record is then left untouched. Returns whether anything
  /// changed.
  pub fn edit(&mut self, year: Year, id: Uuid, edit: FieldEdit) -> Result<bool> {
    let current = self.find(year, id).ok_or(Error::RecordNotFound(id))?;

    let mut updated = current.clone();
    let identity = edit.touches_identity();
    if !updated.apply(edit) {
      return Ok(false);
    }

    if identity && is_duplicate(&updated, self.all_records(), Some(id)) {
      return Err(duplicate_error(&updated));
    }

    if let Some(slot) = self
      .years
      .get_mut(&year)
      .and_then(|rows| rows.iter_mut().find(|r| r.id == id))
    {
      *slot = updated;
    }
    Ok(true)
  }

  /// Recompute every record's total and grade, then sort each year.
  ///
  /// Idempotent: committing twice without edits in between yields the same
  /// gradebook.
  pub fn commit(&mut self) {
    for rows in self.years.values_mut() {
      for record in rows.iter_mut() {
        record.total = record.score_sum();
        record.grade = Some(compute_grade(record.total, record.credit));
      }
      rows.sort_by(compare_records);
    }
    tracing::debug!(records = self.len(), "gradebook committed");
  }

  /// Consuming form of [`Gradebook::commit`].
  pub fn committed(mut self) -> Self {
    self.commit();
    self
  }
}

fn duplicate_error(record: &CourseRecord) -> Error {
  Error::Duplicate {
    category:    record.category,
    requirement: record.requirement,
    subject:     record.subject.clone(),
  }
}
