//! Course records and the constrained field edits that mutate them.
//!
//! A record's `total` and `grade` are derived values. They are only written
//! by [`Gradebook::commit`](crate::gradebook::Gradebook::commit) and are
//! stale between an edit and the next commit.

use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use crate::grade::{LetterGrade, PASS_FAIL_CREDIT};

/// Highest credit a course can carry.
pub const MAX_CREDIT: u8 = 4;
/// Ceiling for attendance and assignment scores.
pub const COURSEWORK_MAX: u8 = 20;
/// Ceiling for midterm and final scores on a normal course.
pub const EXAM_MAX: u8 = 30;
/// Ceiling for midterm and final scores on a pass/fail course.
pub const PASS_FAIL_EXAM_MAX: u8 = 50;

// ─── Classification ──────────────────────────────────────────────────────────

/// Whether a course counts toward the major.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Major,
  #[default]
  Elective,
}

impl Category {
  /// The other variant; used by the grid to flip a select cell.
  pub fn toggled(self) -> Self {
    match self {
      Self::Major => Self::Elective,
      Self::Elective => Self::Major,
    }
  }
}

/// Whether a course is mandatory within its category.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
  Required,
  #[default]
  Optional,
}

impl Requirement {
  pub fn toggled(self) -> Self {
    match self {
      Self::Required => Self::Optional,
      Self::Optional => Self::Required,
    }
  }
}

// ─── CourseRecord ────────────────────────────────────────────────────────────

/// One row of the gradebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
  pub id:          Uuid,
  pub category:    Category,
  pub requirement: Requirement,
  pub subject:     String,
  /// `1` marks a pass/fail course.
  pub credit:      u8,
  pub attendance:  u8,
  pub assignment:  u8,
  pub midterm:     u8,
  #[serde(rename = "final")]
  pub final_exam:  u8,
  /// Sum of the four scores as of the last commit.
  #[serde(default)]
  pub total:       u32,
  /// Grade as of the last commit; `None` until the record is first committed.
  #[serde(default)]
  pub grade:       Option<LetterGrade>,
}

impl CourseRecord {
  /// A fresh record with a new id and the default field values
  /// (Elective, Optional, empty subject, zero credit and scores).
  pub fn new() -> Self { Self::with_id(Uuid::new_v4()) }

  pub fn with_id(id: Uuid) -> Self {
    Self {
      id,
      category: Category::default(),
      requirement: Requirement::default(),
      subject: String::new(),
      credit: 0,
      attendance: 0,
      assignment: 0,
      midterm: 0,
      final_exam: 0,
      total: 0,
      grade: None,
    }
  }

  pub fn is_pass_fail(&self) -> bool { self.credit == PASS_FAIL_CREDIT }

  /// Ceiling for midterm and final under the record's current credit.
  pub fn exam_max(&self) -> u8 {
    if self.is_pass_fail() {
      PASS_FAIL_EXAM_MAX
    } else {
      EXAM_MAX
    }
  }

  /// Sum of the four stored score fields, disabled ones included.
  pub fn score_sum(&self) -> u32 {
    [self.attendance, self.assignment, self.midterm, self.final_exam]
      .into_iter()
      .map(u32::from)
      .sum()
  }

  /// Whether `self` and `other` name the same course.
  pub fn same_course(&self, other: &CourseRecord) -> bool {
    self.category == other.category
      && self.requirement == other.requirement
      && self.subject == other.subject
  }

  /// A record blocks duplicates unless it has already failed. A record that
  /// was never committed has no grade and therefore blocks.
  pub fn blocks_duplicates(&self) -> bool {
    !self.grade.is_some_and(LetterGrade::is_failing)
  }

  /// Apply one constrained edit. Numeric input is clamped into range.
  ///
  /// Attendance and assignment edits are ignored on a pass/fail course,
  /// matching the disabled input. Returns `true` if any field changed.
  pub fn apply(&mut self, edit: FieldEdit) -> bool {
    let before = self.clone();
    match edit {
      FieldEdit::Category(c) => self.category = c,
      FieldEdit::Requirement(r) => self.requirement = r,
      FieldEdit::Subject(s) => self.subject = s,
      FieldEdit::Credit(v) => {
        self.credit = clamp(v, MAX_CREDIT);
        // Stored exam scores are not re-clamped to the new ceiling.
        self.attendance = 0;
        self.assignment = 0;
      }
      FieldEdit::Attendance(v) => {
        if !self.is_pass_fail() {
          self.attendance = clamp(v, COURSEWORK_MAX);
        }
      }
      FieldEdit::Assignment(v) => {
        if !self.is_pass_fail() {
          self.assignment = clamp(v, COURSEWORK_MAX);
        }
      }
      FieldEdit::Midterm(v) => self.midterm = clamp(v, self.exam_max()),
      FieldEdit::Final(v) => self.final_exam = clamp(v, self.exam_max()),
    }
    *self != before
  }
}

impl Default for CourseRecord {
  fn default() -> Self { Self::new() }
}

fn clamp(value: i64, max: u8) -> u8 {
  // Lossless: the clamped value fits in `max`.
  value.clamp(0, i64::from(max)) as u8
}

// ─── Ordering ────────────────────────────────────────────────────────────────

/// Row order within a year: Major before Elective, Required before Optional,
/// then subject text ascending.
pub fn compare_records(a: &CourseRecord, b: &CourseRecord) -> Ordering {
  a.category
    .cmp(&b.category)
    .then(a.requirement.cmp(&b.requirement))
    .then_with(|| compare_subjects(&a.subject, &b.subject))
}

thread_local! {
  static COLLATOR: Option<Collator> =
    Collator::try_new(&Default::default(), CollatorOptions::new())
      .inspect_err(|e| tracing::warn!("root collation unavailable, sorting by code point: {e}"))
      .ok();
}

/// Root-locale collation order, falling back to the raw text so distinct
/// strings never compare equal.
pub fn compare_subjects(a: &str, b: &str) -> Ordering {
  let collated = COLLATOR.with(|collator| {
    collator
      .as_ref()
      .map_or(Ordering::Equal, |c| c.compare(a, b))
  });
  collated.then_with(|| a.cmp(b))
}

// ─── FieldEdit ───────────────────────────────────────────────────────────────

/// A single-field edit coming from the grid. Numeric variants carry raw user
/// input; [`CourseRecord::apply`] clamps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
  Category(Category),
  Requirement(Requirement),
  Subject(String),
  Credit(i64),
  Attendance(i64),
  Assignment(i64),
  Midterm(i64),
  Final(i64),
}

impl FieldEdit {
  /// Edits that change the record's identity and need a duplicate check.
  pub fn touches_identity(&self) -> bool {
    matches!(
      self,
      Self::Category(_) | Self::Requirement(_) | Self::Subject(_)
    )
  }
}
