//! Letter grades and the score → grade banding.
//!
//! Normal courses map a 0–100 total through nine descending bands. Pass/fail
//! courses (credit 1) only distinguish `P` from `NP` at 50 points. Every band
//! boundary belongs to the higher band.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Credit value that marks a course as pass/fail.
pub const PASS_FAIL_CREDIT: u8 = 1;

/// Minimum total for a `P` on a pass/fail course.
pub const PASS_THRESHOLD: u32 = 50;

// ─── LetterGrade ─────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
pub enum LetterGrade {
  #[serde(rename = "A+")]
  #[strum(serialize = "A+")]
  APlus,
  #[serde(rename = "A0")]
  #[strum(serialize = "A0")]
  AZero,
  #[serde(rename = "B+")]
  #[strum(serialize = "B+")]
  BPlus,
  #[serde(rename = "B0")]
  #[strum(serialize = "B0")]
  BZero,
  #[serde(rename = "C+")]
  #[strum(serialize = "C+")]
  CPlus,
  #[serde(rename = "C0")]
  #[strum(serialize = "C0")]
  CZero,
  #[serde(rename = "D+")]
  #[strum(serialize = "D+")]
  DPlus,
  #[serde(rename = "D0")]
  #[strum(serialize = "D0")]
  DZero,
  F,
  /// Pass (pass/fail courses only).
  P,
  /// No pass (pass/fail courses only).
  NP,
}

impl LetterGrade {
  /// `F` and `NP` are failing; everything else counts as a passed course.
  pub fn is_failing(self) -> bool { matches!(self, Self::F | Self::NP) }
}

/// Lower bound of each band, highest first. Anything below the last entry is
/// an `F`.
const BANDS: [(u32, LetterGrade); 8] = [
  (96, LetterGrade::APlus),
  (91, LetterGrade::AZero),
  (86, LetterGrade::BPlus),
  (81, LetterGrade::BZero),
  (76, LetterGrade::CPlus),
  (71, LetterGrade::CZero),
  (66, LetterGrade::DPlus),
  (61, LetterGrade::DZero),
];

// ─── Banding ─────────────────────────────────────────────────────────────────

/// Letter grade for a committed record.
pub fn compute_grade(total: u32, credit: u8) -> LetterGrade {
  if credit == PASS_FAIL_CREDIT {
    return if total >= PASS_THRESHOLD {
      LetterGrade::P
    } else {
      LetterGrade::NP
    };
  }
  BANDS
    .iter()
    .find(|(floor, _)| total >= *floor)
    .map(|(_, grade)| *grade)
    .unwrap_or(LetterGrade::F)
}

/// Nine-band grade for a fractional score such as a year average.
///
/// The pass/fail branch is never applied here, even when every course in
/// the year is pass/fail.
pub fn band_for_score(score: f64) -> LetterGrade {
  BANDS
    .iter()
    .find(|(floor, _)| score >= f64::from(*floor))
    .map(|(_, grade)| *grade)
    .unwrap_or(LetterGrade::F)
}
