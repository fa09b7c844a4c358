//! The per-year aggregate row shown beneath the grid after a save.

use serde::{Deserialize, Serialize};

use crate::{
  grade::{LetterGrade, band_for_score},
  record::CourseRecord,
};

/// Column totals for one year plus the average score and its band.
///
/// `total_score` sums each record's committed `total`, so the row is only
/// meaningful right after a commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
  pub total_credit:     u32,
  /// Pass/fail courses contribute 0.
  pub total_attendance: u32,
  /// Pass/fail courses contribute 0.
  pub total_assignment: u32,
  pub total_midterm:    u32,
  pub total_final:      u32,
  pub total_score:      u32,
  /// `total_score / record count`, rounded to two decimals.
  pub average:          f64,
  pub average_grade:    LetterGrade,
}

impl YearSummary {
  pub fn from_records(records: &[CourseRecord]) -> Self {
    let sum = |f: fn(&CourseRecord) -> u32| records.iter().map(f).sum::<u32>();
    let coursework = |score: u8, r: &CourseRecord| {
      if r.is_pass_fail() { 0 } else { u32::from(score) }
    };

    let total_score = sum(|r| r.total);
    let average = if records.is_empty() {
      0.0
    } else {
      round2(f64::from(total_score) / records.len() as f64)
    };

    Self {
      total_credit: sum(|r| u32::from(r.credit)),
      total_attendance: records.iter().map(|r| coursework(r.attendance, r)).sum(),
      total_assignment: records.iter().map(|r| coursework(r.assignment, r)).sum(),
      total_midterm: sum(|r| u32::from(r.midterm)),
      total_final: sum(|r| u32::from(r.final_exam)),
      total_score,
      average,
      average_grade: band_for_score(average),
    }
  }
}

fn round2(value: f64) -> f64 { (value * 100.0).round() / 100.0 }
