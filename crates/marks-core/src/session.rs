//! Session — the single explicit state object behind the grade grid.
//!
//! Owns the gradebook together with the view state that used to live in
//! scattered UI variables: selected year, selected row, the saved flag, the
//! transient notice raised by a rejected add, and the modal alert raised by a
//! rejected edit.

use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::{
  Error,
  gradebook::{Gradebook, Year},
  record::{CourseRecord, FieldEdit},
  summary::YearSummary,
};

/// How long a notice stays visible unless configured otherwise.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(3);

/// A message that disappears on its own after the session's notice TTL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub message:   String,
  pub raised_at: Instant,
}

#[derive(Debug, Clone)]
pub struct Session {
  book:       Gradebook,
  year:       Year,
  selected:   Option<Uuid>,
  saved:      bool,
  notice:     Option<Notice>,
  alert:      Option<String>,
  notice_ttl: Duration,
}

impl Session {
  /// Start a session on the first year, unsaved, with nothing selected.
  pub fn new(book: Gradebook) -> Self {
    Self {
      book,
      year: Year::default(),
      selected: None,
      saved: false,
      notice: None,
      alert: None,
      notice_ttl: DEFAULT_NOTICE_TTL,
    }
  }

  pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
    self.notice_ttl = ttl;
    self
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub fn book(&self) -> &Gradebook { &self.book }

  pub fn year(&self) -> Year { self.year }

  pub fn selected(&self) -> Option<Uuid> { self.selected }

  /// While `false`, totals, grades, and the aggregate row are stale and
  /// should be shown as a placeholder.
  pub fn is_saved(&self) -> bool { self.saved }

  /// Rows of the current year.
  pub fn records(&self) -> &[CourseRecord] { self.book.records(self.year) }

  /// Aggregate row of the current year, available only after a save.
  pub fn summary(&self) -> Option<YearSummary> {
    self.saved.then(|| self.book.summary(self.year))
  }

  /// The pending notice, if it has not expired by `now`.
  pub fn visible_notice(&self, now: Instant) -> Option<&str> {
    self
      .notice
      .as_ref()
      .filter(|n| now.saturating_duration_since(n.raised_at) < self.notice_ttl)
      .map(|n| n.message.as_str())
  }

  /// The pending modal alert, shown until dismissed.
  pub fn alert(&self) -> Option<&str> { self.alert.as_deref() }

  // ── View state ────────────────────────────────────────────────────────────

  pub fn select_year(&mut self, year: Year) {
    self.year = year;
    self.selected = None;
    self.saved = false;
  }

  /// Select `id`, or clear the selection if it is already selected.
  pub fn toggle_selection(&mut self, id: Uuid) {
    self.selected = if self.selected == Some(id) { None } else { Some(id) };
  }

  pub fn dismiss_alert(&mut self) { self.alert = None; }

  /// Drop an expired notice so the UI can stop polling for it.
  pub fn expire_notice(&mut self, now: Instant) {
    if self.visible_notice(now).is_none() {
      self.notice = None;
    }
  }

  // ── Mutations ─────────────────────────────────────────────────────────────
  //
  // Each returns whether the gradebook changed and needs persisting.

  /// Append a default record to the current year. A duplicate raises a
  /// notice and leaves the gradebook unchanged.
  pub fn add_record(&mut self, now: Instant) -> bool {
    match self.book.add_record(self.year) {
      Ok(_) => {
        self.saved = false;
        true
      }
      Err(e) => {
        tracing::info!(year = %self.year, "add rejected: {e}");
        self.notice = Some(Notice {
          message:   e.to_string(),
          raised_at: now,
        });
        false
      }
    }
  }

  /// Remove the selected record from the current year. No-op without a
  /// selection.
  pub fn delete_selected(&mut self) -> bool {
    let Some(id) = self.selected.take() else {
      return false;
    };
    self.saved = false;
    self.book.remove(self.year, id).is_some()
  }

  /// Apply a field edit to record `id` of the current year. A duplicate
  /// raises the alert and the record keeps its prior value.
  pub fn edit(&mut self, id: Uuid, edit: FieldEdit) -> bool {
    match self.book.edit(self.year, id, edit) {
      Ok(changed) => {
        if changed {
          self.saved = false;
        }
        changed
      }
      Err(e @ Error::Duplicate { .. }) => {
        tracing::info!(%id, "edit rejected: {e}");
        self.alert = Some(e.to_string());
        false
      }
      Err(e) => {
        tracing::warn!(%id, "edit failed: {e}");
        false
      }
    }
  }

  /// Commit the gradebook (totals, grades, sort) and mark the session saved.
  pub fn save(&mut self) {
    self.book.commit();
    self.saved = true;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    grade::LetterGrade,
    record::{Category, Requirement},
  };

  fn fill_algorithms(s: &mut Session, id: Uuid) {
    s.edit(id, FieldEdit::Category(Category::Major));
    s.edit(id, FieldEdit::Requirement(Requirement::Required));
    s.edit(id, FieldEdit::Subject("Algorithms".into()));
    s.edit(id, FieldEdit::Credit(3));
    s.edit(id, FieldEdit::Attendance(18));
    s.edit(id, FieldEdit::Assignment(19));
    s.edit(id, FieldEdit::Midterm(28));
    s.edit(id, FieldEdit::Final(29));
  }

  fn last_id(s: &Session) -> Uuid { s.records().last().unwrap().id }

  #[test]
  fn algorithms_scenario() {
    let now = Instant::now();
    let mut s = Session::new(Gradebook::new());
    assert!(s.add_record(now));
    let id = last_id(&s);
    fill_algorithms(&mut s, id);

    assert!(!s.is_saved());
    assert!(s.summary().is_none());

    s.save();
    let r = &s.records()[0];
    assert_eq!(r.total, 94);
    assert_eq!(r.grade, Some(LetterGrade::AZero));
    assert!(s.summary().is_some());

    // A second Algorithms record is rejected while the first holds an A0.
    assert!(s.add_record(now));
    let second = last_id(&s);
    s.edit(second, FieldEdit::Category(Category::Major));
    s.edit(second, FieldEdit::Requirement(Requirement::Required));
    assert!(!s.edit(second, FieldEdit::Subject("Algorithms".into())));
    assert!(s.alert().is_some());
    assert_eq!(s.records().len(), 2);
    assert_eq!(s.book().find(s.year(), second).unwrap().subject, "");
  }

  #[test]
  fn duplicate_add_raises_transient_notice() {
    let now = Instant::now();
    let mut s = Session::new(Gradebook::new());
    assert!(s.add_record(now));
    assert!(!s.add_record(now));
    assert_eq!(s.records().len(), 1);

    assert!(s.visible_notice(now).is_some());
    assert!(s.visible_notice(now + DEFAULT_NOTICE_TTL).is_none());

    s.expire_notice(now + DEFAULT_NOTICE_TTL);
    assert!(s.visible_notice(now).is_none());
  }

  #[test]
  fn notice_ttl_is_configurable() {
    let now = Instant::now();
    let mut s = Session::new(Gradebook::new()).with_notice_ttl(Duration::from_secs(10));
    s.add_record(now);
    s.add_record(now);
    assert!(s.visible_notice(now + Duration::from_secs(5)).is_some());
  }

  #[test]
  fn saved_flag_resets_on_every_change() {
    let now = Instant::now();
    let mut s = Session::new(Gradebook::new());
    s.add_record(now);
    let id = last_id(&s);

    s.save();
    s.edit(id, FieldEdit::Credit(2));
    assert!(!s.is_saved());

    s.save();
    s.select_year(Year::Second);
    assert!(!s.is_saved());

    s.select_year(Year::First);
    s.save();
    s.toggle_selection(id);
    assert!(s.delete_selected());
    assert!(!s.is_saved());
    assert!(s.records().is_empty());
  }

  #[test]
  fn noop_edit_keeps_saved_flag() {
    let mut s = Session::new(Gradebook::new());
    s.add_record(Instant::now());
    let id = last_id(&s);
    s.save();
    assert!(!s.edit(id, FieldEdit::Midterm(0)));
    assert!(s.is_saved());
  }

  #[test]
  fn selection_toggles_and_clears_on_year_switch() {
    let mut s = Session::new(Gradebook::new());
    s.add_record(Instant::now());
    let id = last_id(&s);

    s.toggle_selection(id);
    assert_eq!(s.selected(), Some(id));
    s.toggle_selection(id);
    assert_eq!(s.selected(), None);

    s.toggle_selection(id);
    s.select_year(Year::Third);
    assert_eq!(s.selected(), None);
    assert!(!s.delete_selected());
  }

  #[test]
  fn dismissing_the_alert_clears_it() {
    let mut s = Session::new(Gradebook::new());
    s.add_record(Instant::now());
    let first = last_id(&s);
    s.edit(first, FieldEdit::Subject("Ethics".into()));
    s.add_record(Instant::now());
    let second = last_id(&s);
    s.edit(second, FieldEdit::Subject("Ethics".into()));
    assert!(s.alert().is_some());
    s.dismiss_alert();
    assert!(s.alert().is_none());
  }
}
