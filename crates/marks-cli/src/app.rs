//! Application state machine and event dispatcher.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use marks_core::{
  gradebook::Year,
  record::{CourseRecord, FieldEdit},
  session::Session,
  store::GradebookStore,
};
use uuid::Uuid;

// ─── Column ───────────────────────────────────────────────────────────────────

/// The editable columns of the grid, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
  Category,
  Requirement,
  Subject,
  Credit,
  Attendance,
  Assignment,
  Midterm,
  Final,
}

impl Column {
  pub const ALL: [Column; 8] = [
    Column::Category,
    Column::Requirement,
    Column::Subject,
    Column::Credit,
    Column::Attendance,
    Column::Assignment,
    Column::Midterm,
    Column::Final,
  ];

  pub fn index(self) -> usize {
    Self::ALL.iter().position(|c| *c == self).unwrap_or_default()
  }

  pub fn next(self) -> Self { Self::ALL[(self.index() + 1).min(Self::ALL.len() - 1)] }

  pub fn prev(self) -> Self { Self::ALL[self.index().saturating_sub(1)] }

  pub fn is_numeric(self) -> bool {
    !matches!(self, Self::Category | Self::Requirement | Self::Subject)
  }

  /// Attendance and assignment are disabled on pass/fail courses.
  pub fn is_enabled(self, record: &CourseRecord) -> bool {
    !(record.is_pass_fail() && matches!(self, Self::Attendance | Self::Assignment))
  }

  /// Current cell text for `record`.
  pub fn value(self, record: &CourseRecord) -> String {
    match self {
      Self::Category => record.category.to_string(),
      Self::Requirement => record.requirement.to_string(),
      Self::Subject => record.subject.clone(),
      Self::Credit => record.credit.to_string(),
      Self::Attendance => record.attendance.to_string(),
      Self::Assignment => record.assignment.to_string(),
      Self::Midterm => record.midterm.to_string(),
      Self::Final => record.final_exam.to_string(),
    }
  }

  /// Build the edit for a numeric column from raw input.
  fn numeric_edit(self, value: i64) -> Option<FieldEdit> {
    match self {
      Self::Credit => Some(FieldEdit::Credit(value)),
      Self::Attendance => Some(FieldEdit::Attendance(value)),
      Self::Assignment => Some(FieldEdit::Assignment(value)),
      Self::Midterm => Some(FieldEdit::Midterm(value)),
      Self::Final => Some(FieldEdit::Final(value)),
      Self::Category | Self::Requirement | Self::Subject => None,
    }
  }
}

/// Parse a numeric cell. Empty input is 0; overflow saturates so the record
/// clamps it to the column ceiling.
pub fn parse_number(input: &str) -> i64 {
  let trimmed = input.trim();
  if trimmed.is_empty() {
    return 0;
  }
  trimmed.parse().unwrap_or(if trimmed.starts_with('-') { 0 } else { i64::MAX })
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<S> {
  /// Gradebook plus year, selection, saved flag, notice and alert.
  pub session: Session,

  /// Cursor row within the current year.
  pub row_cursor: usize,

  /// Cursor column.
  pub column: Column,

  /// Text being typed into the cursor cell, while editing.
  pub input: Option<String>,

  /// One-line status message (storage failures).
  pub status_msg: String,

  /// Write after every change rather than on save and quit.
  pub autosave: bool,

  pub store: S,
}

impl<S: GradebookStore> App<S> {
  pub fn new(store: S, session: Session, autosave: bool) -> Self {
    Self {
      session,
      row_cursor: 0,
      column: Column::Category,
      input: None,
      status_msg: String::new(),
      autosave,
      store,
    }
  }

  /// The record under the cursor, if the year has any rows.
  pub fn cursor_record(&self) -> Option<&CourseRecord> {
    self.session.records().get(self.row_cursor)
  }

  fn cursor_id(&self) -> Option<Uuid> { self.cursor_record().map(|r| r.id) }

  // ── Persistence ───────────────────────────────────────────────────────────

  /// Write the gradebook. Failures are reported in the status bar only.
  pub async fn persist(&mut self) {
    match self.store.save(self.session.book()).await {
      Ok(()) => {
        if !self.status_msg.is_empty() {
          self.status_msg.clear();
        }
      }
      Err(e) => {
        tracing::warn!("failed to persist gradebook: {e}");
        self.status_msg = format!("Error: {e}");
      }
    }
  }

  async fn changed(&mut self) {
    if self.autosave {
      self.persist().await;
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return self.quit().await;
    }

    // The alert is modal.
    if self.session.alert().is_some() {
      if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
        self.session.dismiss_alert();
      }
      return Ok(true);
    }

    if self.input.is_some() {
      self.handle_input_key(key).await;
      return Ok(true);
    }

    self.handle_grid_key(key).await
  }

  async fn quit(&mut self) -> anyhow::Result<bool> {
    if !self.autosave {
      self.persist().await;
    }
    Ok(false)
  }

  async fn handle_grid_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return self.quit().await,

      // Year selector
      KeyCode::Char(c @ '1'..='3') => {
        let n = c as u8 - b'0';
        if let Ok(year) = Year::try_from(n) {
          self.switch_year(year);
        }
      }
      KeyCode::Tab => self.switch_year(self.session.year().next()),

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        if self.row_cursor + 1 < self.session.records().len() {
          self.row_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.row_cursor = self.row_cursor.saturating_sub(1);
      }
      KeyCode::Right | KeyCode::Char('l') => self.column = self.column.next(),
      KeyCode::Left | KeyCode::Char('h') => self.column = self.column.prev(),

      // Row selection
      KeyCode::Char(' ') => {
        if let Some(id) = self.cursor_id() {
          self.session.toggle_selection(id);
        }
      }

      // Add / delete / save
      KeyCode::Char('a') => {
        if self.session.add_record(Instant::now()) {
          self.row_cursor = self.session.records().len().saturating_sub(1);
          self.changed().await;
        }
      }
      KeyCode::Char('d') | KeyCode::Delete => {
        if self.session.delete_selected() {
          self.clamp_cursor();
          self.changed().await;
        }
      }
      KeyCode::Char('s') => self.save().await,

      // Editing
      KeyCode::Enter => self.begin_edit().await,
      KeyCode::Char('+') | KeyCode::Char('=') => self.step(1).await,
      KeyCode::Char('-') => self.step(-1).await,

      _ => {}
    }
    Ok(true)
  }

  async fn handle_input_key(&mut self, key: KeyEvent) {
    let numeric = self.column.is_numeric();
    let Some(buffer) = self.input.as_mut() else {
      return;
    };
    match key.code {
      KeyCode::Esc => self.input = None,
      KeyCode::Enter => {
        let text = self.input.take().unwrap_or_default();
        let edit = if numeric {
          self.column.numeric_edit(parse_number(&text))
        } else {
          Some(FieldEdit::Subject(text))
        };
        if let Some(edit) = edit {
          self.apply(edit).await;
        }
      }
      KeyCode::Backspace => {
        buffer.pop();
      }
      KeyCode::Char(c) if !numeric || c.is_ascii_digit() || (c == '-' && buffer.is_empty()) => {
        buffer.push(c);
      }
      _ => {}
    }
  }

  // ── Actions ───────────────────────────────────────────────────────────────

  fn switch_year(&mut self, year: Year) {
    self.session.select_year(year);
    self.row_cursor = 0;
    self.input = None;
  }

  /// Commit, keeping the cursor on the same record after the sort.
  async fn save(&mut self) {
    let focused = self.cursor_id();
    self.session.save();
    if let Some(id) = focused
      && let Some(idx) = self.session.records().iter().position(|r| r.id == id)
    {
      self.row_cursor = idx;
    }
    tracing::info!(year = %self.session.year(), "gradebook saved");
    self.persist().await;
  }

  /// Start editing the cursor cell. Select cells flip immediately.
  async fn begin_edit(&mut self) {
    let Some(record) = self.cursor_record() else {
      return;
    };
    if !self.column.is_enabled(record) {
      return;
    }
    match self.column {
      Column::Category => {
        let edit = FieldEdit::Category(record.category.toggled());
        self.apply(edit).await;
      }
      Column::Requirement => {
        let edit = FieldEdit::Requirement(record.requirement.toggled());
        self.apply(edit).await;
      }
      column => self.input = Some(column.value(record)),
    }
  }

  /// Nudge a numeric cell by `delta`.
  async fn step(&mut self, delta: i64) {
    let Some(record) = self.cursor_record() else {
      return;
    };
    if !self.column.is_numeric() || !self.column.is_enabled(record) {
      return;
    }
    let current = parse_number(&self.column.value(record));
    if let Some(edit) = self.column.numeric_edit(current + delta) {
      self.apply(edit).await;
    }
  }

  async fn apply(&mut self, edit: FieldEdit) {
    let Some(id) = self.cursor_id() else {
      return;
    };
    tracing::debug!(%id, ?edit, "applying edit");
    if self.session.edit(id, edit) {
      self.changed().await;
    }
  }

  fn clamp_cursor(&mut self) {
    let len = self.session.records().len();
    if self.row_cursor >= len {
      self.row_cursor = len.saturating_sub(1);
    }
  }
}

#[cfg(test)]
mod tests {
  use marks_core::{
    grade::LetterGrade,
    gradebook::Gradebook,
    record::{Category, Requirement},
  };
  use marks_store_sqlite::SqliteStore;

  use super::*;

  async fn app(autosave: bool) -> App<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    App::new(store, Session::new(Gradebook::new()), autosave)
  }

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  async fn press(app: &mut App<SqliteStore>, codes: &[KeyCode]) {
    for code in codes {
      assert!(app.handle_key(key(*code)).await.unwrap());
    }
  }

  async fn type_text(app: &mut App<SqliteStore>, text: &str) {
    for c in text.chars() {
      press(app, &[KeyCode::Char(c)]).await;
    }
  }

  /// Move to `column` and enter `value` into it.
  async fn fill(app: &mut App<SqliteStore>, column: Column, value: &str) {
    app.column = column;
    press(app, &[KeyCode::Enter]).await;
    let len = app.input.as_ref().map(String::len).unwrap_or_default();
    for _ in 0..len {
      press(app, &[KeyCode::Backspace]).await;
    }
    type_text(app, value).await;
    press(app, &[KeyCode::Enter]).await;
  }

  #[test]
  fn parse_number_handles_odd_input() {
    assert_eq!(parse_number(""), 0);
    assert_eq!(parse_number("17"), 17);
    assert_eq!(parse_number("-"), 0);
    assert_eq!(parse_number("99999999999999999999999"), i64::MAX);
  }

  #[tokio::test]
  async fn algorithms_through_the_grid() {
    let mut app = app(true).await;
    press(&mut app, &[KeyCode::Char('a')]).await;
    assert_eq!(app.session.records().len(), 1);

    app.column = Column::Category;
    press(&mut app, &[KeyCode::Enter]).await;
    app.column = Column::Requirement;
    press(&mut app, &[KeyCode::Enter]).await;
    fill(&mut app, Column::Subject, "Algorithms").await;
    fill(&mut app, Column::Credit, "3").await;
    fill(&mut app, Column::Attendance, "18").await;
    fill(&mut app, Column::Assignment, "19").await;
    fill(&mut app, Column::Midterm, "28").await;
    fill(&mut app, Column::Final, "29").await;

    let r = app.cursor_record().unwrap();
    assert_eq!(r.category, Category::Major);
    assert_eq!(r.requirement, Requirement::Required);
    assert!(!app.session.is_saved());

    press(&mut app, &[KeyCode::Char('s')]).await;
    let r = app.cursor_record().unwrap();
    assert_eq!(r.total, 94);
    assert_eq!(r.grade, Some(LetterGrade::AZero));

    let stored = app.store.load().await.unwrap();
    assert_eq!(&stored, app.session.book());
  }

  #[tokio::test]
  async fn typed_scores_are_clamped() {
    let mut app = app(true).await;
    press(&mut app, &[KeyCode::Char('a')]).await;
    fill(&mut app, Column::Credit, "3").await;
    fill(&mut app, Column::Midterm, "45").await;
    assert_eq!(app.cursor_record().unwrap().midterm, 30);

    app.column = Column::Midterm;
    press(&mut app, &[KeyCode::Char('+')]).await;
    assert_eq!(app.cursor_record().unwrap().midterm, 30);
    press(&mut app, &[KeyCode::Char('-')]).await;
    assert_eq!(app.cursor_record().unwrap().midterm, 29);
  }

  #[tokio::test]
  async fn pass_fail_disables_coursework_cells() {
    let mut app = app(true).await;
    press(&mut app, &[KeyCode::Char('a')]).await;
    fill(&mut app, Column::Attendance, "12").await;
    fill(&mut app, Column::Credit, "1").await;
    assert_eq!(app.cursor_record().unwrap().attendance, 0);

    app.column = Column::Attendance;
    press(&mut app, &[KeyCode::Enter]).await;
    assert!(app.input.is_none());
  }

  #[tokio::test]
  async fn duplicate_add_leaves_year_unchanged() {
    let mut app = app(true).await;
    press(&mut app, &[KeyCode::Char('a'), KeyCode::Char('a')]).await;
    assert_eq!(app.session.records().len(), 1);
    assert!(app.session.visible_notice(Instant::now()).is_some());
  }

  #[tokio::test]
  async fn duplicate_edit_shows_modal_alert() {
    let mut app = app(true).await;
    press(&mut app, &[KeyCode::Char('a')]).await;
    fill(&mut app, Column::Subject, "Ethics").await;
    press(&mut app, &[KeyCode::Char('a')]).await;
    fill(&mut app, Column::Subject, "Ethics").await;

    assert!(app.session.alert().is_some());
    assert_eq!(app.cursor_record().unwrap().subject, "");

    // Keys other than dismissal are swallowed while the alert is up.
    press(&mut app, &[KeyCode::Char('a')]).await;
    assert_eq!(app.session.records().len(), 2);
    press(&mut app, &[KeyCode::Esc]).await;
    assert!(app.session.alert().is_none());
  }

  #[tokio::test]
  async fn delete_selected_row() {
    let mut app = app(true).await;
    press(&mut app, &[KeyCode::Char('a')]).await;
    fill(&mut app, Column::Subject, "Ethics").await;
    press(&mut app, &[KeyCode::Char('a')]).await;

    // Nothing selected: delete is a no-op.
    press(&mut app, &[KeyCode::Char('d')]).await;
    assert_eq!(app.session.records().len(), 2);

    press(&mut app, &[KeyCode::Char(' '), KeyCode::Char('d')]).await;
    assert_eq!(app.session.records().len(), 1);
    assert_eq!(app.row_cursor, 0);
    assert_eq!(app.store.load().await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn year_switch_resets_cursor_and_saved() {
    let mut app = app(true).await;
    press(&mut app, &[KeyCode::Char('a'), KeyCode::Char('s')]).await;
    assert!(app.session.is_saved());

    press(&mut app, &[KeyCode::Char('2')]).await;
    assert_eq!(app.session.year(), Year::Second);
    assert!(!app.session.is_saved());
    assert!(app.session.records().is_empty());

    press(&mut app, &[KeyCode::Tab]).await;
    assert_eq!(app.session.year(), Year::Third);
  }

  #[tokio::test]
  async fn without_autosave_writes_on_save_and_quit() {
    let mut app = app(false).await;
    press(&mut app, &[KeyCode::Char('a')]).await;
    assert!(app.store.raw_blob().await.unwrap().is_none());

    press(&mut app, &[KeyCode::Char('s')]).await;
    assert_eq!(app.store.load().await.unwrap().len(), 1);

    fill(&mut app, Column::Subject, "Ethics").await;
    assert!(!app.handle_key(key(KeyCode::Char('q'))).await.unwrap());
    let stored = app.store.load().await.unwrap();
    assert_eq!(stored.all_records().next().unwrap().subject, "Ethics");
  }

  #[tokio::test]
  async fn escape_cancels_typing() {
    let mut app = app(true).await;
    press(&mut app, &[KeyCode::Char('a')]).await;
    app.column = Column::Subject;
    press(&mut app, &[KeyCode::Enter]).await;
    type_text(&mut app, "Draft").await;
    press(&mut app, &[KeyCode::Esc]).await;
    assert!(app.input.is_none());
    assert_eq!(app.cursor_record().unwrap().subject, "");
  }

  #[tokio::test]
  async fn app_owns_its_store() {
    let mut app = app(true).await;
    press(&mut app, &[KeyCode::Char('a')]).await;

    let App { store, .. } = app;
    assert_eq!(store.load().await.unwrap().len(), 1);
  }
}
