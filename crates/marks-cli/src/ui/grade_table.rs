//! Grade grid — one row per course plus the aggregate row.

use marks_core::{grade::LetterGrade, record::CourseRecord};
use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Cell, Row, Table, TableState},
};

use crate::app::{App, Column};

/// Shown instead of derived values until the year is saved.
const PLACEHOLDER: &str = "-";

const HEADERS: [&str; 11] = [
  "Category", "Req.", "Subject", "Credit", "Attend.", "Assign.", "Midterm", "Final", "Total",
  "Avg", "Grade",
];

const WIDTHS: [Constraint; 11] = [
  Constraint::Length(9),
  Constraint::Length(9),
  Constraint::Min(16),
  Constraint::Length(6),
  Constraint::Length(7),
  Constraint::Length(7),
  Constraint::Length(7),
  Constraint::Length(6),
  Constraint::Length(6),
  Constraint::Length(7),
  Constraint::Length(6),
];

/// Render the grid into `area`.
pub fn draw<S>(f: &mut Frame, area: Rect, app: &App<S>) {
  let session = &app.session;
  let records = session.records();

  let title = format!(
    " Year {} ({} courses){} ",
    session.year(),
    records.len(),
    if session.is_saved() { "" } else { "  unsaved" }
  );
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let header = Row::new(HEADERS.iter().map(|h| Cell::from(*h))).style(
    Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );

  let mut rows: Vec<Row> = records
    .iter()
    .enumerate()
    .map(|(i, record)| record_row(app, i, record))
    .collect();
  rows.push(summary_row(app));

  let mut state = TableState::default();
  state.select(if records.is_empty() {
    None
  } else {
    Some(app.row_cursor)
  });

  f.render_stateful_widget(
    Table::new(rows, WIDTHS).header(header).block(block),
    area,
    &mut state,
  );
}

fn record_row<'a, S>(app: &'a App<S>, index: usize, record: &'a CourseRecord) -> Row<'a> {
  let session = &app.session;
  let saved = session.is_saved();
  let is_cursor_row = index == app.row_cursor;
  let is_selected = session.selected() == Some(record.id);

  let mut cells: Vec<Cell> = Column::ALL
    .iter()
    .map(|&column| {
      let focused = is_cursor_row && column == app.column;
      let text = match (&app.input, focused) {
        (Some(buffer), true) => format!("{buffer}_"),
        _ => column.value(record),
      };

      let mut style = Style::default();
      if !column.is_enabled(record) {
        style = style.fg(Color::DarkGray);
      }
      if focused {
        style = style.add_modifier(Modifier::REVERSED);
      }
      Cell::from(text).style(style)
    })
    .collect();

  let total = if saved { record.total.to_string() } else { PLACEHOLDER.into() };
  let (grade, grade_cell_style) = match (saved, record.grade) {
    (true, Some(g)) => (g.to_string(), grade_style(g)),
    _ => (PLACEHOLDER.to_string(), Style::default()),
  };
  cells.push(Cell::from(total));
  cells.push(Cell::from(PLACEHOLDER));
  cells.push(Cell::from(grade).style(grade_cell_style));

  let row_style = if is_selected {
    Style::default().bg(Color::Blue).fg(Color::White)
  } else {
    Style::default()
  };
  Row::new(cells).style(row_style)
}

fn summary_row<S>(app: &App<S>) -> Row<'static> {
  let style = Style::default().add_modifier(Modifier::BOLD);
  let Some(s) = app.session.summary() else {
    let mut cells = vec![Cell::from("Total"), Cell::from(""), Cell::from("")];
    cells.extend(std::iter::repeat_n(PLACEHOLDER, 8).map(Cell::from));
    return Row::new(cells).style(style);
  };

  Row::new(vec![
    Cell::from("Total"),
    Cell::from(""),
    Cell::from(""),
    Cell::from(s.total_credit.to_string()),
    Cell::from(s.total_attendance.to_string()),
    Cell::from(s.total_assignment.to_string()),
    Cell::from(s.total_midterm.to_string()),
    Cell::from(s.total_final.to_string()),
    Cell::from(s.total_score.to_string()),
    Cell::from(format!("{:.2}", s.average)),
    Cell::from(Line::from(Span::styled(
      s.average_grade.to_string(),
      grade_style(s.average_grade),
    ))),
  ])
  .style(style)
}

fn grade_style(grade: LetterGrade) -> Style {
  if grade.is_failing() {
    Style::default().fg(Color::Red)
  } else {
    Style::default()
  }
}
