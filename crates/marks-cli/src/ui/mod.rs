//! TUI rendering — orchestrates all panes.

pub mod grade_table;

use std::time::Instant;

use chrono::Local;
use marks_core::gradebook::Year;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
};

use crate::app::App;

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<S>(f: &mut Frame, app: &App<S>) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // grid
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  grade_table::draw(f, rows[1], app);
  draw_status(f, rows[2], app);

  if let Some(message) = app.session.alert() {
    draw_alert(f, area, message);
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<S>(f: &mut Frame, area: Rect, app: &App<S>) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Length(8),
      Constraint::Min(0),
      Constraint::Length(date.len() as u16 + 1),
    ])
    .split(area);

  let bar = Style::default().bg(Color::DarkGray);
  f.render_widget(Block::default().style(bar), area);

  f.render_widget(
    Paragraph::new(Span::styled(
      " marks",
      Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    )),
    cols[0],
  );

  let titles = Year::ALL.map(|y| format!("Year {y}"));
  let selected = Year::ALL
    .iter()
    .position(|y| *y == app.session.year())
    .unwrap_or_default();
  f.render_widget(
    Tabs::new(titles)
      .select(selected)
      .style(Style::default().fg(Color::Gray))
      .highlight_style(
        Style::default()
          .fg(Color::Black)
          .bg(Color::Cyan)
          .add_modifier(Modifier::BOLD),
      )
      .divider(" "),
    cols[1],
  );

  f.render_widget(
    Paragraph::new(Span::styled(date, Style::default().fg(Color::Gray))),
    cols[2],
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<S>(f: &mut Frame, area: Rect, app: &App<S>) {
  let (mode_label, hints) = if app.session.alert().is_some() {
    ("ALERT", "Enter/Esc dismiss")
  } else if app.input.is_some() {
    ("EDIT", "Type value  Enter apply  Esc cancel")
  } else {
    (
      "GRID",
      "1-3/Tab year  ↑↓←→ move  Enter edit  +/- adjust  Space select  a add  d delete  s save  q quit",
    )
  };

  let (text, text_style) = if let Some(notice) = app.session.visible_notice(Instant::now()) {
    (notice.to_string(), Style::default().fg(Color::Red))
  } else if !app.status_msg.is_empty() {
    (app.status_msg.clone(), Style::default().fg(Color::Yellow))
  } else {
    (hints.to_string(), Style::default().fg(Color::DarkGray))
  };

  let line = Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {text}"), text_style),
  ]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

// ─── Alert ────────────────────────────────────────────────────────────────────

fn draw_alert(f: &mut Frame, area: Rect, message: &str) {
  let popup = centered(area, 60, 7);
  let block = Block::default()
    .title(" Duplicate course ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Red));

  f.render_widget(Clear, popup);
  f.render_widget(
    Paragraph::new(vec![
      Line::from(message.to_string()),
      Line::from(""),
      Line::from(Span::styled(
        "Press Enter to continue.",
        Style::default().fg(Color::DarkGray),
      )),
    ])
    .wrap(Wrap { trim: true })
    .block(block),
    popup,
  );
}

/// A `width` × `height` rectangle centred in `area`, shrunk to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn centered_fits_inside_small_areas() {
    let area = Rect::new(0, 0, 40, 5);
    let r = centered(area, 60, 7);
    assert_eq!((r.width, r.height), (40, 5));
    assert_eq!((r.x, r.y), (0, 0));

    let r = centered(Rect::new(0, 0, 100, 30), 60, 7);
    assert_eq!((r.x, r.y), (20, 11));
  }
}
