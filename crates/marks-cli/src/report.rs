//! Non-interactive subcommands: `summary`, `export`, `import`.

use std::{io::Write, path::Path};

use anyhow::{Context, Result};
use marks_core::{
  gradebook::{Gradebook, Year},
  record::CourseRecord,
  store::GradebookStore,
  summary::YearSummary,
};

// ─── summary ──────────────────────────────────────────────────────────────────

/// Print the committed view of one year, or all three, without writing the
/// commit back to the store.
pub async fn summary<S: GradebookStore>(
  store: &S,
  year: Option<u8>,
  out: &mut impl Write,
) -> Result<()> {
  let book = store.load().await?.committed();
  let years = match year {
    Some(n) => vec![Year::try_from(n)?],
    None => Year::ALL.to_vec(),
  };

  for (i, year) in years.into_iter().enumerate() {
    if i > 0 {
      writeln!(out)?;
    }
    write_year(&book, year, out)?;
  }
  Ok(())
}

fn write_year(book: &Gradebook, year: Year, out: &mut impl Write) -> Result<()> {
  writeln!(out, "Year {year}")?;
  writeln!(
    out,
    "{:<9} {:<9} {:<24} {:>3} {:>4} {:>4} {:>4} {:>4} {:>6} {:>6}  {}",
    "Category", "Req.", "Subject", "Cr", "Att", "Asg", "Mid", "Fin", "Total", "Avg", "Grade"
  )?;
  for record in book.records(year) {
    write_row(record, out)?;
  }
  write_summary(&book.summary(year), out)
}

fn write_row(r: &CourseRecord, out: &mut impl Write) -> Result<()> {
  let grade = r.grade.map(|g| g.to_string()).unwrap_or_else(|| "-".into());
  writeln!(
    out,
    "{:<9} {:<9} {:<24} {:>3} {:>4} {:>4} {:>4} {:>4} {:>6} {:>6}  {}",
    r.category.to_string(),
    r.requirement.to_string(),
    r.subject,
    r.credit,
    r.attendance,
    r.assignment,
    r.midterm,
    r.final_exam,
    r.total,
    "-",
    grade,
  )?;
  Ok(())
}

fn write_summary(s: &YearSummary, out: &mut impl Write) -> Result<()> {
  writeln!(
    out,
    "{:<44} {:>3} {:>4} {:>4} {:>4} {:>4} {:>6} {:>6.2}  {}",
    "Total",
    s.total_credit,
    s.total_attendance,
    s.total_assignment,
    s.total_midterm,
    s.total_final,
    s.total_score,
    s.average,
    s.average_grade,
  )?;
  Ok(())
}

// ─── export / import ──────────────────────────────────────────────────────────

/// Print the stored blob. An empty store exports an empty gradebook.
pub async fn export<S: GradebookStore>(
  store: &S,
  pretty: bool,
  out: &mut impl Write,
) -> Result<()> {
  let raw = match store.raw_blob().await? {
    Some(raw) => raw,
    None => Gradebook::new().to_json()?,
  };
  if pretty {
    let value: serde_json::Value =
      serde_json::from_str(&raw).context("stored blob is not valid JSON")?;
    writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
  } else {
    writeln!(out, "{raw}")?;
  }
  Ok(())
}

/// Replace the stored gradebook with the blob in `path`. Unlike startup
/// loading, a malformed file is an error rather than an empty gradebook.
pub async fn import<S: GradebookStore>(store: &S, path: &Path) -> Result<()> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading {}", path.display()))?;
  let book = Gradebook::from_json(&raw)
    .with_context(|| format!("parsing gradebook from {}", path.display()))?;
  store.save(&book).await?;
  tracing::info!(records = book.len(), "gradebook imported");
  Ok(())
}
