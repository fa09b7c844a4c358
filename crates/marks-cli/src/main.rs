//! `marks` — terminal gradebook.
//!
//! # Usage
//!
//! ```
//! marks                          # open the grid on ./marks.db
//! marks --store ~/grades.db      # use another store
//! marks summary --year 2         # print the committed view of year 2
//! marks export > backup.json     # dump the stored blob
//! marks import backup.json       # replace the stored blob
//! ```

mod app;
mod report;
mod settings;
mod ui;

use std::{
  fs::OpenOptions,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::{Duration, Instant},
};

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use marks_core::{session::Session, store::GradebookStore};
use marks_store_sqlite::SqliteStore;
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "marks", version, about = "Terminal gradebook for three academic years")]
struct Args {
  /// Path to a TOML config file (store_path, log_file, notice_secs, autosave).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// SQLite file holding the gradebook (default: marks.db).
  #[arg(long, env = "MARKS_STORE", value_name = "FILE")]
  store: Option<PathBuf>,

  /// Log file for the interactive grid (default: store path with `.log`).
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print a year's rows and aggregate as they would look after a save.
  /// The store is not modified.
  Summary {
    /// Academic year (1, 2 or 3); all years when omitted.
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=3))]
    year: Option<u8>,
  },
  /// Print the stored gradebook blob.
  Export {
    /// Re-indent the JSON.
    #[arg(long)]
    pretty: bool,
  },
  /// Replace the stored gradebook with a previously exported blob.
  Import {
    /// JSON file produced by `marks export`.
    file: PathBuf,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let settings = Settings::load(args.config.as_deref())?
    .with_overrides(args.store, args.log_file);

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;

  match args.command {
    None => {
      init_file_tracing(&settings.log_path())?;
      run_tui(store, &settings).await
    }
    Some(command) => {
      init_stderr_tracing();
      let mut stdout = io::stdout().lock();
      match command {
        Command::Summary { year } => report::summary(&store, year, &mut stdout).await,
        Command::Export { pretty } => report::export(&store, pretty, &mut stdout).await,
        Command::Import { file } => report::import(&store, &file).await,
      }
    }
  }
}

// ─── Tracing ──────────────────────────────────────────────────────────────────

fn env_filter() -> EnvFilter {
  EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy()
}

/// The grid owns the terminal, so its logs go to a file.
fn init_file_tracing(path: &Path) -> Result<()> {
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;
  tracing_subscriber::fmt()
    .with_env_filter(env_filter())
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

fn init_stderr_tracing() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(io::stderr)
    .init();
}

// ─── Interactive grid ─────────────────────────────────────────────────────────

async fn run_tui(store: SqliteStore, settings: &Settings) -> Result<()> {
  let book = store.load().await.context("loading gradebook")?;
  let session = Session::new(book).with_notice_ttl(settings.notice_ttl());
  let mut app = App::new(store, session, settings.autosave);
  tracing::info!(store = %settings.store_path.display(), autosave = settings.autosave, "starting grid");

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<SqliteStore>,
) -> Result<()> {
  loop {
    app.session.expire_notice(Instant::now());
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(100))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && key.kind == KeyEventKind::Press
    {
      let cont = app.handle_key(key).await?;
      if !cont {
        break;
      }
    }
  }

  Ok(())
}
