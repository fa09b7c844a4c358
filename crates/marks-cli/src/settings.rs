//! Layered configuration: defaults, then an optional TOML file, then
//! `MARKS_*` environment variables. CLI flags are applied on top by `main`.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use serde::Deserialize;

/// Config file consulted when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "marks.toml";

/// Runtime settings, deserialised from the config sources.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// SQLite file holding the gradebook.
  #[serde(default = "default_store_path")]
  pub store_path:  PathBuf,
  /// Log destination; defaults to the store path with a `.log` extension.
  #[serde(default)]
  pub log_file:    Option<PathBuf>,
  /// Seconds a rejected-add notice stays on screen.
  #[serde(default = "default_notice_secs")]
  pub notice_secs: u64,
  /// Persist after every change. When off, the gradebook is written on save
  /// and on quit.
  #[serde(default = "default_autosave")]
  pub autosave:    bool,
}

fn default_store_path() -> PathBuf { PathBuf::from("marks.db") }

fn default_notice_secs() -> u64 { 3 }

fn default_autosave() -> bool { true }

impl Default for Settings {
  fn default() -> Self {
    Self {
      store_path:  default_store_path(),
      log_file:    None,
      notice_secs: default_notice_secs(),
      autosave:    default_autosave(),
    }
  }
}

impl Settings {
  /// Read settings from `file` (required if given, otherwise
  /// [`DEFAULT_CONFIG_FILE`] if present) and the environment.
  pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
    let source = match file {
      Some(path) => config::File::from(path.to_path_buf()).required(true),
      None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let settings = config::Config::builder()
      .add_source(source)
      .add_source(config::Environment::with_prefix("MARKS"))
      .build()
      .context("failed to read config")?;

    let mut loaded: Settings = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;
    loaded.store_path = expand_tilde(&loaded.store_path);
    loaded.log_file = loaded.log_file.as_deref().map(expand_tilde);
    Ok(loaded)
  }

  /// Apply command-line overrides.
  pub fn with_overrides(mut self, store: Option<PathBuf>, log_file: Option<PathBuf>) -> Self {
    if let Some(path) = store {
      self.store_path = expand_tilde(&path);
    }
    if let Some(path) = log_file {
      self.log_file = Some(expand_tilde(&path));
    }
    self
  }

  pub fn notice_ttl(&self) -> Duration { Duration::from_secs(self.notice_secs) }

  /// Where the TUI writes its log.
  pub fn log_path(&self) -> PathBuf {
    self
      .log_file
      .clone()
      .unwrap_or_else(|| self.store_path.with_extension("log"))
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let s = Settings::default();
    assert_eq!(s.store_path, PathBuf::from("marks.db"));
    assert_eq!(s.notice_ttl(), Duration::from_secs(3));
    assert!(s.autosave);
    assert_eq!(s.log_path(), PathBuf::from("marks.log"));
  }

  #[test]
  fn cli_overrides_win() {
    let s = Settings::default()
      .with_overrides(Some("/tmp/grades.db".into()), None);
    assert_eq!(s.store_path, PathBuf::from("/tmp/grades.db"));
    assert_eq!(s.log_path(), PathBuf::from("/tmp/grades.log"));

    let s = s.with_overrides(None, Some("/tmp/other.log".into()));
    assert_eq!(s.log_path(), PathBuf::from("/tmp/other.log"));
  }

  #[test]
  fn reads_toml_file() {
    let dir = std::env::temp_dir().join(format!("marks-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("marks.toml");
    std::fs::write(&path, "store_path = \"/srv/book.db\"\nnotice_secs = 5\nautosave = false\n")
      .unwrap();

    let s = Settings::load(Some(&path)).unwrap();
    assert_eq!(s.store_path, PathBuf::from("/srv/book.db"));
    assert_eq!(s.notice_secs, 5);
    assert!(!s.autosave);

    let _ = std::fs::remove_dir_all(&dir);
  }

  #[test]
  fn missing_explicit_file_is_an_error() {
    assert!(Settings::load(Some(Path::new("/nonexistent/marks.toml"))).is_err());
  }

  #[test]
  fn tilde_expands_to_home() {
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expand_tilde(Path::new("~/x.db")), PathBuf::from(home).join("x.db"));
    }
    assert_eq!(expand_tilde(Path::new("/abs.db")), PathBuf::from("/abs.db"));
  }
}
