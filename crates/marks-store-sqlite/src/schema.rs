//! SQL schema for the marks SQLite store.
//!
//! Executed once at connection startup. The blob itself carries no schema
//! version; `user_version` only tracks the table layout.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per key. The gradebook lives under a single key and is
-- rewritten wholesale on every save.
CREATE TABLE IF NOT EXISTS kv (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,   -- serialised JSON blob
    updated_at TEXT NOT NULL    -- RFC 3339 UTC
);

PRAGMA user_version = 1;
";
