//! Versioned schema migrations for the tracker database.
//!
//! Migrations are ordered and idempotent at the set level: the SQLite
//! `user_version` pragma records how far this database has advanced, and
//! only later entries run. Safe to call on every startup.

use anyhow::Context;
use rusqlite::Connection;

/// All migrations in chronological order. Index + 1 is the resulting
/// `user_version`.
const MIGRATIONS: &[&str] = &[
    // v1: base tracking schema
    r#"
    CREATE TABLE IF NOT EXISTS habit (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        positive_score INTEGER NOT NULL DEFAULT 1,
        negative_score INTEGER NOT NULL DEFAULT 0,
        is_active INTEGER NOT NULL DEFAULT 1,
        display_order INTEGER NOT NULL DEFAULT 0
    );
    CREATE TABLE IF NOT EXISTS daily_entry (
        id INTEGER PRIMARY KEY,
        entry_date TEXT NOT NULL,
        loved_someone TEXT NOT NULL DEFAULT '',
        daily_summary TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE TABLE IF NOT EXISTS habit_log (
        id INTEGER PRIMARY KEY,
        entry_id INTEGER NOT NULL REFERENCES daily_entry(id) ON DELETE CASCADE,
        habit_id INTEGER NOT NULL REFERENCES habit(id) ON DELETE CASCADE,
        completed INTEGER NOT NULL DEFAULT 0
    );
    CREATE TABLE IF NOT EXISTS quote (
        id INTEGER PRIMARY KEY,
        text TEXT NOT NULL,
        sensed INTEGER NOT NULL DEFAULT 0
    );
    CREATE TABLE IF NOT EXISTS task (
        id INTEGER PRIMARY KEY,
        title TEXT NOT NULL,
        due_date TEXT,
        done INTEGER NOT NULL DEFAULT 0
    );
    "#,
    // v2: lookup indexes for the dashboard queries
    r#"
    CREATE INDEX IF NOT EXISTS idx_daily_entry_date ON daily_entry(entry_date);
    CREATE INDEX IF NOT EXISTS idx_habit_log_entry ON habit_log(entry_id);
    "#,
];

/// Bring `conn` up to the current schema version.
pub fn migrate(conn: &Connection) -> anyhow::Result<()> {
    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .context("reading schema version")?;

    for (i, sql) in MIGRATIONS.iter().enumerate().skip(version as usize) {
        let target = (i + 1) as i64;
        tracing::info!(target_version = target, "applying schema migration");
        conn.execute_batch(sql)
            .with_context(|| format!("migration to schema v{target}"))?;
        conn.pragma_update(None, "user_version", target)
            .with_context(|| format!("recording schema v{target}"))?;
    }
    Ok(())
}
