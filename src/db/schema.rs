// Table creation and migrations.
//
// A `schema_version` table records which migrations have run; each
// migration is a closure executing its SQL once.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet. Idempotent.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One row per analyzed store
        CREATE TABLE IF NOT EXISTS sentiment_results (
            region TEXT NOT NULL,
            store TEXT NOT NULL,
            total REAL NOT NULL,               -- 0.0 to 100.0
            keywords_json TEXT NOT NULL,       -- column -> score or null
            sentences_analyzed INTEGER NOT NULL,
            reviews_analyzed INTEGER NOT NULL,
            analyzed_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (region, store)
        );
        ",
    )
    .context("Failed to create database tables")?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    // Migration v2: remember which classifier backend produced each row,
    // so results from different models can be told apart.
    run_migration(conn, 2, |c| {
        c.execute_batch("ALTER TABLE sentiment_results ADD COLUMN classifier TEXT;")
    })?;

    Ok(())
}

fn run_migration<F>(conn: &Connection, version: i64, migrate: F) -> Result<()>
where
    F: FnOnce(&Connection) -> rusqlite::Result<()>,
{
    let already_applied: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM schema_version WHERE version = ?1",
        [version],
        |row| row.get(0),
    )?;

    if !already_applied {
        migrate(conn).with_context(|| format!("Migration v{version} failed"))?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )?;
    }

    Ok(())
}
