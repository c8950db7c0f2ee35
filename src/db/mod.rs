// Database layer — SQLite storage for per-store sentiment results.
//
// Sentiment passes are slow, so every result is kept and reused: a store is
// re-analyzed only on request, and a region's baseline is the mean of the
// results stored for it. rusqlite's "bundled" feature means no system
// SQLite is needed. The file lives wherever DCX_DB_PATH points (defaults to
// ./dcx.db).

pub mod queries;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// Open (or create) the database and run migrations.
pub fn initialize(db_path: &str) -> Result<Connection> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {}", db_path))?;
        }
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    schema::create_tables(&conn)?;

    Ok(conn)
}
