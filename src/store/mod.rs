//! Persistence
//! Mission: SQLite-backed storage shared by the user and document stores

pub mod documents;

pub use documents::{Collection, Document, DocumentStore};

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use std::time::Duration;
use tracing::{info, warn};

/// Path that selects a private in-memory database (used by tests)
pub const IN_MEMORY: &str = ":memory:";

/// Open a SQLite connection with the pragmas every store expects
pub fn open_database(db_path: &str) -> Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_NO_MUTEX; // callers wrap the connection in their own mutex

    let conn = Connection::open_with_flags(db_path, flags)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    conn.busy_timeout(Duration::from_secs(5))
        .context("Failed to set busy timeout")?;

    if db_path != IN_MEMORY {
        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .context("Failed to enable WAL mode")?;

        if !journal_mode.eq_ignore_ascii_case("wal") {
            warn!("WAL mode not active, journal_mode = {}", journal_mode);
        }

        info!("📂 Database opened at: {}", db_path);
    }

    Ok(conn)
}
