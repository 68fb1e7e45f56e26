//! Connection bootstrap utilities for SQLite.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a busy timeout.
//! - `open_db*` connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{debug, error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Busy timeout applied when the caller does not configure one.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
enum OpenMode {
    File,
    Memory,
}

impl OpenMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Memory => "memory",
        }
    }
}

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Switches the file to WAL journal mode.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_and_migrate(OpenMode::File, DEFAULT_BUSY_TIMEOUT, || {
        Connection::open(path)
    })
}

/// Opens a private in-memory database and applies all pending migrations.
///
/// The database lives as long as the returned connection; it cannot be
/// shared with other connections.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_and_migrate(
        OpenMode::Memory,
        DEFAULT_BUSY_TIMEOUT,
        Connection::open_in_memory,
    )
}

pub(super) fn open_migrated_file(path: &Path, busy_timeout: Duration) -> DbResult<Connection> {
    open_and_migrate(OpenMode::File, busy_timeout, || Connection::open(path))
}

/// Opens a per-transaction connection to an already migrated file.
pub(super) fn open_scoped(path: &Path, busy_timeout: Duration) -> DbResult<Connection> {
    let conn = Connection::open(path)?;
    configure_connection(&conn, busy_timeout)?;
    debug!("event=db_acquire module=db status=ok mode=file");
    Ok(conn)
}

fn open_and_migrate(
    mode: OpenMode,
    busy_timeout: Duration,
    opener: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={}", mode.as_str());

    let result = opener()
        .map_err(DbError::from)
        .and_then(|mut conn| bootstrap_connection(&mut conn, mode, busy_timeout).map(|()| conn));

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={} duration_ms={}",
            mode.as_str(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
            mode.as_str(),
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn bootstrap_connection(
    conn: &mut Connection,
    mode: OpenMode,
    busy_timeout: Duration,
) -> DbResult<()> {
    configure_connection(conn, busy_timeout)?;
    if let OpenMode::File = mode {
        // journal_mode answers with a row, so it cannot go through execute_batch.
        let journal: String =
            conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
        debug!("event=db_journal module=db status=ok journal_mode={journal}");
    }
    apply_migrations(conn)?;
    Ok(())
}

fn configure_connection(conn: &Connection, busy_timeout: Duration) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(busy_timeout)?;
    Ok(())
}
