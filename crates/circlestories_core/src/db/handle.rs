//! Owned storage handle shared by the story services.
//!
//! `StoryDb` never holds an open connection. Each logical transaction calls
//! `acquire()`, works on the returned connection and drops it when done, so
//! concurrent workers never contend on one connection object.

use super::open::{open_migrated_file, open_scoped};
use super::DbResult;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug)]
pub struct StoryDb {
    path: PathBuf,
    busy_timeout: Duration,
}

impl StoryDb {
    /// Opens (creating if needed) the database file and migrates it.
    ///
    /// The bootstrap connection is closed before this returns.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        drop(open_migrated_file(&path, busy_timeout)?);
        Ok(Self { path, busy_timeout })
    }

    /// Opens a fresh connection scoped to one logical transaction.
    pub fn acquire(&self) -> DbResult<rusqlite::Connection> {
        open_scoped(&self.path, self.busy_timeout)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn busy_timeout(&self) -> Duration {
        self.busy_timeout
    }
}
