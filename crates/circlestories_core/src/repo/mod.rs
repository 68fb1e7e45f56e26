//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define story, block and contributor data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories never open transactions themselves; callers decide the
//!   transaction boundary and hand in a `Connection` or `Transaction`.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Repository APIs return semantic errors (`NotFound`, `EmptyStory`,
//!   `MissingOpeningBlock`, `SequenceGap`) in addition to DB transport errors.

pub mod block_repo;
pub mod contributor_repo;
pub mod story_repo;

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::story::{StoryId, ValidationError};
use crate::model::user::UserId;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all story persistence contracts.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound(StoryId),
    /// A story exists without any block. Never expected; signals a prior
    /// atomicity bug.
    EmptyStory(StoryId),
    /// Later blocks exist but block 0 does not.
    MissingOpeningBlock(StoryId),
    /// Persisted sequence indexes skip a value.
    SequenceGap {
        story_id: StoryId,
        expected: u32,
        found: u32,
    },
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "story not found: {id}"),
            Self::EmptyStory(id) => write!(f, "story has no blocks: {id}"),
            Self::MissingOpeningBlock(id) => write!(f, "story is missing block 0: {id}"),
            Self::SequenceGap {
                story_id,
                expected,
                found,
            } => write!(
                f,
                "gap in block sequence of story {story_id}: expected {expected}, found {found}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "story repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted story data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Rejects connections that were not opened through `crate::db`.
fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

fn parse_story_id(value: &str, column: &str) -> RepoResult<StoryId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn parse_user_id(value: &str, column: &str) -> RepoResult<UserId> {
    UserId::parse(value)
        .map_err(|err| RepoError::InvalidData(format!("{err} in {column}")))
}
