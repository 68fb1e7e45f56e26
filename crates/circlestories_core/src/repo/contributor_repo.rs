//! Contributor index: which users have authored blocks of which stories.
//!
//! # Invariants
//! - Set semantics per `(story_id, user_id)`; recording twice is a no-op.
//! - Records are never removed.
//! - Membership gates visibility only, never the right to append.

use super::{ensure_connection_ready, parse_user_id, RepoResult};
use crate::model::story::StoryId;
use crate::model::user::UserId;
use rusqlite::{params, Connection};

/// Repository interface for contributor membership.
pub trait ContributorIndex {
    /// Records `user` as a contributor of `story_id`.
    ///
    /// Returns `true` when the pair was not recorded before.
    fn record(&self, story_id: StoryId, user: &UserId) -> RepoResult<bool>;
    fn is_contributor(&self, story_id: StoryId, user: &UserId) -> RepoResult<bool>;
    /// Contributors ordered by first contribution.
    fn list_contributors(&self, story_id: StoryId) -> RepoResult<Vec<UserId>>;
}

/// SQLite-backed contributor index.
pub struct SqliteContributorIndex<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContributorIndex<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ContributorIndex for SqliteContributorIndex<'_> {
    fn record(&self, story_id: StoryId, user: &UserId) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO contributors (story_id, user_id) VALUES (?1, ?2);",
            params![story_id.to_string(), user.as_str()],
        )?;
        Ok(inserted == 1)
    }

    fn is_contributor(&self, story_id: StoryId, user: &UserId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM contributors
                WHERE story_id = ?1 AND user_id = ?2
            );",
            params![story_id.to_string(), user.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn list_contributors(&self, story_id: StoryId) -> RepoResult<Vec<UserId>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id
             FROM contributors
             WHERE story_id = ?1
             ORDER BY joined_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([story_id.to_string()])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            let raw: String = row.get(0)?;
            users.push(parse_user_id(&raw, "contributors.user_id")?);
        }
        Ok(users)
    }
}
