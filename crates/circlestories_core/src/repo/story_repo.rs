//! Story metadata repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist and load immutable story metadata from the `stories` table.
//! - List stories for home-page style overviews.
//!
//! # Invariants
//! - `insert_story` only writes metadata; block 0 and the creator's
//!   contributor row must be written in the same caller-owned transaction.
//! - List order is `created_at DESC, rowid DESC`.

use super::{ensure_connection_ready, parse_story_id, parse_user_id, RepoResult};
use crate::model::story::{Story, StoryId};
use crate::model::user::UserId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const STORY_SELECT_SQL: &str = "SELECT
    story_id,
    title,
    creator_id,
    created_at
FROM stories";

const STORIES_DEFAULT_LIMIT: u32 = 20;
const STORIES_LIMIT_MAX: u32 = 100;

/// Query options for listing stories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryListQuery {
    /// Only stories this user has contributed to.
    pub contributor: Option<UserId>,
    /// Defaults to 20 and clamps to 100.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for story metadata.
pub trait StoryRepository {
    /// Inserts one story row and returns it with its assigned `created_at`.
    fn insert_story(
        &self,
        story_id: StoryId,
        creator: &UserId,
        title: &str,
    ) -> RepoResult<Story>;
    fn get_story(&self, story_id: StoryId) -> RepoResult<Option<Story>>;
    fn story_exists(&self, story_id: StoryId) -> RepoResult<bool>;
    fn list_stories(&self, query: &StoryListQuery) -> RepoResult<Vec<Story>>;
}

/// SQLite-backed story repository.
pub struct SqliteStoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStoryRepository<'conn> {
    /// Creates repository from a migrated connection or transaction.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl StoryRepository for SqliteStoryRepository<'_> {
    fn insert_story(
        &self,
        story_id: StoryId,
        creator: &UserId,
        title: &str,
    ) -> RepoResult<Story> {
        let created_at: i64 = self.conn.query_row(
            "INSERT INTO stories (story_id, title, creator_id)
             VALUES (?1, ?2, ?3)
             RETURNING created_at;",
            params![story_id.to_string(), title, creator.as_str()],
            |row| row.get(0),
        )?;

        Ok(Story {
            story_id,
            title: title.to_string(),
            creator: creator.clone(),
            created_at,
        })
    }

    fn get_story(&self, story_id: StoryId) -> RepoResult<Option<Story>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STORY_SELECT_SQL} WHERE story_id = ?1;"))?;
        let mut rows = stmt.query([story_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(read_story_columns(row)?.into_story()?));
        }

        Ok(None)
    }

    fn story_exists(&self, story_id: StoryId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM stories WHERE story_id = ?1);",
            [story_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn list_stories(&self, query: &StoryListQuery) -> RepoResult<Vec<Story>> {
        let mut sql = format!("{STORY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(user) = query.contributor.as_ref() {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM contributors c
                    WHERE c.story_id = stories.story_id
                      AND c.user_id = ?
                )",
            );
            bind_values.push(Value::Text(user.as_str().to_string()));
        }

        sql.push_str(" ORDER BY created_at DESC, rowid DESC LIMIT ?");
        bind_values.push(Value::Integer(i64::from(normalize_story_limit(query.limit))));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut stories = Vec::new();
        while let Some(row) = rows.next()? {
            stories.push(read_story_columns(row)?.into_story()?);
        }
        Ok(stories)
    }
}

/// Normalizes list limit according to the story list contract.
pub fn normalize_story_limit(limit: Option<u32>) -> u32 {
    match limit {
        None | Some(0) => STORIES_DEFAULT_LIMIT,
        Some(value) => value.min(STORIES_LIMIT_MAX),
    }
}

struct StoryColumns {
    story_id: String,
    title: String,
    creator_id: String,
    created_at: i64,
}

impl StoryColumns {
    fn into_story(self) -> RepoResult<Story> {
        Ok(Story {
            story_id: parse_story_id(&self.story_id, "stories.story_id")?,
            title: self.title,
            creator: parse_user_id(&self.creator_id, "stories.creator_id")?,
            created_at: self.created_at,
        })
    }
}

fn read_story_columns(row: &Row<'_>) -> RepoResult<StoryColumns> {
    Ok(StoryColumns {
        story_id: row.get("story_id")?,
        title: row.get("title")?,
        creator_id: row.get("creator_id")?,
        created_at: row.get("created_at")?,
    })
}
