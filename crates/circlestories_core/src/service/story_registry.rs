//! Story registry use-cases: creation, lookup and listing.
//!
//! # Responsibility
//! - Create a story together with its opening block and creator record.
//! - Resolve story ids to metadata and contributor membership.
//!
//! # Invariants
//! - `create_story` writes story, block 0 and the creator's contributor row
//!   in one IMMEDIATE transaction; a story without blocks is never visible.
//! - `get_story` distinguishes an unknown id (`NotFound`) from a known one.

use crate::db::StoryDb;
use crate::model::story::{NewStory, Story, StoryId};
use crate::model::user::UserId;
use crate::repo::block_repo::{BlockStore, SqliteBlockStore};
use crate::repo::contributor_repo::{ContributorIndex, SqliteContributorIndex};
use crate::repo::story_repo::{SqliteStoryRepository, StoryListQuery, StoryRepository};
use crate::service::error::{StoryError, StoryResult};
use log::{error, info, warn};
use rusqlite::{Connection, TransactionBehavior};
use std::sync::Arc;
use std::time::Instant;

/// Registry of stories backed by the shared storage handle.
#[derive(Debug, Clone)]
pub struct StoryRegistry {
    db: Arc<StoryDb>,
}

impl StoryRegistry {
    pub fn new(db: Arc<StoryDb>) -> Self {
        Self { db }
    }

    /// Creates a story whose block 0 is `opening_text` by `creator_id`.
    ///
    /// # Errors
    /// - `InvalidInput` for an empty title/text or a malformed creator id.
    /// - `Storage` when the transaction cannot be committed; nothing is
    ///   persisted in that case.
    pub fn create_story(
        &self,
        creator_id: &str,
        title: &str,
        opening_text: &str,
    ) -> StoryResult<StoryId> {
        let started_at = Instant::now();
        let input = NewStory::parse(creator_id, title, opening_text).inspect_err(|err| {
            warn!("event=story_create module=registry status=rejected error={err}");
        })?;

        let result = self.insert_new_story(&input);
        match &result {
            Ok(story) => info!(
                "event=story_create module=registry status=ok story_id={} duration_ms={}",
                story.story_id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=story_create module=registry status=error story_id={} duration_ms={} error_code={} error={}",
                input.story_id,
                started_at.elapsed().as_millis(),
                err.code(),
                err
            ),
        }
        result.map(|story| story.story_id)
    }

    /// Loads story metadata.
    pub fn get_story(&self, story_id: StoryId) -> StoryResult<Story> {
        let conn = self.db.acquire()?;
        load_story(&conn, story_id)
    }

    /// Lists stories newest first.
    pub fn list_stories(&self, query: &StoryListQuery) -> StoryResult<Vec<Story>> {
        let conn = self.db.acquire()?;
        let stories = SqliteStoryRepository::try_new(&conn)?.list_stories(query)?;
        Ok(stories)
    }

    /// Contributors of one story ordered by first contribution.
    pub fn contributors(&self, story_id: StoryId) -> StoryResult<Vec<UserId>> {
        let mut conn = self.db.acquire()?;
        let tx = conn.transaction()?;
        ensure_story_exists(&tx, story_id)?;
        let users = SqliteContributorIndex::try_new(&tx)?.list_contributors(story_id)?;
        tx.commit()?;
        Ok(users)
    }

    /// Whether `user_id` has authored at least one block of the story.
    pub fn is_contributor(&self, story_id: StoryId, user_id: &str) -> StoryResult<bool> {
        let user = UserId::parse(user_id)?;
        let mut conn = self.db.acquire()?;
        let tx = conn.transaction()?;
        ensure_story_exists(&tx, story_id)?;
        let member = SqliteContributorIndex::try_new(&tx)?.is_contributor(story_id, &user)?;
        tx.commit()?;
        Ok(member)
    }

    fn insert_new_story(&self, input: &NewStory) -> StoryResult<Story> {
        let mut conn = self.db.acquire()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let story = SqliteStoryRepository::try_new(&tx)?.insert_story(
            input.story_id,
            &input.creator,
            &input.title,
        )?;
        let seq = SqliteBlockStore::try_new(&tx, story.story_id)?
            .append(&input.creator, &input.opening_text)?;
        if seq != 0 {
            return Err(StoryError::ConsistencyFault {
                story_id: story.story_id,
                details: format!("opening block received seq {seq}"),
            });
        }
        SqliteContributorIndex::try_new(&tx)?.record(story.story_id, &input.creator)?;

        tx.commit()?;
        Ok(story)
    }
}

/// Loads story metadata or fails with `NotFound`.
pub(crate) fn load_story(conn: &Connection, story_id: StoryId) -> StoryResult<Story> {
    SqliteStoryRepository::try_new(conn)?
        .get_story(story_id)?
        .ok_or(StoryError::NotFound(story_id))
}

/// Fails with `NotFound` unless the story exists.
pub(crate) fn ensure_story_exists(conn: &Connection, story_id: StoryId) -> StoryResult<()> {
    if !SqliteStoryRepository::try_new(conn)?.story_exists(story_id)? {
        return Err(StoryError::NotFound(story_id));
    }
    Ok(())
}
