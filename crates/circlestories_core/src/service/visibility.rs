//! Full/partial visibility decision and view rendering.
//!
//! # Invariants
//! - Contributors get `StoryView::Full`; everyone else gets
//!   `StoryView::Partial` with the newest block only.
//! - One contribution grants the full view forever, including blocks
//!   written later by others.
//! - Membership and block reads share one read transaction, so a view never
//!   mixes two different committed states.

use crate::db::StoryDb;
use crate::model::story::StoryId;
use crate::model::user::UserId;
use crate::model::view::StoryView;
use crate::repo::block_repo::{BlockStore, SqliteBlockStore};
use crate::repo::contributor_repo::{ContributorIndex, SqliteContributorIndex};
use crate::service::error::StoryResult;
use crate::service::story_registry::load_story;
use log::debug;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct VisibilityPolicy {
    db: Arc<StoryDb>,
}

impl VisibilityPolicy {
    pub fn new(db: Arc<StoryDb>) -> Self {
        Self { db }
    }

    /// Renders the story as `viewer_id` is allowed to see it.
    ///
    /// # Errors
    /// - `InvalidInput` for a malformed viewer id.
    /// - `NotFound` when the story does not exist.
    /// - `ConsistencyFault` when the story has no blocks.
    pub fn view(&self, story_id: StoryId, viewer_id: &str) -> StoryResult<StoryView> {
        let viewer = UserId::parse(viewer_id)?;
        let mut conn = self.db.acquire()?;
        let tx = conn.transaction()?;

        let story = load_story(&tx, story_id)?;
        let log = SqliteBlockStore::try_new(&tx, story_id)?;
        let view = if SqliteContributorIndex::try_new(&tx)?.is_contributor(story_id, &viewer)? {
            StoryView::Full {
                story,
                blocks: log.full_text()?,
            }
        } else {
            StoryView::Partial {
                story,
                last_block: log.last_block()?,
            }
        };
        drop(log);
        tx.commit()?;

        debug!(
            "event=story_view module=visibility status=ok story_id={} visibility={}",
            story_id,
            if view.is_full() { "full" } else { "partial" }
        );
        Ok(view)
    }
}
