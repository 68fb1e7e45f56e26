//! Story engine facade.
//!
//! # Responsibility
//! - Own the storage handle and wire it into the story services.
//! - Offer identity-aware entry points for request handlers.
//!
//! # Invariants
//! - One `StoryEngine` is shared by all request workers (`Send + Sync`).
//! - Anonymous callers (`resolve_current_user() == None`) are rejected with
//!   `Unauthenticated` before any storage access.

use crate::config::EngineConfig;
use crate::db::StoryDb;
use crate::identity::IdentityProvider;
use crate::model::block::BlockSeq;
use crate::model::story::{Story, StoryId};
use crate::model::user::UserId;
use crate::model::view::StoryView;
use crate::repo::story_repo::StoryListQuery;
use crate::service::append_coordinator::{AppendCoordinator, AppendReceipt};
use crate::service::error::{StoryError, StoryResult};
use crate::service::story_registry::StoryRegistry;
use crate::service::visibility::VisibilityPolicy;
use std::sync::Arc;

#[derive(Debug)]
pub struct StoryEngine {
    db: Arc<StoryDb>,
    registry: StoryRegistry,
    appends: AppendCoordinator,
    visibility: VisibilityPolicy,
}

impl StoryEngine {
    /// Opens (and migrates) the configured database.
    pub fn open(config: &EngineConfig) -> StoryResult<Self> {
        let db = StoryDb::open(&config.db_path, config.busy_timeout())?;
        Ok(Self::with_db(Arc::new(db)))
    }

    /// Builds the services around an already opened storage handle.
    pub fn with_db(db: Arc<StoryDb>) -> Self {
        Self {
            registry: StoryRegistry::new(Arc::clone(&db)),
            appends: AppendCoordinator::new(Arc::clone(&db)),
            visibility: VisibilityPolicy::new(Arc::clone(&db)),
            db,
        }
    }

    pub fn db(&self) -> &StoryDb {
        &self.db
    }

    pub fn create_story(
        &self,
        creator_id: &str,
        title: &str,
        opening_text: &str,
    ) -> StoryResult<StoryId> {
        self.registry.create_story(creator_id, title, opening_text)
    }

    pub fn get_story(&self, story_id: StoryId) -> StoryResult<Story> {
        self.registry.get_story(story_id)
    }

    pub fn list_stories(&self, query: &StoryListQuery) -> StoryResult<Vec<Story>> {
        self.registry.list_stories(query)
    }

    pub fn contributors(&self, story_id: StoryId) -> StoryResult<Vec<UserId>> {
        self.registry.contributors(story_id)
    }

    pub fn is_contributor(&self, story_id: StoryId, user_id: &str) -> StoryResult<bool> {
        self.registry.is_contributor(story_id, user_id)
    }

    pub fn submit_append(
        &self,
        story_id: StoryId,
        author_id: &str,
        text: &str,
    ) -> StoryResult<BlockSeq> {
        self.appends.submit_append(story_id, author_id, text)
    }

    pub fn append_with_receipt(
        &self,
        story_id: StoryId,
        author_id: &str,
        text: &str,
    ) -> StoryResult<AppendReceipt> {
        self.appends.append_with_receipt(story_id, author_id, text)
    }

    pub fn view(&self, story_id: StoryId, viewer_id: &str) -> StoryResult<StoryView> {
        self.visibility.view(story_id, viewer_id)
    }

    /// Number of stories with an append in flight.
    pub fn active_appends(&self) -> usize {
        self.appends.active_stories()
    }

    /// Creates a story on behalf of the current user.
    pub fn create_story_as(
        &self,
        identity: &impl IdentityProvider,
        title: &str,
        opening_text: &str,
    ) -> StoryResult<StoryId> {
        let user = current_user(identity)?;
        self.create_story(user.as_str(), title, opening_text)
    }

    /// Appends on behalf of the current user.
    pub fn submit_append_as(
        &self,
        identity: &impl IdentityProvider,
        story_id: StoryId,
        text: &str,
    ) -> StoryResult<BlockSeq> {
        let user = current_user(identity)?;
        self.submit_append(story_id, user.as_str(), text)
    }

    /// Renders the story for the current user.
    pub fn view_as(
        &self,
        identity: &impl IdentityProvider,
        story_id: StoryId,
    ) -> StoryResult<StoryView> {
        let user = current_user(identity)?;
        self.view(story_id, user.as_str())
    }
}

fn current_user(identity: &impl IdentityProvider) -> StoryResult<UserId> {
    identity
        .resolve_current_user()
        .ok_or(StoryError::Unauthenticated)
}
