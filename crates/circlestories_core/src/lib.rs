//! Core engine for CircleStories collaborative story writing.
//! This crate is the single source of truth for story, block and
//! visibility invariants.

pub mod config;
pub mod db;
pub mod engine;
pub mod identity;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::EngineConfig;
pub use db::{DbError, StoryDb};
pub use engine::StoryEngine;
pub use identity::{IdentityProvider, StaticIdentity};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::block::{Block, BlockSeq};
pub use model::story::{Story, StoryId, ValidationError};
pub use model::user::UserId;
pub use model::view::StoryView;
pub use repo::block_repo::{BlockStore, SqliteBlockStore};
pub use repo::contributor_repo::{ContributorIndex, SqliteContributorIndex};
pub use repo::story_repo::{SqliteStoryRepository, StoryListQuery, StoryRepository};
pub use repo::{RepoError, RepoResult};
pub use service::append_coordinator::{AppendCoordinator, AppendReceipt};
pub use service::error::{StoryError, StoryResult};
pub use service::story_registry::StoryRegistry;
pub use service::visibility::VisibilityPolicy;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
