//! Serialized block appends.
//!
//! # Responsibility
//! - Give every accepted append a unique, gapless sequence index.
//! - Record the author as a contributor in the same transaction as the block.
//!
//! # Invariants
//! - Same-story appends are mutually exclusive in-process (`StoryLocks`) and
//!   across processes (IMMEDIATE transaction plus the `(story_id, seq)` key).
//! - SQLite has one writer per database file, so appends to different stories
//!   still queue on the write lock. The IMMEDIATE window covers only the
//!   block and contributor inserts, and a wait is bounded by `busy_timeout`.
//! - A reader never sees a block whose author is missing from the
//!   contributor index, nor the reverse.
//! - Failed appends are reported, never retried here: a retry could
//!   duplicate a block whose commit actually succeeded.

use crate::db::StoryDb;
use crate::model::block::BlockSeq;
use crate::model::story::{validate_block_text, StoryId};
use crate::model::user::UserId;
use crate::repo::block_repo::{BlockStore, SqliteBlockStore};
use crate::repo::contributor_repo::{ContributorIndex, SqliteContributorIndex};
use crate::service::error::StoryResult;
use crate::service::story_locks::StoryLocks;
use crate::service::story_registry::ensure_story_exists;
use log::{error, info, warn};
use rusqlite::TransactionBehavior;
use std::sync::Arc;
use std::time::Instant;

/// Outcome of one accepted append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendReceipt {
    pub seq: BlockSeq,
    /// Whether this was the author's first block in the story.
    pub first_contribution: bool,
}

#[derive(Debug)]
pub struct AppendCoordinator {
    db: Arc<StoryDb>,
    locks: StoryLocks,
}

impl AppendCoordinator {
    pub fn new(db: Arc<StoryDb>) -> Self {
        Self {
            db,
            locks: StoryLocks::new(),
        }
    }

    /// Appends `text` by `author_id` to an existing story and returns the
    /// assigned sequence index.
    ///
    /// Any user may append; contributor status is not required.
    ///
    /// # Errors
    /// - `InvalidInput` for empty text or a malformed author id.
    /// - `NotFound` when the story does not exist.
    /// - `Storage` when the write fails; nothing is persisted in that case.
    pub fn submit_append(
        &self,
        story_id: StoryId,
        author_id: &str,
        text: &str,
    ) -> StoryResult<BlockSeq> {
        self.append_with_receipt(story_id, author_id, text)
            .map(|receipt| receipt.seq)
    }

    /// Same as `submit_append`, also reporting whether the author is new.
    pub fn append_with_receipt(
        &self,
        story_id: StoryId,
        author_id: &str,
        text: &str,
    ) -> StoryResult<AppendReceipt> {
        let started_at = Instant::now();
        let author = UserId::parse(author_id)
            .and_then(|author| validate_block_text(text).map(|()| author))
            .inspect_err(|err| {
                warn!("event=block_append module=append status=rejected story_id={story_id} error={err}");
            })?;

        let result = self
            .locks
            .with_story_lock(story_id, || self.append_locked(story_id, &author, text));

        match &result {
            Ok(receipt) => info!(
                "event=block_append module=append status=ok story_id={} seq={} first_contribution={} duration_ms={}",
                story_id,
                receipt.seq,
                receipt.first_contribution,
                started_at.elapsed().as_millis()
            ),
            Err(err) if err.is_caller_error() => warn!(
                "event=block_append module=append status=rejected story_id={} error_code={}",
                story_id,
                err.code()
            ),
            Err(err) => error!(
                "event=block_append module=append status=error story_id={} duration_ms={} error_code={} error={}",
                story_id,
                started_at.elapsed().as_millis(),
                err.code(),
                err
            ),
        }
        result
    }

    /// Number of stories with an in-flight or waiting append.
    pub fn active_stories(&self) -> usize {
        self.locks.active_slots()
    }

    fn append_locked(
        &self,
        story_id: StoryId,
        author: &UserId,
        text: &str,
    ) -> StoryResult<AppendReceipt> {
        let mut conn = self.db.acquire()?;
        // Stories are never deleted, so the check stays valid once the write lock is taken.
        ensure_story_exists(&conn, story_id)?;

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let seq = SqliteBlockStore::try_new(&tx, story_id)?.append(author, text)?;
        let first_contribution = SqliteContributorIndex::try_new(&tx)?.record(story_id, author)?;

        tx.commit()?;
        Ok(AppendReceipt {
            seq,
            first_contribution,
        })
    }
}
