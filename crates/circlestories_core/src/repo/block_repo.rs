//! Per-story block log: contract and SQLite implementation.
//!
//! # Responsibility
//! - Append text blocks at the next free sequence index.
//! - Read the full ordered log or only its newest block.
//!
//! # Invariants
//! - `append` must run inside a write transaction that the caller holds
//!   (IMMEDIATE), otherwise two writers could read the same `max(seq)`.
//! - `(story_id, seq)` is the primary key; a racing writer fails loudly
//!   instead of producing a duplicate or a gap.
//! - Rows are never updated or deleted (enforced by schema triggers).
//! - Reads never serve a log that lacks block 0 or skips an index; those
//!   states are reported as consistency faults and logged at error level.

use super::{ensure_connection_ready, parse_user_id, RepoError, RepoResult};
use crate::model::block::{Block, BlockSeq};
use crate::model::story::{validate_block_text, StoryId};
use crate::model::user::UserId;
use log::error;
use rusqlite::{params, Connection, Row};

const BLOCK_SELECT_SQL: &str = "SELECT
    seq,
    author_id,
    content,
    created_at
FROM blocks";

const BLOCK_SELECT_SQL_WITH_OPENING: &str = "SELECT
    seq,
    author_id,
    content,
    created_at,
    EXISTS(
        SELECT 1 FROM blocks AS opening
        WHERE opening.story_id = blocks.story_id AND opening.seq = 0
    ) AS has_opening
FROM blocks";

/// Append-only log of one story's blocks.
pub trait BlockStore {
    /// Appends `text` as the next block and returns its sequence index.
    fn append(&self, author: &UserId, text: &str) -> RepoResult<BlockSeq>;
    /// All blocks in ascending `seq` order.
    fn full_text(&self) -> RepoResult<Vec<Block>>;
    /// Block with the highest `seq`.
    ///
    /// Fails with `EmptyStory` if there is none and with
    /// `MissingOpeningBlock` if block 0 is absent.
    fn last_block(&self) -> RepoResult<Block>;
    fn block_count(&self) -> RepoResult<u32>;
}

/// SQLite-backed block log bound to one story.
pub struct SqliteBlockStore<'conn> {
    conn: &'conn Connection,
    story_id: StoryId,
}

impl<'conn> SqliteBlockStore<'conn> {
    /// Binds a block log to `story_id`. Does not check that the story exists.
    pub fn try_new(conn: &'conn Connection, story_id: StoryId) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn, story_id })
    }

    fn parse_block_row(&self, row: &Row<'_>) -> RepoResult<Block> {
        Ok(Block {
            story_id: self.story_id,
            seq: row.get("seq")?,
            author: parse_user_id(&row.get::<_, String>("author_id")?, "blocks.author_id")?,
            text: row.get("content")?,
            created_at: row.get("created_at")?,
        })
    }
}

impl BlockStore for SqliteBlockStore<'_> {
    fn append(&self, author: &UserId, text: &str) -> RepoResult<BlockSeq> {
        validate_block_text(text)?;

        let seq: BlockSeq = self.conn.query_row(
            "INSERT INTO blocks (story_id, seq, author_id, content)
             SELECT ?1, COALESCE(MAX(seq) + 1, 0), ?2, ?3
             FROM blocks
             WHERE story_id = ?1
             RETURNING seq;",
            params![self.story_id.to_string(), author.as_str(), text],
            |row| row.get(0),
        )?;

        Ok(seq)
    }

    fn full_text(&self) -> RepoResult<Vec<Block>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BLOCK_SELECT_SQL} WHERE story_id = ?1 ORDER BY seq ASC;"
        ))?;
        let mut rows = stmt.query([self.story_id.to_string()])?;
        let mut blocks: Vec<Block> = Vec::new();
        while let Some(row) = rows.next()? {
            let block = self.parse_block_row(row)?;
            let expected = u32::try_from(blocks.len()).unwrap_or(u32::MAX);
            if block.seq != expected {
                let fault = if expected == 0 {
                    RepoError::MissingOpeningBlock(self.story_id)
                } else {
                    RepoError::SequenceGap {
                        story_id: self.story_id,
                        expected,
                        found: block.seq,
                    }
                };
                return Err(broken_log(fault));
            }
            blocks.push(block);
        }

        if blocks.is_empty() {
            return Err(broken_log(RepoError::EmptyStory(self.story_id)));
        }
        Ok(blocks)
    }

    fn last_block(&self) -> RepoResult<Block> {
        let mut stmt = self.conn.prepare(&format!(
            "{BLOCK_SELECT_SQL_WITH_OPENING} WHERE story_id = ?1 ORDER BY seq DESC LIMIT 1;"
        ))?;
        let mut rows = stmt.query([self.story_id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Err(broken_log(RepoError::EmptyStory(self.story_id)));
        };
        if !row.get::<_, bool>("has_opening")? {
            return Err(broken_log(RepoError::MissingOpeningBlock(self.story_id)));
        }
        self.parse_block_row(row)
    }

    fn block_count(&self) -> RepoResult<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM blocks WHERE story_id = ?1;",
            [self.story_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn broken_log(fault: RepoError) -> RepoError {
    let error_code = match &fault {
        RepoError::EmptyStory(_) => "empty_story",
        RepoError::MissingOpeningBlock(_) => "missing_opening_block",
        _ => "sequence_gap",
    };
    error!("event=consistency_fault module=repo status=error error_code={error_code} error={fault}");
    fault
}
