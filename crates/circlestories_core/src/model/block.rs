//! Story block model.
//!
//! # Invariants
//! - `seq` starts at 0 and is gapless and unique within one story.
//! - Block 0 is always authored by the story creator.
//! - Blocks are never rewritten once persisted.

use crate::model::story::StoryId;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

/// Zero-based position of a block inside its story.
pub type BlockSeq = u32;

/// One author's fragment of a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub story_id: StoryId,
    pub seq: BlockSeq,
    pub author: UserId,
    pub text: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Block {
    pub fn is_opening(&self) -> bool {
        self.seq == 0
    }
}
