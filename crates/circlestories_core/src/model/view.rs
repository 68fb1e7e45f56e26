//! Rendered story views.
//!
//! A contributor gets every block; anyone else gets only the newest block.
//! There are no intermediate tiers.

use crate::model::block::Block;
use crate::model::story::Story;
use serde::{Deserialize, Serialize};

/// Separator placed between blocks when assembling the narrative.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// What one user is allowed to see of one story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "visibility", rename_all = "snake_case")]
pub enum StoryView {
    /// All blocks in ascending `seq` order. Never empty.
    Full { story: Story, blocks: Vec<Block> },
    /// Only the block with the highest `seq`.
    Partial { story: Story, last_block: Block },
}

impl StoryView {
    pub fn story(&self) -> &Story {
        match self {
            Self::Full { story, .. } | Self::Partial { story, .. } => story,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full { .. })
    }

    /// Block texts visible to the viewer, in story order.
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Self::Full { blocks, .. } => blocks.iter().map(|block| block.text.as_str()).collect(),
            Self::Partial { last_block, .. } => vec![last_block.text.as_str()],
        }
    }

    /// Visible text joined with `BLOCK_SEPARATOR`.
    pub fn assembled_text(&self) -> String {
        self.texts().join(BLOCK_SEPARATOR)
    }
}
