//! Story metadata model.
//!
//! # Responsibility
//! - Define the immutable metadata record for one collaborative story.
//! - Validate creation input before anything reaches storage.
//!
//! # Invariants
//! - `story_id` is stable and never reused for another story.
//! - `title` and `creator` never change after creation.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a story.
pub type StoryId = Uuid;

/// Caller-correctable input problems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyTitle,
    EmptyText,
    EmptyUserId,
    MalformedUserId(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "story title cannot be empty"),
            Self::EmptyText => write!(f, "block text cannot be empty"),
            Self::EmptyUserId => write!(f, "user id cannot be empty"),
            Self::MalformedUserId(raw) => write!(f, "malformed user id `{}`", raw.escape_debug()),
        }
    }
}

impl Error for ValidationError {}

/// Metadata for one collaborative story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub story_id: StoryId,
    pub title: String,
    /// Author of block 0.
    pub creator: UserId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Validated input for creating a story together with its opening block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    pub story_id: StoryId,
    pub creator: UserId,
    pub title: String,
    pub opening_text: String,
}

impl NewStory {
    /// Validates raw creation input and assigns a fresh `StoryId`.
    ///
    /// Text is stored exactly as given; whitespace-only values count as empty.
    pub fn parse(creator_id: &str, title: &str, opening_text: &str) -> Result<Self, ValidationError> {
        let creator = UserId::parse(creator_id)?;
        validate_title(title)?;
        validate_block_text(opening_text)?;
        Ok(Self {
            story_id: Uuid::new_v4(),
            creator,
            title: title.to_string(),
            opening_text: opening_text.to_string(),
        })
    }
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

pub fn validate_block_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NewStory, ValidationError};

    #[test]
    fn parse_keeps_text_verbatim() {
        let input = NewStory::parse("alice", "  Title ", "Once upon a time\n").unwrap();
        assert_eq!(input.creator.as_str(), "alice");
        assert_eq!(input.title, "  Title ");
        assert_eq!(input.opening_text, "Once upon a time\n");
    }

    #[test]
    fn parse_assigns_distinct_ids() {
        let first = NewStory::parse("alice", "Title", "text").unwrap();
        let second = NewStory::parse("alice", "Title", "text").unwrap();
        assert_ne!(first.story_id, second.story_id);
    }

    #[test]
    fn parse_rejects_blank_fields() {
        assert_eq!(
            NewStory::parse("alice", " ", "text").unwrap_err(),
            ValidationError::EmptyTitle
        );
        assert_eq!(
            NewStory::parse("alice", "Title", "\t\n").unwrap_err(),
            ValidationError::EmptyText
        );
        assert_eq!(
            NewStory::parse("", "Title", "text").unwrap_err(),
            ValidationError::EmptyUserId
        );
    }
}
