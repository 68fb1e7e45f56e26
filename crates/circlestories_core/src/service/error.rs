//! Caller-facing error for story use-cases.

use crate::db::DbError;
use crate::model::story::{StoryId, ValidationError};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoryResult<T> = Result<T, StoryError>;

/// Service error for story use-cases.
#[derive(Debug)]
pub enum StoryError {
    /// Empty title/text or malformed user id. Caller-correctable.
    InvalidInput(ValidationError),
    /// Unknown story id. Distinct from "story with no contributors".
    NotFound(StoryId),
    /// Identity provider returned no current user.
    Unauthenticated,
    /// Stored data broke a core invariant (for example a story without
    /// block 0). Must be alerted on, never silently recovered.
    ConsistencyFault { story_id: StoryId, details: String },
    /// Storage-layer failure (I/O, locking, constraint violation).
    Storage(RepoError),
}

impl StoryError {
    /// Returns whether the caller can fix the problem by changing input.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::NotFound(_) | Self::Unauthenticated
        )
    }

    /// Stable short code for log lines and presentation layers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::Unauthenticated => "unauthenticated",
            Self::ConsistencyFault { .. } => "consistency_fault",
            Self::Storage(_) => "storage_failure",
        }
    }
}

impl Display for StoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "invalid input: {err}"),
            Self::NotFound(story_id) => write!(f, "story not found: {story_id}"),
            Self::Unauthenticated => write!(f, "login required"),
            Self::ConsistencyFault { story_id, details } => {
                write!(f, "consistency fault in story {story_id}: {details}")
            }
            Self::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for StoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for StoryError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<RepoError> for StoryError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidInput(err),
            RepoError::NotFound(story_id) => Self::NotFound(story_id),
            RepoError::EmptyStory(story_id)
            | RepoError::MissingOpeningBlock(story_id)
            | RepoError::SequenceGap { story_id, .. } => Self::ConsistencyFault {
                story_id,
                details: value.to_string(),
            },
            other => Self::Storage(other),
        }
    }
}

impl From<DbError> for StoryError {
    fn from(value: DbError) -> Self {
        Self::Storage(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for StoryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(RepoError::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::StoryError;
    use crate::model::story::ValidationError;
    use crate::repo::RepoError;
    use uuid::Uuid;

    #[test]
    fn repo_errors_map_to_semantic_variants() {
        let story_id = Uuid::new_v4();
        assert!(matches!(
            StoryError::from(RepoError::NotFound(story_id)),
            StoryError::NotFound(id) if id == story_id
        ));
        assert!(matches!(
            StoryError::from(RepoError::EmptyStory(story_id)),
            StoryError::ConsistencyFault { story_id: id, .. } if id == story_id
        ));
        assert!(matches!(
            StoryError::from(RepoError::Validation(ValidationError::EmptyText)),
            StoryError::InvalidInput(ValidationError::EmptyText)
        ));
    }

    #[test]
    fn caller_errors_are_distinguished_from_system_errors() {
        assert!(StoryError::from(ValidationError::EmptyTitle).is_caller_error());
        assert!(StoryError::NotFound(Uuid::new_v4()).is_caller_error());
        assert!(StoryError::Unauthenticated.is_caller_error());

        let fault = StoryError::from(RepoError::EmptyStory(Uuid::new_v4()));
        assert!(!fault.is_caller_error());
        assert_eq!(fault.code(), "consistency_fault");

        let gap = StoryError::from(RepoError::SequenceGap {
            story_id: Uuid::new_v4(),
            expected: 2,
            found: 3,
        });
        assert_eq!(gap.code(), "consistency_fault");
        assert!(StoryError::from(RepoError::MissingOpeningBlock(Uuid::new_v4()))
            .to_string()
            .contains("missing block 0"));

        let storage = StoryError::from(RepoError::InvalidData("bad row".to_string()));
        assert!(!storage.is_caller_error());
        assert_eq!(storage.code(), "storage_failure");
    }
}
