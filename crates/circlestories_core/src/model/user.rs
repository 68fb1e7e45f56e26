//! Opaque user identifier supplied by the external identity provider.
//!
//! # Invariants
//! - Non-empty, no leading/trailing whitespace, no control characters.
//! - At most `USER_ID_MAX_CHARS` characters.
//! - No further structure is assumed; the core never creates or deletes users.

use crate::model::story::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Longest accepted identifier, in characters.
pub const USER_ID_MAX_CHARS: usize = 128;

static USER_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s\p{Cc}](?:[^\p{Cc}]*[^\s\p{Cc}])?$").expect("valid user id regex")
});

/// Stable identifier of an externally managed user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validates and wraps a raw identifier.
    ///
    /// # Errors
    /// - `EmptyUserId` when `raw` is empty or whitespace-only.
    /// - `MalformedUserId` when `raw` has surrounding whitespace, control
    ///   characters, or exceeds `USER_ID_MAX_CHARS`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::EmptyUserId);
        }
        if raw.chars().count() > USER_ID_MAX_CHARS || !USER_ID_RE.is_match(raw) {
            return Err(ValidationError::MalformedUserId(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}
