//! User identifier type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::path::validate_segment;

/// An opaque user identifier, safe to embed in a collection path.
///
/// User ids come from verified auth tokens. Because they become part of a
/// storage path, they must not be empty and must not contain `/`.
///
/// # Examples
///
/// ```
/// use wattle_persistence::user::UserId;
///
/// assert!(UserId::parse("firebase-uid-1").is_ok());
/// assert!(UserId::parse("").is_err());
/// assert!(UserId::parse("alice/../bob").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Parses a user id, rejecting values that cannot be a path segment.
    pub fn parse(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        validate_segment(&id)?;
        Ok(Self(id))
    }

    /// Returns the user ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
