//! Hierarchical collection paths.
//!
//! Documents are addressed by a collection path plus a document id, in the
//! style of a hosted document database:
//!
//! | Collection | Contents |
//! |------------|----------|
//! | `users` | One profile document per user, keyed by user id |
//! | `users/{userId}/records` | Uploaded health records |
//! | `users/{userId}/fhir/{resourceType}` | FHIR-shaped resources |
//! | `users/{userId}/conversations` | Question/answer turns |
//! | `users/{userId}/analysis` | Generated analyses (e.g. `holistic`) |

use std::fmt;

use crate::error::ValidationError;
use crate::user::UserId;

/// A validated collection path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath {
    segments: Vec<String>,
}

impl CollectionPath {
    /// Builds a path from raw segments, validating each one.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(ValidationError::InvalidPathSegment {
                segment: String::new(),
                message: "a collection path needs at least one segment".to_string(),
            });
        }
        for segment in &segments {
            validate_segment(segment)?;
        }
        Ok(Self { segments })
    }

    /// Parses a `/`-separated path such as `users/u1/records`.
    pub fn parse(path: &str) -> Result<Self, ValidationError> {
        Self::from_segments(path.split('/'))
    }

    /// The top-level `users` collection holding profile documents.
    pub fn users() -> Self {
        Self {
            segments: vec!["users".to_string()],
        }
    }

    /// `users/{userId}/records`
    pub fn records(user: &UserId) -> Self {
        Self::user_child(user, &["records"])
    }

    /// `users/{userId}/conversations`
    pub fn conversations(user: &UserId) -> Self {
        Self::user_child(user, &["conversations"])
    }

    /// `users/{userId}/analysis`
    pub fn analysis(user: &UserId) -> Self {
        Self::user_child(user, &["analysis"])
    }

    /// `users/{userId}/fhir/{resourceType}`
    ///
    /// The resource type must be a FHIR-style type name: an ASCII letter
    /// followed by ASCII letters or digits.
    pub fn fhir(user: &UserId, resource_type: &str) -> Result<Self, ValidationError> {
        validate_resource_type(resource_type)?;
        Ok(Self::user_child(user, &["fhir", resource_type]))
    }

    fn user_child(user: &UserId, rest: &[&str]) -> Self {
        let mut segments = vec!["users".to_string(), user.as_str().to_string()];
        segments.extend(rest.iter().map(|s| s.to_string()));
        Self { segments }
    }

    /// Returns the path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the last segment (the collection's own name).
    pub fn name(&self) -> &str {
        self.segments
            .last()
            .map(String::as_str)
            .unwrap_or_default()
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Checks that a string can be used as one path segment or document id.
pub(crate) fn validate_segment(segment: &str) -> Result<(), ValidationError> {
    let message = if segment.is_empty() {
        Some("segment must not be empty")
    } else if segment.contains('/') {
        Some("segment must not contain '/'")
    } else if segment == "." || segment == ".." {
        Some("relative segments are not allowed")
    } else if segment.chars().any(char::is_control) {
        Some("segment must not contain control characters")
    } else {
        None
    };

    match message {
        Some(message) => Err(ValidationError::InvalidPathSegment {
            segment: segment.to_string(),
            message: message.to_string(),
        }),
        None => Ok(()),
    }
}

/// Checks that a resource type looks like a FHIR type name.
pub fn validate_resource_type(resource_type: &str) -> Result<(), ValidationError> {
    let mut chars = resource_type.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidPathSegment {
            segment: resource_type.to_string(),
            message: "resource type must be alphanumeric and start with a letter".to_string(),
        })
    }
}
