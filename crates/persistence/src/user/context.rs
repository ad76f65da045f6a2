//! User context for storage operations.

use super::id::UserId;

/// The resolved identity a request acts on behalf of.
///
/// Repositories derive every collection path from this context, so a request
/// can only ever see the partition of the user it was authenticated as.
#[derive(Debug, Clone)]
pub struct UserContext {
    /// The user identifier.
    user_id: UserId,
    /// Optional correlation ID for request tracing.
    correlation_id: Option<String>,
}

impl UserContext {
    /// Creates a new context for the given user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            correlation_id: None,
        }
    }

    /// Creates a context with the specified correlation ID for tracing.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Returns the user ID.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the correlation ID, if set.
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }
}
