//! Authenticated user extractor.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;
use wattle_persistence::core::DocumentStore;
use wattle_persistence::user::{UserContext, UserId};

use super::verifier::{AuthError, bearer_token};
use crate::error::RestError;
use crate::state::AppState;

/// Request-id header set by the request-id middleware.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Axum extractor resolving the bearer token to a [`UserContext`].
///
/// Rejects with 401 before the handler runs, so no handler touches the
/// store for an unauthenticated request.
///
/// # Example
///
/// ```rust,ignore
/// use wattle_rest::auth::AuthenticatedUser;
///
/// async fn handler(user: AuthenticatedUser) {
///     println!("User: {}", user.user_id());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    context: UserContext,
}

impl AuthenticatedUser {
    /// Wraps an already-resolved context.
    pub fn new(context: UserContext) -> Self {
        Self { context }
    }

    /// Returns the user context used for repository calls.
    pub fn context(&self) -> &UserContext {
        &self.context
    }

    /// Returns the user ID.
    pub fn user_id(&self) -> &UserId {
        self.context.user_id()
    }

    /// Checks a client-supplied user id against the token's user.
    ///
    /// Request bodies may carry a `userId`; it is never trusted for
    /// addressing, but a mismatch is refused.
    pub fn ensure_same_user(&self, claimed: Option<&str>) -> Result<(), RestError> {
        match claimed {
            Some(claimed) if claimed != self.user_id().as_str() => Err(RestError::unauthorized(
                "userId does not match the authenticated user",
            )),
            _ => Ok(()),
        }
    }
}

impl From<AuthError> for RestError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Config(message) => RestError::InternalError { message },
            other => RestError::unauthorized(other.to_string()),
        }
    }
}

impl<S> FromRequestParts<AppState<S>> for AuthenticatedUser
where
    S: DocumentStore + Send + Sync + 'static,
{
    type Rejection = RestError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::MalformedHeader)?;
        let token = bearer_token(header)?;

        let user_id = state.verifier().verify(token).await.inspect_err(|err| {
            debug!(error = %err, "Rejected bearer token");
        })?;

        let mut context = UserContext::new(user_id);
        if let Some(request_id) = parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
        {
            context = context.with_correlation_id(request_id);
        }

        Ok(Self { context })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> AuthenticatedUser {
        AuthenticatedUser::new(UserContext::new(UserId::parse(id).unwrap()))
    }

    #[test]
    fn test_ensure_same_user() {
        let alice = user("alice");
        assert!(alice.ensure_same_user(None).is_ok());
        assert!(alice.ensure_same_user(Some("alice")).is_ok());
        assert!(matches!(
            alice.ensure_same_user(Some("bob")),
            Err(RestError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_auth_error_maps_to_401() {
        let err: RestError = AuthError::MissingToken.into();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
        let err: RestError = AuthError::Config("x".into()).into();
        assert_eq!(
            err.status_code(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
