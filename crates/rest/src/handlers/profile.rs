//! Profile handlers.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::debug;
use wattle_persistence::core::{DocumentStore, ProfileRepository};

use crate::auth::AuthenticatedUser;
use crate::error::{RestError, RestResult};
use crate::extractors::JsonBody;
use crate::state::AppState;

/// `GET /api/profile`: the stored profile, `{}` when none.
pub async fn get_profile_handler<S>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    let profile = ProfileRepository::new(state.storage(), user.context())
        .get()
        .await?;
    Ok(Json(profile).into_response())
}

/// `PUT /api/profile`: replaces the profile.
///
/// # Response
///
/// - `200 OK` - the stored profile
/// - `400 Bad Request` - body is not a JSON object
pub async fn put_profile_handler<S>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
    JsonBody(body): JsonBody<Value>,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    if !body.is_object() {
        return Err(RestError::bad_request("Profile must be a JSON object"));
    }
    debug!(user_id = %user.user_id(), "Updating profile");
    let profile = ProfileRepository::new(state.storage(), user.context())
        .put(body)
        .await?;
    Ok(Json(profile).into_response())
}
