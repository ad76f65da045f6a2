//! `GET /files/{*key}`: serves the caller's own blobs.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use wattle_persistence::core::DocumentStore;

use crate::auth::AuthenticatedUser;
use crate::error::RestResult;
use crate::state::AppState;

/// Returns a blob with its guessed content type.
///
/// # Response
///
/// - `200 OK` - file bytes
/// - `404 Not Found` - no such file, or it belongs to another user
pub async fn file_handler<S>(
    State(state): State<AppState<S>>,
    Path(key): Path<String>,
    user: AuthenticatedUser,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    let blob = state.blobs().get(user.user_id(), &key).await?;
    Ok((
        [(header::CONTENT_TYPE, blob.content_type.to_string())],
        blob.bytes,
    )
        .into_response())
}
