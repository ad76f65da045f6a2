//! Delete interaction handlers.
//!
//! - `DELETE /api/fhir/{resourceType}/{id}`
//! - `DELETE /api/fhir/{resourceType}?_id={id}`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::debug;
use wattle_persistence::core::{DocumentStore, ResourceRepository};

use crate::auth::AuthenticatedUser;
use crate::error::{RestError, RestResult};
use crate::extractors::SearchParams;
use crate::state::AppState;

/// Handler for the delete interaction.
///
/// # Response
///
/// - `204 No Content` - resource deleted
/// - `404 Not Found` - no such resource
pub async fn delete_handler<S>(
    State(state): State<AppState<S>>,
    Path((resource_type, id)): Path<(String, String)>,
    user: AuthenticatedUser,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    delete(&state, &user, &resource_type, &id).await
}

/// Collection-level delete; `_id` is required.
///
/// # Response
///
/// - `204 No Content` - resource deleted
/// - `400 Bad Request` - no `_id` given
/// - `404 Not Found` - no such resource
pub async fn delete_collection_handler<S>(
    State(state): State<AppState<S>>,
    Path(resource_type): Path<String>,
    user: AuthenticatedUser,
    params: SearchParams,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    let id = params
        .get("_id")
        .ok_or_else(|| RestError::bad_request("Resource id is required for delete"))?
        .to_string();
    delete(&state, &user, &resource_type, &id).await
}

async fn delete<S>(
    state: &AppState<S>,
    user: &AuthenticatedUser,
    resource_type: &str,
    id: &str,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    debug!(
        resource_type = %resource_type,
        id = %id,
        user_id = %user.user_id(),
        "Processing delete request"
    );

    ResourceRepository::new(state.storage(), user.context())
        .delete(resource_type, id)
        .await?;

    debug!(resource_type = %resource_type, id = %id, "Resource deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}
