//! Update interaction handlers.
//!
//! - `PUT /api/fhir/{resourceType}/{id}`
//! - `PUT /api/fhir/{resourceType}?_id={id}` (or the body `id`)

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::debug;
use wattle_persistence::core::{DocumentStore, ResourceRepository};

use crate::auth::AuthenticatedUser;
use crate::error::{RestError, RestResult};
use crate::extractors::{JsonBody, SearchParams};
use crate::state::AppState;

/// Handler for the update interaction.
///
/// Replaces the whole resource and bumps `meta.versionId`. An update never
/// creates: a missing resource is a 404.
///
/// # Response
///
/// - `200 OK` - the stored resource
/// - `400 Bad Request` - `resourceType` or `id` in the body do not match
/// - `404 Not Found` - no such resource
pub async fn update_handler<S>(
    State(state): State<AppState<S>>,
    Path((resource_type, id)): Path<(String, String)>,
    user: AuthenticatedUser,
    JsonBody(resource): JsonBody<Value>,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    update(&state, &user, &resource_type, &id, resource).await
}

/// Collection-level update; the id comes from `_id` or the body `id`.
pub async fn update_collection_handler<S>(
    State(state): State<AppState<S>>,
    Path(resource_type): Path<String>,
    user: AuthenticatedUser,
    params: SearchParams,
    JsonBody(resource): JsonBody<Value>,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    let id = params
        .get("_id")
        .map(str::to_string)
        .or_else(|| {
            resource
                .get("id")
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
        })
        .ok_or_else(|| RestError::bad_request("Resource id is required for update"))?;

    update(&state, &user, &resource_type, &id, resource).await
}

async fn update<S>(
    state: &AppState<S>,
    user: &AuthenticatedUser,
    resource_type: &str,
    id: &str,
    resource: Value,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    debug!(
        resource_type = %resource_type,
        id = %id,
        user_id = %user.user_id(),
        "Processing update request"
    );

    let updated = ResourceRepository::new(state.storage(), user.context())
        .update(resource_type, id, resource)
        .await?;

    debug!(
        resource_type = %resource_type,
        id = %id,
        version = ?updated.pointer("/meta/versionId"),
        "Resource updated"
    );

    Ok(Json(updated).into_response())
}
