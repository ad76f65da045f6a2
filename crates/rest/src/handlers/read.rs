//! Read interaction handler.
//!
//! `GET /api/fhir/{resourceType}/{id}`

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::debug;
use wattle_persistence::core::{DocumentStore, ResourceRepository};

use crate::auth::AuthenticatedUser;
use crate::error::RestResult;
use crate::state::AppState;

/// Handler for the read interaction.
///
/// # Response
///
/// - `200 OK` - the stored resource
/// - `404 Not Found` - no such resource for this user
pub async fn read_handler<S>(
    State(state): State<AppState<S>>,
    Path((resource_type, id)): Path<(String, String)>,
    user: AuthenticatedUser,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    debug!(
        resource_type = %resource_type,
        id = %id,
        user_id = %user.user_id(),
        "Processing read request"
    );

    let resource = ResourceRepository::new(state.storage(), user.context())
        .read(&resource_type, &id)
        .await?;

    Ok(Json(resource).into_response())
}
