//! Create interaction handler.
//!
//! `POST /api/fhir/{resourceType}`

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::debug;
use wattle_persistence::core::{DocumentStore, ResourceRepository};

use crate::auth::AuthenticatedUser;
use crate::error::RestResult;
use crate::extractors::JsonBody;
use crate::responses::resource_url;
use crate::state::AppState;

/// Handler for the create interaction.
///
/// The body must carry a `resourceType` equal to the route type. A missing
/// `id` is assigned; an `id` that already exists is refused.
///
/// # Response
///
/// - `201 Created` - the stored resource, with a `Location` header
/// - `400 Bad Request` - missing or mismatched `resourceType`, duplicate id
/// - `401 Unauthorized` - missing or invalid bearer token
///
/// # Example
///
/// ```http
/// POST /api/fhir/Patient HTTP/1.1
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// {"resourceType": "Patient", "name": [{"family": "Smith"}]}
/// ```
pub async fn create_handler<S>(
    State(state): State<AppState<S>>,
    Path(resource_type): Path<String>,
    user: AuthenticatedUser,
    JsonBody(resource): JsonBody<Value>,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    debug!(
        resource_type = %resource_type,
        user_id = %user.user_id(),
        "Processing create request"
    );

    let created = ResourceRepository::new(state.storage(), user.context())
        .create(&resource_type, resource)
        .await?;

    let id = created
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let location = resource_url(state.base_url(), &resource_type, id);

    debug!(resource_type = %resource_type, id = %id, "Resource created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    )
        .into_response())
}
