//! Health record handlers.
//!
//! - `GET /api/records` - list, newest first
//! - `POST /api/records` - create from JSON
//! - `GET /api/records/{id}` - fetch one
//! - `DELETE /api/records/{id}` - delete, along with its files
//! - `POST /api/records/{id}/comments` - append a comment

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::debug;
use wattle_persistence::core::{DocumentStore, RecordRepository};
use wattle_persistence::types::HealthRecord;

use super::count_param;
use crate::auth::AuthenticatedUser;
use crate::blob::delete_urls;
use crate::error::{RestError, RestResult};
use crate::extractors::{JsonBody, SearchParams};
use crate::state::AppState;

/// Body of `POST /api/records`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    /// Optional; must match the token user when present.
    pub user_id: Option<String>,
    /// Display name.
    pub name: String,
    /// File URLs, in order.
    #[serde(default)]
    pub urls: Vec<String>,
    /// Optional comment.
    pub comment: Option<String>,
}

/// Body of `POST /api/records/{id}/comments`.
#[derive(Debug, Deserialize)]
pub struct NewComment {
    /// Comment text.
    pub comment: String,
}

/// Lists the user's records, newest first. Honours `_count`.
pub async fn list_records_handler<S>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
    params: SearchParams,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    let limit = count_param(&params, state.max_page_size())?;
    let records = RecordRepository::new(state.storage(), user.context())
        .list(limit)
        .await?;
    debug!(user_id = %user.user_id(), count = records.len(), "Listed records");
    Ok(Json(records).into_response())
}

/// Creates a record from JSON.
pub async fn create_record_handler<S>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
    JsonBody(body): JsonBody<NewRecord>,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    user.ensure_same_user(body.user_id.as_deref())?;
    let name = body.name.trim();
    if name.is_empty() {
        return Err(RestError::bad_request("Record name is required"));
    }

    let record = RecordRepository::new(state.storage(), user.context())
        .create(HealthRecord::new(name, body.urls, body.comment))
        .await?;

    let location = format!(
        "{}/api/records/{}",
        state.base_url().trim_end_matches('/'),
        record.id
    );
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(record),
    )
        .into_response())
}

/// Fetches one record.
pub async fn get_record_handler<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    user: AuthenticatedUser,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    let record = RecordRepository::new(state.storage(), user.context())
        .get(&id)
        .await?;
    Ok(Json(record).into_response())
}

/// Deletes a record and the files it references.
pub async fn delete_record_handler<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    user: AuthenticatedUser,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    let records = RecordRepository::new(state.storage(), user.context());
    let record = records.get(&id).await?;
    records.delete(&id).await?;

    delete_urls(state.blobs(), user.user_id(), &record.urls).await;
    debug!(record_id = %id, files = record.urls.len(), "Deleted record");
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Appends a comment to a record.
pub async fn add_comment_handler<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    user: AuthenticatedUser,
    JsonBody(body): JsonBody<NewComment>,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    let comment = body.comment.trim();
    if comment.is_empty() {
        return Err(RestError::bad_request("Comment must not be empty"));
    }

    let record = RecordRepository::new(state.storage(), user.context())
        .add_comment(&id, comment)
        .await?;
    debug!(record_id = %id, comments = record.comments.len(), "Added comment");
    Ok(Json(record).into_response())
}
