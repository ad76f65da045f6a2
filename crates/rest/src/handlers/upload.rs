//! Upload handler.
//!
//! `POST /api/upload` (multipart): one or more `files` parts plus optional
//! `recordName` and `comment` fields. Files go to the blob store in
//! sequential batches; the writes inside a batch run concurrently.

use std::time::Duration;

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};
use wattle_persistence::core::{DocumentStore, RecordRepository};
use wattle_persistence::types::HealthRecord;
use wattle_persistence::user::UserId;

use crate::auth::AuthenticatedUser;
use crate::blob::{BlobError, BlobStore, delete_urls};
use crate::error::{RestError, RestResult};
use crate::state::AppState;

/// A file received in the upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied file name.
    pub filename: String,
    /// File content.
    pub bytes: Vec<u8>,
}

/// Response of `POST /api/upload`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Id of the created record.
    pub record_id: String,
    /// Blob URLs, in upload order.
    pub file_urls: Vec<String>,
}

/// Writes files in batches of `batch_size`, pausing `delay` between batches.
///
/// Returns URLs in the order the files were given. The first failed write
/// aborts the remaining batches, and every file already written is deleted
/// again before the error is returned.
pub async fn store_in_batches(
    blobs: &dyn BlobStore,
    user: &UserId,
    files: Vec<UploadedFile>,
    batch_size: usize,
    delay: Duration,
) -> Result<Vec<String>, BlobError> {
    let batch_size = batch_size.max(1);
    let mut urls = Vec::with_capacity(files.len());
    let mut remaining = files.into_iter().peekable();
    let mut batch_index = 0;

    while remaining.peek().is_some() {
        if batch_index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let batch: Vec<UploadedFile> = remaining.by_ref().take(batch_size).collect();
        debug!(batch = batch_index, files = batch.len(), "Writing upload batch");

        let writes = batch
            .into_iter()
            .map(|file| async move { blobs.put(user, &file.filename, file.bytes).await });
        let mut failure = None;
        for result in join_all(writes).await {
            match result {
                Ok(url) => urls.push(url),
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }
        if let Some(e) = failure {
            warn!(written = urls.len(), error = %e, "Upload failed, removing stored files");
            delete_urls(blobs, user, &urls).await;
            return Err(e);
        }
        batch_index += 1;
    }

    Ok(urls)
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> RestError {
    RestError::bad_request(format!("Invalid multipart body: {}", err.body_text()))
}

/// Handler for multipart uploads.
///
/// # Response
///
/// - `201 Created` - `{recordId, fileUrls}`
/// - `400 Bad Request` - no files, or a malformed multipart body
pub async fn upload_handler<S>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    let mut files = Vec::new();
    let mut record_name: Option<String> = None;
    let mut comment: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "files" | "files[]" | "file" => {
                let filename = field.file_name().unwrap_or("file").to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                files.push(UploadedFile {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            "recordName" => record_name = Some(field.text().await.map_err(multipart_error)?),
            "comment" => comment = Some(field.text().await.map_err(multipart_error)?),
            "userId" => {
                let claimed = field.text().await.map_err(multipart_error)?;
                user.ensure_same_user(Some(&claimed))?;
            }
            other => debug!(field = %other, "Ignoring unknown upload field"),
        }
    }

    if files.is_empty() {
        return Err(RestError::bad_request("No files uploaded"));
    }

    let record_name = record_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| files[0].filename.clone());
    let comment = comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let config = state.config();
    let file_count = files.len();
    let urls = store_in_batches(
        state.blobs(),
        user.user_id(),
        files,
        config.upload_batch_size,
        Duration::from_millis(config.upload_batch_delay_ms),
    )
    .await?;

    let created = RecordRepository::new(state.storage(), user.context())
        .create(HealthRecord::new(record_name, urls.clone(), comment))
        .await;
    let record = match created {
        Ok(record) => record,
        Err(e) => {
            delete_urls(state.blobs(), user.user_id(), &urls).await;
            return Err(e.into());
        }
    };

    info!(
        user_id = %user.user_id(),
        record_id = %record.id,
        files = file_count,
        "Upload stored"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            record_id: record.id,
            file_urls: record.urls,
        }),
    )
        .into_response())
}
