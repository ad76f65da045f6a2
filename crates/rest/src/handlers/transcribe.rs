//! `POST /api/transcribe`: speech to text.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use wattle_persistence::core::DocumentStore;

use crate::ai::{AudioClip, decode_data_url};
use crate::auth::AuthenticatedUser;
use crate::error::{RestError, RestResult};
use crate::extractors::JsonBody;
use crate::state::AppState;

/// Body of `POST /api/transcribe`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeRequest {
    /// Must match the token user when present.
    pub user_id: Option<String>,
    /// Recording as a base64 `data:` URL.
    pub audio: String,
}

/// Response of `POST /api/transcribe`.
#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    /// Always `true`; failures are error responses.
    pub success: bool,
    /// Transcribed text.
    pub text: String,
}

/// Transcribes a recording.
///
/// # Response
///
/// - `200 OK` - `{success, text}`
/// - `400 Bad Request` - `audio` is not a base64 data URL
/// - `500 Internal Server Error` - the provider failed
pub async fn transcribe_handler<S>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
    JsonBody(body): JsonBody<TranscribeRequest>,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    user.ensure_same_user(body.user_id.as_deref())?;
    let (mime_type, bytes) =
        decode_data_url(&body.audio).map_err(|e| RestError::bad_request(e.to_string()))?;
    if bytes.is_empty() {
        return Err(RestError::bad_request("Audio must not be empty"));
    }
    debug!(user_id = %user.user_id(), mime_type = %mime_type, bytes = bytes.len(), "Transcribing audio");

    let text = state
        .ai()
        .transcribe(AudioClip { bytes, mime_type })
        .await?;
    Ok(Json(TranscribeResponse {
        success: true,
        text: text.trim().to_string(),
    })
    .into_response())
}
