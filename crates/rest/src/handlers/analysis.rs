//! Analysis handlers.
//!
//! - `POST /api/records/{id}/analyze` - analyse one record's files
//! - `POST /api/analysis/holistic` - analyse all records together
//! - `GET /api/analysis/holistic` - the stored holistic analysis
//!
//! Model failures are logged and answered with `success: false` and a
//! placeholder text; nothing is persisted in that case.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use wattle_persistence::core::{DocumentStore, ProfileRepository, RecordRepository, profile_text};
use wattle_persistence::types::{HealthRecord, HolisticAnalysis, current_timestamp};

use super::context::{gather_context, optional_body};
use crate::ai::prompts::{
    ANALYSIS_UNAVAILABLE, HOLISTIC_UNAVAILABLE, RecordDigest, record_analysis_messages,
};
use crate::ai::{AiError, ContentPart, HolisticOptions, encode_data_url, extract_tag};
use crate::auth::AuthenticatedUser;
use crate::blob::Blob;
use crate::error::{RestError, RestResult};
use crate::state::AppState;

/// Response of the analysis endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    /// Whether the model produced the analysis.
    pub success: bool,
    /// Analysis text, or a placeholder on failure.
    pub analysis: String,
    /// `<SUMMARY>` section of a record analysis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl AnalysisResponse {
    fn unavailable(placeholder: &str) -> Self {
        Self {
            success: false,
            analysis: placeholder.to_string(),
            summary: None,
        }
    }
}

/// Optional body of `POST /api/analysis/holistic`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolisticRequest {
    /// Must match the token user when present.
    pub user_id: Option<String>,
}

/// Turns a stored file into a prompt part.
///
/// Images become image parts and PDFs file parts; text is inlined. Other
/// types cannot be read by the model and are skipped.
pub fn blob_to_part(blob: Blob) -> Option<ContentPart> {
    let mime_type = blob.content_type.essence_str().to_string();
    let (kind, subtype) = (blob.content_type.type_(), blob.content_type.subtype());

    if kind == mime::IMAGE {
        Some(ContentPart::ImageUrl(encode_data_url(&mime_type, &blob.bytes)))
    } else if kind == mime::APPLICATION && subtype == mime::PDF {
        Some(ContentPart::File {
            data_url: encode_data_url(&mime_type, &blob.bytes),
            filename: blob.filename,
        })
    } else if kind == mime::TEXT || (kind == mime::APPLICATION && subtype == mime::JSON) {
        Some(ContentPart::Text(format!(
            "File {}:\n{}",
            blob.filename,
            String::from_utf8_lossy(&blob.bytes)
        )))
    } else {
        debug!(filename = %blob.filename, content_type = %mime_type, "Skipping unsupported file");
        None
    }
}

async fn load_parts<S>(
    state: &AppState<S>,
    user: &AuthenticatedUser,
    record: &HealthRecord,
) -> Vec<ContentPart>
where
    S: DocumentStore + Send + Sync + 'static,
{
    let blobs = state.blobs();
    let loads = record.urls.iter().map(|url| async move {
        let key = blobs.key_from_url(url)?;
        blobs.get(user.user_id(), &key).await
    });

    join_all(loads)
        .await
        .into_iter()
        .zip(&record.urls)
        .filter_map(|(result, url)| match result {
            Ok(blob) => blob_to_part(blob),
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to load record file");
                None
            }
        })
        .collect()
}

/// Analyses one record's files.
///
/// # Response
///
/// - `200 OK` - `{success, analysis, summary?}`
/// - `404 Not Found` - no such record
pub async fn analyze_record_handler<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    user: AuthenticatedUser,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    let records = RecordRepository::new(state.storage(), user.context());
    let profiles = ProfileRepository::new(state.storage(), user.context());

    let (record, profile) = tokio::join!(records.get(&id), profiles.get());
    let record = record?;
    let profile_text = profile.map(|p| profile_text(&p)).unwrap_or_else(|e| {
        warn!(user_id = %user.user_id(), error = %e, "Failed to load profile");
        String::new()
    });

    let parts = load_parts(&state, &user, &record).await;
    debug!(record_id = %id, parts = parts.len(), "Analysing record");

    let result: Result<String, AiError> = if parts.is_empty() {
        Err(AiError::InvalidInput("record has no readable files".to_string()))
    } else {
        state
            .ai()
            .chat(record_analysis_messages(&record.name, &profile_text, parts))
            .await
            .map(|completion| completion.text.trim().to_string())
    };

    let response = match result {
        Ok(text) if !text.is_empty() => {
            records.set_analysis(&id, &text).await?;
            info!(record_id = %id, "Record analysed");
            AnalysisResponse {
                success: true,
                summary: extract_tag(&text, "SUMMARY"),
                analysis: text,
            }
        }
        Ok(_) => {
            warn!(record_id = %id, "Model returned an empty analysis");
            AnalysisResponse::unavailable(ANALYSIS_UNAVAILABLE)
        }
        Err(e) => {
            warn!(record_id = %id, error = %e, "Record analysis failed");
            AnalysisResponse::unavailable(ANALYSIS_UNAVAILABLE)
        }
    };
    Ok(Json(response).into_response())
}

/// Generates and stores a holistic analysis.
///
/// # Response
///
/// - `200 OK` - `{success, analysis}`
/// - `401 Unauthorized` - body `userId` differs from the token user
pub async fn holistic_post_handler<S>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
    body: Bytes,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    let request: HolisticRequest = optional_body(&body)?;
    user.ensure_same_user(request.user_id.as_deref())?;

    let context = gather_context(&state, &user).await;
    let options = HolisticOptions {
        records: context.records.iter().map(RecordDigest::from).collect(),
    };

    let result = state
        .analyzer()
        .generate_holistic_analysis(user.user_id(), &context.profile_text, &options)
        .await;

    let response = match result {
        Ok(text) if !text.trim().is_empty() => {
            let stored = HolisticAnalysis {
                analysis: text.trim().to_string(),
                generated_at: current_timestamp(),
                record_count: options.records.len(),
            };
            ProfileRepository::new(state.storage(), user.context())
                .put_holistic(&stored)
                .await?;
            info!(user_id = %user.user_id(), records = stored.record_count, "Holistic analysis stored");
            AnalysisResponse {
                success: true,
                analysis: stored.analysis,
                summary: None,
            }
        }
        Ok(_) => {
            warn!(user_id = %user.user_id(), "Holistic analysis came back empty");
            AnalysisResponse::unavailable(HOLISTIC_UNAVAILABLE)
        }
        Err(e) => {
            warn!(user_id = %user.user_id(), error = %e, "Holistic analysis failed");
            AnalysisResponse::unavailable(HOLISTIC_UNAVAILABLE)
        }
    };
    Ok(Json(response).into_response())
}

/// Returns the stored holistic analysis.
///
/// # Response
///
/// - `200 OK` - `{analysis, generatedAt, recordCount}`
/// - `404 Not Found` - none generated yet
pub async fn holistic_get_handler<S>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    let analysis = ProfileRepository::new(state.storage(), user.context())
        .holistic()
        .await?
        .ok_or_else(|| RestError::NotFound {
            resource_type: "Analysis".to_string(),
            id: "holistic".to_string(),
        })?;
    Ok(Json(analysis).into_response())
}
