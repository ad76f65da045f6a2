//! `POST /api/question`: answer a question against the user's health context.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use wattle_persistence::core::{ConversationRepository, DocumentStore};
use wattle_persistence::types::{ConversationTurn, current_timestamp};

use super::context::{gather_context, previous_turn};
use crate::ai::prompts::{ANSWER_UNAVAILABLE, RecordDigest, question_messages};
use crate::ai::extract_tag_or_all;
use crate::auth::AuthenticatedUser;
use crate::error::{RestError, RestResult};
use crate::extractors::JsonBody;
use crate::state::AppState;

/// Body of `POST /api/question`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    /// Must match the token user when present.
    pub user_id: Option<String>,
    /// The question.
    pub question: String,
    /// Turn this question follows up on.
    pub previous_response_id: Option<String>,
    /// Whether to synthesise speech for the answer.
    #[serde(default)]
    pub generate_audio: bool,
    /// Voice for speech; the configured voice otherwise.
    pub voice_preference: Option<String>,
}

/// Response of `POST /api/question`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    /// Whether the model answered.
    pub success: bool,
    /// The answer, or a placeholder.
    pub answer: String,
    /// Synthesised speech, when requested and produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Id of the stored turn; absent when the model failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

async fn synthesize<S>(
    state: &AppState<S>,
    user: &AuthenticatedUser,
    answer: &str,
    voice: &str,
) -> Option<String>
where
    S: DocumentStore + Send + Sync + 'static,
{
    let audio = match state.ai().speak(answer, voice).await {
        Ok(audio) => audio,
        Err(e) => {
            warn!(error = %e, "Speech synthesis failed");
            return None;
        }
    };
    match state.blobs().put(user.user_id(), "answer.mp3", audio).await {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(error = %e, "Failed to store answer audio");
            None
        }
    }
}

/// Answers a question.
///
/// # Response
///
/// - `200 OK` - `{success, answer, audioUrl?, id}`
/// - `400 Bad Request` - empty question
/// - `401 Unauthorized` - body `userId` differs from the token user
pub async fn question_handler<S>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
    JsonBody(body): JsonBody<QuestionRequest>,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    user.ensure_same_user(body.user_id.as_deref())?;
    let question = body.question.trim();
    if question.is_empty() {
        return Err(RestError::bad_request("Question must not be empty"));
    }

    let (context, previous) = tokio::join!(
        gather_context(&state, &user),
        previous_turn(&state, &user, body.previous_response_id.as_deref())
    );
    let digests: Vec<RecordDigest> = context.records.iter().map(RecordDigest::from).collect();
    debug!(
        user_id = %user.user_id(),
        records = digests.len(),
        follow_up = previous.is_some(),
        "Answering question"
    );

    let messages = question_messages(question, &context.profile_text, &digests, previous.as_ref());
    let answer = match state.ai().chat(messages).await {
        Ok(completion) => extract_tag_or_all(&completion.text, "ANSWER"),
        Err(e) => {
            warn!(user_id = %user.user_id(), error = %e, "Question answering failed");
            String::new()
        }
    };
    if answer.is_empty() {
        return Ok(Json(QuestionResponse {
            success: false,
            answer: ANSWER_UNAVAILABLE.to_string(),
            audio_url: None,
            id: None,
        })
        .into_response());
    }

    let audio_url = if body.generate_audio {
        let voice = body
            .voice_preference
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(&state.config().speech_voice);
        synthesize(&state, &user, &answer, voice).await
    } else {
        None
    };

    let turn = ConversationRepository::new(state.storage(), user.context())
        .add(ConversationTurn {
            id: String::new(),
            question: question.to_string(),
            answer: answer.clone(),
            timestamp: current_timestamp(),
            audio_url: audio_url.clone(),
            previous_response_id: body.previous_response_id.filter(|id| !id.is_empty()),
        })
        .await?;
    info!(user_id = %user.user_id(), turn_id = %turn.id, "Question answered");

    Ok(Json(QuestionResponse {
        success: true,
        answer,
        audio_url,
        id: Some(turn.id),
    })
    .into_response())
}
