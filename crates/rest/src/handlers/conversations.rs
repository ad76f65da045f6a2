//! Conversation history handlers.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use wattle_persistence::core::{ConversationRepository, DocumentStore};

use super::count_param;
use crate::auth::AuthenticatedUser;
use crate::error::RestResult;
use crate::extractors::SearchParams;
use crate::state::AppState;

/// `GET /api/conversations`: turns newest first, honouring `_count`.
pub async fn list_conversations_handler<S>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
    params: SearchParams,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    let limit = count_param(&params, state.max_page_size())?;
    let turns = ConversationRepository::new(state.storage(), user.context())
        .list(limit)
        .await?;
    Ok(Json(turns).into_response())
}

/// `GET /api/conversations/{id}`: one turn, 404 if absent.
pub async fn get_conversation_handler<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    user: AuthenticatedUser,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    let turn = ConversationRepository::new(state.storage(), user.context())
        .require(&id)
        .await?;
    Ok(Json(turn).into_response())
}
