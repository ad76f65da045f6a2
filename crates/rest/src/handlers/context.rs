//! Prompt context gathering shared by the AI handlers.

use serde::de::DeserializeOwned;
use tracing::warn;
use wattle_persistence::core::{
    ConversationRepository, DocumentStore, ProfileRepository, RecordRepository, profile_text,
};
use wattle_persistence::types::{ConversationTurn, HealthRecord};

use crate::auth::AuthenticatedUser;
use crate::error::{RestError, RestResult};
use crate::state::AppState;

/// Profile and records for one user.
#[derive(Debug, Default)]
pub struct UserContextData {
    /// Profile rendered as `key: value` lines.
    pub profile_text: String,
    /// All records, newest first.
    pub records: Vec<HealthRecord>,
}

/// Loads the profile and records concurrently.
///
/// A failed branch is logged and replaced by empty data.
pub async fn gather_context<S>(state: &AppState<S>, user: &AuthenticatedUser) -> UserContextData
where
    S: DocumentStore + Send + Sync + 'static,
{
    let profiles = ProfileRepository::new(state.storage(), user.context());
    let records = RecordRepository::new(state.storage(), user.context());

    let (profile, records) = tokio::join!(profiles.get(), records.list(None));
    UserContextData {
        profile_text: profile
            .map(|p| profile_text(&p))
            .unwrap_or_else(|e| {
                warn!(user_id = %user.user_id(), error = %e, "Failed to load profile");
                String::new()
            }),
        records: records.unwrap_or_else(|e| {
            warn!(user_id = %user.user_id(), error = %e, "Failed to load records");
            Vec::new()
        }),
    }
}

/// Loads the turn a question follows up on; failures are logged.
pub async fn previous_turn<S>(
    state: &AppState<S>,
    user: &AuthenticatedUser,
    id: Option<&str>,
) -> Option<ConversationTurn>
where
    S: DocumentStore + Send + Sync + 'static,
{
    let id = id.filter(|id| !id.is_empty())?;
    match ConversationRepository::new(state.storage(), user.context())
        .get(id)
        .await
    {
        Ok(turn) => turn,
        Err(e) => {
            warn!(previous_response_id = %id, error = %e, "Failed to load previous turn");
            None
        }
    }
}

/// Parses an optional JSON body; an empty body yields `T::default()`.
pub fn optional_body<T: DeserializeOwned + Default>(bytes: &[u8]) -> RestResult<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(bytes)
        .map_err(|e| RestError::bad_request(format!("Invalid JSON body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Body {
        user_id: Option<String>,
    }

    #[test]
    fn test_optional_body() {
        assert_eq!(optional_body::<Body>(b"").unwrap(), Body::default());
        assert_eq!(optional_body::<Body>(b"  \n").unwrap(), Body::default());
        assert_eq!(
            optional_body::<Body>(br#"{"userId":"u1"}"#).unwrap().user_id,
            Some("u1".to_string())
        );
        assert!(optional_body::<Body>(b"{").is_err());
    }
}
