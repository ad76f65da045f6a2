//! User profile and holistic analysis documents.
//!
//! The profile is a free-form object stored as document `{userId}` in the
//! top-level `users` collection. The holistic analysis is the single
//! document `holistic` in `users/{userId}/analysis`.

use serde_json::{Map, Value};

use crate::core::DocumentStore;
use crate::error::{StorageResult, ValidationError};
use crate::path::CollectionPath;
use crate::types::{Document, HolisticAnalysis};
use crate::user::UserContext;

const HOLISTIC_DOC: &str = "holistic";

/// Per-user singleton documents.
pub struct ProfileRepository<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    user: &'a UserContext,
}

impl<'a, S: DocumentStore + ?Sized> ProfileRepository<'a, S> {
    /// Creates a repository for the given user.
    pub fn new(store: &'a S, user: &'a UserContext) -> Self {
        Self { store, user }
    }

    /// Returns the profile, or an empty object if none was saved.
    pub async fn get(&self) -> StorageResult<Value> {
        let doc = self
            .store
            .get(&CollectionPath::users(), self.user.user_id().as_str())
            .await?;
        Ok(doc
            .map(Document::into_data)
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    /// Replaces the profile.
    pub async fn put(&self, profile: Value) -> StorageResult<Value> {
        if !profile.is_object() {
            return Err(ValidationError::InvalidResource {
                message: "profile must be a JSON object".to_string(),
            }
            .into());
        }
        self.store
            .put(
                &CollectionPath::users(),
                Document::new(self.user.user_id().as_str(), profile.clone()),
            )
            .await?;
        Ok(profile)
    }

    /// Returns the stored holistic analysis, if any.
    pub async fn holistic(&self) -> StorageResult<Option<HolisticAnalysis>> {
        let collection = CollectionPath::analysis(self.user.user_id());
        match self.store.get(&collection, HOLISTIC_DOC).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc.into_data())?)),
            None => Ok(None),
        }
    }

    /// Stores the holistic analysis, replacing the previous one.
    pub async fn put_holistic(&self, analysis: &HolisticAnalysis) -> StorageResult<()> {
        let collection = CollectionPath::analysis(self.user.user_id());
        let body = serde_json::to_value(analysis)?;
        self.store
            .put(&collection, Document::new(HOLISTIC_DOC, body))
            .await
    }
}

/// Renders a profile as `key: value` lines for prompts.
pub fn profile_text(profile: &Value) -> String {
    match profile {
        Value::Object(map) if !map.is_empty() => map
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("{}: {}", k, s),
                other => format!("{}: {}", k, other),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::memory::MemoryStore;
    use crate::user::UserId;
    use chrono::Utc;
    use serde_json::json;

    #[tokio::test]
    async fn test_profile_defaults_to_empty() {
        let store = MemoryStore::new();
        let ctx = UserContext::new(UserId::parse("u1").unwrap());
        let repo = ProfileRepository::new(&store, &ctx);
        assert_eq!(repo.get().await.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_profile_roundtrip_and_validation() {
        let store = MemoryStore::new();
        let ctx = UserContext::new(UserId::parse("u1").unwrap());
        let repo = ProfileRepository::new(&store, &ctx);

        repo.put(json!({"age": 42, "conditions": "asthma"})).await.unwrap();
        assert_eq!(repo.get().await.unwrap()["age"], 42);
        assert!(repo.put(json!("not an object")).await.is_err());
    }

    #[tokio::test]
    async fn test_holistic_roundtrip() {
        let store = MemoryStore::new();
        let ctx = UserContext::new(UserId::parse("u1").unwrap());
        let repo = ProfileRepository::new(&store, &ctx);
        assert!(repo.holistic().await.unwrap().is_none());

        let analysis = HolisticAnalysis {
            analysis: "Stable".to_string(),
            generated_at: Utc::now(),
            record_count: 3,
        };
        repo.put_holistic(&analysis).await.unwrap();
        let loaded = repo.holistic().await.unwrap().unwrap();
        assert_eq!(loaded.analysis, "Stable");
        assert_eq!(loaded.record_count, 3);
    }

    #[test]
    fn test_profile_text() {
        let text = profile_text(&json!({"age": 42, "sex": "F"}));
        assert!(text.contains("age: 42"));
        assert!(text.contains("sex: F"));
        assert_eq!(profile_text(&json!({})), "");
    }
}
