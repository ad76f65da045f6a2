//! Conversation history repository.

use serde_json::Value;
use uuid::Uuid;

use crate::core::DocumentStore;
use crate::error::{ResourceError, StorageResult};
use crate::path::{CollectionPath, validate_segment};
use crate::types::{ConversationTurn, Document, DocumentQuery, SortField};
use crate::user::UserContext;

/// Question/answer turns for one user, in `users/{userId}/conversations`.
pub struct ConversationRepository<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    collection: CollectionPath,
}

impl<'a, S: DocumentStore + ?Sized> ConversationRepository<'a, S> {
    /// Creates a repository over the user's conversations collection.
    pub fn new(store: &'a S, user: &UserContext) -> Self {
        Self {
            store,
            collection: CollectionPath::conversations(user.user_id()),
        }
    }

    /// Lists turns, newest first.
    pub async fn list(&self, limit: Option<usize>) -> StorageResult<Vec<ConversationTurn>> {
        let mut query = DocumentQuery::new().with_sort(SortField::descending("timestamp"));
        query.limit = limit;
        self.store
            .query(&self.collection, &query)
            .await?
            .iter()
            .map(|doc| -> StorageResult<ConversationTurn> {
                Ok(serde_json::from_value(doc.to_json_with_id())?)
            })
            .collect()
    }

    /// Fetches one turn.
    pub async fn get(&self, id: &str) -> StorageResult<Option<ConversationTurn>> {
        validate_segment(id)?;
        match self.store.get(&self.collection, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc.to_json_with_id())?)),
            None => Ok(None),
        }
    }

    /// Stores a turn under a generated id.
    pub async fn add(&self, mut turn: ConversationTurn) -> StorageResult<ConversationTurn> {
        turn.id = Uuid::new_v4().to_string();
        let mut body = serde_json::to_value(&turn)?;
        if let Value::Object(map) = &mut body {
            map.remove("id");
        }
        self.store
            .insert(&self.collection, Document::new(&turn.id, body))
            .await?;
        Ok(turn)
    }

    /// Fetches a turn that must exist.
    pub async fn require(&self, id: &str) -> StorageResult<ConversationTurn> {
        self.get(id).await?.ok_or_else(|| {
            ResourceError::NotFound {
                resource_type: "Conversation".to_string(),
                id: id.to_string(),
            }
            .into()
        })
    }
}
