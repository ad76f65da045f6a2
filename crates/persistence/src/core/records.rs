//! Health record repository.

use chrono::Utc;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::core::DocumentStore;
use crate::error::{ResourceError, StorageError, StorageResult};
use crate::path::{CollectionPath, validate_segment};
use crate::types::{Document, DocumentQuery, HealthRecord, SortField};
use crate::user::UserContext;

const RECORD: &str = "Record";

/// Records for one user, stored in `users/{userId}/records`.
pub struct RecordRepository<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    collection: CollectionPath,
}

impl<'a, S: DocumentStore + ?Sized> RecordRepository<'a, S> {
    /// Creates a repository over the user's records collection.
    pub fn new(store: &'a S, user: &UserContext) -> Self {
        Self {
            store,
            collection: CollectionPath::records(user.user_id()),
        }
    }

    /// Lists records, newest first.
    pub async fn list(&self, limit: Option<usize>) -> StorageResult<Vec<HealthRecord>> {
        let mut query = DocumentQuery::new().with_sort(SortField::descending("createdAt"));
        query.limit = limit;
        let docs = self.store.query(&self.collection, &query).await?;
        docs.iter().map(decode).collect()
    }

    /// Fetches one record.
    pub async fn get(&self, id: &str) -> StorageResult<HealthRecord> {
        validate_segment(id)?;
        match self.store.get(&self.collection, id).await? {
            Some(doc) => decode(&doc),
            None => Err(not_found(id)),
        }
    }

    /// Stores a new record under a generated id and returns it with the id set.
    pub async fn create(&self, mut record: HealthRecord) -> StorageResult<HealthRecord> {
        record.id = Uuid::new_v4().to_string();
        self.store
            .insert(&self.collection, encode(&record)?)
            .await?;
        debug!(record_id = %record.id, files = record.file_count, "Created record");
        Ok(record)
    }

    /// Stores the analysis text and stamps `analyzedAt`.
    pub async fn set_analysis(&self, id: &str, analysis: &str) -> StorageResult<HealthRecord> {
        let mut record = self.get(id).await?;
        record.analysis = analysis.to_string();
        record.analyzed_at = Some(Utc::now());
        self.store.put(&self.collection, encode(&record)?).await?;
        Ok(record)
    }

    /// Appends a comment.
    pub async fn add_comment(&self, id: &str, comment: &str) -> StorageResult<HealthRecord> {
        let mut record = self.get(id).await?;
        record.comments.push(comment.to_string());
        self.store.put(&self.collection, encode(&record)?).await?;
        Ok(record)
    }

    /// Deletes a record.
    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        validate_segment(id)?;
        if self.store.delete(&self.collection, id).await? {
            debug!(record_id = %id, "Deleted record");
            Ok(())
        } else {
            Err(not_found(id))
        }
    }
}

fn encode(record: &HealthRecord) -> StorageResult<Document> {
    let mut body = serde_json::to_value(record)?;
    if let Value::Object(map) = &mut body {
        map.remove("id");
    }
    Ok(Document::new(&record.id, body))
}

fn decode(doc: &Document) -> StorageResult<HealthRecord> {
    Ok(serde_json::from_value(doc.to_json_with_id())?)
}

fn not_found(id: &str) -> StorageError {
    ResourceError::NotFound {
        resource_type: RECORD.to_string(),
        id: id.to_string(),
    }
    .into()
}
