//! Document store trait.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::path::CollectionPath;
use crate::types::{Document, DocumentQuery};

/// A hierarchical document database.
///
/// Documents live in collections addressed by [`CollectionPath`] and are
/// keyed by id within their collection. Writes are last-write-wins; the only
/// conditional write is [`insert`](DocumentStore::insert), which refuses to
/// overwrite.
///
/// Backends are expected to honour [`DocumentQuery`] with the semantics of
/// [`crate::query::apply`]; the shipped backends call it directly.
///
/// # Example
///
/// ```
/// use wattle_persistence::backends::memory::MemoryStore;
/// use wattle_persistence::core::DocumentStore;
/// use wattle_persistence::path::CollectionPath;
/// use wattle_persistence::types::{Document, DocumentQuery};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let store = MemoryStore::new();
/// let users = CollectionPath::users();
///
/// store.put(&users, Document::new("u1", json!({"name": "Ada"}))).await.unwrap();
/// let found = store.get(&users, "u1").await.unwrap();
/// assert_eq!(found.unwrap().data()["name"], "Ada");
///
/// let all = store.query(&users, &DocumentQuery::new()).await.unwrap();
/// assert_eq!(all.len(), 1);
/// # });
/// ```
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns a human-readable name for this backend.
    fn backend_name(&self) -> &'static str;

    /// Fetches one document.
    async fn get(&self, collection: &CollectionPath, id: &str) -> StorageResult<Option<Document>>;

    /// Writes a document, replacing any existing one with the same id.
    async fn put(&self, collection: &CollectionPath, document: Document) -> StorageResult<()>;

    /// Writes a document only if its id is free.
    ///
    /// # Errors
    ///
    /// * `StorageError::Resource(AlreadyExists)` - if the id is taken
    async fn insert(&self, collection: &CollectionPath, document: Document) -> StorageResult<()>;

    /// Removes a document, returning whether it existed.
    async fn delete(&self, collection: &CollectionPath, id: &str) -> StorageResult<bool>;

    /// Scans a collection.
    async fn query(
        &self,
        collection: &CollectionPath,
        query: &DocumentQuery,
    ) -> StorageResult<Vec<Document>>;

    /// Checks that the backend can serve requests.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
