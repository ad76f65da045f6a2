//! In-memory document store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::core::DocumentStore;
use crate::error::{ResourceError, StorageError, StorageResult};
use crate::path::CollectionPath;
use crate::query::apply;
use crate::types::{Document, DocumentQuery};

type Collection = BTreeMap<String, Document>;

/// A process-local document store.
///
/// Collections are created on first write. Nothing is persisted; this is
/// the default backend for development and for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<CollectionPath, Collection>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of documents across all collections.
    pub fn len(&self) -> usize {
        self.collections.read().values().map(BTreeMap::len).sum()
    }

    /// Returns true if no documents are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, collection: &CollectionPath, id: &str) -> StorageResult<Option<Document>> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|c| c.get(id))
            .cloned())
    }

    async fn put(&self, collection: &CollectionPath, document: Document) -> StorageResult<()> {
        self.collections
            .write()
            .entry(collection.clone())
            .or_default()
            .insert(document.id().to_string(), document);
        Ok(())
    }

    async fn insert(&self, collection: &CollectionPath, document: Document) -> StorageResult<()> {
        let mut collections = self.collections.write();
        let docs = collections.entry(collection.clone()).or_default();
        if docs.contains_key(document.id()) {
            return Err(StorageError::Resource(ResourceError::AlreadyExists {
                resource_type: collection.name().to_string(),
                id: document.id().to_string(),
            }));
        }
        docs.insert(document.id().to_string(), document);
        Ok(())
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> StorageResult<bool> {
        Ok(self
            .collections
            .write()
            .get_mut(collection)
            .is_some_and(|c| c.remove(id).is_some()))
    }

    async fn query(
        &self,
        collection: &CollectionPath,
        query: &DocumentQuery,
    ) -> StorageResult<Vec<Document>> {
        let documents: Vec<Document> = self
            .collections
            .read()
            .get(collection)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default();
        Ok(apply(documents, query))
    }
}
