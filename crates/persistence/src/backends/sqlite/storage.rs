//! DocumentStore implementation for SQLite.

use async_trait::async_trait;
use rusqlite::{OptionalExtension, params};
use serde_json::Value;

use crate::core::DocumentStore;
use crate::error::{BackendError, ResourceError, StorageError, StorageResult};
use crate::path::CollectionPath;
use crate::query::apply;
use crate::types::{Document, DocumentQuery, current_timestamp, format_timestamp};

use super::SqliteBackend;
use super::backend::internal_error;

fn decode(id: String, data: String) -> StorageResult<Document> {
    let value: Value = serde_json::from_str(&data).map_err(|e| {
        StorageError::Backend(BackendError::SerializationError {
            message: format!("Failed to parse stored document {}: {}", id, e),
        })
    })?;
    Ok(Document::new(id, value))
}

#[async_trait]
impl DocumentStore for SqliteBackend {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn get(&self, collection: &CollectionPath, id: &str) -> StorageResult<Option<Document>> {
        let conn = self.get_connection()?;
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection.to_string(), id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| internal_error("Failed to read document", e))?;

        data.map(|data| decode(id.to_string(), data)).transpose()
    }

    async fn put(&self, collection: &CollectionPath, document: Document) -> StorageResult<()> {
        let conn = self.get_connection()?;
        let data = serde_json::to_string(document.data())?;
        conn.execute(
            "INSERT INTO documents (collection, id, data, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (collection, id) DO UPDATE
             SET data = excluded.data, updated_at = excluded.updated_at",
            params![
                collection.to_string(),
                document.id(),
                data,
                format_timestamp(current_timestamp())
            ],
        )
        .map_err(|e| internal_error("Failed to write document", e))?;
        Ok(())
    }

    async fn insert(&self, collection: &CollectionPath, document: Document) -> StorageResult<()> {
        let conn = self.get_connection()?;
        let data = serde_json::to_string(document.data())?;
        let inserted = conn
            .execute(
                "INSERT INTO documents (collection, id, data, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (collection, id) DO NOTHING",
                params![
                    collection.to_string(),
                    document.id(),
                    data,
                    format_timestamp(current_timestamp())
                ],
            )
            .map_err(|e| internal_error("Failed to insert document", e))?;

        if inserted == 0 {
            return Err(StorageError::Resource(ResourceError::AlreadyExists {
                resource_type: collection.name().to_string(),
                id: document.id().to_string(),
            }));
        }
        Ok(())
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> StorageResult<bool> {
        let conn = self.get_connection()?;
        let removed = conn
            .execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection.to_string(), id],
            )
            .map_err(|e| internal_error("Failed to delete document", e))?;
        Ok(removed > 0)
    }

    async fn query(
        &self,
        collection: &CollectionPath,
        query: &DocumentQuery,
    ) -> StorageResult<Vec<Document>> {
        let conn = self.get_connection()?;
        let mut stmt = conn
            .prepare("SELECT id, data FROM documents WHERE collection = ?1 ORDER BY id")
            .map_err(|e| internal_error("Failed to prepare query", e))?;
        let rows = stmt
            .query_map(params![collection.to_string()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| internal_error("Failed to run query", e))?;

        let mut documents = Vec::new();
        for row in rows {
            let (id, data) = row.map_err(|e| internal_error("Failed to read row", e))?;
            documents.push(decode(id, data)?);
        }

        tracing::trace!(
            collection = %collection,
            scanned = documents.len(),
            "Evaluating sqlite query"
        );
        Ok(apply(documents, query))
    }

    async fn health_check(&self) -> StorageResult<()> {
        let conn = self.get_connection().map_err(|_| {
            StorageError::Backend(BackendError::Unavailable {
                backend_name: "sqlite".to_string(),
                message: "Failed to get connection".to_string(),
            })
        })?;
        conn.query_row("SELECT 1", [], |_| Ok(()))
            .map_err(|e| internal_error("Health check failed", e))
    }
}
