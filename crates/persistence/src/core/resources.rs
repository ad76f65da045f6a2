//! FHIR-shaped resource repository.
//!
//! Resources of type `T` for user `U` live in `users/{U}/fhir/{T}`, keyed by
//! their `id`. The repository owns the write rules: the body's
//! `resourceType` must match the collection, ids are generated on create
//! when absent, and `meta.versionId`/`meta.lastUpdated` are maintained by
//! the store rather than trusted from the client.

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::core::DocumentStore;
use crate::error::{ResourceError, StorageError, StorageResult, ValidationError};
use crate::path::{CollectionPath, validate_segment};
use crate::query::QueryPlan;
use crate::types::{Document, stamp_meta};
use crate::user::UserContext;

/// Result of executing a [`QueryPlan`].
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// `_id` was given and the resource exists.
    Single(Value),
    /// A collection scan.
    Matches(Vec<Value>),
}

/// Resource CRUD scoped to one user.
pub struct ResourceRepository<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    user: &'a UserContext,
}

impl<'a, S: DocumentStore + ?Sized> ResourceRepository<'a, S> {
    /// Creates a repository for the given user.
    pub fn new(store: &'a S, user: &'a UserContext) -> Self {
        Self { store, user }
    }

    fn collection(&self, resource_type: &str) -> Result<CollectionPath, ValidationError> {
        CollectionPath::fhir(self.user.user_id(), resource_type)
    }

    /// Creates a resource.
    ///
    /// Assigns a UUID when the body has no `id` and stamps
    /// `meta.versionId = "1"`.
    ///
    /// # Errors
    ///
    /// * `Validation` - body is not an object, `resourceType` is missing or
    ///   differs from `resource_type`, or `id` is not a usable string
    /// * `Resource(AlreadyExists)` - a resource with the body's id exists
    pub async fn create(&self, resource_type: &str, resource: Value) -> StorageResult<Value> {
        let collection = self.collection(resource_type)?;
        let mut body = into_checked_object(resource, resource_type)?;

        let id = match body_id(&body)? {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                body.insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };
        stamp_meta(&mut body, 1, Utc::now());

        let stored = Value::Object(body);
        self.store
            .insert(&collection, Document::new(&id, stored.clone()))
            .await?;

        debug!(
            user_id = %self.user.user_id(),
            resource_type = %resource_type,
            id = %id,
            "Created resource"
        );
        Ok(stored)
    }

    /// Reads a resource.
    ///
    /// # Errors
    ///
    /// * `Resource(NotFound)` - no such resource
    pub async fn read(&self, resource_type: &str, id: &str) -> StorageResult<Value> {
        let collection = self.collection(resource_type)?;
        validate_segment(id)?;
        match self.store.get(&collection, id).await? {
            Some(doc) => Ok(doc.into_data()),
            None => Err(not_found(resource_type, id)),
        }
    }

    /// Executes a query plan.
    ///
    /// A plan with a lookup reads that one resource instead of scanning.
    pub async fn search(&self, plan: &QueryPlan) -> StorageResult<SearchOutcome> {
        if let Some(id) = &plan.lookup {
            return self
                .read(&plan.resource_type, id)
                .await
                .map(SearchOutcome::Single);
        }

        let collection = self.collection(&plan.resource_type)?;
        let docs = self.store.query(&collection, &plan.query).await?;
        debug!(
            user_id = %self.user.user_id(),
            resource_type = %plan.resource_type,
            matches = docs.len(),
            "Executed resource search"
        );
        Ok(SearchOutcome::Matches(
            docs.into_iter().map(Document::into_data).collect(),
        ))
    }

    /// Replaces an existing resource.
    ///
    /// A missing body `id` is filled in from `id`. The stored version is
    /// incremented; an update never creates.
    ///
    /// # Errors
    ///
    /// * `Validation` - body problems as for create, or a body `id` that
    ///   differs from `id`
    /// * `Resource(NotFound)` - no such resource
    pub async fn update(&self, resource_type: &str, id: &str, resource: Value) -> StorageResult<Value> {
        let collection = self.collection(resource_type)?;
        validate_segment(id)?;
        let mut body = into_checked_object(resource, resource_type)?;

        match body_id(&body)? {
            Some(body_id) if body_id != id => {
                return Err(ValidationError::IdMismatch {
                    expected: id.to_string(),
                    actual: body_id,
                }
                .into());
            }
            Some(_) => {}
            None => {
                body.insert("id".to_string(), Value::String(id.to_string()));
            }
        }

        let existing = self
            .store
            .get(&collection, id)
            .await?
            .ok_or_else(|| not_found(resource_type, id))?;
        let next_version = existing
            .version_id()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(1)
            + 1;
        stamp_meta(&mut body, next_version, Utc::now());

        let stored = Value::Object(body);
        self.store
            .put(&collection, Document::new(id, stored.clone()))
            .await?;

        debug!(
            user_id = %self.user.user_id(),
            resource_type = %resource_type,
            id = %id,
            version = next_version,
            "Updated resource"
        );
        Ok(stored)
    }

    /// Deletes a resource.
    ///
    /// # Errors
    ///
    /// * `Resource(NotFound)` - no such resource
    pub async fn delete(&self, resource_type: &str, id: &str) -> StorageResult<()> {
        let collection = self.collection(resource_type)?;
        validate_segment(id)?;
        if self.store.delete(&collection, id).await? {
            debug!(
                user_id = %self.user.user_id(),
                resource_type = %resource_type,
                id = %id,
                "Deleted resource"
            );
            Ok(())
        } else {
            Err(not_found(resource_type, id))
        }
    }
}

fn not_found(resource_type: &str, id: &str) -> StorageError {
    ResourceError::NotFound {
        resource_type: resource_type.to_string(),
        id: id.to_string(),
    }
    .into()
}

/// Checks that `resource` is an object whose `resourceType` is `expected`.
fn into_checked_object(resource: Value, expected: &str) -> Result<Map<String, Value>, ValidationError> {
    let Value::Object(body) = resource else {
        return Err(ValidationError::InvalidResource {
            message: "resource must be a JSON object".to_string(),
        });
    };
    match body.get("resourceType") {
        None => {
            return Err(ValidationError::MissingRequiredField {
                field: "resourceType".to_string(),
            });
        }
        Some(Value::String(actual)) if actual == expected => {}
        Some(Value::String(actual)) => {
            return Err(ValidationError::ResourceTypeMismatch {
                expected: expected.to_string(),
                actual: actual.clone(),
            });
        }
        Some(_) => {
            return Err(ValidationError::InvalidResource {
                message: "resourceType must be a string".to_string(),
            });
        }
    }
    Ok(body)
}

/// Returns the body's `id`, if present and usable.
fn body_id(body: &Map<String, Value>) -> Result<Option<String>, ValidationError> {
    match body.get("id") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) => {
            validate_segment(id)?;
            Ok(Some(id.clone()))
        }
        Some(_) => Err(ValidationError::InvalidResource {
            message: "id must be a string".to_string(),
        }),
    }
}
