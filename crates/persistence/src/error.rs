//! Error types for the persistence layer.
//!
//! Errors are split into three categories: resource state errors (a document
//! is missing or already present), validation errors (the caller handed us
//! something malformed) and backend errors (the store itself failed).

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Resource state errors
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors related to resource state.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The requested resource was not found.
    #[error("resource not found: {resource_type}/{id}")]
    NotFound { resource_type: String, id: String },

    /// A resource with the given ID already exists.
    #[error("resource already exists: {resource_type}/{id}")]
    AlreadyExists { resource_type: String, id: String },
}

/// Errors related to malformed input.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The resource failed validation.
    #[error("invalid resource: {message}")]
    InvalidResource { message: String },

    /// Missing required field.
    #[error("missing required field: {field}")]
    MissingRequiredField { field: String },

    /// The `resourceType` of a body does not match its target collection.
    #[error("resource type in body ({actual}) does not match target ({expected})")]
    ResourceTypeMismatch { expected: String, actual: String },

    /// The `id` of a body does not match the addressed resource.
    #[error("resource id in body ({actual}) does not match target ({expected})")]
    IdMismatch { expected: String, actual: String },

    /// The search parameter is invalid.
    #[error("invalid search parameter '{parameter}': {message}")]
    InvalidSearchParameter { parameter: String, message: String },

    /// A collection path segment is unusable.
    #[error("invalid path segment '{segment}': {message}")]
    InvalidPathSegment { segment: String, message: String },
}

/// Errors originating from the database backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend is currently unavailable.
    #[error("backend unavailable: {backend_name}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError { message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Backend(BackendError::SerializationError {
            message: err.to_string(),
        })
    }
}

impl StorageError {
    /// Returns true if this error means the addressed document does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::Resource(ResourceError::NotFound { .. }))
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = ResourceError::NotFound {
            resource_type: "Observation".to_string(),
            id: "obs1".to_string(),
        };
        assert_eq!(err.to_string(), "resource not found: Observation/obs1");
    }

    #[test]
    fn test_transparent_wrapping() {
        let err: StorageError = ValidationError::MissingRequiredField {
            field: "resourceType".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "missing required field: resourceType");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_is_not_found() {
        let err: StorageError = ResourceError::NotFound {
            resource_type: "Patient".to_string(),
            id: "p1".to_string(),
        }
        .into();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_serde_error_maps_to_backend() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: StorageError = serde_err.into();
        assert!(matches!(
            err,
            StorageError::Backend(BackendError::SerializationError { .. })
        ));
    }
}
