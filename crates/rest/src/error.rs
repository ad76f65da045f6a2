//! Error types for the Wattle REST API.
//!
//! Every error is rendered as a FHIR-style OperationOutcome so clients see a
//! single error shape across the FHIR routes and the record/AI routes.
//!
//! # Error Mapping
//!
//! | Source | HTTP Status | Issue Code |
//! |--------|-------------|------------|
//! | ResourceError::NotFound | 404 | not-found |
//! | ResourceError::AlreadyExists | 400 | duplicate |
//! | ValidationError | 400 | invalid |
//! | BackendError | 500 | exception |
//! | Missing/invalid token | 401 | login |
//! | AI provider failure | 500 | transient |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use wattle_persistence::error::{BackendError, ResourceError, StorageError, ValidationError};

use crate::ai::AiError;
use crate::blob::BlobError;

/// The primary error type for REST API operations.
#[derive(Debug)]
pub enum RestError {
    /// Resource not found (HTTP 404).
    NotFound {
        /// The resource type or collection (e.g., "Patient", "Record").
        resource_type: String,
        /// The resource ID.
        id: String,
    },

    /// Bad request - validation error (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// A resource with this id already exists (HTTP 400).
    Duplicate {
        /// The resource type.
        resource_type: String,
        /// The resource ID.
        id: String,
    },

    /// Missing or invalid credentials (HTTP 401).
    Unauthorized {
        /// Error message.
        message: String,
    },

    /// An upstream service (AI provider) failed (HTTP 500).
    Upstream {
        /// Error message.
        message: String,
    },

    /// Internal server error (HTTP 500).
    InternalError {
        /// Error message.
        message: String,
    },
}

impl RestError {
    /// Shorthand for a [`RestError::BadRequest`].
    pub fn bad_request(message: impl Into<String>) -> Self {
        RestError::BadRequest {
            message: message.into(),
        }
    }

    /// Shorthand for a [`RestError::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        RestError::Unauthorized {
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RestError::BadRequest { .. } | RestError::Duplicate { .. } => StatusCode::BAD_REQUEST,
            RestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RestError::Upstream { .. } | RestError::InternalError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::NotFound { resource_type, id } => {
                write!(f, "Resource not found: {}/{}", resource_type, id)
            }
            RestError::BadRequest { message } => {
                write!(f, "Bad request: {}", message)
            }
            RestError::Duplicate { resource_type, id } => {
                write!(f, "Resource already exists: {}/{}", resource_type, id)
            }
            RestError::Unauthorized { message } => {
                write!(f, "Unauthorized: {}", message)
            }
            RestError::Upstream { message } => {
                write!(f, "Upstream error: {}", message)
            }
            RestError::InternalError { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for RestError {}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, details) = match &self {
            RestError::NotFound { resource_type, id } => (
                "not-found",
                format!("Resource {}/{} not found", resource_type, id),
            ),
            RestError::BadRequest { message } => ("invalid", message.clone()),
            RestError::Duplicate { resource_type, id } => (
                "duplicate",
                format!("Resource {}/{} already exists", resource_type, id),
            ),
            RestError::Unauthorized { message } => ("login", message.clone()),
            RestError::Upstream { message } => ("transient", message.clone()),
            RestError::InternalError { message } => ("exception", message.clone()),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let operation_outcome = create_operation_outcome("error", code, &details);
        (status, Json(operation_outcome)).into_response()
    }
}

/// Creates a FHIR OperationOutcome resource.
///
/// # Arguments
///
/// * `severity` - The issue severity (fatal, error, warning, information)
/// * `code` - The FHIR issue code
/// * `details` - Human-readable details
pub fn create_operation_outcome(severity: &str, code: &str, details: &str) -> serde_json::Value {
    serde_json::json!({
        "resourceType": "OperationOutcome",
        "issue": [{
            "severity": severity,
            "code": code,
            "details": {
                "text": details
            }
        }]
    })
}

// Conversions from storage errors

impl From<StorageError> for RestError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Resource(e) => e.into(),
            StorageError::Validation(e) => e.into(),
            StorageError::Backend(e) => e.into(),
        }
    }
}

impl From<ResourceError> for RestError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::NotFound { resource_type, id } => {
                RestError::NotFound { resource_type, id }
            }
            ResourceError::AlreadyExists { resource_type, id } => {
                RestError::Duplicate { resource_type, id }
            }
        }
    }
}

impl From<ValidationError> for RestError {
    fn from(err: ValidationError) -> Self {
        RestError::BadRequest {
            message: err.to_string(),
        }
    }
}

impl From<BackendError> for RestError {
    fn from(err: BackendError) -> Self {
        RestError::InternalError {
            message: err.to_string(),
        }
    }
}

impl From<AiError> for RestError {
    fn from(err: AiError) -> Self {
        RestError::Upstream {
            message: err.to_string(),
        }
    }
}

impl From<BlobError> for RestError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::NotFound { key } => RestError::NotFound {
                resource_type: "File".to_string(),
                id: key,
            },
            BlobError::InvalidKey { .. } | BlobError::ForeignUrl { .. } => RestError::BadRequest {
                message: err.to_string(),
            },
            BlobError::Io { .. } => RestError::InternalError {
                message: err.to_string(),
            },
        }
    }
}

/// Result type for REST handlers.
pub type RestResult<T> = Result<T, RestError>;
