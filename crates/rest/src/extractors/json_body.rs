//! JSON body extractor with OperationOutcome rejections.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::RestError;

/// Axum extractor for a JSON request body.
///
/// Behaves like [`axum::Json`] but rejects with a [`RestError::BadRequest`],
/// so malformed bodies get the same OperationOutcome shape as other errors.
///
/// # Example
///
/// ```rust,ignore
/// use wattle_rest::extractors::JsonBody;
///
/// async fn create_handler(JsonBody(resource): JsonBody<serde_json::Value>) {
///     println!("Resource type: {}", resource["resourceType"]);
/// }
/// ```
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T> JsonBody<T> {
    /// Consumes the extractor and returns the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = RestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| RestError::BadRequest {
                message: format!("Invalid JSON body: {}", rejection.body_text()),
            })?;
        Ok(Self(value))
    }
}
