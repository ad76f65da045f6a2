//! Health check endpoint handler.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};
use wattle_persistence::core::DocumentStore;

use crate::state::AppState;

/// Handler for the health check endpoint. Requires no authentication.
///
/// # Response
///
/// - `200 OK` - server and store are healthy
/// - `503 Service Unavailable` - the store health check failed
pub async fn health_handler<S>(State(state): State<AppState<S>>) -> Response
where
    S: DocumentStore + Send + Sync + 'static,
{
    debug!("Processing health check request");

    let backend_name = state.storage().backend_name();
    let (status, label) = match state.storage().health_check().await {
        Ok(()) => (StatusCode::OK, "healthy"),
        Err(e) => {
            warn!(error = %e, backend = backend_name, "Store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
    };

    let body = serde_json::json!({
        "status": label,
        "backend": backend_name,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    (status, Json(body)).into_response()
}
