//! Route configuration.
//!
//! Defines all routes of the Wattle API.

use axum::{
    Router,
    routing::{get, post},
};
use wattle_persistence::core::DocumentStore;

use crate::blob::FILES_ROUTE;
use crate::handlers;
use crate::state::AppState;

/// Creates all API routes.
///
/// # Routes
///
/// ## Unauthenticated
/// - `GET /health` - Health check
///
/// ## Resources
/// - `GET /api/fhir/{type}` - Search
/// - `POST /api/fhir/{type}` - Create
/// - `PUT /api/fhir/{type}` - Update (`_id` or body `id`)
/// - `DELETE /api/fhir/{type}` - Delete (`_id`)
/// - `GET|PUT|DELETE /api/fhir/{type}/{id}` - Read, update, delete
///
/// ## Health records
/// - `GET|POST /api/records`, `GET|DELETE /api/records/{id}`
/// - `POST /api/records/{id}/comments`, `POST /api/records/{id}/analyze`
/// - `POST /api/upload` - Multipart upload
/// - `POST /api/question` - Question answering
/// - `GET|POST /api/analysis/holistic` - Holistic analysis
/// - `POST /api/transcribe` - Speech to text
/// - `GET /api/conversations`, `GET /api/conversations/{id}`
/// - `GET|PUT /api/profile`
/// - `GET /files/{*key}` - Stored files
pub fn create_routes<S>(state: AppState<S>) -> Router
where
    S: DocumentStore + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(handlers::health_handler::<S>))
        // Resource routes
        .route(
            "/api/fhir/{resource_type}",
            get(handlers::search_handler::<S>)
                .post(handlers::create_handler::<S>)
                .put(handlers::update_collection_handler::<S>)
                .delete(handlers::delete_collection_handler::<S>),
        )
        .route(
            "/api/fhir/{resource_type}/{id}",
            get(handlers::read_handler::<S>)
                .put(handlers::update_handler::<S>)
                .delete(handlers::delete_handler::<S>),
        )
        // Record routes
        .route(
            "/api/records",
            get(handlers::list_records_handler::<S>).post(handlers::create_record_handler::<S>),
        )
        .route(
            "/api/records/{id}",
            get(handlers::get_record_handler::<S>).delete(handlers::delete_record_handler::<S>),
        )
        .route(
            "/api/records/{id}/comments",
            post(handlers::add_comment_handler::<S>),
        )
        .route(
            "/api/records/{id}/analyze",
            post(handlers::analyze_record_handler::<S>),
        )
        .route("/api/upload", post(handlers::upload_handler::<S>))
        // AI routes
        .route("/api/question", post(handlers::question_handler::<S>))
        .route(
            "/api/analysis/holistic",
            get(handlers::holistic_get_handler::<S>).post(handlers::holistic_post_handler::<S>),
        )
        .route("/api/transcribe", post(handlers::transcribe_handler::<S>))
        .route(
            "/api/conversations",
            get(handlers::list_conversations_handler::<S>),
        )
        .route(
            "/api/conversations/{id}",
            get(handlers::get_conversation_handler::<S>),
        )
        .route(
            "/api/profile",
            get(handlers::get_profile_handler::<S>).put(handlers::put_profile_handler::<S>),
        )
        .route(
            &format!("{}/{{*key}}", FILES_ROUTE),
            get(handlers::file_handler::<S>),
        )
        // State
        .with_state(state)
}
