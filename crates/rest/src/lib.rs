//! # wattle-rest - HTTP API for Wattle
//!
//! Wattle stores FHIR-shaped resources and personal health records per user
//! and runs AI analysis over them through an OpenAI-compatible API.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wattle_rest::{create_app_with_config, ServerConfig};
//! use wattle_persistence::backends::memory::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::default();
//!     let app = create_app_with_config(MemoryStore::new(), config)?;
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Interaction | HTTP Method | URL Pattern |
//! |------------|-------------|-------------|
//! | search | GET | `/api/fhir/[type]?params` |
//! | create | POST | `/api/fhir/[type]` |
//! | read | GET | `/api/fhir/[type]/[id]` |
//! | update | PUT | `/api/fhir/[type]/[id]` or `/api/fhir/[type]?_id=[id]` |
//! | delete | DELETE | `/api/fhir/[type]/[id]` or `/api/fhir/[type]?_id=[id]` |
//! | records | GET/POST | `/api/records`, `/api/records/[id]` |
//! | analyze | POST | `/api/records/[id]/analyze` |
//! | upload | POST | `/api/upload` |
//! | question | POST | `/api/question` |
//! | holistic analysis | GET/POST | `/api/analysis/holistic` |
//! | transcribe | POST | `/api/transcribe` |
//! | conversations | GET | `/api/conversations` |
//! | profile | GET/PUT | `/api/profile` |
//! | files | GET | `/files/[key]` |
//! | health | GET | `/health` |
//!
//! Every route except `/health` needs `Authorization: Bearer <token>`.
//!
//! ## Error Handling
//!
//! Errors are returned as OperationOutcome resources:
//!
//! | HTTP Status | Issue Code | Description |
//! |-------------|-----------------|-------------|
//! | 400 | invalid | Bad request / validation error |
//! | 400 | duplicate | Create with an existing id |
//! | 401 | login | Missing or invalid token |
//! | 404 | not-found | Resource not found |
//! | 500 | transient | AI provider failure |
//! | 500 | exception | Internal server error |
//!
//! ## Architecture
//!
//! - [`error`] - Error types and OperationOutcome generation
//! - [`config`] - Server configuration
//! - [`state`] - Application state (store and injected clients)
//! - [`auth`] - Bearer token verification
//! - [`ai`] - OpenAI-compatible client, prompts and tag parsing
//! - [`blob`] - File storage for uploads and audio
//! - [`handlers`] - HTTP request handlers
//! - [`extractors`] - Axum extractors
//! - [`responses`] - Bundle building
//! - [`routing`] - Route configuration

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod ai;
pub mod auth;
pub mod blob;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod responses;
pub mod routing;
pub mod state;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{RestError, RestResult};
pub use state::AppState;

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::DefaultBodyLimit};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use wattle_persistence::core::DocumentStore;

use crate::ai::{AiError, AiHolisticAnalyzer, OpenAiClient};
use crate::auth::{AuthError, build_verifier};
use crate::blob::LocalBlobStore;

/// Errors raised while assembling the application.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Authentication could not be configured.
    #[error("authentication setup failed: {0}")]
    Auth(#[from] AuthError),

    /// The AI client could not be configured.
    #[error("AI client setup failed: {0}")]
    Ai(#[from] AiError),
}

/// Builds the default collaborators from configuration.
///
/// Uses JWT and/or static tokens for auth, the OpenAI-compatible client,
/// local file storage under `upload_dir`, and the prompt-based holistic
/// analyzer.
pub fn default_state<S>(storage: S, config: ServerConfig) -> Result<AppState<S>, StartupError>
where
    S: DocumentStore + Send + Sync + 'static,
{
    let verifier = build_verifier(&config)?;
    let ai = Arc::new(OpenAiClient::from_config(&config)?);
    let blobs = Arc::new(LocalBlobStore::new(&config.upload_dir, &config.base_url));
    let analyzer = Arc::new(AiHolisticAnalyzer::new(ai.clone()));

    Ok(AppState::new(
        Arc::new(storage),
        config,
        verifier,
        ai,
        blobs,
        analyzer,
    ))
}

/// Creates the Axum application with collaborators built from `config`.
///
/// # Example
///
/// ```rust
/// use wattle_persistence::backends::memory::MemoryStore;
/// use wattle_rest::{ServerConfig, create_app_with_config};
///
/// let app = create_app_with_config(MemoryStore::new(), ServerConfig::for_testing());
/// assert!(app.is_ok());
/// ```
pub fn create_app_with_config<S>(storage: S, config: ServerConfig) -> Result<Router, StartupError>
where
    S: DocumentStore + Send + Sync + 'static,
{
    Ok(create_app(default_state(storage, config)?))
}

/// Creates the Axum application from a prepared state.
///
/// Sets up all routes plus the middleware stack: request ids, tracing,
/// timeout, body limit and CORS.
pub fn create_app<S>(state: AppState<S>) -> Router
where
    S: DocumentStore + Send + Sync + 'static,
{
    info!(
        "Creating REST API server with backend: {}",
        state.storage().backend_name()
    );

    let config = state.config().clone();
    let router = routing::create_routes(state);

    // Request id first so the trace span and the auth extractor see it
    let service_builder = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout),
        ));

    let router = router.layer(DefaultBodyLimit::max(config.max_body_size));

    // Add CORS if enabled
    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    router.layer(service_builder)
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = config
            .cors_methods
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = config
            .cors_headers
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// Call once at startup. `RUST_LOG` overrides `level` when set.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "wattle={level},wattle_rest={level},wattle_persistence={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
