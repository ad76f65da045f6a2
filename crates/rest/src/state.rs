//! Application state for the Wattle REST API.
//!
//! Holds the injected collaborators every handler needs: the document store,
//! configuration, token verifier, AI client, blob store and holistic
//! analyzer. Nothing here is global; `main` builds each piece and hands it in.

use std::sync::Arc;

use wattle_persistence::core::DocumentStore;

use crate::ai::{AiClient, HolisticAnalyzer};
use crate::auth::TokenVerifier;
use crate::blob::BlobStore;
use crate::config::ServerConfig;

/// Shared application state for the REST API.
///
/// # Type Parameters
///
/// * `S` - The document store type (must implement [`DocumentStore`])
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use wattle_persistence::backends::memory::MemoryStore;
/// use wattle_rest::{AppState, ServerConfig};
/// use wattle_rest::ai::{AiHolisticAnalyzer, OpenAiClient};
/// use wattle_rest::auth::StaticTokenVerifier;
/// use wattle_rest::blob::LocalBlobStore;
///
/// let config = ServerConfig::for_testing();
/// let ai = Arc::new(OpenAiClient::from_config(&config).unwrap());
/// let state = AppState::new(
///     Arc::new(MemoryStore::new()),
///     config.clone(),
///     Arc::new(StaticTokenVerifier::new([("t", "u1")])),
///     ai.clone(),
///     Arc::new(LocalBlobStore::new(&config.upload_dir, &config.base_url)),
///     Arc::new(AiHolisticAnalyzer::new(ai)),
/// );
/// assert_eq!(state.default_page_size(), 10);
/// ```
pub struct AppState<S> {
    /// The document store.
    storage: Arc<S>,

    /// Server configuration.
    config: Arc<ServerConfig>,

    /// Bearer token verifier.
    verifier: Arc<dyn TokenVerifier>,

    /// OpenAI-compatible client.
    ai: Arc<dyn AiClient>,

    /// Blob storage for uploads and generated audio.
    blobs: Arc<dyn BlobStore>,

    /// Holistic analysis generator.
    analyzer: Arc<dyn HolisticAnalyzer>,
}

// Manually implement Clone since S is wrapped in Arc and doesn't need to be Clone
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: Arc::clone(&self.config),
            verifier: Arc::clone(&self.verifier),
            ai: Arc::clone(&self.ai),
            blobs: Arc::clone(&self.blobs),
            analyzer: Arc::clone(&self.analyzer),
        }
    }
}

impl<S: DocumentStore> AppState<S> {
    /// Creates a new AppState from its collaborators.
    pub fn new(
        storage: Arc<S>,
        config: ServerConfig,
        verifier: Arc<dyn TokenVerifier>,
        ai: Arc<dyn AiClient>,
        blobs: Arc<dyn BlobStore>,
        analyzer: Arc<dyn HolisticAnalyzer>,
    ) -> Self {
        Self {
            storage,
            config: Arc::new(config),
            verifier,
            ai,
            blobs,
            analyzer,
        }
    }

    /// Returns a reference to the document store.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the token verifier.
    pub fn verifier(&self) -> &dyn TokenVerifier {
        self.verifier.as_ref()
    }

    /// Returns the AI client.
    pub fn ai(&self) -> &dyn AiClient {
        self.ai.as_ref()
    }

    /// Returns the blob store.
    pub fn blobs(&self) -> &dyn BlobStore {
        self.blobs.as_ref()
    }

    /// Returns the holistic analyzer.
    pub fn analyzer(&self) -> &dyn HolisticAnalyzer {
        self.analyzer.as_ref()
    }

    /// Returns the base URL for the server.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Returns the default page size for search results.
    pub fn default_page_size(&self) -> usize {
        self.config.default_page_size
    }

    /// Returns the maximum page size for search results.
    pub fn max_page_size(&self) -> usize {
        self.config.max_page_size
    }
}
