//! Server configuration for the Wattle API.
//!
//! Every option can be given on the command line or through a `WATTLE_*`
//! environment variable.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `WATTLE_PORT` | 8080 | Server port |
//! | `WATTLE_HOST` | 127.0.0.1 | Host to bind |
//! | `WATTLE_LOG_LEVEL` | info | Log level |
//! | `WATTLE_MAX_BODY_SIZE` | 52428800 | Max request body (bytes) |
//! | `WATTLE_REQUEST_TIMEOUT` | 120 | Request timeout (seconds) |
//! | `WATTLE_ENABLE_CORS` | true | Enable CORS |
//! | `WATTLE_CORS_ORIGINS` | * | Allowed origins |
//! | `WATTLE_BASE_URL` | http://localhost:8080 | Base URL for `fullUrl` and `Location` |
//! | `WATTLE_DATABASE_URL` | (memory) | `:memory:` or a SQLite file path |
//! | `WATTLE_JWT_SECRET` | | HS256 secret for bearer tokens |
//! | `WATTLE_DEV_TOKENS` | | `token=userId` pairs, comma-separated |
//! | `WATTLE_OPENAI_BASE_URL` | https://api.openai.com/v1 | OpenAI-compatible API |
//! | `WATTLE_OPENAI_API_KEY` | | API key |
//! | `WATTLE_UPLOAD_DIR` | ./data/uploads | Blob storage directory |
//! | `WATTLE_UPLOAD_BATCH_SIZE` | 3 | Files written concurrently per batch |
//! | `WATTLE_UPLOAD_BATCH_DELAY_MS` | 500 | Pause between upload batches |
//!
//! # Example
//!
//! ```rust
//! use wattle_rest::ServerConfig;
//!
//! let config = ServerConfig {
//!     port: 3000,
//!     jwt_secret: Some("a-very-long-secret-used-only-for-this-example".to_string()),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use clap::Parser;

/// Minimum accepted length of the JWT secret.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Server configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "wattle")]
#[command(about = "Wattle health record API server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "WATTLE_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "WATTLE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "WATTLE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum request body size in bytes.
    #[arg(long, env = "WATTLE_MAX_BODY_SIZE", default_value = "52428800")]
    pub max_body_size: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "WATTLE_REQUEST_TIMEOUT", default_value = "120")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "WATTLE_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "WATTLE_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(long, env = "WATTLE_CORS_METHODS", default_value = "GET,POST,PUT,DELETE,OPTIONS")]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "WATTLE_CORS_HEADERS",
        default_value = "Content-Type,Authorization,Accept"
    )]
    pub cors_headers: String,

    /// Base URL for the server (used in Location headers and Bundle links).
    #[arg(long, env = "WATTLE_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Database location: `:memory:` or a SQLite file path. Unset means the
    /// in-process memory store.
    #[arg(long, env = "WATTLE_DATABASE_URL")]
    pub database_url: Option<String>,

    /// HS256 secret used to verify bearer tokens.
    #[arg(long, env = "WATTLE_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Static development tokens as `token=userId` pairs, comma-separated.
    #[arg(long, env = "WATTLE_DEV_TOKENS", hide_env_values = true)]
    pub dev_tokens: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[arg(long, env = "WATTLE_OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    /// API key for the OpenAI-compatible API.
    #[arg(long, env = "WATTLE_OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Chat/vision model.
    #[arg(long, env = "WATTLE_CHAT_MODEL", default_value = "gpt-4o")]
    pub chat_model: String,

    /// Transcription model.
    #[arg(long, env = "WATTLE_TRANSCRIPTION_MODEL", default_value = "whisper-1")]
    pub transcription_model: String,

    /// Text-to-speech model.
    #[arg(long, env = "WATTLE_SPEECH_MODEL", default_value = "tts-1")]
    pub speech_model: String,

    /// Default text-to-speech voice.
    #[arg(long, env = "WATTLE_SPEECH_VOICE", default_value = "alloy")]
    pub speech_voice: String,

    /// Directory for uploaded files and generated audio.
    #[arg(long, env = "WATTLE_UPLOAD_DIR", default_value = "./data/uploads")]
    pub upload_dir: String,

    /// Number of files written concurrently per upload batch.
    #[arg(long, env = "WATTLE_UPLOAD_BATCH_SIZE", default_value = "3")]
    pub upload_batch_size: usize,

    /// Pause between upload batches in milliseconds.
    #[arg(long, env = "WATTLE_UPLOAD_BATCH_DELAY_MS", default_value = "500")]
    pub upload_batch_delay_ms: u64,

    /// Default page size for searches without `_count`.
    #[arg(long, env = "WATTLE_DEFAULT_PAGE_SIZE", default_value = "100")]
    pub default_page_size: usize,

    /// Maximum page size for searches.
    #[arg(long, env = "WATTLE_MAX_PAGE_SIZE", default_value = "1000")]
    pub max_page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            max_body_size: 50 * 1024 * 1024, // 50MB
            request_timeout: 120,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,PUT,DELETE,OPTIONS".to_string(),
            cors_headers: "Content-Type,Authorization,Accept".to_string(),
            base_url: "http://localhost:8080".to_string(),
            database_url: None,
            jwt_secret: None,
            dev_tokens: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_api_key: None,
            chat_model: "gpt-4o".to_string(),
            transcription_model: "whisper-1".to_string(),
            speech_model: "tts-1".to_string(),
            speech_voice: "alloy".to_string(),
            upload_dir: "./data/uploads".to_string(),
            upload_batch_size: 3,
            upload_batch_delay_ms: 500,
            default_page_size: 100,
            max_page_size: 1000,
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    pub fn from_env() -> Self {
        Self::try_parse().unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses [`dev_tokens`](Self::dev_tokens) into `(token, userId)` pairs.
    pub fn parse_dev_tokens(&self) -> Result<Vec<(String, String)>, String> {
        let Some(raw) = self.dev_tokens.as_deref() else {
            return Ok(Vec::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| match entry.split_once('=') {
                Some((token, user)) if !token.trim().is_empty() && !user.trim().is_empty() => {
                    Ok((token.trim().to_string(), user.trim().to_string()))
                }
                _ => Err(format!("Invalid dev token entry '{}', expected token=userId", entry)),
            })
            .collect()
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.default_page_size == 0 {
            errors.push("Default page size cannot be 0".to_string());
        }

        if self.default_page_size > self.max_page_size {
            errors.push("Default page size cannot exceed max page size".to_string());
        }

        if self.upload_batch_size == 0 {
            errors.push("Upload batch size cannot be 0".to_string());
        }

        if let Some(secret) = &self.jwt_secret {
            if secret.len() < MIN_JWT_SECRET_LEN {
                errors.push(format!(
                    "JWT secret must be at least {} characters",
                    MIN_JWT_SECRET_LEN
                ));
            }
        }

        match self.parse_dev_tokens() {
            Ok(tokens) => {
                if tokens.is_empty() && self.jwt_secret.is_none() {
                    errors.push(
                        "No authentication configured: set a JWT secret or dev tokens".to_string(),
                    );
                }
            }
            Err(e) => errors.push(e),
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// Uses ephemeral port 0, a static token `test-token` for user
    /// `test-user`, no upload batch delay and small page sizes.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            cors_methods: "*".to_string(),
            cors_headers: "*".to_string(),
            base_url: "http://localhost:0".to_string(),
            dev_tokens: Some("test-token=test-user,other-token=other-user".to_string()),
            openai_base_url: "http://127.0.0.1:9/v1".to_string(),
            upload_dir: std::env::temp_dir()
                .join("wattle-test-uploads")
                .to_string_lossy()
                .into_owned(),
            upload_batch_delay_ms: 0,
            default_page_size: 10,
            max_page_size: 100,
            ..Default::default()
        }
    }
}
