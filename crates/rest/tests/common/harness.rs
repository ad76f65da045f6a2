//! API test harness.
//!
//! Builds the full router over a [`MemoryStore`], static dev tokens, a
//! temporary blob directory and a scripted AI client, and wraps it in an
//! `axum-test` server.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue, header};
use axum_test::{TestRequest, TestServer};
use tempfile::TempDir;
use wattle_persistence::backends::memory::MemoryStore;

use wattle_rest::ai::{AiClient, AiError, AiHolisticAnalyzer, AudioClip, ChatCompletion, ChatMessage, ContentPart};
use wattle_rest::auth::StaticTokenVerifier;
use wattle_rest::blob::LocalBlobStore;
use wattle_rest::{AppState, ServerConfig, create_app};

/// Token accepted for [`USER`].
pub const TOKEN: &str = "test-token";
/// Token accepted for [`OTHER_USER`].
pub const OTHER_TOKEN: &str = "other-token";
/// Primary test user.
pub const USER: &str = "test-user";
/// Second user, for isolation checks.
pub const OTHER_USER: &str = "other-user";

/// AI client that replays canned output and records what it was sent.
#[derive(Default)]
pub struct ScriptedAi {
    reply: Mutex<Option<String>>,
    transcript: Mutex<Option<String>>,
    speech_fails: Mutex<bool>,
    chats: Mutex<Vec<Vec<ChatMessage>>>,
    spoken: Mutex<Vec<(String, String)>>,
}

impl ScriptedAi {
    /// A client whose chat calls fail.
    pub fn failing() -> Self {
        Self::default()
    }

    /// A client that answers every chat with `text`.
    pub fn replying(text: &str) -> Self {
        let ai = Self::default();
        ai.set_reply(text);
        ai
    }

    /// Changes the chat reply.
    pub fn set_reply(&self, text: &str) {
        *self.reply.lock().unwrap() = Some(text.to_string());
    }

    /// Sets the transcription result.
    pub fn set_transcript(&self, text: &str) {
        *self.transcript.lock().unwrap() = Some(text.to_string());
    }

    /// Makes speech synthesis fail.
    pub fn fail_speech(&self) {
        *self.speech_fails.lock().unwrap() = true;
    }

    /// Message lists sent to `chat`, in call order.
    pub fn chats(&self) -> Vec<Vec<ChatMessage>> {
        self.chats.lock().unwrap().clone()
    }

    /// `(text, voice)` pairs sent to `speak`.
    pub fn spoken(&self) -> Vec<(String, String)> {
        self.spoken.lock().unwrap().clone()
    }

    /// All text parts of the last chat call, joined.
    pub fn last_prompt_text(&self) -> String {
        self.chats()
            .last()
            .map(|messages| {
                messages
                    .iter()
                    .flat_map(|m| m.parts.iter())
                    .filter_map(|p| match p {
                        ContentPart::Text(t) => Some(t.as_str()),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl AiClient for ScriptedAi {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatCompletion, AiError> {
        self.chats.lock().unwrap().push(messages);
        match self.reply.lock().unwrap().clone() {
            Some(text) => Ok(ChatCompletion {
                text,
                response_id: Some("resp-1".to_string()),
            }),
            None => Err(AiError::RequestFailed {
                status: 503,
                body: "scripted failure".to_string(),
            }),
        }
    }

    async fn transcribe(&self, _audio: AudioClip) -> Result<String, AiError> {
        self.transcript
            .lock()
            .unwrap()
            .clone()
            .ok_or(AiError::RateLimited)
    }

    async fn speak(&self, text: &str, voice: &str) -> Result<Vec<u8>, AiError> {
        if *self.speech_fails.lock().unwrap() {
            return Err(AiError::Network("speech unavailable".to_string()));
        }
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), voice.to_string()));
        Ok(b"ID3-fake-mp3".to_vec())
    }
}

/// A running test application.
pub struct TestApp {
    /// The test server instance.
    pub server: TestServer,
    /// The store behind the server.
    pub store: Arc<MemoryStore>,
    /// The scripted AI client.
    pub ai: Arc<ScriptedAi>,
    /// Server configuration.
    pub config: ServerConfig,
    /// Blob directory; removed on drop.
    pub upload_dir: TempDir,
}

impl TestApp {
    /// Creates an app whose AI calls fail.
    pub fn new() -> Self {
        Self::with_ai(ScriptedAi::failing())
    }

    /// Creates an app using `ai`.
    pub fn with_ai(ai: ScriptedAi) -> Self {
        Self::with_config(ai, ServerConfig::for_testing())
    }

    /// Creates an app using `ai` and `config`; the upload dir is replaced
    /// by a temp dir.
    pub fn with_config(ai: ScriptedAi, config: ServerConfig) -> Self {
        let upload_dir = TempDir::new().expect("Failed to create temp dir");
        let config = ServerConfig {
            upload_dir: upload_dir.path().display().to_string(),
            ..config
        };

        let store = Arc::new(MemoryStore::new());
        let ai = Arc::new(ai);
        let state = AppState::new(
            Arc::clone(&store),
            config.clone(),
            Arc::new(StaticTokenVerifier::new([(TOKEN, USER), (OTHER_TOKEN, OTHER_USER)])),
            ai.clone(),
            Arc::new(LocalBlobStore::new(upload_dir.path(), &config.base_url)),
            Arc::new(AiHolisticAnalyzer::new(ai.clone())),
        );
        let server = TestServer::new(create_app(state)).expect("Failed to create test server");

        Self {
            server,
            store,
            ai,
            config,
            upload_dir,
        }
    }
}

/// `Authorization` header for `token`.
pub fn bearer(token: &'static str) -> (HeaderName, HeaderValue) {
    let value = HeaderValue::from_str(&format!("Bearer {}", token)).expect("valid header");
    (header::AUTHORIZATION, value)
}

/// Extension for adding auth to requests.
pub trait Authorized {
    /// Authenticates as [`USER`].
    fn as_user(self) -> Self;
    /// Authenticates as [`OTHER_USER`].
    fn as_other_user(self) -> Self;
}

impl Authorized for TestRequest {
    fn as_user(self) -> Self {
        let (name, value) = bearer(TOKEN);
        self.add_header(name, value)
    }

    fn as_other_user(self) -> Self {
        let (name, value) = bearer(OTHER_TOKEN);
        self.add_header(name, value)
    }
}
