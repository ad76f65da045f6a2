//! AI client abstraction.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the AI provider.
#[derive(Error, Debug)]
pub enum AiError {
    /// No provider is configured.
    #[error("AI provider is not configured")]
    NotConfigured,

    /// Network error talking to the provider.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with a non-success status.
    #[error("request failed with HTTP {status}: {body}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// Rate limited by the provider.
    #[error("rate limited by AI provider")]
    RateLimited,

    /// The provider's response could not be understood.
    #[error("could not parse provider response: {0}")]
    Parse(String),

    /// The input could not be sent (bad data URL, empty audio).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// System instructions.
    System,
    /// User input.
    User,
    /// Prior model output.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One part of a multimodal message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// Plain text.
    Text(String),
    /// An image, as an `https:` or `data:` URL.
    ImageUrl(String),
    /// A document such as a PDF, as a base64 `data:` URL.
    File {
        /// Original file name.
        filename: String,
        /// `data:` URL with the file content.
        data_url: String,
    },
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Who is speaking.
    pub role: Role,
    /// Message content.
    pub parts: Vec<ContentPart>,
}

impl ChatMessage {
    /// A system message with text content.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            parts: vec![ContentPart::Text(text.into())],
        }
    }

    /// A user message with text content.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![ContentPart::Text(text.into())],
        }
    }

    /// A user message with arbitrary parts.
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }
}

/// Result of a chat completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCompletion {
    /// Generated text.
    pub text: String,
    /// Provider response id, if reported.
    pub response_id: Option<String>,
}

/// Audio handed to transcription.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Raw audio bytes.
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `audio/webm`.
    pub mime_type: String,
}

impl AudioClip {
    /// File name to report to the provider, derived from the MIME type.
    pub fn filename(&self) -> String {
        let ext = match self.mime_type.as_str() {
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/wav" | "audio/x-wav" => "wav",
            "audio/ogg" => "ogg",
            "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
            _ => "webm",
        };
        format!("audio.{}", ext)
    }
}

/// Client for an OpenAI-compatible API.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Runs a chat completion (text and vision).
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatCompletion, AiError>;

    /// Transcribes speech to text.
    async fn transcribe(&self, audio: AudioClip) -> Result<String, AiError>;

    /// Synthesizes speech; returns MP3 bytes.
    async fn speak(&self, text: &str, voice: &str) -> Result<Vec<u8>, AiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let msg = ChatMessage::system("be brief");
        assert_eq!(msg.role, Role::System);
        assert_eq!(msg.parts, vec![ContentPart::Text("be brief".into())]);
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_audio_filename() {
        let clip = AudioClip {
            bytes: vec![],
            mime_type: "audio/mpeg".into(),
        };
        assert_eq!(clip.filename(), "audio.mp3");
        let clip = AudioClip {
            bytes: vec![],
            mime_type: "application/octet-stream".into(),
        };
        assert_eq!(clip.filename(), "audio.webm");
    }
}
