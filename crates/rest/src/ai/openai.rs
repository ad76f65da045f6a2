//! OpenAI-compatible HTTP client.
//!
//! Works with the OpenAI API and compatible servers (vLLM, Ollama, LocalAI)
//! that expose `/chat/completions`, `/audio/transcriptions` and
//! `/audio/speech`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, header, multipart};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::{AiClient, AiError, AudioClip, ChatCompletion, ChatMessage, ContentPart};
use crate::config::ServerConfig;

/// OpenAI-compatible client.
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    chat_model: String,
    transcription_model: String,
    speech_model: String,
}

impl OpenAiClient {
    /// Creates a client for `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(AiError::NotConfigured);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AiError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key,
            chat_model: "gpt-4o".to_string(),
            transcription_model: "whisper-1".to_string(),
            speech_model: "tts-1".to_string(),
        })
    }

    /// Creates a client from the server configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self, AiError> {
        Ok(Self::new(
            &config.openai_base_url,
            config.openai_api_key.clone(),
            Duration::from_secs(config.request_timeout),
        )?
        .with_models(
            &config.chat_model,
            &config.transcription_model,
            &config.speech_model,
        ))
    }

    /// Sets the chat, transcription and speech models.
    pub fn with_models(mut self, chat: &str, transcription: &str, speech: &str) -> Self {
        self.chat_model = chat.to_string();
        self.transcription_model = transcription.to_string();
        self.speech_model = speech.to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(header::AUTHORIZATION, format!("Bearer {}", key)),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AiError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| AiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status.as_u16() == 429 {
            return Err(AiError::RateLimited);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AiError::RequestFailed {
            status: status.as_u16(),
            body,
        })
    }
}

/// Chat completion request body.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WirePart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: WireImage<'a> },
    File { file: WireFile<'a> },
}

#[derive(Debug, Serialize)]
struct WireImage<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct WireFile<'a> {
    filename: &'a str,
    file_data: &'a str,
}

impl<'a> From<&'a ContentPart> for WirePart<'a> {
    fn from(part: &'a ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => WirePart::Text { text },
            ContentPart::ImageUrl(url) => WirePart::ImageUrl {
                image_url: WireImage { url },
            },
            ContentPart::File { filename, data_url } => WirePart::File {
                file: WireFile {
                    filename,
                    file_data: data_url,
                },
            },
        }
    }
}

/// Chat completion response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    id: Option<String>,
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'static str,
}

#[async_trait]
impl AiClient for OpenAiClient {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatCompletion, AiError> {
        let body = ChatRequest {
            model: &self.chat_model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: m.parts.iter().map(WirePart::from).collect(),
                })
                .collect(),
        };

        debug!(
            model = %self.chat_model,
            messages = body.messages.len(),
            "Sending chat completion"
        );

        let response = self
            .send(self.client.post(self.url("chat/completions")).json(&body))
            .await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::Parse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AiError::Parse("no choices in response".to_string()))?;

        Ok(ChatCompletion {
            text: choice.message.content.unwrap_or_default(),
            response_id: parsed.id,
        })
    }

    async fn transcribe(&self, audio: AudioClip) -> Result<String, AiError> {
        if audio.bytes.is_empty() {
            return Err(AiError::InvalidInput("audio is empty".to_string()));
        }

        let filename = audio.filename();
        let part = multipart::Part::bytes(audio.bytes)
            .file_name(filename)
            .mime_str(&audio.mime_type)
            .map_err(|e| AiError::InvalidInput(e.to_string()))?;
        let form = multipart::Form::new()
            .text("model", self.transcription_model.clone())
            .part("file", part);

        let response = self
            .send(
                self.client
                    .post(self.url("audio/transcriptions"))
                    .multipart(form),
            )
            .await?;
        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| AiError::Parse(e.to_string()))?;
        Ok(parsed.text)
    }

    async fn speak(&self, text: &str, voice: &str) -> Result<Vec<u8>, AiError> {
        let body = SpeechRequest {
            model: &self.speech_model,
            input: text,
            voice,
            response_format: "mp3",
        };
        let response = self
            .send(self.client.post(self.url("audio/speech")).json(&body))
            .await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AiError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
