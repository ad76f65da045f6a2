//! AI provider integration.
//!
//! - [`AiClient`] - chat/vision, transcription and speech over an
//!   OpenAI-compatible API ([`OpenAiClient`])
//! - [`HolisticAnalyzer`] - cross-record analysis ([`AiHolisticAnalyzer`])
//! - [`extract_tag`] - pulls `<NAME>...</NAME>` sections out of replies
//! - [`prompts`] - the fixed prompts and degraded-reply placeholders

mod client;
mod data_url;
mod holistic;
mod openai;
pub mod prompts;
mod tags;

pub use client::{AiClient, AiError, AudioClip, ChatCompletion, ChatMessage, ContentPart, Role};
pub use data_url::{decode_data_url, encode_data_url};
pub use holistic::{AiHolisticAnalyzer, HolisticAnalyzer, HolisticOptions};
pub use openai::OpenAiClient;
pub use prompts::RecordDigest;
pub use tags::{extract_tag, extract_tag_or_all};
