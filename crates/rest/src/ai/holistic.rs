//! Holistic analysis generation.

use std::sync::Arc;

use async_trait::async_trait;
use wattle_persistence::user::UserId;

use super::client::{AiClient, AiError};
use super::prompts::{RecordDigest, holistic_messages};

/// Inputs for a holistic analysis besides the profile.
#[derive(Debug, Clone, Default)]
pub struct HolisticOptions {
    /// Records to summarize, newest first.
    pub records: Vec<RecordDigest>,
}

/// Produces a holistic analysis across a user's records.
#[async_trait]
pub trait HolisticAnalyzer: Send + Sync {
    /// Generates the analysis text.
    async fn generate_holistic_analysis(
        &self,
        user_id: &UserId,
        profile_text: &str,
        options: &HolisticOptions,
    ) -> Result<String, AiError>;
}

/// Default analyzer: one chat completion with a fixed prompt.
pub struct AiHolisticAnalyzer {
    ai: Arc<dyn AiClient>,
}

impl AiHolisticAnalyzer {
    /// Creates an analyzer backed by `ai`.
    pub fn new(ai: Arc<dyn AiClient>) -> Self {
        Self { ai }
    }
}

#[async_trait]
impl HolisticAnalyzer for AiHolisticAnalyzer {
    async fn generate_holistic_analysis(
        &self,
        user_id: &UserId,
        profile_text: &str,
        options: &HolisticOptions,
    ) -> Result<String, AiError> {
        tracing::debug!(
            user_id = %user_id,
            records = options.records.len(),
            "Generating holistic analysis"
        );
        let completion = self
            .ai
            .chat(holistic_messages(profile_text, &options.records))
            .await?;
        Ok(completion.text.trim().to_string())
    }
}
