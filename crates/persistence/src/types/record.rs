//! Health record, conversation and analysis document shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Writes timestamps with fixed millisecond precision so stored values sort
/// lexicographically in time order.
mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::types::format_timestamp;

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(*at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }
}

/// An uploaded health record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    /// Document id; not stored in the body.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Blob URLs, in upload order.
    #[serde(default)]
    pub urls: Vec<String>,
    /// Model output; empty until analysed.
    #[serde(default)]
    pub analysis: String,
    /// Creation time.
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Comment supplied at upload time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Later comments, oldest first.
    #[serde(default)]
    pub comments: Vec<String>,
    /// Number of uploaded files.
    #[serde(default)]
    pub file_count: usize,
    /// When the analysis was last written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<DateTime<Utc>>,
}

impl HealthRecord {
    /// Creates a record with no analysis yet.
    pub fn new(name: impl Into<String>, urls: Vec<String>, comment: Option<String>) -> Self {
        let file_count = urls.len();
        Self {
            id: String::new(),
            name: name.into(),
            urls,
            analysis: String::new(),
            created_at: crate::types::current_timestamp(),
            comment,
            comments: Vec::new(),
            file_count,
            analyzed_at: None,
        }
    }

    /// Returns true once an analysis has been stored.
    pub fn is_analyzed(&self) -> bool {
        !self.analysis.is_empty()
    }
}

/// One question/answer exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    /// Document id; not stored in the body.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// The user's question.
    pub question: String,
    /// The answer shown to the user.
    pub answer: String,
    /// When the answer was produced.
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Synthesised speech for the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Id of the turn this one follows up on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
}

/// A stored holistic analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolisticAnalysis {
    /// Model output.
    pub analysis: String,
    /// When it was generated.
    #[serde(with = "timestamp")]
    pub generated_at: DateTime<Utc>,
    /// How many records fed into it.
    pub record_count: usize,
}
