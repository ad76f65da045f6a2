//! Fixed prompts for record analysis, questions and holistic summaries.

use wattle_persistence::types::{ConversationTurn, HealthRecord, format_timestamp};

use super::client::{ChatMessage, ContentPart};

/// Stored when a record could not be analyzed.
pub const ANALYSIS_UNAVAILABLE: &str =
    "Analysis is not available right now. Please try again later.";

/// Returned when a question could not be answered.
pub const ANSWER_UNAVAILABLE: &str =
    "I could not answer that right now. Please try again in a moment.";

/// Returned when a holistic analysis could not be generated.
pub const HOLISTIC_UNAVAILABLE: &str =
    "A holistic analysis could not be generated right now. Please try again later.";

const RECORD_SYSTEM: &str = "You are a careful medical document assistant. \
Read the attached medical document and explain it to the patient in plain language. \
List key findings and any values outside their reference range. \
Do not diagnose. Wrap a two or three sentence overview in <SUMMARY></SUMMARY> tags \
and put the full explanation after it.";

const QUESTION_SYSTEM: &str = "You are a health assistant answering questions about the \
user's own medical records. Use only the context provided. If the context does not \
contain the answer, say so and suggest asking a clinician. \
Put the reply meant for the user inside <ANSWER></ANSWER> tags.";

const HOLISTIC_SYSTEM: &str = "You are a health assistant. Combine the user's profile and \
all record analyses into one holistic overview: overall picture, trends across records, \
items worth discussing with a clinician. Do not diagnose.";

/// A short view of a record used as prompt context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDigest {
    /// Record name.
    pub name: String,
    /// Creation time (RFC 3339).
    pub created_at: String,
    /// Analysis text; may be empty.
    pub analysis: String,
}

impl From<&HealthRecord> for RecordDigest {
    fn from(record: &HealthRecord) -> Self {
        Self {
            name: record.name.clone(),
            created_at: format_timestamp(record.created_at),
            analysis: record.analysis.clone(),
        }
    }
}

fn records_block(records: &[RecordDigest]) -> String {
    let analyzed: Vec<String> = records
        .iter()
        .filter(|r| !r.analysis.trim().is_empty())
        .map(|r| format!("## {} ({})\n{}", r.name, r.created_at, r.analysis.trim()))
        .collect();
    if analyzed.is_empty() {
        "No analyzed records.".to_string()
    } else {
        analyzed.join("\n\n")
    }
}

fn profile_block(profile_text: &str) -> String {
    if profile_text.trim().is_empty() {
        "No profile information.".to_string()
    } else {
        profile_text.trim().to_string()
    }
}

/// Messages asking for the analysis of one record.
///
/// `document` holds the record's files as content parts.
pub fn record_analysis_messages(
    record_name: &str,
    profile_text: &str,
    document: Vec<ContentPart>,
) -> Vec<ChatMessage> {
    let mut parts = vec![ContentPart::Text(format!(
        "Patient profile:\n{}\n\nDocument: {}",
        profile_block(profile_text),
        record_name
    ))];
    parts.extend(document);
    vec![
        ChatMessage::system(RECORD_SYSTEM),
        ChatMessage::user_parts(parts),
    ]
}

/// Messages asking a question against the user's context.
pub fn question_messages(
    question: &str,
    profile_text: &str,
    records: &[RecordDigest],
    previous: Option<&ConversationTurn>,
) -> Vec<ChatMessage> {
    let mut messages = vec![
        ChatMessage::system(QUESTION_SYSTEM),
        ChatMessage::user(format!(
            "Patient profile:\n{}\n\nRecords:\n{}",
            profile_block(profile_text),
            records_block(records)
        )),
    ];
    if let Some(turn) = previous {
        messages.push(ChatMessage::user(turn.question.clone()));
        messages.push(ChatMessage {
            role: super::client::Role::Assistant,
            parts: vec![ContentPart::Text(turn.answer.clone())],
        });
    }
    messages.push(ChatMessage::user(question.to_string()));
    messages
}

/// Messages asking for a holistic analysis.
pub fn holistic_messages(profile_text: &str, records: &[RecordDigest]) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(HOLISTIC_SYSTEM),
        ChatMessage::user(format!(
            "Patient profile:\n{}\n\nRecords ({}):\n{}",
            profile_block(profile_text),
            records.len(),
            records_block(records)
        )),
    ]
}
