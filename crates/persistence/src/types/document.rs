//! Stored document type.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON document stored under a collection path.
///
/// The id is the document key within its collection. For FHIR resources the
/// id also appears inside `data` as the `id` element; for other collections
/// the stored body may or may not carry it.
///
/// # Examples
///
/// ```
/// use wattle_persistence::types::Document;
/// use serde_json::json;
///
/// let doc = Document::new("obs1", json!({"resourceType": "Observation", "id": "obs1"}));
/// assert_eq!(doc.id(), "obs1");
/// assert_eq!(doc.resource_type(), Some("Observation"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: String,
    data: Value,
}

impl Document {
    /// Creates a document.
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Returns the document key.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the document body.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Returns a mutable reference to the body.
    pub fn data_mut(&mut self) -> &mut Value {
        &mut self.data
    }

    /// Consumes the document, returning its body.
    pub fn into_data(self) -> Value {
        self.data
    }

    /// Returns the body's `resourceType`, if it has one.
    pub fn resource_type(&self) -> Option<&str> {
        self.data.get("resourceType").and_then(Value::as_str)
    }

    /// Returns `meta.versionId`, if present.
    pub fn version_id(&self) -> Option<&str> {
        self.data
            .get("meta")
            .and_then(|m| m.get("versionId"))
            .and_then(Value::as_str)
    }

    /// Returns the body with the document key injected as `id`.
    ///
    /// Used for collections whose stored body does not carry its own id.
    pub fn to_json_with_id(&self) -> Value {
        let mut value = self.data.clone();
        if let Value::Object(map) = &mut value {
            map.insert("id".to_string(), Value::String(self.id.clone()));
        }
        value
    }
}

/// Formats a timestamp the way it is written into stored documents.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The current time at the precision timestamps are stored with.
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Writes `meta.versionId` and `meta.lastUpdated`, keeping any other meta
/// elements the caller supplied.
pub(crate) fn stamp_meta(resource: &mut Map<String, Value>, version_id: u64, at: DateTime<Utc>) {
    let meta = resource
        .entry("meta")
        .or_insert_with(|| Value::Object(Map::new()));
    if !meta.is_object() {
        *meta = Value::Object(Map::new());
    }
    if let Value::Object(meta) = meta {
        meta.insert(
            "versionId".to_string(),
            Value::String(version_id.to_string()),
        );
        meta.insert(
            "lastUpdated".to_string(),
            Value::String(format_timestamp(at)),
        );
    }
}
