//! Bundle response building.

use serde_json::Value;

/// Returns the `fullUrl` of a stored resource.
pub fn resource_url(base_url: &str, resource_type: &str, id: &str) -> String {
    format!(
        "{}/api/fhir/{}/{}",
        base_url.trim_end_matches('/'),
        resource_type,
        id
    )
}

/// An entry in a searchset Bundle.
#[derive(Debug, Clone)]
pub struct BundleEntry {
    /// Full URL of the resource.
    pub full_url: String,
    /// The resource itself.
    pub resource: Value,
}

impl BundleEntry {
    /// Creates a search result entry.
    pub fn search_result(resource: Value, full_url: impl Into<String>) -> Self {
        Self {
            full_url: full_url.into(),
            resource,
        }
    }

    /// Converts to FHIR JSON.
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "fullUrl": self.full_url,
            "resource": self.resource
        })
    }
}

/// Builder for searchset Bundles.
#[derive(Debug, Default)]
pub struct BundleBuilder {
    entries: Vec<BundleEntry>,
}

impl BundleBuilder {
    /// Creates a searchset bundle builder.
    pub fn searchset() -> Self {
        Self::default()
    }

    /// Adds an entry.
    pub fn add_entry(mut self, entry: BundleEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Adds every resource, deriving `fullUrl` from its `id`.
    pub fn add_resources(
        mut self,
        base_url: &str,
        resource_type: &str,
        resources: impl IntoIterator<Item = Value>,
    ) -> Self {
        for resource in resources {
            let id = resource
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let full_url = resource_url(base_url, resource_type, &id);
            self.entries
                .push(BundleEntry::search_result(resource, full_url));
        }
        self
    }

    /// Builds the Bundle resource; `total` is the number of entries.
    pub fn build(self) -> Value {
        serde_json::json!({
            "resourceType": "Bundle",
            "type": "searchset",
            "total": self.entries.len(),
            "entry": self.entries.iter().map(BundleEntry::to_json).collect::<Vec<_>>()
        })
    }
}
