//! Document query types.
//!
//! A [`DocumentQuery`] is the backend-neutral description of a scan over one
//! collection: a conjunction of field filters, an ordered sort specification
//! and a result limit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operators for field filters.
///
/// The string forms double as the two-letter value prefixes accepted in
/// search query strings (`date=gt2024-01-01`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    /// Equal (default).
    #[default]
    Eq,
    /// Greater than.
    Gt,
    /// Less than.
    Lt,
    /// Greater than or equal.
    Ge,
    /// Less than or equal.
    Le,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::Eq => write!(f, "eq"),
            Comparator::Gt => write!(f, "gt"),
            Comparator::Lt => write!(f, "lt"),
            Comparator::Ge => write!(f, "ge"),
            Comparator::Le => write!(f, "le"),
        }
    }
}

impl FromStr for Comparator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" => Ok(Comparator::Eq),
            "gt" => Ok(Comparator::Gt),
            "lt" => Ok(Comparator::Lt),
            "ge" => Ok(Comparator::Ge),
            "le" => Ok(Comparator::Le),
            _ => Err(format!("unknown comparator: {}", s)),
        }
    }
}

impl Comparator {
    /// Returns true if an ordering of `stored` relative to the comparand
    /// satisfies this comparator.
    pub fn accepts(&self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            Comparator::Eq => ordering == Equal,
            Comparator::Gt => ordering == Greater,
            Comparator::Lt => ordering == Less,
            Comparator::Ge => ordering != Less,
            Comparator::Le => ordering != Greater,
        }
    }
}

/// A dotted path to a possibly nested field (`valueQuantity.value`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    /// Creates a field path from its dotted form.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the dotted form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates over the path's segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Resolves the path against a document, flattening arrays.
    ///
    /// Arrays met along the way fan out: `name.family` on
    /// `{"name": [{"family": "A"}, {"family": "B"}]}` yields both values.
    /// A terminal array yields its elements.
    pub fn resolve<'a>(&self, document: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![document];
        for segment in self.segments() {
            let mut next = Vec::new();
            for value in current {
                collect_child(value, segment, &mut next);
            }
            if next.is_empty() {
                return next;
            }
            current = next;
        }
        let mut resolved = Vec::with_capacity(current.len());
        for value in current {
            match value {
                Value::Array(items) => resolved.extend(items.iter()),
                other => resolved.push(other),
            }
        }
        resolved
    }
}

fn collect_child<'a>(value: &'a Value, segment: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            if let Some(child) = map.get(segment) {
                out.push(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_child(item, segment, out);
            }
        }
        _ => {}
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single field filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    /// The field to test.
    pub field: FieldPath,
    /// How to compare.
    pub comparator: Comparator,
    /// The raw comparand taken from the query string.
    pub value: String,
}

impl FieldFilter {
    /// Creates a filter.
    pub fn new(field: impl Into<String>, comparator: Comparator, value: impl Into<String>) -> Self {
        Self {
            field: FieldPath::new(field),
            comparator,
            value: value.into(),
        }
    }

    /// Creates an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Comparator::Eq, value)
    }
}

/// Sort direction for `_sort` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Ascending,
    /// Descending order.
    Descending,
}

/// A sort directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortField {
    /// The field to sort by.
    pub field: FieldPath,
    /// The direction.
    pub direction: SortDirection,
}

impl SortField {
    /// Ascending sort on a field.
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: FieldPath::new(field),
            direction: SortDirection::Ascending,
        }
    }

    /// Descending sort on a field.
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: FieldPath::new(field),
            direction: SortDirection::Descending,
        }
    }
}

/// A scan over one collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentQuery {
    /// Filters, all of which must match.
    pub filters: Vec<FieldFilter>,
    /// Sort fields, applied in order.
    pub sort: Vec<SortField>,
    /// Maximum number of documents to return.
    pub limit: Option<usize>,
}

impl DocumentQuery {
    /// Creates an empty query (everything, in id order).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter.
    pub fn with_filter(mut self, filter: FieldFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Adds a sort field.
    pub fn with_sort(mut self, sort: SortField) -> Self {
        self.sort.push(sort);
        self
    }

    /// Sets the limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
