//! In-process evaluation of [`DocumentQuery`] values.

use std::cmp::Ordering;

use serde_json::Value;

use crate::types::{Comparator, Document, DocumentQuery, FieldFilter, SortDirection, SortField};

/// Filters, sorts and limits `documents`.
///
/// Documents are first ordered by id, so ties between sort keys (and queries
/// with no sort at all) come back in id order. Documents missing a sort field
/// go after every document that has it, whichever the direction.
pub fn apply(mut documents: Vec<Document>, query: &DocumentQuery) -> Vec<Document> {
    documents.retain(|doc| query.filters.iter().all(|f| matches(f, doc.data())));
    documents.sort_by(|a, b| a.id().cmp(b.id()));

    if !query.sort.is_empty() {
        let mut keyed: Vec<(Vec<Option<SortKey>>, Document)> = documents
            .into_iter()
            .map(|doc| {
                let keys = query
                    .sort
                    .iter()
                    .map(|s| sort_key(&s.field.resolve(doc.data())))
                    .collect();
                (keys, doc)
            })
            .collect();
        keyed.sort_by(|(a, _), (b, _)| compare_keys(&query.sort, a, b));
        documents = keyed.into_iter().map(|(_, doc)| doc).collect();
    }

    if let Some(limit) = query.limit {
        documents.truncate(limit);
    }
    documents
}

/// Returns true if any value at the filter's field satisfies it.
///
/// Equality on a stored string is exact, so numeric-looking identifiers such
/// as `"007"` or long MRNs only match their own spelling.
pub fn matches(filter: &FieldFilter, document: &Value) -> bool {
    filter
        .field
        .resolve(document)
        .into_iter()
        .filter_map(|v| match (v, filter.comparator) {
            (Value::String(s), Comparator::Eq) => Some(s.as_str().cmp(filter.value.as_str())),
            _ => compare_values(v, &filter.value),
        })
        .any(|ordering| filter.comparator.accepts(ordering))
}

/// Orders a stored value relative to a query-string comparand.
///
/// Used for range comparisons and non-string equality. Numeric when both
/// sides parse as numbers, boolean when the stored value
/// is a boolean and the comparand is `true` or `false`, string otherwise.
/// Objects, arrays and nulls are not comparable.
pub fn compare_values(stored: &Value, comparand: &str) -> Option<Ordering> {
    match stored {
        Value::Number(n) => match (n.as_f64(), parse_number(comparand)) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => Some(n.to_string().as_str().cmp(comparand)),
        },
        Value::String(s) => match (parse_number(s), parse_number(comparand)) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => Some(s.as_str().cmp(comparand)),
        },
        Value::Bool(b) => match comparand {
            "true" => Some(b.cmp(&true)),
            "false" => Some(b.cmp(&false)),
            _ => Some(b.to_string().as_str().cmp(comparand)),
        },
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Comparable projection of a value for sorting.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Bool(_) => 0,
            SortKey::Number(_) => 1,
            SortKey::Text(_) => 2,
        }
    }

    fn cmp(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Takes the first sortable value at a field.
fn sort_key(values: &[&Value]) -> Option<SortKey> {
    values.iter().find_map(|v| match v {
        Value::Bool(b) => Some(SortKey::Bool(*b)),
        Value::Number(n) => n.as_f64().map(SortKey::Number),
        Value::String(s) => Some(match parse_number(s) {
            Some(n) => SortKey::Number(n),
            None => SortKey::Text(s.clone()),
        }),
        _ => None,
    })
}

fn compare_keys(sort: &[SortField], a: &[Option<SortKey>], b: &[Option<SortKey>]) -> Ordering {
    for (field, (ka, kb)) in sort.iter().zip(a.iter().zip(b.iter())) {
        let ordering = match (ka, kb) {
            (Some(x), Some(y)) => match field.direction {
                SortDirection::Ascending => x.cmp(y),
                SortDirection::Descending => y.cmp(x),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
