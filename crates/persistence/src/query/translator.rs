//! Query-string to query-plan translation.

use serde::Serialize;

use crate::error::ValidationError;
use crate::path::validate_resource_type;
use crate::types::{Comparator, DocumentQuery, FieldFilter, SortField};

/// Limit applied when `_count` is absent.
pub const DEFAULT_LIMIT: usize = 100;

/// Keys that control the search rather than filter it.
pub const RESERVED_PARAMS: &[&str] = &[
    "_id",
    "_count",
    "_sort",
    "_format",
    "_include",
    "_revinclude",
    "userId",
];

/// A translated search request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    /// The resource type being searched.
    pub resource_type: String,
    /// Point lookup requested via `_id`; when set the scan is skipped.
    pub lookup: Option<String>,
    /// The collection scan.
    pub query: DocumentQuery,
}

impl QueryPlan {
    /// Caps the limit at `max`.
    pub fn clamp_limit(mut self, max: usize) -> Self {
        self.query.limit = Some(self.query.limit.map_or(max, |l| l.min(max)));
        self
    }
}

/// Translates ordered query pairs into a [`QueryPlan`].
///
/// Non-reserved keys become filters on the field with the same (possibly
/// dotted) name. A value starting with `gt`, `lt`, `ge`, `le` or `eq`
/// followed by a digit or sign is a comparison; anything else is an equality
/// test on the whole value, so `status=lemon` never reads as `le` + `mon`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidSearchParameter`] when `_count` is not a
/// non-negative integer, and [`ValidationError::InvalidPathSegment`] for an
/// unusable resource type.
///
/// # Examples
///
/// ```
/// use wattle_persistence::query::translate;
/// use wattle_persistence::types::Comparator;
///
/// let pairs = vec![
///     ("date".to_string(), "gt2023-06-01".to_string()),
///     ("_sort".to_string(), "-date".to_string()),
///     ("_count".to_string(), "5".to_string()),
/// ];
/// let plan = translate("Observation", &pairs, 100).unwrap();
///
/// assert_eq!(plan.query.filters[0].comparator, Comparator::Gt);
/// assert_eq!(plan.query.filters[0].value, "2023-06-01");
/// assert_eq!(plan.query.limit, Some(5));
/// ```
pub fn translate(
    resource_type: &str,
    pairs: &[(String, String)],
    default_limit: usize,
) -> Result<QueryPlan, ValidationError> {
    validate_resource_type(resource_type)?;

    let mut lookup = None;
    let mut query = DocumentQuery::new();
    let mut limit = None;

    for (key, value) in pairs {
        match key.as_str() {
            "_id" => {
                if lookup.is_none() && !value.is_empty() {
                    lookup = Some(value.clone());
                }
            }
            "_count" => {
                let count = value.trim().parse::<usize>().map_err(|_| {
                    ValidationError::InvalidSearchParameter {
                        parameter: "_count".to_string(),
                        message: format!("expected a non-negative integer, got '{}'", value),
                    }
                })?;
                limit = Some(count);
            }
            "_sort" => query.sort.extend(parse_sort(value)),
            "" => {}
            k if RESERVED_PARAMS.contains(&k) => {}
            field => query.filters.push(parse_filter(field, value)),
        }
    }

    query.limit = Some(limit.unwrap_or(default_limit));

    Ok(QueryPlan {
        resource_type: resource_type.to_string(),
        lookup,
        query,
    })
}

/// Parses `_sort=a,-b` into sort fields, skipping empty entries.
fn parse_sort(value: &str) -> Vec<SortField> {
    value
        .split(',')
        .map(str::trim)
        .filter_map(|s| match s.strip_prefix('-') {
            Some("") => None,
            Some(field) => Some(SortField::descending(field)),
            None if s.is_empty() => None,
            None => Some(SortField::ascending(s)),
        })
        .collect()
}

fn parse_filter(field: &str, value: &str) -> FieldFilter {
    let (comparator, comparand) = split_prefix(value);
    FieldFilter::new(field, comparator, comparand)
}

fn split_prefix(value: &str) -> (Comparator, &str) {
    if let (Some(prefix), Some(rest)) = (value.get(..2), value.get(2..)) {
        if let Ok(comparator) = prefix.parse::<Comparator>() {
            let starts_comparand = rest
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+');
            if starts_comparand {
                return (comparator, rest);
            }
        }
    }
    (Comparator::Eq, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SortDirection;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_limit() {
        let plan = translate("Patient", &[], DEFAULT_LIMIT).unwrap();
        assert_eq!(plan.query.limit, Some(100));
        assert!(plan.lookup.is_none());
        assert!(plan.query.filters.is_empty());
    }

    #[test]
    fn test_count_must_be_numeric() {
        let err = translate("Patient", &pairs(&[("_count", "ten")]), 100).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidSearchParameter { ref parameter, .. } if parameter == "_count"
        ));
        assert!(translate("Patient", &pairs(&[("_count", "-1")]), 100).is_err());
    }

    #[test]
    fn test_reserved_keys_do_not_filter() {
        let plan = translate(
            "Patient",
            &pairs(&[
                ("_format", "json"),
                ("_include", "Patient:organization"),
                ("_revinclude", "Observation:subject"),
                ("userId", "someone-else"),
                ("family", "Smith"),
            ]),
            100,
        )
        .unwrap();
        assert_eq!(plan.query.filters, vec![FieldFilter::eq("family", "Smith")]);
    }

    #[test]
    fn test_id_becomes_lookup() {
        let plan = translate("Observation", &pairs(&[("_id", "obs1")]), 100).unwrap();
        assert_eq!(plan.lookup.as_deref(), Some("obs1"));
    }

    #[test]
    fn test_sort_order_and_direction() {
        let plan = translate("Observation", &pairs(&[("_sort", "status,-date,,-")]), 100).unwrap();
        assert_eq!(plan.query.sort.len(), 2);
        assert_eq!(plan.query.sort[0].field.as_str(), "status");
        assert_eq!(plan.query.sort[0].direction, SortDirection::Ascending);
        assert_eq!(plan.query.sort[1].field.as_str(), "date");
        assert_eq!(plan.query.sort[1].direction, SortDirection::Descending);
    }

    #[test]
    fn test_prefix_needs_comparand() {
        assert_eq!(split_prefix("gt2023-06-01"), (Comparator::Gt, "2023-06-01"));
        assert_eq!(split_prefix("le-5"), (Comparator::Le, "-5"));
        assert_eq!(split_prefix("eq7"), (Comparator::Eq, "7"));
        assert_eq!(split_prefix("lemon"), (Comparator::Eq, "lemon"));
        assert_eq!(split_prefix("gt"), (Comparator::Eq, "gt"));
        assert_eq!(split_prefix("final"), (Comparator::Eq, "final"));
    }

    #[test]
    fn test_dotted_key_kept_whole() {
        let plan = translate("Observation", &pairs(&[("code.text", "HbA1c")]), 100).unwrap();
        assert_eq!(plan.query.filters[0].field.as_str(), "code.text");
    }

    #[test]
    fn test_rejects_bad_resource_type() {
        assert!(translate("../records", &[], 100).is_err());
    }

    #[test]
    fn test_clamp_limit() {
        let plan = translate("Patient", &pairs(&[("_count", "5000")]), 100)
            .unwrap()
            .clamp_limit(1000);
        assert_eq!(plan.query.limit, Some(1000));
    }
}
