//! Ordered query-string extractor.
//!
//! Search semantics depend on parameter order (`_sort` lists, repeated keys),
//! so the query string is kept as an ordered list of pairs instead of a map.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

/// Axum extractor for query-string pairs, in request order.
///
/// # Example
///
/// ```rust,ignore
/// use wattle_rest::extractors::SearchParams;
///
/// async fn search_handler(params: SearchParams) {
///     for (name, value) in params.iter() {
///         println!("{} = {}", name, value);
///     }
/// }
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pairs: Vec<(String, String)>,
}

impl SearchParams {
    /// Parses a raw (percent-encoded) query string.
    pub fn parse(query: &str) -> Self {
        Self {
            pairs: url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    /// Returns the pairs in request order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Returns an iterator over all parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the first non-empty value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(k, v)| *k == name && !v.is_empty())
            .map(|(_, v)| v)
    }

    /// Returns true if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<S> FromRequestParts<S> for SearchParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.uri.query().map(Self::parse).unwrap_or_default())
    }
}
