//! Core types for the persistence layer.
//!
//! - [`Document`] - a JSON body stored under a collection path
//! - [`DocumentQuery`], [`FieldFilter`], [`SortField`] - collection scans
//! - [`HealthRecord`], [`ConversationTurn`], [`HolisticAnalysis`] - typed
//!   shapes of the non-FHIR collections
//!
//! # Building a Query
//!
//! ```
//! use wattle_persistence::types::{Comparator, DocumentQuery, FieldFilter, SortField};
//!
//! let query = DocumentQuery::new()
//!     .with_filter(FieldFilter::new("effectiveDateTime", Comparator::Gt, "2023-06-01"))
//!     .with_sort(SortField::descending("effectiveDateTime"))
//!     .with_limit(10);
//!
//! assert_eq!(query.filters.len(), 1);
//! assert_eq!(query.limit, Some(10));
//! ```

mod document;
mod query;
mod record;

pub use document::{Document, current_timestamp, format_timestamp};
pub(crate) use document::stamp_meta;
pub use query::{
    Comparator, DocumentQuery, FieldFilter, FieldPath, SortDirection, SortField,
};
pub use record::{ConversationTurn, HealthRecord, HolisticAnalysis};
