//! Resource query translation and evaluation.
//!
//! [`translate`] turns the ordered key/value pairs of a search query string
//! into a [`QueryPlan`]. [`evaluate`] applies the plan's [`DocumentQuery`] to
//! a set of documents; every backend calls it so that filter and sort
//! semantics are identical regardless of where documents live.
//!
//! [`DocumentQuery`]: crate::types::DocumentQuery

pub mod evaluate;
mod translator;

pub use evaluate::{apply, compare_values, matches};
pub use translator::{DEFAULT_LIMIT, QueryPlan, RESERVED_PARAMS, translate};
