//! Response building.
//!
//! - [`bundle`] - searchset Bundle building
//!
//! OperationOutcome bodies are produced by [`RestError`](crate::RestError).

pub mod bundle;

pub use bundle::{BundleBuilder, BundleEntry, resource_url};
