//! Wattle Persistence Layer
//!
//! User-scoped document storage for Wattle: uploaded health records,
//! conversation history, profiles, generated analyses and FHIR-shaped
//! resources, all kept as JSON documents in a hierarchical collection
//! layout.
//!
//! # Architecture
//!
//! - [`path`] - collection paths (`users/{userId}/fhir/{type}` and friends)
//! - [`user`] - the user scope every repository operation requires
//! - [`types`] - documents, queries and the typed record shapes
//! - [`query`] - query-string translation and in-process evaluation
//! - [`core`] - the [`DocumentStore`] trait and per-collection repositories
//! - [`backends`] - in-memory and SQLite stores
//! - [`error`] - error types for all operations
//!
//! # Backend Features
//!
//! - `sqlite` (default) - SQLite with in-memory and file modes
//!
//! The in-memory backend is always available.
//!
//! # Quick Start
//!
//! ```
//! use wattle_persistence::backends::memory::MemoryStore;
//! use wattle_persistence::core::{ResourceRepository, SearchOutcome};
//! use wattle_persistence::query::translate;
//! use wattle_persistence::user::{UserContext, UserId};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let store = MemoryStore::new();
//! let user = UserContext::new(UserId::parse("uid-123").unwrap());
//! let resources = ResourceRepository::new(&store, &user);
//!
//! let created = resources
//!     .create("Observation", json!({"resourceType": "Observation", "status": "final"}))
//!     .await
//!     .unwrap();
//! assert_eq!(created["meta"]["versionId"], "1");
//!
//! let pairs = vec![("status".to_string(), "final".to_string())];
//! let plan = translate("Observation", &pairs, 100).unwrap();
//! match resources.search(&plan).await.unwrap() {
//!     SearchOutcome::Matches(found) => assert_eq!(found.len(), 1),
//!     SearchOutcome::Single(_) => unreachable!(),
//! }
//! # });
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod core;
pub mod error;
pub mod path;
pub mod query;
pub mod types;
pub mod user;

// Re-export commonly used types at crate root
pub use error::{StorageError, StorageResult};
pub use path::CollectionPath;
pub use user::{UserContext, UserId};

pub use core::DocumentStore;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
