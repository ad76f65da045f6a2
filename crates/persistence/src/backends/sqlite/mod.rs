//! SQLite backend implementation.
//!
//! Stores every collection in a single `documents` table keyed by
//! `(collection, id)`, with the JSON body kept as text. Supports in-memory
//! databases (for tests) and file databases.
//!
//! # Example
//!
//! ```no_run
//! use wattle_persistence::backends::sqlite::SqliteBackend;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SqliteBackend::open("./data/wattle.db")?;
//! backend.init_schema()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Queries
//!
//! A query loads the collection's rows and evaluates filters and sort order
//! in process with [`crate::query::apply`], so results match the in-memory
//! backend exactly.

mod backend;
mod schema;
mod storage;

pub use backend::{SqliteBackend, SqliteBackendConfig};
pub use schema::SCHEMA_VERSION;
