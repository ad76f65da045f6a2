//! Core storage traits and repositories.
//!
//! - [`DocumentStore`] - the backend abstraction (collections of JSON documents)
//! - [`ResourceRepository`] - FHIR-shaped resource CRUD with meta handling
//! - [`RecordRepository`], [`ConversationRepository`], [`ProfileRepository`] -
//!   typed access to the other per-user collections
//!
//! Repositories borrow a store and a [`UserContext`](crate::user::UserContext);
//! every path they touch is derived from the context's user id, so one user's
//! repository cannot reach another user's documents.

mod conversations;
mod profile;
mod records;
mod resources;
mod store;

pub use conversations::ConversationRepository;
pub use profile::{ProfileRepository, profile_text};
pub use records::RecordRepository;
pub use resources::{ResourceRepository, SearchOutcome};
pub use store::DocumentStore;
