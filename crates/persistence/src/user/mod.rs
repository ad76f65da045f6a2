//! User scoping for the document store.
//!
//! Every piece of Wattle data lives beneath a `users/{userId}` prefix. The
//! types in this module make that prefix impossible to forget: repository
//! operations take a [`UserContext`], and a [`UserId`] can only be built from
//! a string that is safe to use as a single path segment.
//!
//! # Examples
//!
//! ```
//! use wattle_persistence::user::{UserContext, UserId};
//!
//! let user = UserId::parse("uid-123").unwrap();
//! let ctx = UserContext::new(user).with_correlation_id("req-42");
//!
//! assert_eq!(ctx.user_id().as_str(), "uid-123");
//! assert_eq!(ctx.correlation_id(), Some("req-42"));
//! ```

mod context;
mod id;

pub use context::UserContext;
pub use id::UserId;
