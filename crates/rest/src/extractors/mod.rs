//! Axum extractors.
//!
//! - [`SearchParams`] - ordered query-string pairs
//! - [`JsonBody`] - JSON body with OperationOutcome rejections
//!
//! The bearer-token extractor, [`AuthenticatedUser`](crate::auth::AuthenticatedUser),
//! lives in [`auth`](crate::auth).

mod json_body;
mod search_params;

pub use json_body::JsonBody;
pub use search_params::SearchParams;
