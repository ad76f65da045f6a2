//! HTTP request handlers.
//!
//! Resource interactions under `/api/fhir`:
//!
//! - [`create`] - Create a resource
//! - [`read`] - Read a resource by ID
//! - [`search`] - Search a resource type
//! - [`update`] - Replace an existing resource
//! - [`delete`] - Delete a resource
//!
//! Health record features:
//!
//! - [`records`] - Record CRUD and comments
//! - [`upload`] - Multipart file upload
//! - [`analysis`] - Record and holistic analysis
//! - [`question`] - Question answering
//! - [`transcribe`] - Speech to text
//! - [`conversations`] - Question history
//! - [`profile`] - User profile
//! - [`files`] - Blob download
//! - [`health`] - Health check endpoint

pub mod analysis;
mod context;
pub mod conversations;
pub mod create;
pub mod delete;
pub mod files;
pub mod health;
pub mod profile;
pub mod question;
pub mod read;
pub mod records;
pub mod search;
pub mod transcribe;
pub mod update;
pub mod upload;

use crate::error::{RestError, RestResult};
use crate::extractors::SearchParams;

// Re-export handlers for convenience
pub use analysis::{analyze_record_handler, holistic_get_handler, holistic_post_handler};
pub use conversations::{get_conversation_handler, list_conversations_handler};
pub use create::create_handler;
pub use delete::{delete_collection_handler, delete_handler};
pub use files::file_handler;
pub use health::health_handler;
pub use profile::{get_profile_handler, put_profile_handler};
pub use question::question_handler;
pub use read::read_handler;
pub use records::{
    add_comment_handler, create_record_handler, delete_record_handler, get_record_handler,
    list_records_handler,
};
pub use search::search_handler;
pub use transcribe::transcribe_handler;
pub use update::{update_collection_handler, update_handler};
pub use upload::upload_handler;

/// Reads `_count` for the list endpoints, clamped to `max`.
pub(crate) fn count_param(params: &SearchParams, max: usize) -> RestResult<Option<usize>> {
    params
        .get("_count")
        .map(|raw| {
            raw.trim()
                .parse::<usize>()
                .map(|n| n.min(max))
                .map_err(|_| RestError::bad_request(format!("Invalid _count value: {}", raw)))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_param() {
        assert_eq!(count_param(&SearchParams::parse(""), 100).unwrap(), None);
        assert_eq!(count_param(&SearchParams::parse("_count=5"), 100).unwrap(), Some(5));
        assert_eq!(count_param(&SearchParams::parse("_count=500"), 100).unwrap(), Some(100));
        assert!(count_param(&SearchParams::parse("_count=abc"), 100).is_err());
        assert!(count_param(&SearchParams::parse("_count=-1"), 100).is_err());
    }
}
