//! Search interaction handler.
//!
//! `GET /api/fhir/{resourceType}?params`
//!
//! Query keys are document field paths (`name.family`, `valueQuantity.value`).
//! Values may carry a `gt`/`lt`/`ge`/`le`/`eq` prefix. `_count`, `_sort` and
//! `_id` control paging, ordering and point lookup.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::debug;
use wattle_persistence::core::{DocumentStore, ResourceRepository, SearchOutcome};
use wattle_persistence::query::translate;

use crate::auth::AuthenticatedUser;
use crate::error::RestResult;
use crate::extractors::SearchParams;
use crate::responses::BundleBuilder;
use crate::state::AppState;

/// Handler for GET search.
///
/// # Response
///
/// - `200 OK` - a searchset Bundle, or the resource itself when `_id` is given
/// - `400 Bad Request` - non-numeric `_count`
/// - `404 Not Found` - `_id` given and no such resource
pub async fn search_handler<S>(
    State(state): State<AppState<S>>,
    Path(resource_type): Path<String>,
    user: AuthenticatedUser,
    params: SearchParams,
) -> RestResult<Response>
where
    S: DocumentStore + Send + Sync + 'static,
{
    debug!(
        resource_type = %resource_type,
        user_id = %user.user_id(),
        params = params.pairs().len(),
        "Processing search request"
    );

    let plan = translate(&resource_type, params.pairs(), state.default_page_size())?
        .clamp_limit(state.max_page_size());

    let outcome = ResourceRepository::new(state.storage(), user.context())
        .search(&plan)
        .await?;

    match outcome {
        SearchOutcome::Single(resource) => Ok(Json(resource).into_response()),
        SearchOutcome::Matches(resources) => {
            debug!(
                resource_type = %resource_type,
                matches = resources.len(),
                "Search complete"
            );
            let bundle = BundleBuilder::searchset()
                .add_resources(state.base_url(), &resource_type, resources)
                .build();
            Ok(Json(bundle).into_response())
        }
    }
}
