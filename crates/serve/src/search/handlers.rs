//! Search request handler
//!
//! # Endpoint
//!
//! ```text
//! GET /s?q=<query>&p=<page>&f=<key:value>...&format=<html|json>
//! ```
//!
//! The pipeline decodes the parameters, runs one backend query, and renders
//! either the raw hits as JSON or the results template as HTML. Any failure
//! after decoding is fatal to the request and becomes a `500` through
//! [`SearchError`].

use axum::{
    extract::{OriginalUri, State},
    response::Response,
};
use std::time::Instant;
use tracing::debug;
use trawl_core::{OutputFormat, SearchQuery, SearchRequest};

use super::error::SearchError;
use super::render::{render_html, render_json, RenderContext};
use crate::handlers::AppState;

/// GET handler for `/s`
pub async fn handle_search(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, SearchError> {
    let start = Instant::now();

    let request = SearchRequest::from_query(uri.query());
    debug!(
        "Search request: query='{}', page={}, filters={}, format={}",
        request.query,
        request.page,
        request.filter.len(),
        request.format
    );

    let query = SearchQuery::from_request(&request, state.per_page);
    let response = state
        .backend
        .search(&query)
        .await
        .map_err(SearchError::Backend)?;

    debug!(
        "Backend returned {} hits of {} for '{}'",
        response.hits.len(),
        response.total,
        request.query
    );

    match request.format {
        OutputFormat::Json => render_json(&response.hits),
        OutputFormat::Html => {
            let elapsed = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            let context = RenderContext::build(
                &request,
                response,
                state.per_page,
                &uri.to_string(),
                elapsed,
            )?;
            render_html(&state.templates, &context)
        }
    }
}
