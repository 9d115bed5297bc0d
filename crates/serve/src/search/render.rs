//! Response rendering for search results
//!
//! JSON output passes the backend hits through unmodified. HTML output
//! decodes every hit into a [`FileResult`] and executes the results template
//! with a [`RenderContext`].

use axum::{
    http::header,
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use trawl_core::{FileResult, Filter, Hit, PageWindow, SearchRequest, SearchResponse};
use trawl_infra::{TemplateRenderer, RESULTS_TEMPLATE};

use super::error::SearchError;

/// Everything the results template can see
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext {
    pub query: String,
    pub filters: Filter,
    #[serde(flatten)]
    pub window: PageWindow,
    /// Whole milliseconds since the handler started
    pub elapsed: u64,
    pub response: SearchResponse,
    pub results: Vec<FileResult>,
}

impl RenderContext {
    /// Build the HTML context.
    ///
    /// Fails on the first hit whose payload does not decode, so a page is
    /// never rendered with missing entries.
    pub fn build(
        request: &SearchRequest,
        response: SearchResponse,
        per_page: u64,
        current_uri: &str,
        elapsed: u64,
    ) -> Result<Self, SearchError> {
        let results = decode_results(&response.hits)?;
        let window = PageWindow::new(request.page, per_page, response.total, current_uri);

        Ok(Self {
            query: request.query.clone(),
            filters: request.filter.clone(),
            window,
            elapsed,
            response,
            results,
        })
    }
}

/// Decode every hit payload, aborting on the first failure
pub fn decode_results(hits: &[Hit]) -> Result<Vec<FileResult>, SearchError> {
    hits.iter()
        .map(|hit| hit.decode().map_err(SearchError::Decode))
        .collect()
}

/// Serialize the raw hits as a JSON array
pub fn render_json(hits: &[Hit]) -> Result<Response, SearchError> {
    let body = serde_json::to_vec(hits)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Execute the results template.
///
/// The page is rendered into a buffer first, so a template failure still
/// yields a clean `500` instead of a truncated page.
pub fn render_html(
    templates: &TemplateRenderer,
    context: &RenderContext,
) -> Result<Response, SearchError> {
    let mut buffer = Vec::with_capacity(8 * 1024);
    templates
        .render_to_write(RESULTS_TEMPLATE, context, &mut buffer)
        .map_err(SearchError::Render)?;
    Ok(Html(buffer).into_response())
}
