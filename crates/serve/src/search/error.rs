//! Request-scoped search failures
//!
//! Every fatal failure inside the search pipeline is funneled into a
//! [`SearchError`]. Its [`IntoResponse`] implementation is the single place
//! that logs the failure and produces the `500` response.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use trawl_core::TrawlError;

/// Fatal error while handling one search request
#[derive(Debug, Error)]
pub enum SearchError {
    /// The search backend call failed
    #[error("{0}")]
    Backend(TrawlError),

    /// The hit list could not be serialized to JSON
    #[error("{0}")]
    Serialization(#[from] serde_json::Error),

    /// A hit payload could not be decoded into a result
    #[error("{0}")]
    Decode(TrawlError),

    /// The HTML template failed to render
    #[error("{0}")]
    Render(TrawlError),
}

impl SearchError {
    /// Short label used in the log line
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Backend(_) => "backend",
            Self::Serialization(_) => "serialization",
            Self::Decode(_) => "decode",
            Self::Render(_) => "render",
        }
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        tracing::error!(kind = self.kind(), "Search request failed: {}", message);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        )
            .into_response()
    }
}
