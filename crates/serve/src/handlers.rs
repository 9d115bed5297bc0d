//! HTTP handlers for Trawl serve crate

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Serialize;
use std::sync::Arc;
use trawl_core::SearchBackend;
use trawl_infra::TemplateRenderer;

/// Application state shared across handlers.
///
/// Built once at startup and never mutated; cloning only bumps reference
/// counts.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn SearchBackend>,
    pub templates: Arc<TemplateRenderer>,
    pub per_page: u64,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        templates: Arc<TemplateRenderer>,
        per_page: u64,
    ) -> Self {
        Self {
            backend,
            templates,
            per_page,
        }
    }
}

/// `GET /` permanently redirects to the search page
pub async fn handle_root() -> impl IntoResponse {
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, "/s")])
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: bool,
}

/// `GET /health` reports whether the search backend is reachable
pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let backend = match state.backend.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Backend health check errored: {}", e);
            false
        }
    };

    let (status, label) = if backend {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            version: crate::VERSION.to_string(),
            backend,
        }),
    )
}
