//! Server module for Trawl serve crate

use crate::handlers::{handle_health, handle_root, AppState};
use crate::search::handle_search;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::any::Any;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, services::ServeDir,
    trace::TraceLayer,
};
use trawl_core::config::ServerSettings;
use trawl_core::{Result, SearchBackend, TrawlConfig, TrawlError};
use trawl_infra::TemplateRenderer;

/// Trawl HTTP server
pub struct TrawlServer {
    settings: ServerSettings,
    app: Router,
}

impl TrawlServer {
    /// Create a server from configuration, connecting the default backend
    /// and loading templates from disk
    pub fn new(config: &TrawlConfig) -> Result<Self> {
        ServerBuilder::new(config.clone()).build()
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr = format!("{}:{}", self.settings.host, self.settings.port);
        let socket_addr: SocketAddr = addr
            .parse()
            .map_err(|e| TrawlError::validation(format!("Invalid address {}: {}", addr, e)))?;

        tracing::info!("Starting Trawl server on {}", addr);

        let listener = tokio::net::TcpListener::bind(socket_addr)
            .await
            .map_err(|e| TrawlError::network(format!("Failed to bind to {}: {}", addr, e)))?;

        axum::serve(listener, self.app)
            .await
            .map_err(|e| TrawlError::network(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// Register routes and middleware
pub fn create_app(state: AppState, settings: &ServerSettings) -> Router {
    create_routes(&settings.static_dir)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // failures are logged by SearchError and handle_panic
                .layer(TraceLayer::new_for_http().on_failure(()))
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(RequestBodyLimitLayer::new(settings.max_request_size)),
        )
}

/// Route table without state
pub fn create_routes(static_dir: &Path) -> Router<AppState> {
    Router::new()
        .route("/", get(handle_root))
        .route("/s", get(handle_search))
        .route("/health", get(handle_health))
        .nest_service("/static", ServeDir::new(static_dir))
}

/// Turn a panic inside a handler into a logged `500`
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    tracing::error!("Request handler panicked: {}", message);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        message,
    )
        .into_response()
}

/// Server builder for configuration
pub struct ServerBuilder {
    config: TrawlConfig,
    backend: Option<Arc<dyn SearchBackend>>,
    templates: Option<Arc<TemplateRenderer>>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new(config: TrawlConfig) -> Self {
        Self {
            config,
            backend: None,
            templates: None,
        }
    }

    /// Set the host address
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.server.host = host.into();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Set hits per page
    pub fn per_page(mut self, per_page: u64) -> Self {
        self.config.search.per_page = per_page;
        self
    }

    /// Use a specific search backend instead of the configured one
    pub fn backend(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use a specific template set instead of loading from disk
    pub fn templates(mut self, templates: Arc<TemplateRenderer>) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Build the server
    pub fn build(self) -> Result<TrawlServer> {
        self.config.validate()?;

        let backend = match self.backend {
            Some(backend) => backend,
            None => trawl_infra::build_backend(&self.config)?,
        };
        let templates = match self.templates {
            Some(templates) => templates,
            None => trawl_infra::build_templates(&self.config)?,
        };

        let state = AppState::new(backend, templates, self.config.search.per_page);
        let app = create_app(state, &self.config.server);

        Ok(TrawlServer {
            settings: self.config.server,
            app,
        })
    }
}
