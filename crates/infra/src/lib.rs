//! Trawl Infrastructure Library
//!
//! Infrastructure components for the Trawl search front end: the
//! Elasticsearch backend client, the HTML template renderer and logging
//! setup.

use std::sync::Arc;
use trawl_core::{Result, SearchBackend, TrawlConfig};

pub mod elastic;
pub mod logger;
pub mod templates;

pub use elastic::{ElasticBackend, ElasticConfig};
pub use logger::*;
pub use templates::{TemplateRenderer, RESULTS_TEMPLATE};

/// Infrastructure version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the shared search backend for a configuration
pub fn build_backend(config: &TrawlConfig) -> Result<Arc<dyn SearchBackend>> {
    tracing::info!(
        "Using search backend {} (index '{}')",
        config.backend.url,
        config.backend.index
    );
    let backend = ElasticBackend::new(config.backend.clone().into())?;
    Ok(Arc::new(backend))
}

/// Load the shared template set for a configuration
pub fn build_templates(config: &TrawlConfig) -> Result<Arc<TemplateRenderer>> {
    let renderer = TemplateRenderer::from_dir(&config.server.template_dir)?;
    Ok(Arc::new(renderer))
}
