//! Trawl Core Library
//!
//! Core functionality for the Trawl search front end: request parameter
//! decoding, facet filters, page window computation, the search backend
//! contract and the result types rendered by the server.

pub mod backend;
pub mod config;
pub mod error;
pub mod filter;
pub mod humanize;
pub mod pagination;
pub mod params;
pub mod types;

// Re-export commonly used types
pub use backend::{SearchBackend, SearchQuery};
pub use config::TrawlConfig;
pub use error::{Result, TrawlError};
pub use filter::{Filter, FilterConstraint};
pub use humanize::human_bytes;
pub use pagination::{link_for, page_count, PageWindow};
pub use params::{OutputFormat, SearchRequest};
pub use types::{FileResult, Hit, SearchResponse, Server};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version info as a formatted string
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
