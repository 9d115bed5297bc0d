//! Search pipeline
//!
//! - `handlers`: the `/s` request handler
//! - `render`: JSON and HTML response strategies
//! - `error`: the request-scoped error boundary

pub mod error;
pub mod handlers;
pub mod render;

pub use error::SearchError;
pub use handlers::handle_search;
pub use render::{decode_results, render_html, render_json, RenderContext};
