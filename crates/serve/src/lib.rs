//! Trawl Serve Library
//!
//! Web server for the Trawl search front end.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/s` | Search, HTML or JSON (`format=json`) |
//! | `GET`  | `/` | `301` redirect to `/s` |
//! | `GET`  | `/static/*` | Static assets |
//! | `GET`  | `/health` | Backend reachability and version |

pub mod handlers;
pub mod search;
pub mod server;

pub use handlers::AppState;
pub use search::{handle_search, SearchError};
pub use server::*;

/// Server version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
