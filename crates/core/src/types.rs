//! Core type definitions for Trawl
//!
//! [`Hit`] and [`SearchResponse`] mirror what the search backend returns and
//! are passed through untouched for JSON output. [`FileResult`] is the
//! presentation projection used by the HTML template.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::humanize::human_bytes;
use crate::{Result, TrawlError};

/// One matching document exactly as returned by the search backend.
///
/// The hit is kept whole so JSON output reproduces every backend field;
/// only `_id` and `_source` are read for HTML rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hit(Value);

impl Hit {
    /// Wrap a raw backend hit
    pub fn from_value(raw: Value) -> Self {
        Self(raw)
    }

    /// Backend document id, when present
    pub fn id(&self) -> Option<&str> {
        self.0.get("_id").and_then(Value::as_str)
    }

    /// Opaque document payload; `null` when the hit carries none
    pub fn source(&self) -> &Value {
        self.0.get("_source").unwrap_or(&Value::Null)
    }

    /// Decode the payload into a [`FileResult`]
    pub fn decode(&self) -> Result<FileResult> {
        let mut result = FileResult::deserialize(self.source()).map_err(|e| {
            TrawlError::decode(format!(
                "hit {} has an invalid payload: {}",
                self.id().unwrap_or("<unknown>"),
                e
            ))
        })?;
        result.human_size = human_bytes(result.size);
        Ok(result)
    }
}

/// Backend result: ranked hits plus the total match count
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Total number of matches across all pages
    pub total: u64,

    /// Hits for the requested page, in rank order
    pub hits: Vec<Hit>,

    /// Backend-reported query time in milliseconds, when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub took: Option<u64>,
}

/// A mirror location of a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    pub path: String,
}

/// Presentation projection of a hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    /// Mirrors holding this file, in backend order
    #[serde(default)]
    pub servers: Vec<Server>,

    pub filename: String,

    /// Size in bytes
    pub size: u64,

    /// Human-readable size, filled in after decoding
    #[serde(default)]
    pub human_size: String,
}
