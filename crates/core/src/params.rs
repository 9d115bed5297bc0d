//! Search request parameter decoding
//!
//! Recognized parameters:
//! - `q`: free-text query, empty when absent
//! - `p`: zero-based page, `0` when absent or not a non-negative integer
//! - `f`: facet filter token, may be repeated
//! - `format`: `json` selects JSON output, anything else means HTML
//!
//! Decoding is total: a request never fails because of its parameters.

use serde::Serialize;
use std::fmt;
use url::form_urlencoded;

use crate::filter::Filter;

/// Output format selected by the `format` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
}

impl OutputFormat {
    /// Map a raw parameter value; only the exact literal `json` selects JSON
    pub fn from_param(value: &str) -> Self {
        if value == "json" {
            Self::Json
        } else {
            Self::Html
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Html => write!(f, "html"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Decoded per-request search state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub format: OutputFormat,
    pub page: u64,
    pub filter: Filter,
}

impl SearchRequest {
    /// Decode from a raw (undecoded) query string such as `q=a&p=1`
    pub fn from_query(raw: Option<&str>) -> Self {
        let pairs: Vec<(String, String)> = raw
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self::from_pairs(&pairs)
    }

    /// Decode from already split key/value pairs.
    ///
    /// For scalar parameters the first occurrence wins.
    pub fn from_pairs<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> Self {
        let first = |name: &str| {
            pairs
                .iter()
                .find(|(k, _)| k.as_ref() == name)
                .map(|(_, v)| v.as_ref())
        };

        let query = first("q").unwrap_or_default().to_string();
        let format = OutputFormat::from_param(first("format").unwrap_or_default());
        let page = parse_page(first("p"));

        let tokens: Vec<&str> = pairs
            .iter()
            .filter(|(k, _)| k.as_ref() == "f")
            .map(|(_, v)| v.as_ref())
            .collect();
        let filter = Filter::decode(&tokens);

        Self {
            query,
            format,
            page,
            filter,
        }
    }
}

/// Parse the page parameter, falling back to `0`.
///
/// Only plain decimal digits are accepted; surrounding whitespace makes the
/// value invalid.
pub fn parse_page(value: Option<&str>) -> u64 {
    value.and_then(|v| v.parse::<u64>().ok()).unwrap_or(0)
}
