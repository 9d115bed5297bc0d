//! Facet filters decoded from repeated `f` query parameters
//!
//! Each token is self-describing and has the form `key:value`, for example
//! `type:pdf` or `server:ftp.example.org`. A [`Filter`] is the normalized set
//! of constraints: insertion order does not matter and duplicates collapse.
//!
//! # Examples
//!
//! ```rust
//! use trawl_core::filter::Filter;
//!
//! let filter = Filter::decode(&["type:pdf", "garbage", "type:pdf"]);
//! assert_eq!(filter.len(), 1);
//! assert_eq!(filter.encode(), vec!["type:pdf".to_string()]);
//! ```

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::{Result, TrawlError};

/// Separator between facet key and value in an encoded token
pub const TOKEN_SEPARATOR: char = ':';

/// A single facet constraint
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FilterConstraint {
    key: String,
    value: String,
}

impl FilterConstraint {
    /// Create a constraint, validating key and value
    pub fn new<K: Into<String>, V: Into<String>>(key: K, value: V) -> Result<Self> {
        let key = key.into().trim().to_string();
        let value = value.into().trim().to_string();

        if key.is_empty() {
            return Err(TrawlError::validation("filter key cannot be empty"));
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(TrawlError::validation(format!(
                "invalid filter key '{}'",
                key
            )));
        }
        if value.is_empty() {
            return Err(TrawlError::validation(format!(
                "filter '{}' has no value",
                key
            )));
        }

        Ok(Self { key, value })
    }

    /// Facet key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Facet value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Encoded `key:value` form
    pub fn token(&self) -> String {
        self.to_string()
    }
}

impl FromStr for FilterConstraint {
    type Err = TrawlError;

    fn from_str(token: &str) -> Result<Self> {
        let (key, value) = token.split_once(TOKEN_SEPARATOR).ok_or_else(|| {
            TrawlError::validation(format!("filter token '{}' has no separator", token))
        })?;
        Self::new(key, value)
    }
}

impl fmt::Display for FilterConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.key, TOKEN_SEPARATOR, self.value)
    }
}

impl Serialize for FilterConstraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Echo<'a> {
            key: &'a str,
            value: &'a str,
            token: String,
        }

        Echo {
            key: &self.key,
            value: &self.value,
            token: self.token(),
        }
        .serialize(serializer)
    }
}

/// Normalized set of facet constraints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    constraints: BTreeSet<FilterConstraint>,
}

impl Filter {
    /// Create an empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a filter from encoded tokens.
    ///
    /// Decoding never fails: malformed tokens are skipped and logged at
    /// debug level.
    pub fn decode<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut filter = Self::new();
        for token in tokens {
            let token = token.as_ref();
            match token.parse::<FilterConstraint>() {
                Ok(constraint) => {
                    filter.constraints.insert(constraint);
                }
                Err(e) => tracing::debug!("Dropping filter token '{}': {}", token, e),
            }
        }
        filter
    }

    /// Encode into sorted `key:value` tokens
    pub fn encode(&self) -> Vec<String> {
        self.constraints.iter().map(FilterConstraint::token).collect()
    }

    /// Distinct facet keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.constraints.iter().map(|c| c.key()).collect();
        keys.dedup();
        keys
    }

    /// All values constrained for a key, sorted
    pub fn values_for(&self, key: &str) -> Vec<&str> {
        self.constraints
            .iter()
            .filter(|c| c.key() == key)
            .map(|c| c.value())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.constraints.len()))?;
        for constraint in &self.constraints {
            seq.serialize_element(constraint)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_tokens() {
        let filter = Filter::decode(&["type:pdf", "server:ftp.example.org"]);
        assert_eq!(filter.len(), 2);
        assert_eq!(filter.values_for("type"), vec!["pdf"]);
        assert_eq!(filter.values_for("server"), vec!["ftp.example.org"]);
    }

    #[test]
    fn test_decode_drops_malformed_tokens() {
        let filter = Filter::decode(&["type:pdf", "nocolon", ":value", "key:", "bad key:x"]);
        assert_eq!(filter.encode(), vec!["type:pdf".to_string()]);
    }

    #[test]
    fn test_decode_is_order_independent() {
        let a = Filter::decode(&["type:pdf", "lang:en"]);
        let b = Filter::decode(&["lang:en", "type:pdf"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_duplicates_collapse() {
        let filter = Filter::decode(&["type:pdf", "type:pdf", " type : pdf "]);
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn test_value_may_contain_separator() {
        let filter = Filter::decode(&["url:http://example.org"]);
        assert_eq!(filter.values_for("url"), vec!["http://example.org"]);
    }

    #[test]
    fn test_encode_decode_is_stable() {
        let filter = Filter::decode(&["type:pdf", "type:txt", "lang:en"]);
        let again = Filter::decode(&filter.encode());
        assert_eq!(filter, again);
        assert_eq!(
            filter.encode(),
            vec!["lang:en", "type:pdf", "type:txt"]
        );
    }

    #[test]
    fn test_keys_are_distinct() {
        let filter = Filter::decode(&["type:pdf", "type:txt", "lang:en"]);
        assert_eq!(filter.keys(), vec!["lang", "type"]);
    }

    #[test]
    fn test_empty_input() {
        let filter = Filter::decode::<&str>(&[]);
        assert!(filter.is_empty());
        assert_eq!(filter, Filter::new());
    }

    #[test]
    fn test_serialize_for_template_echo() {
        let filter = Filter::decode(&["type:pdf"]);
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "key": "type", "value": "pdf", "token": "type:pdf" }])
        );
    }

    #[test]
    fn test_constraint_rejects_invalid_key() {
        assert!(FilterConstraint::new("ty pe", "pdf").is_err());
        assert!(FilterConstraint::new("", "pdf").is_err());
        assert!(FilterConstraint::new("type", "  ").is_err());
        assert!(FilterConstraint::new("file.ext", "pdf").is_ok());
    }
}
