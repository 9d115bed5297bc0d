//! Configuration types for Trawl
//!
//! Configuration is read from a YAML or JSON file and can be overridden with
//! `TRAWL_`-prefixed environment variables, using `__` between sections:
//!
//! ```text
//! TRAWL_SEARCH__PER_PAGE=25
//! TRAWL_BACKEND__URL=http://es.internal:9200
//! ```

use crate::{Result, TrawlError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "TRAWL";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrawlConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,
    /// Search pipeline settings
    #[serde(default)]
    pub search: SearchSettings,
    /// Search backend settings
    #[serde(default)]
    pub backend: BackendSettings,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served under `/static`
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    /// Directory holding the HTML templates
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,
    /// Maximum accepted request body size in bytes
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            template_dir: default_template_dir(),
            max_request_size: default_max_request_size(),
        }
    }
}

/// Search pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Hits shown per page
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
        }
    }
}

/// Search backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL of the Elasticsearch-compatible server
    #[serde(default = "default_backend_url")]
    pub url: Url,
    /// Index holding the file documents
    #[serde(default = "default_index")]
    pub index: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            index: default_index(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl TrawlConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        // Try YAML first, then JSON
        match serde_yaml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(_) => {
                let config = serde_json::from_str(&content)?;
                Ok(config)
            }
        }
    }

    /// Load configuration from an optional file plus environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(TrawlError::not_found(format!(
                    "configuration file {}",
                    path.display()
                )));
            }
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.search.per_page == 0 {
            return Err(TrawlError::validation(
                "search.per_page must be greater than 0",
            ));
        }

        if self.backend.url.scheme() != "http" && self.backend.url.scheme() != "https" {
            return Err(TrawlError::validation(
                "Backend URL must use http or https scheme",
            ));
        }

        if self.backend.index.trim().is_empty() {
            return Err(TrawlError::validation("Backend index cannot be empty"));
        }

        Ok(())
    }
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}
fn default_template_dir() -> PathBuf {
    PathBuf::from("templates")
}
fn default_max_request_size() -> usize {
    64 * 1024
}
fn default_per_page() -> u64 {
    10
}
fn default_backend_url() -> Url {
    Url::parse("http://localhost:9200").expect("static URL is valid")
}
fn default_index() -> String {
    "files".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}
