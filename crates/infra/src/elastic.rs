//! Elasticsearch client implementing the search backend contract

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use trawl_core::config::BackendSettings;
use trawl_core::{Hit, Result, SearchBackend, SearchQuery, SearchResponse, TrawlError};
use url::Url;

/// Elasticsearch client configuration
#[derive(Debug, Clone)]
pub struct ElasticConfig {
    pub base_url: Url,
    pub index: String,
    pub timeout: Duration,
}

impl Default for ElasticConfig {
    fn default() -> Self {
        BackendSettings::default().into()
    }
}

impl From<BackendSettings> for ElasticConfig {
    fn from(settings: BackendSettings) -> Self {
        Self {
            base_url: settings.url,
            index: settings.index,
            timeout: Duration::from_secs(settings.timeout_seconds),
        }
    }
}

/// Search backend talking to an Elasticsearch-compatible `_search` endpoint.
///
/// The inner `reqwest::Client` pools connections and is shared by all
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct ElasticBackend {
    config: ElasticConfig,
    client: reqwest::Client,
}

impl ElasticBackend {
    /// Create a new client
    pub fn new(config: ElasticConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TrawlError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn search_url(&self) -> String {
        format!(
            "{}/{}/_search",
            self.config.base_url.as_str().trim_end_matches('/'),
            self.config.index
        )
    }
}

/// Build the `_search` request body for a query
pub fn build_request_body(query: &SearchQuery) -> Value {
    let text = query.query.trim();
    let must = if text.is_empty() {
        json!({ "match_all": {} })
    } else {
        json!({
            "query_string": {
                "query": text,
                "default_operator": "AND"
            }
        })
    };

    let filters: Vec<Value> = query
        .filter
        .keys()
        .into_iter()
        .map(|key| {
            let values = query.filter.values_for(key);
            if values.len() == 1 {
                json!({ "term": { key: values[0] } })
            } else {
                json!({ "terms": { key: values } })
            }
        })
        .collect();

    json!({
        "from": query.offset(),
        "size": query.per_page,
        "query": {
            "bool": {
                "must": [must],
                "filter": filters
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct ElasticResponse {
    #[serde(default)]
    took: Option<u64>,
    hits: ElasticHits,
}

#[derive(Debug, Deserialize)]
struct ElasticHits {
    #[serde(default)]
    total: ElasticTotal,
    #[serde(default)]
    hits: Vec<Hit>,
}

/// `hits.total` is a number before Elasticsearch 7 and an object after
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ElasticTotal {
    Count(u64),
    Object { value: u64 },
}

impl Default for ElasticTotal {
    fn default() -> Self {
        Self::Count(0)
    }
}

impl ElasticTotal {
    fn value(&self) -> u64 {
        match self {
            Self::Count(n) | Self::Object { value: n } => *n,
        }
    }
}

/// Parse a raw `_search` response body
pub fn parse_response(body: &str) -> Result<SearchResponse> {
    let parsed: ElasticResponse = serde_json::from_str(body)
        .map_err(|e| TrawlError::backend(format!("Invalid search response: {}", e)))?;

    Ok(SearchResponse {
        total: parsed.hits.total.value(),
        hits: parsed.hits.hits,
        took: parsed.took,
    })
}

#[async_trait]
impl SearchBackend for ElasticBackend {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
        let url = self.search_url();
        let body = build_request_body(query);

        tracing::debug!(
            "Searching {}: query='{}', page={}, per_page={}",
            url,
            query.query,
            query.page,
            query.per_page
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TrawlError::backend(format!("Search request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TrawlError::backend(format!("Failed to read search response: {}", e)))?;

        if !status.is_success() {
            return Err(TrawlError::backend(format!(
                "Search backend returned {}: {}",
                status, text
            )));
        }

        parse_response(&text)
    }

    async fn health_check(&self) -> Result<bool> {
        match self.client.get(self.config.base_url.clone()).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::warn!("Search backend health check failed: {}", e);
                Ok(false)
            }
        }
    }
}
