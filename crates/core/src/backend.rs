//! Search backend contract
//!
//! The pipeline only needs one operation from the index: run a query with a
//! filter and a page window, returning ranked hits and a total. Concrete
//! clients live in `trawl-infra`.

use async_trait::async_trait;

use crate::filter::Filter;
use crate::params::SearchRequest;
use crate::types::SearchResponse;
use crate::Result;

/// A structured backend query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub filter: Filter,
    pub per_page: u64,
    pub page: u64,
}

impl SearchQuery {
    /// Build the backend query for a decoded request
    pub fn from_request(request: &SearchRequest, per_page: u64) -> Self {
        Self {
            query: request.query.clone(),
            filter: request.filter.clone(),
            per_page,
            page: request.page,
        }
    }

    /// Offset of the first hit to fetch
    pub fn offset(&self) -> u64 {
        self.per_page.saturating_mul(self.page)
    }
}

/// Search index client shared by all requests.
///
/// Implementations must be safe for concurrent use; the server holds a
/// single instance behind an `Arc`.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a query. Errors are fatal to the calling request.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse>;

    /// Check whether the backend is reachable
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_from_request() {
        let request = SearchRequest::from_query(Some("q=report&p=2&f=type:pdf"));
        let query = SearchQuery::from_request(&request, 10);

        assert_eq!(query.query, "report");
        assert_eq!(query.page, 2);
        assert_eq!(query.per_page, 10);
        assert_eq!(query.offset(), 20);
        assert_eq!(query.filter, Filter::decode(&["type:pdf"]));
    }
}
