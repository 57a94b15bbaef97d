//! Web search collaborator

use super::{FetchRequest, HttpFetcher, ProviderError};
use crate::cache::{cache_key, MemoryCache};
use crate::config::SearchConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Web,
    News,
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchKind::Web => write!(f, "web"),
            SearchKind::News => write!(f, "news"),
        }
    }
}

/// One hit as returned by the search backend; every field may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSearchResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub organic_results: Vec<RawSearchResult>,
    #[serde(default)]
    pub news_results: Vec<RawSearchResult>,
    #[serde(default)]
    pub related_searches: Vec<String>,
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(
        &self,
        query: &str,
        kind: SearchKind,
        limit: u32,
    ) -> Result<SearchResponse, ProviderError>;
}

/// Search over HTTP, cached per `(query, kind, limit)`
pub struct HttpSearchClient {
    fetcher: Arc<dyn HttpFetcher>,
    cache: Arc<MemoryCache>,
    url: String,
    authorized: bool,
    timeout: Duration,
}

impl HttpSearchClient {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, cache: Arc<MemoryCache>, config: &SearchConfig) -> Self {
        Self {
            fetcher,
            cache,
            url: config.url.clone(),
            authorized: config.api_key.is_some(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    async fn fetch_uncached(
        &self,
        query: &str,
        kind: SearchKind,
        limit: u32,
    ) -> Result<SearchResponse, ProviderError> {
        let body = serde_json::json!({ "query": query, "type": kind, "limit": limit });
        let mut request = FetchRequest::post(self.url.clone(), body).timeout(self.timeout);
        if self.authorized {
            request = request.header("Authorization", "Bearer {{SEARCH_API_KEY}}");
        }

        let response = self.fetcher.fetch(request).await?;
        if !(200..300).contains(&response.status) {
            return Err(ProviderError::Status {
                provider: "Search".to_string(),
                status: response.status,
                message: response
                    .error_message()
                    .unwrap_or("Unknown error")
                    .to_string(),
            });
        }

        serde_json::from_value(response.body).map_err(|e| ProviderError::InvalidResponse {
            provider: "Search".to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl WebSearch for HttpSearchClient {
    async fn search(
        &self,
        query: &str,
        kind: SearchKind,
        limit: u32,
    ) -> Result<SearchResponse, ProviderError> {
        let key = cache_key("search", &[query, &kind.to_string(), &limit.to_string()]);
        self.cache
            .get_or_fetch(&key, || self.fetch_uncached(query, kind, limit))
            .await
    }
}
