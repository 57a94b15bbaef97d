//! Trending topic discovery
//!
//! News search plus a gateway-generated topic list. The catalog's trending
//! tables stand in whenever the model reply is unusable.

use crate::cache::{cache_key, MemoryCache};
use crate::catalog::Catalog;
use crate::models::{SearchResult, TrendingResponse, TrendingTopic};
use crate::services::prompt;
use crate::services::providers::{
    GenerationParams, RawSearchResult, SearchKind, TextGenerator, WebSearch,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

const TOPICS_MAX_TOKENS: u32 = 2000;
const IMAGE_PROMPTS_MAX_TOKENS: u32 = 1000;
const ENHANCE_PROMPT_MAX_TOKENS: u32 = 500;
const SEARCH_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicsReply {
    #[serde(default)]
    topics: Vec<TrendingTopic>,
    #[serde(default)]
    image_prompts: Vec<String>,
}

pub struct TrendingService {
    catalog: Arc<Catalog>,
    gateway: Arc<dyn TextGenerator>,
    search: Arc<dyn WebSearch>,
    cache: Arc<MemoryCache>,
}

impl TrendingService {
    pub fn new(
        catalog: Arc<Catalog>,
        gateway: Arc<dyn TextGenerator>,
        search: Arc<dyn WebSearch>,
        cache: Arc<MemoryCache>,
    ) -> Self {
        Self {
            catalog,
            gateway,
            search,
            cache,
        }
    }

    /// Search results plus generated topic ideas for `query`.
    ///
    /// Successful responses are cached per query and category. When the
    /// search itself fails the catalog fallback is returned uncached.
    pub async fn search_trending(&self, query: &str, category: Option<&str>) -> TrendingResponse {
        let key = cache_key("trending", &[query, category.unwrap_or("all")]);
        match self.cache.get::<TrendingResponse>(&key).await {
            Ok(Some(cached)) => return cached,
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring unreadable cache entry {}: {}", key, e),
        }

        let results = match self.search.search(query, SearchKind::News, SEARCH_LIMIT).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("Trending search for {:?} failed: {}", query, e);
                return self.fallback_response(query);
            }
        };

        let params = GenerationParams::new(prompt::build_trending_topics_prompt(query))
            .max_tokens(TOPICS_MAX_TOKENS);
        let reply = match self.gateway.generate(&params).await {
            Ok(text) => parse_json_reply::<TopicsReply>(&text),
            Err(e) => {
                tracing::warn!("Trending topic generation failed: {}", e);
                None
            }
        };
        let (topics, image_prompts) = match reply {
            Some(reply) => (reply.topics, reply.image_prompts),
            None => (
                self.catalog.trending.topics.clone(),
                self.catalog.trending.image_prompts.clone(),
            ),
        };

        let search_results = results
            .organic_results
            .iter()
            .map(|r| to_search_result(r, "Web"))
            .chain(results.news_results.iter().map(|r| to_search_result(r, "News")))
            .collect();

        let response = TrendingResponse {
            topics,
            search_results,
            related_queries: results.related_searches,
            image_prompts,
        };
        if let Err(e) = self.cache.set(&key, &response).await {
            tracing::warn!("Failed to cache trending response {}: {}", key, e);
        }
        response
    }

    fn fallback_response(&self, query: &str) -> TrendingResponse {
        TrendingResponse {
            topics: self.catalog.trending.topics.clone(),
            search_results: Vec::new(),
            related_queries: vec![
                format!("{} trends 2024", query),
                format!("{} best practices", query),
                format!("{} for beginners", query),
                format!("{} tools and resources", query),
                format!("{} case studies", query),
            ],
            image_prompts: self.catalog.trending.image_prompts.clone(),
        }
    }

    pub async fn image_prompt_suggestions(&self, product_type: &str, niche: &str) -> Vec<String> {
        let params = GenerationParams::new(prompt::build_image_prompts_prompt(product_type, niche))
            .max_tokens(IMAGE_PROMPTS_MAX_TOKENS);

        match self.gateway.generate(&params).await {
            Ok(text) => parse_json_reply::<Vec<String>>(&text)
                .unwrap_or_else(|| niche_image_prompts(product_type, niche)),
            Err(e) => {
                tracing::warn!("Image prompt generation failed: {}", e);
                self.catalog.trending.generic_image_prompts.clone()
            }
        }
    }

    /// Sharpen a generation prompt; the original comes back on failure
    pub async fn enhance_prompt(&self, original: &str, product_type: &str) -> String {
        let params = GenerationParams::new(prompt::build_prompt_enhancement(original, product_type))
            .max_tokens(ENHANCE_PROMPT_MAX_TOKENS);

        match self.gateway.generate(&params).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!("Prompt enhancement failed: {}", e);
                original.to_string()
            }
        }
    }
}

fn to_search_result(raw: &RawSearchResult, default_source: &str) -> SearchResult {
    SearchResult {
        title: raw.title.clone().unwrap_or_default(),
        snippet: raw.snippet.clone().unwrap_or_default(),
        url: raw.link.clone().unwrap_or_default(),
        source: raw
            .source
            .clone()
            .unwrap_or_else(|| default_source.to_string()),
        date: raw.date.clone(),
    }
}

/// Parse a reply that is either bare JSON or JSON inside a code fence
pub(crate) fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Option<T> {
    let text = text.trim();
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }

    let after_fence = &text[text.find("```")? + 3..];
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let body = &body[..body.find("```")?];
    serde_json::from_str(body.trim()).ok()
}

fn niche_image_prompts(product_type: &str, niche: &str) -> Vec<String> {
    vec![
        format!(
            "Professional {} cover design with modern typography and {} theme",
            product_type, niche
        ),
        format!("Clean minimalist illustration representing {} concepts", niche),
        format!("High-quality stock photo style image related to {}", niche),
        format!("Infographic-style visual explaining {} key points", niche),
        format!("Social media post template with {} branding", niche),
        format!("Professional headshot or lifestyle photo for {} audience", niche),
        format!("Abstract geometric design with {} color scheme", niche),
        format!("Hand-drawn sketch style illustration for {} content", niche),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::testing::{FailingGenerator, MockGenerator, MockSearch};
    use crate::services::providers::SearchResponse;

    fn service(gateway: Arc<dyn TextGenerator>, search: Arc<MockSearch>) -> TrendingService {
        TrendingService::new(
            Arc::new(Catalog::embedded().unwrap()),
            gateway,
            search,
            Arc::new(MemoryCache::new()),
        )
    }

    fn news() -> SearchResponse {
        SearchResponse {
            organic_results: vec![RawSearchResult {
                title: Some("Budget apps surge".into()),
                link: Some("https://news.test/a".into()),
                ..Default::default()
            }],
            news_results: vec![RawSearchResult {
                title: Some("Savings rates".into()),
                source: Some("Daily Ledger".into()),
                ..Default::default()
            }, RawSearchResult {
                title: Some("Side hustles".into()),
                ..Default::default()
            }],
            related_searches: vec!["budget apps 2024".into()],
        }
    }

    const TOPICS_JSON: &str = r#"{
        "topics": [{
            "id": "zero-based",
            "title": "Zero-Based Budgeting",
            "description": "Every dollar gets a job",
            "category": "Finance",
            "searchVolume": "High",
            "difficulty": "Low",
            "monetizationPotential": "High",
            "keywords": ["budget"],
            "relatedTopics": ["envelopes"]
        }],
        "imagePrompts": ["Calculator on a desk"]
    }"#;

    #[test]
    fn test_parse_json_reply_forms() {
        assert_eq!(
            parse_json_reply::<Vec<String>>(r#" ["a", "b"] "#),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(
            parse_json_reply::<Vec<String>>("Sure!\n```json\n[\"a\"]\n```\nEnjoy"),
            Some(vec!["a".to_string()])
        );
        assert_eq!(parse_json_reply::<Vec<String>>("not json"), None);
        assert_eq!(parse_json_reply::<Vec<String>>("```json\n[1, 2"), None);
    }

    #[tokio::test]
    async fn test_search_maps_results_and_topics() {
        let search = Arc::new(MockSearch::with("budgeting", news()));
        let svc = service(Arc::new(MockGenerator::replying(TOPICS_JSON)), search.clone());

        let response = svc.search_trending("budgeting", Some("Finance")).await;
        assert_eq!(response.topics.len(), 1);
        assert_eq!(response.topics[0].id, "zero-based");
        assert_eq!(response.image_prompts, vec!["Calculator on a desk"]);
        assert_eq!(response.related_queries, vec!["budget apps 2024"]);

        let sources: Vec<_> = response.search_results.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(sources, vec!["Web", "Daily Ledger", "News"]);
        assert_eq!(response.search_results[0].url, "https://news.test/a");

        // second call is served from the cache
        svc.search_trending("budgeting", Some("Finance")).await;
        assert_eq!(search.queries.lock().unwrap().len(), 1);
        svc.search_trending("budgeting", None).await;
        assert_eq!(search.queries.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unparseable_reply_uses_catalog_topics() {
        let search = Arc::new(MockSearch::with("budgeting", news()));
        let svc = service(Arc::new(MockGenerator::replying("Here are some ideas...")), search);

        let response = svc.search_trending("budgeting", None).await;
        assert_eq!(response.topics.len(), 5);
        assert_eq!(response.topics[0].id, "ai-productivity");
        assert_eq!(response.search_results.len(), 3);
        assert_eq!(response.image_prompts.len(), 8);
    }

    #[tokio::test]
    async fn test_search_failure_returns_fallback() {
        let svc = service(Arc::new(MockGenerator::replying(TOPICS_JSON)), Arc::new(MockSearch::default()));
        let response = svc.search_trending("keto", None).await;

        assert!(response.search_results.is_empty());
        assert_eq!(
            response.related_queries,
            vec![
                "keto trends 2024",
                "keto best practices",
                "keto for beginners",
                "keto tools and resources",
                "keto case studies"
            ]
        );
        assert_eq!(response.topics.len(), 5);
    }

    #[tokio::test]
    async fn test_image_prompts() {
        let svc = service(
            Arc::new(MockGenerator::replying(r#"["Sunrise yoga mat"]"#)),
            Arc::new(MockSearch::default()),
        );
        assert_eq!(svc.image_prompt_suggestions("eBook", "yoga").await, vec!["Sunrise yoga mat"]);

        let svc = service(Arc::new(MockGenerator::replying("nope")), Arc::new(MockSearch::default()));
        let prompts = svc.image_prompt_suggestions("eBook", "yoga").await;
        assert_eq!(prompts.len(), 8);
        assert_eq!(
            prompts[0],
            "Professional eBook cover design with modern typography and yoga theme"
        );

        let svc = service(Arc::new(FailingGenerator), Arc::new(MockSearch::default()));
        let prompts = svc.image_prompt_suggestions("eBook", "yoga").await;
        assert_eq!(prompts[0], "Professional cover design with modern typography");
    }

    #[tokio::test]
    async fn test_enhance_prompt() {
        let svc = service(
            Arc::new(MockGenerator::replying("  Sharper prompt \n")),
            Arc::new(MockSearch::default()),
        );
        assert_eq!(svc.enhance_prompt("prompt", "eBook").await, "Sharper prompt");

        let svc = service(Arc::new(FailingGenerator), Arc::new(MockSearch::default()));
        assert_eq!(svc.enhance_prompt("prompt", "eBook").await, "prompt");
    }
}
