//! Trending topic models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingTopic {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub search_volume: String,
    /// Low, Medium or High
    pub difficulty: String,
    /// Low, Medium, High or Very High
    pub monetization_potential: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub related_topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingResponse {
    pub topics: Vec<TrendingTopic>,
    pub search_results: Vec<SearchResult>,
    pub related_queries: Vec<String>,
    pub image_prompts: Vec<String>,
}
