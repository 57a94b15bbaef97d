//! Social media content models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl ContentLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentLength::Short => "short",
            ContentLength::Medium => "medium",
            ContentLength::Long => "long",
        }
    }
}

/// Input for post, blog, meme and hashtag generation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialRequest {
    #[serde(default)]
    pub content_type: String,
    pub topic: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub include_hashtags: bool,
    #[serde(default)]
    pub include_call_to_action: bool,
    #[serde(default)]
    pub content_length: ContentLength,
    #[serde(default)]
    pub additional_requirements: String,
}

impl SocialRequest {
    /// Platform key, `general` when unset
    pub fn platform_or_general(&self) -> &str {
        self.platform
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or("general")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialPost {
    pub title: String,
    pub content: String,
    pub hashtags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_to_action: Option<String>,
    pub platform: String,
    pub estimated_reach: String,
    pub engagement_tips: Vec<String>,
    pub best_posting_times: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub title: String,
    pub content: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub reading_time: String,
    pub seo_score: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_to_action: Option<String>,
    pub hashtags: Vec<String>,
    pub engagement_tips: Vec<String>,
    pub best_posting_times: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meme {
    pub title: String,
    pub content: String,
    pub image_prompt: String,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub viral_potential: String,
    pub platform: String,
    pub engagement_tips: Vec<String>,
    pub best_posting_times: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_to_action: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_defaults_to_general() {
        let mut req = SocialRequest {
            topic: "sourdough".into(),
            ..Default::default()
        };
        assert_eq!(req.platform_or_general(), "general");
        req.platform = Some(String::new());
        assert_eq!(req.platform_or_general(), "general");
        req.platform = Some("tiktok".into());
        assert_eq!(req.platform_or_general(), "tiktok");
    }

    #[test]
    fn test_request_accepts_minimal_body() {
        let req: SocialRequest =
            serde_json::from_value(serde_json::json!({ "topic": "yoga", "contentLength": "long" }))
                .unwrap();
        assert_eq!(req.content_length, ContentLength::Long);
        assert!(req.keywords.is_empty());
    }
}
