//! Social media content service
//!
//! Posts, blog articles and memes come back from the gateway as labelled
//! sections (`**TITLE:** ...`, `CONTENT: ...`). Every operation degrades to
//! a static fallback when the provider fails.

use crate::catalog::Catalog;
use crate::models::{BlogPost, Meme, SocialPost, SocialRequest};
use crate::services::prompt::{self, SocialEnhancement};
use crate::services::providers::{GenerationParams, TextGenerator};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const POST_MAX_TOKENS: u32 = 2000;
const BLOG_MAX_TOKENS: u32 = 4000;
const MEME_MAX_TOKENS: u32 = 1500;
const HASHTAG_MAX_TOKENS: u32 = 500;
const ENHANCE_MAX_TOKENS: u32 = 1500;

const MAX_HASHTAGS: usize = 15;
const MAX_TRENDING_HASHTAGS: usize = 20;
const MAX_FALLBACK_HASHTAGS: usize = 10;
const MAX_LIST_ITEMS: usize = 8;
const WORDS_PER_MINUTE: usize = 200;
const DEFAULT_SCORE: &str = "7/10";

const SECTION_NAMES: [&str; 13] = [
    "TITLE",
    "CONTENT",
    "HASHTAGS",
    "CALL_TO_ACTION",
    "ENGAGEMENT_TIPS",
    "BEST_POSTING_TIMES",
    "META_DESCRIPTION",
    "KEYWORDS",
    "READING_TIME",
    "SEO_SCORE",
    "IMAGE_PROMPT",
    "CAPTION",
    "VIRAL_POTENTIAL",
];

/// Header patterns for one section label
struct SectionPatterns {
    /// `**NAME...:**`
    bold_colon: Regex,
    /// `NAME:`
    plain: Regex,
    /// `**NAME**`
    bold: Regex,
}

/// Finds labelled sections in a model response
pub struct SectionExtractor {
    sections: HashMap<&'static str, SectionPatterns>,
    next_label: Regex,
    hashtag: Regex,
    bullet: Regex,
    numbering: Regex,
}

impl SectionExtractor {
    pub fn new() -> anyhow::Result<Self> {
        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|e| anyhow::anyhow!("Regex error: {}", e))
        };

        let mut sections = HashMap::new();
        for name in SECTION_NAMES {
            sections.insert(
                name,
                SectionPatterns {
                    bold_colon: compile(format!(r"(?is)\*\*{}[^:]*:\*\*", name))?,
                    plain: compile(format!(r"(?i){}:", name))?,
                    bold: compile(format!(r"(?i)\*\*{}\*\*", name))?,
                },
            );
        }

        Ok(Self {
            sections,
            next_label: compile(r"(?i)\n[A-Z_]+:".to_string())?,
            hashtag: compile(r"#[A-Za-z0-9_]+".to_string())?,
            bullet: compile(r"^[-•*]\s*".to_string())?,
            numbering: compile(r"^\d+\.\s*".to_string())?,
        })
    }

    /// Value of the first matching header form, with `**` removed.
    ///
    /// Bold forms end at the next line starting with `**`; the plain form
    /// ends at the next `LABEL:` line.
    pub fn section(&self, text: &str, name: &str) -> Option<String> {
        let patterns = self.sections.get(name)?;

        if let Some(m) = patterns.bold_colon.find(text) {
            if let Some(value) = take_value(&text[m.end()..], |s| s.find("\n**")) {
                return Some(value);
            }
        }
        if let Some(m) = patterns.plain.find(text) {
            let value = take_value(&text[m.end()..], |s| {
                self.next_label.find(s).map(|label| label.start())
            });
            if value.is_some() {
                return value;
            }
        }
        if let Some(m) = patterns.bold.find(text) {
            return take_value(&text[m.end()..], |s| s.find("\n**"));
        }
        None
    }

    /// Unique inline hashtags in order of appearance, else the items of
    /// the HASHTAGS section
    pub fn hashtags(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let inline: Vec<String> = self
            .hashtag
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|tag| seen.insert(*tag))
            .take(MAX_HASHTAGS)
            .map(str::to_string)
            .collect();
        if !inline.is_empty() {
            return inline;
        }

        self.section(text, "HASHTAGS")
            .map(|section| {
                section
                    .split(|c| c == '\n' || c == ',')
                    .map(str::trim)
                    .filter(|tag| tag.starts_with('#'))
                    .take(MAX_HASHTAGS)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Section lines without bullets or numbering
    pub fn list(&self, text: &str, name: &str) -> Vec<String> {
        let Some(section) = self.section(text, name) else {
            return Vec::new();
        };
        section
            .lines()
            .map(|line| {
                let line = self.bullet.replace(line.trim(), "");
                self.numbering.replace(&line, "").into_owned()
            })
            .filter(|line| line.chars().count() > 3)
            .take(MAX_LIST_ITEMS)
            .collect()
    }
}

fn take_value(rest: &str, find_end: impl Fn(&str) -> Option<usize>) -> Option<String> {
    let rest = rest.trim_start();
    let end = find_end(rest).unwrap_or(rest.len());
    let value = rest[..end].trim().replace("**", "");
    (!value.is_empty()).then_some(value)
}

/// `round(base × (1 + 0.1 × hashtags))` as `"1,300+ impressions"`
pub fn estimated_reach(base: u32, hashtag_count: usize) -> String {
    let estimated = (base as f64 * (1.0 + hashtag_count as f64 * 0.1)).round() as u64;
    format!("{}+ impressions", format_thousands(estimated))
}

pub fn reading_time(content: &str) -> String {
    let words = content.split_whitespace().count().max(1);
    format!("{} min read", words.div_ceil(WORDS_PER_MINUTE))
}

fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub struct SocialService {
    catalog: Arc<Catalog>,
    gateway: Arc<dyn TextGenerator>,
    extractor: SectionExtractor,
}

impl SocialService {
    pub fn new(catalog: Arc<Catalog>, gateway: Arc<dyn TextGenerator>) -> anyhow::Result<Self> {
        Ok(Self {
            catalog,
            gateway,
            extractor: SectionExtractor::new()?,
        })
    }

    async fn ask(&self, prompt: String, max_tokens: u32) -> Option<String> {
        let params = GenerationParams::new(prompt)
            .max_tokens(max_tokens)
            .with_search();
        match self.gateway.generate(&params).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("Social content generation failed: {}", e);
                None
            }
        }
    }

    pub async fn generate_post(&self, request: &SocialRequest) -> SocialPost {
        let prompt = prompt::build_post_prompt(&self.catalog, request);
        match self.ask(prompt, POST_MAX_TOKENS).await {
            Some(text) => self.parse_post(&text, request.platform_or_general()),
            None => self.fallback_post(request),
        }
    }

    pub async fn generate_blog(&self, request: &SocialRequest) -> BlogPost {
        match self.ask(prompt::build_blog_prompt(request), BLOG_MAX_TOKENS).await {
            Some(text) => self.parse_blog(&text),
            None => self.fallback_blog(request),
        }
    }

    pub async fn generate_meme(&self, request: &SocialRequest) -> Meme {
        match self.ask(prompt::build_meme_prompt(request), MEME_MAX_TOKENS).await {
            Some(text) => self.parse_meme(&text, request.platform_or_general()),
            None => self.fallback_meme(request),
        }
    }

    pub async fn trending_hashtags(&self, topic: &str, platform: &str) -> Vec<String> {
        let text = self
            .ask(prompt::build_hashtag_prompt(topic, platform), HASHTAG_MAX_TOKENS)
            .await
            .unwrap_or_default();

        let hashtags: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with('#'))
            .take(MAX_TRENDING_HASHTAGS)
            .map(str::to_string)
            .collect();

        if hashtags.is_empty() {
            self.fallback_hashtags(topic, platform)
        } else {
            hashtags
        }
    }

    /// Rewrite for reach; the input comes back unchanged on failure
    pub async fn enhance(&self, content: &str, kind: SocialEnhancement) -> String {
        self.ask(prompt::build_social_enhancement_prompt(content, kind), ENHANCE_MAX_TOKENS)
            .await
            .unwrap_or_else(|| content.to_string())
    }

    fn parse_post(&self, text: &str, platform: &str) -> SocialPost {
        let x = &self.extractor;
        let hashtags = x.hashtags(text);
        let tips = x.list(text, "ENGAGEMENT_TIPS");
        let times = x.list(text, "BEST_POSTING_TIMES");

        SocialPost {
            title: x
                .section(text, "TITLE")
                .unwrap_or_else(|| "Social Media Post".to_string()),
            content: x.section(text, "CONTENT").unwrap_or_else(|| text.to_string()),
            call_to_action: x.section(text, "CALL_TO_ACTION"),
            platform: platform.to_string(),
            estimated_reach: estimated_reach(self.catalog.base_reach(platform), hashtags.len()),
            engagement_tips: or_else(tips, || self.catalog.engagement_tips(platform)),
            best_posting_times: or_else(times, || self.catalog.posting_times(platform)),
            hashtags,
        }
    }

    fn parse_blog(&self, text: &str) -> BlogPost {
        let x = &self.extractor;
        let title = x
            .section(text, "TITLE")
            .unwrap_or_else(|| "Blog Post".to_string());
        let content = x.section(text, "CONTENT").unwrap_or_else(|| text.to_string());
        let keywords = x.list(text, "KEYWORDS");

        BlogPost {
            meta_description: x
                .section(text, "META_DESCRIPTION")
                .unwrap_or_else(|| title.chars().take(150).collect()),
            keywords: or_else(keywords, || {
                ["blog", "content", "article"].iter().map(|s| s.to_string()).collect()
            }),
            reading_time: x
                .section(text, "READING_TIME")
                .unwrap_or_else(|| reading_time(&content)),
            seo_score: x
                .section(text, "SEO_SCORE")
                .unwrap_or_else(|| DEFAULT_SCORE.to_string()),
            hashtags: x.hashtags(text),
            call_to_action: x.section(text, "CALL_TO_ACTION"),
            engagement_tips: self.catalog.engagement_tips("blog"),
            best_posting_times: self.catalog.posting_times("blog"),
            title,
            content,
        }
    }

    fn parse_meme(&self, text: &str, platform: &str) -> Meme {
        let x = &self.extractor;
        Meme {
            title: x.section(text, "TITLE").unwrap_or_else(|| "Meme".to_string()),
            content: x.section(text, "CONTENT").unwrap_or_else(|| text.to_string()),
            image_prompt: x
                .section(text, "IMAGE_PROMPT")
                .unwrap_or_else(|| "Funny meme image".to_string()),
            caption: x
                .section(text, "CAPTION")
                .unwrap_or_else(|| "Meme caption".to_string()),
            hashtags: x.hashtags(text),
            viral_potential: x
                .section(text, "VIRAL_POTENTIAL")
                .unwrap_or_else(|| DEFAULT_SCORE.to_string()),
            platform: platform.to_string(),
            engagement_tips: self.catalog.engagement_tips("meme"),
            best_posting_times: self.catalog.posting_times(platform),
            call_to_action: x.section(text, "CALL_TO_ACTION"),
        }
    }

    /// First three topic words as tags, then the platform's stock tags
    pub fn fallback_hashtags(&self, topic: &str, platform: &str) -> Vec<String> {
        topic
            .to_lowercase()
            .split(' ')
            .take(3)
            .map(|word| {
                let word: String = word
                    .chars()
                    .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
                    .collect();
                format!("#{}", word)
            })
            .chain(self.catalog.platform_hashtags(platform))
            .take(MAX_FALLBACK_HASHTAGS)
            .collect()
    }

    fn fallback_post(&self, request: &SocialRequest) -> SocialPost {
        let platform = request.platform_or_general();
        let topic = &request.topic;
        let cta_line = if request.include_call_to_action {
            "👉 What are your thoughts? Share in the comments below!"
        } else {
            ""
        };
        let compact_topic: String = topic.split_whitespace().collect();

        SocialPost {
            title: format!("{} - Social Media Post", topic),
            content: format!(
                "🌟 Exciting insights about {}! \n\nPerfect for {} who want to stay ahead of the curve.\n\n{}\n\n#{} #SocialMedia #Content",
                topic, request.target_audience, cta_line, compact_topic
            ),
            hashtags: self.fallback_hashtags(topic, platform),
            call_to_action: request
                .include_call_to_action
                .then(|| "Engage with this post and share your thoughts!".to_string()),
            platform: platform.to_string(),
            estimated_reach: "1,000+ impressions".to_string(),
            engagement_tips: self.catalog.engagement_tips(platform),
            best_posting_times: self.catalog.posting_times(platform),
        }
    }

    fn fallback_blog(&self, request: &SocialRequest) -> BlogPost {
        let topic = &request.topic;
        let audience = &request.target_audience;
        let take_action = if request.include_call_to_action {
            "## Take Action Today\n\nReady to get started? Apply these insights to your own situation and see the results for yourself!"
        } else {
            ""
        };

        let content = format!(
            "# {topic}: A Comprehensive Guide

## Introduction

Welcome to our comprehensive guide on {topic}. This resource is specifically designed for {audience} who want to understand and master this important topic.

## Key Concepts

Understanding {topic} requires a solid foundation in the core concepts and principles that drive success in this area.

## Best Practices

Here are the essential best practices you should follow:

1. Start with a clear understanding of your goals
2. Research thoroughly before taking action
3. Implement strategies systematically
4. Monitor and adjust based on results
5. Stay updated with latest trends and developments

## Conclusion

{topic} is an essential skill for {audience}. By following the strategies outlined in this guide, you'll be well-equipped to achieve your goals.

{take_action}"
        );

        BlogPost {
            title: format!("{}: Complete Guide for {}", topic, audience),
            content,
            meta_description: format!(
                "Comprehensive guide on {} for {}. Learn best practices, strategies, and actionable insights.",
                topic, audience
            ),
            keywords: vec![
                topic.to_lowercase(),
                "guide".to_string(),
                "tips".to_string(),
                "strategies".to_string(),
            ],
            reading_time: "5 min read".to_string(),
            seo_score: DEFAULT_SCORE.to_string(),
            call_to_action: request
                .include_call_to_action
                .then(|| "Apply these insights to your own situation and see the results!".to_string()),
            hashtags: self.fallback_hashtags(topic, "blog"),
            engagement_tips: self.catalog.engagement_tips("blog"),
            best_posting_times: self.catalog.posting_times("blog"),
        }
    }

    fn fallback_meme(&self, request: &SocialRequest) -> Meme {
        let platform = request.platform_or_general();
        let topic = &request.topic;

        Meme {
            title: format!("{} Meme", topic),
            content: format!(
                "When someone mentions {} and you're the expert in the room 😎",
                topic
            ),
            image_prompt: format!(
                "Funny meme image related to {}, showing someone looking confident or knowledgeable",
                topic
            ),
            caption: format!("Me explaining {} to {}", topic, request.target_audience),
            hashtags: self.fallback_hashtags(topic, platform),
            viral_potential: DEFAULT_SCORE.to_string(),
            platform: platform.to_string(),
            engagement_tips: self.catalog.engagement_tips("meme"),
            best_posting_times: self.catalog.posting_times(platform),
            call_to_action: request
                .include_call_to_action
                .then(|| "Tag someone who needs to see this!".to_string()),
        }
    }
}

fn or_else(items: Vec<String>, default: impl FnOnce() -> Vec<String>) -> Vec<String> {
    if items.is_empty() {
        default()
    } else {
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::testing::{FailingGenerator, MockGenerator};

    fn extractor() -> SectionExtractor {
        SectionExtractor::new().unwrap()
    }

    fn request(platform: Option<&str>, cta: bool) -> SocialRequest {
        SocialRequest {
            topic: "Home Workouts".into(),
            platform: platform.map(str::to_string),
            tone: "Friendly".into(),
            target_audience: "busy parents".into(),
            include_hashtags: true,
            include_call_to_action: cta,
            ..Default::default()
        }
    }

    fn service(generator: Arc<dyn TextGenerator>) -> SocialService {
        SocialService::new(Arc::new(Catalog::embedded().unwrap()), generator).unwrap()
    }

    #[test]
    fn test_bold_colon_sections() {
        let text = "**TITLE:** Ten Minute **Burn**\n**CONTENT:** Line one\nline two\n**HASHTAGS:** #fit";
        let x = extractor();
        assert_eq!(x.section(text, "TITLE").as_deref(), Some("Ten Minute Burn"));
        assert_eq!(x.section(text, "CONTENT").as_deref(), Some("Line one\nline two"));
        assert!(x.section(text, "CAPTION").is_none());
    }

    #[test]
    fn test_plain_sections_end_at_next_label() {
        let text = "TITLE: Stretch Daily\nCONTENT: Reach up.\nBreathe out.\nCALL_TO_ACTION: Try it now";
        let x = extractor();
        assert_eq!(x.section(text, "TITLE").as_deref(), Some("Stretch Daily"));
        assert_eq!(x.section(text, "CONTENT").as_deref(), Some("Reach up.\nBreathe out."));
        assert_eq!(x.section(text, "CALL_TO_ACTION").as_deref(), Some("Try it now"));
    }

    #[test]
    fn test_bold_without_colon() {
        let text = "**CAPTION** When the alarm rings\n**NEXT** x";
        assert_eq!(
            extractor().section(text, "CAPTION").as_deref(),
            Some("When the alarm rings")
        );
    }

    #[test]
    fn test_hashtags_unique_and_capped() {
        let x = extractor();
        let text = "#a #b #a #c";
        assert_eq!(x.hashtags(text), vec!["#a", "#b", "#c"]);

        let many: String = (0..20).map(|i| format!("#tag{} ", i)).collect();
        assert_eq!(x.hashtags(&many).len(), 15);
        assert!(x.hashtags("no tags here").is_empty());
    }

    #[test]
    fn test_list_strips_markers() {
        let text = "**ENGAGEMENT_TIPS:**\n- Reply fast\n2. Use polls\n* ok\n• Post reels daily\n**NEXT:** x";
        assert_eq!(
            extractor().list(text, "ENGAGEMENT_TIPS"),
            vec!["Reply fast", "Use polls", "Post reels daily"]
        );
    }

    #[test]
    fn test_reach_and_reading_time() {
        assert_eq!(estimated_reach(1000, 3), "1,300+ impressions");
        assert_eq!(estimated_reach(2000, 15), "5,000+ impressions");
        assert_eq!(estimated_reach(800, 0), "800+ impressions");
        assert_eq!(format_thousands(1234567), "1,234,567");

        assert_eq!(reading_time("word"), "1 min read");
        assert_eq!(reading_time(&"w ".repeat(401)), "3 min read");
        assert_eq!(reading_time(""), "1 min read");
    }

    #[tokio::test]
    async fn test_post_parsing_with_defaults() {
        let reply = "**TITLE:** Sweat at Home\n**CONTENT:** No gym needed.\n#fitness #home";
        let generator = Arc::new(MockGenerator::replying(reply));
        let svc = service(generator.clone());

        let post = svc.generate_post(&request(Some("tiktok"), false)).await;
        assert_eq!(post.title, "Sweat at Home");
        assert_eq!(post.hashtags, vec!["#fitness", "#home"]);
        assert_eq!(post.estimated_reach, "2,400+ impressions");
        assert_eq!(post.engagement_tips[0], "Hook viewers in the first 3 seconds");
        assert_eq!(post.best_posting_times, vec!["6-10 AM", "7-9 PM", "Tuesday-Thursday", "Sunday"]);

        let call = &generator.calls()[0];
        assert_eq!(call.max_tokens, 2000);
        assert!(call.search);
    }

    #[tokio::test]
    async fn test_blog_defaults() {
        let svc = service(Arc::new(MockGenerator::replying("Just some words here")));
        let blog = svc.generate_blog(&request(None, false)).await;
        assert_eq!(blog.title, "Blog Post");
        assert_eq!(blog.meta_description, "Blog Post");
        assert_eq!(blog.content, "Just some words here");
        assert_eq!(blog.keywords, vec!["blog", "content", "article"]);
        assert_eq!(blog.reading_time, "1 min read");
        assert_eq!(blog.seo_score, "7/10");
        assert_eq!(blog.best_posting_times[0], "10-11 AM");
    }

    #[tokio::test]
    async fn test_meme_uses_platform_times() {
        let svc = service(Arc::new(MockGenerator::replying("CAPTION: Leg day again")));
        let meme = svc.generate_meme(&request(Some("twitter"), false)).await;
        assert_eq!(meme.caption, "Leg day again");
        assert_eq!(meme.image_prompt, "Funny meme image");
        assert_eq!(meme.best_posting_times[3], "Monday-Friday");
        assert_eq!(meme.engagement_tips[0], "Post when your audience is most active");
    }

    #[tokio::test]
    async fn test_fallbacks_on_provider_failure() {
        let svc = service(Arc::new(FailingGenerator));

        let post = svc.generate_post(&request(None, true)).await;
        assert_eq!(post.title, "Home Workouts - Social Media Post");
        assert!(post.content.contains("👉 What are your thoughts?"));
        assert!(post.content.ends_with("#HomeWorkouts #SocialMedia #Content"));
        assert_eq!(post.estimated_reach, "1,000+ impressions");
        assert_eq!(post.platform, "general");
        assert_eq!(post.hashtags[..2], ["#home".to_string(), "#workouts".to_string()]);
        assert_eq!(post.hashtags.len(), 7);

        let blog = svc.generate_blog(&request(None, false)).await;
        assert_eq!(blog.title, "Home Workouts: Complete Guide for busy parents");
        assert!(!blog.content.contains("Take Action Today"));
        assert!(blog.call_to_action.is_none());

        let meme = svc.generate_meme(&request(None, true)).await;
        assert_eq!(meme.caption, "Me explaining Home Workouts to busy parents");
        assert_eq!(meme.call_to_action.as_deref(), Some("Tag someone who needs to see this!"));
    }

    #[tokio::test]
    async fn test_trending_hashtags() {
        let svc = service(Arc::new(MockGenerator::replying("Here you go:\n#yoga\n #stretch \nnot a tag")));
        assert_eq!(svc.trending_hashtags("yoga", "instagram").await, vec!["#yoga", "#stretch"]);

        let svc = service(Arc::new(FailingGenerator));
        let tags = svc.trending_hashtags("Morning Yoga Flow Tips", "instagram").await;
        assert_eq!(&tags[..3], ["#morning", "#yoga", "#flow"]);
        assert_eq!(tags[3], "#instagood");
        assert_eq!(tags.len(), 8);
    }

    #[tokio::test]
    async fn test_enhance_returns_input_on_failure() {
        let svc = service(Arc::new(FailingGenerator));
        assert_eq!(svc.enhance("original", SocialEnhancement::Viral).await, "original");

        let svc = service(Arc::new(MockGenerator::replying("better")));
        assert_eq!(svc.enhance("original", SocialEnhancement::Trending).await, "better");
    }
}
