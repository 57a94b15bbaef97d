//! Product generation service
//!
//! Prompt, dispatch, parse. Single-product generation for catalog models
//! tries OpenRouter and falls back to the gateway; anything else goes
//! straight to the gateway. Fan-out, comprehensive, search-enhanced and
//! specialist calls talk to OpenRouter alone so their errors stay visible.
//! `generate_content` and `generate_with_models` never fail.

use crate::catalog::Catalog;
use crate::models::{CoverDesign, GeneratedContent, GenerationRequest};
use crate::services::parser::ContentParser;
use crate::services::prompt::{self, EnhancementKind, SpecialistKind, COMPREHENSIVE_SYSTEM_PROMPT};
use crate::services::providers::{
    FallbackGenerator, GenerationParams, ProviderError, SearchKind, TextGenerator, WebSearch,
    DEFAULT_TEMPERATURE,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

const PRODUCT_MAX_TOKENS: u32 = 6000;
const COMPREHENSIVE_MAX_TOKENS: u32 = 8000;
const ALTERNATIVE_MAX_TOKENS: u32 = 6000;
const ENHANCE_MAX_TOKENS: u32 = 3000;
const SPECIALIST_MAX_TOKENS: u32 = 6000;

/// At most this many alternatives accompany a comprehensive generation
const MAX_ALTERNATIVES: usize = 2;

const SEARCH_CONTEXT_RESULTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Failed to generate content: {0}")]
    Provider(#[from] ProviderError),

    #[error("Failed to enhance content: {0}")]
    Enhancement(String),

    #[error("Unknown enhancement type: {0}")]
    UnknownSpecialist(String),
}

/// Per-call overrides for fan-out generation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub system_prompt: Option<String>,
}

impl GenerationOptions {
    fn params(&self, prompt: &str, model: &str) -> GenerationParams {
        let mut params = GenerationParams::new(prompt)
            .model(model)
            .temperature(self.temperature.unwrap_or(DEFAULT_TEMPERATURE));
        if let Some(max_tokens) = self.max_tokens {
            params = params.max_tokens(max_tokens);
        }
        if let Some(system) = &self.system_prompt {
            params = params.system_prompt(system.clone());
        }
        params
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveResult {
    pub content: String,
    pub model_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<BTreeMap<String, String>>,
}

pub struct GenerationService {
    catalog: Arc<Catalog>,
    parser: ContentParser,
    openrouter: Arc<dyn TextGenerator>,
    /// `openrouter`, then `gateway` on failure
    chain: FallbackGenerator,
    gateway: Arc<dyn TextGenerator>,
    search: Arc<dyn WebSearch>,
}

impl GenerationService {
    pub fn new(
        catalog: Arc<Catalog>,
        openrouter: Arc<dyn TextGenerator>,
        gateway: Arc<dyn TextGenerator>,
        search: Arc<dyn WebSearch>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            parser: ContentParser::new(catalog.clone())?,
            chain: FallbackGenerator::new(openrouter.clone(), gateway.clone()),
            catalog,
            openrouter,
            gateway,
            search,
        })
    }

    /// Generate and parse one product. Provider failures yield
    /// [`fallback_content`](Self::fallback_content).
    pub async fn generate_content(&self, request: &GenerationRequest) -> GeneratedContent {
        let prompt = prompt::build_product_prompt(&self.catalog, request);
        let params = GenerationParams::new(prompt)
            .max_tokens(PRODUCT_MAX_TOKENS)
            .temperature(DEFAULT_TEMPERATURE)
            .with_search();

        let result = if self.catalog.is_openrouter_model(&request.ai_model) {
            let model = self.catalog.openrouter_model_id(&request.ai_model);
            self.chain.generate(&params.model(model)).await
        } else {
            self.gateway.generate(&params).await
        };

        match result {
            Ok(text) => self.parser.parse(&text, request),
            Err(e) => {
                tracing::warn!(
                    "Generation for {} / {} failed, serving fallback content: {}",
                    request.product_type,
                    request.niche,
                    e
                );
                self.fallback_content(request)
            }
        }
    }

    /// Static product used when every provider failed
    pub fn fallback_content(&self, request: &GenerationRequest) -> GeneratedContent {
        let title = format!("{}: {} Guide", request.product_type, request.niche);
        let subtitle = format!("A comprehensive resource for {}", request.target_audience);
        let defaults = &self.catalog.defaults;

        GeneratedContent {
            content: fallback_body(&title, request),
            table_of_contents: FALLBACK_TOC.iter().map(|s| s.to_string()).collect(),
            monetization_suggestions: defaults.monetization.clone(),
            marketing_channels: defaults.marketing.clone(),
            price_range: defaults.price_range.clone(),
            cover_design: CoverDesign {
                title: title.clone(),
                subtitle: subtitle.clone(),
                colors: defaults.cover_colors.clone(),
            },
            title,
            subtitle,
        }
    }

    /// Run `prompt` against every model concurrently. A failed branch maps
    /// to `"Error: Failed to generate content with {model}"`.
    pub async fn generate_with_models(
        &self,
        prompt: &str,
        model_ids: &[String],
        options: &GenerationOptions,
    ) -> BTreeMap<String, String> {
        let branches = model_ids.iter().map(|model| async move {
            let params = options.params(prompt, model);
            let text = match self.openrouter.generate(&params).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Failed to generate with model {}: {}", model, e);
                    format!("Error: Failed to generate content with {}", model)
                }
            };
            (model.clone(), text)
        });

        join_all(branches).await.into_iter().collect()
    }

    /// Primary generation plus up to two alternatives from the remaining
    /// selected models
    pub async fn generate_comprehensive(
        &self,
        request: &GenerationRequest,
        selected_models: &[String],
    ) -> Result<ComprehensiveResult, GenerationError> {
        let primary = selected_models
            .first()
            .cloned()
            .unwrap_or_else(|| self.catalog.default_model.clone());
        let prompt = prompt::build_comprehensive_prompt(request);

        let params = GenerationParams::new(prompt.clone())
            .model(primary.clone())
            .system_prompt(COMPREHENSIVE_SYSTEM_PROMPT)
            .max_tokens(COMPREHENSIVE_MAX_TOKENS);
        let content = self.openrouter.generate(&params).await?;

        let alternatives = if selected_models.len() > 1 {
            let end = selected_models.len().min(1 + MAX_ALTERNATIVES);
            let options = GenerationOptions {
                max_tokens: Some(ALTERNATIVE_MAX_TOKENS),
                temperature: Some(DEFAULT_TEMPERATURE),
                system_prompt: Some(COMPREHENSIVE_SYSTEM_PROMPT.to_string()),
            };
            Some(
                self.generate_with_models(&prompt, &selected_models[1..end], &options)
                    .await,
            )
        } else {
            None
        };

        Ok(ComprehensiveResult {
            content,
            model_used: primary,
            alternatives,
        })
    }

    /// Generate with recent news about `topic` folded into the prompt.
    /// A failed search only removes the context.
    pub async fn search_enhanced_generation(
        &self,
        topic: &str,
        product_type: &str,
        target_audience: &str,
    ) -> Result<String, GenerationError> {
        let query = format!("{} trends 2024 latest", topic);
        let context = match self.search.search(&query, SearchKind::News, 10).await {
            Ok(results) => results
                .organic_results
                .iter()
                .take(SEARCH_CONTEXT_RESULTS)
                .map(|r| {
                    format!(
                        "{}: {}",
                        r.title.as_deref().unwrap_or_default(),
                        r.snippet.as_deref().unwrap_or_default()
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => {
                tracing::warn!("Search for {:?} failed, generating without context: {}", query, e);
                String::new()
            }
        };

        let prompt = prompt::build_search_enhanced_prompt(topic, product_type, target_audience, &context);
        let params = GenerationParams::new(prompt)
            .model(self.catalog.default_model.clone())
            .max_tokens(PRODUCT_MAX_TOKENS);
        Ok(self.openrouter.generate(&params).await?)
    }

    /// Rewrite `content` in one of the general styles
    pub async fn enhance_content(
        &self,
        content: &str,
        kind: EnhancementKind,
    ) -> Result<String, GenerationError> {
        let params = GenerationParams::new(prompt::build_enhancement_prompt(content, kind))
            .max_tokens(ENHANCE_MAX_TOKENS);
        self.gateway.generate(&params).await.map_err(|e| {
            tracing::warn!("Content enhancement failed: {}", e);
            GenerationError::Enhancement("Failed to enhance content. Please try again.".to_string())
        })
    }

    /// Rewrite `content` with the model the catalog assigns to `kind`
    pub async fn enhance_with_specialist(
        &self,
        content: &str,
        kind: SpecialistKind,
    ) -> Result<String, GenerationError> {
        let specialist = self
            .catalog
            .specialists
            .get(kind.as_str())
            .ok_or_else(|| GenerationError::UnknownSpecialist(kind.as_str().to_string()))?;

        let (system, prompt) = prompt::build_specialist_prompts(&specialist.instruction, kind, content);
        let params = GenerationParams::new(prompt)
            .model(self.catalog.openrouter_model_id(&specialist.model))
            .system_prompt(system)
            .max_tokens(SPECIALIST_MAX_TOKENS);
        Ok(self.openrouter.generate(&params).await?)
    }
}

const FALLBACK_TOC: [&str; 9] = [
    "Introduction",
    "Chapter 1: Getting Started",
    "Chapter 2: Core Strategies",
    "Chapter 3: Advanced Techniques",
    "Chapter 4: Common Challenges and Solutions",
    "Chapter 5: Case Studies and Examples",
    "Conclusion",
    "Next Steps",
    "Additional Resources",
];

fn fallback_body(title: &str, request: &GenerationRequest) -> String {
    format!(
        "# {title}

## Introduction
Welcome to your comprehensive guide on {niche}. This resource has been specifically designed for {audience} who want to achieve success in this area.

## Chapter 1: Getting Started
Understanding the fundamentals is crucial for success. In this chapter, we'll cover the basic concepts and principles you need to know.

### Key Concepts
- Foundation principles
- Essential terminology
- Common misconceptions

### Getting Started Checklist
- [ ] Assess your current situation
- [ ] Set clear goals
- [ ] Gather necessary resources

## Chapter 2: Core Strategies
Now that you understand the basics, let's dive into the core strategies that will help you succeed.

### Strategy 1: Foundation Building
Building a strong foundation is essential for long-term success.

### Strategy 2: Implementation
Learn how to put these concepts into practice effectively.

## Chapter 3: Advanced Techniques
Take your knowledge to the next level with these advanced techniques and strategies.

### Advanced Method 1
Detailed explanation of advanced concepts.

### Advanced Method 2
Additional sophisticated approaches.

## Chapter 4: Common Challenges and Solutions
Every journey has obstacles. Here's how to overcome the most common challenges.

### Challenge 1: Getting Started
Solutions and workarounds for initial hurdles.

### Challenge 2: Maintaining Momentum
How to stay motivated and consistent.

## Chapter 5: Case Studies and Examples
Real-world examples and case studies to illustrate key concepts.

### Case Study 1
Detailed analysis of a successful implementation.

### Case Study 2
Lessons learned from challenges and setbacks.

## Conclusion
Congratulations on completing this comprehensive guide. You now have the knowledge and tools needed to succeed in {niche}.

## Next Steps
- Implement the strategies outlined in this guide
- Track your progress regularly
- Continue learning and adapting

## Additional Resources
- Recommended reading
- Useful tools and software
- Community resources and support",
        title = title,
        niche = request.niche,
        audience = request.target_audience,
    )
}
