//! Pain-point discovery
//!
//! Five news searches around a topic feed one analysis call through the
//! OpenRouter chain (gateway on failure). A failed search only drops its
//! results. An unusable reply, or no reply at all, yields a canned analysis
//! built from the topic, so discovery never fails.

use crate::catalog::Catalog;
use crate::models::{
    ActionPlan, MarketInsights, PainPoint, PainPointAnalysis, ProductSpec, ProductSuggestion,
};
use crate::services::prompt::{self, PAIN_POINT_ANALYST_PROMPT, PRODUCT_STRATEGIST_PROMPT};
use crate::services::providers::{
    FallbackGenerator, GenerationParams, SearchKind, SearchResponse, TextGenerator, WebSearch,
    DEFAULT_TEMPERATURE,
};
use crate::services::trending::parse_json_reply;
use futures::future::join_all;
use serde::Deserialize;
use std::sync::Arc;

const ANALYSIS_MODEL: &str = "kimi";
const SPEC_MODEL: &str = "mai";
const ANALYSIS_MAX_TOKENS: u32 = 6000;
const SPEC_MAX_TOKENS: u32 = 1500;
const RESULTS_PER_QUERY: u32 = 5;

pub const DEFAULT_PLATFORMS: [&str; 4] = ["reddit", "twitter", "facebook", "linkedin"];
const DEFAULT_AUDIENCE: &str = "General public";

/// Appended to the topic, one search each
const QUERY_SUFFIXES: [&str; 5] = [
    "problems complaints",
    "frustrations issues",
    "challenges difficulties",
    "pain points struggles",
    "help needed advice",
];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisReply {
    #[serde(default)]
    pain_points: Vec<PainPoint>,
    #[serde(default)]
    product_suggestions: Vec<ProductSuggestion>,
    market_insights: Option<MarketInsights>,
    action_plan: Option<ActionPlan>,
}

pub struct PainPointService {
    catalog: Arc<Catalog>,
    chain: FallbackGenerator,
    search: Arc<dyn WebSearch>,
}

impl PainPointService {
    pub fn new(
        catalog: Arc<Catalog>,
        openrouter: Arc<dyn TextGenerator>,
        gateway: Arc<dyn TextGenerator>,
        search: Arc<dyn WebSearch>,
    ) -> Self {
        Self {
            catalog,
            chain: FallbackGenerator::new(openrouter, gateway),
            search,
        }
    }

    /// Pain points, product suggestions and a plan for `topic`.
    ///
    /// An empty `platforms` list means [`DEFAULT_PLATFORMS`].
    pub async fn discover(
        &self,
        topic: &str,
        platforms: &[String],
        target_audience: Option<&str>,
    ) -> PainPointAnalysis {
        let target_audience = target_audience.map(str::trim).filter(|a| !a.is_empty());
        let searches = QUERY_SUFFIXES.iter().map(|suffix| async move {
            let query = format!("{} {}", topic, suffix);
            match self.search.search(&query, SearchKind::News, RESULTS_PER_QUERY).await {
                Ok(results) => Some(results),
                Err(e) => {
                    tracing::warn!("Pain point search for {:?} failed: {}", query, e);
                    None
                }
            }
        });
        let results: Vec<SearchResponse> = join_all(searches).await.into_iter().flatten().collect();
        tracing::debug!("Pain point discovery for {:?}: {} searches answered", topic, results.len());

        let platforms: Vec<String> = if platforms.is_empty() {
            DEFAULT_PLATFORMS.iter().map(|p| p.to_string()).collect()
        } else {
            platforms.to_vec()
        };
        let results_json = serde_json::to_string_pretty(&results).unwrap_or_else(|_| "[]".to_string());
        let prompt = prompt::build_pain_point_analysis_prompt(
            topic,
            &results_json,
            target_audience.unwrap_or(DEFAULT_AUDIENCE),
            &platforms,
        );
        let params = GenerationParams::new(prompt)
            .model(self.catalog.openrouter_model_id(ANALYSIS_MODEL))
            .system_prompt(PAIN_POINT_ANALYST_PROMPT)
            .max_tokens(ANALYSIS_MAX_TOKENS)
            .temperature(DEFAULT_TEMPERATURE);

        match self.chain.generate(&params).await {
            Ok(text) => match parse_json_reply::<AnalysisReply>(&text) {
                Some(reply) => with_defaults(reply, topic),
                None => {
                    tracing::warn!("Pain point analysis for {:?} was not valid JSON", topic);
                    fallback_analysis(topic, target_audience)
                }
            },
            Err(e) => {
                tracing::warn!("Pain point analysis for {:?} failed: {}", topic, e);
                fallback_analysis(topic, target_audience)
            }
        }
    }

    /// Generation form for a product answering `pain_point`
    pub async fn product_spec(&self, pain_point: &PainPoint) -> ProductSpec {
        let params = GenerationParams::new(prompt::build_product_spec_prompt(pain_point))
            .model(self.catalog.openrouter_model_id(SPEC_MODEL))
            .system_prompt(PRODUCT_STRATEGIST_PROMPT)
            .max_tokens(SPEC_MAX_TOKENS)
            .temperature(DEFAULT_TEMPERATURE);

        let spec = match self.chain.generate(&params).await {
            Ok(text) => parse_json_reply::<ProductSpec>(&text),
            Err(e) => {
                tracing::warn!("Product spec for {:?} failed: {}", pain_point.title, e);
                None
            }
        };
        spec.filter(|s| !s.product_type.trim().is_empty() && !s.niche.trim().is_empty())
            .unwrap_or_else(|| fallback_spec(pain_point))
    }
}

fn fill(value: &mut String, default: impl Into<String>) {
    if value.trim().is_empty() {
        *value = default.into();
    }
}

fn fill_list(list: &mut Vec<String>, default: &[&str]) {
    if list.is_empty() {
        *list = strings(default);
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Missing or empty fields take the same defaults the UI expects
fn with_defaults(reply: AnalysisReply, topic: &str) -> PainPointAnalysis {
    let pain_points = reply
        .pain_points
        .into_iter()
        .enumerate()
        .map(|(i, mut p)| {
            fill(&mut p.id, format!("pain-{}", i));
            fill(&mut p.title, format!("{} Challenge {}", topic, i + 1));
            fill(&mut p.description, "Pain point description");
            fill(&mut p.platform, "Social Media");
            fill(&mut p.audience, "General audience");
            fill(&mut p.urgency, "Medium");
            fill(&mut p.market_size, "Medium");
            fill_list(&mut p.keywords, &[topic]);
            fill_list(&mut p.marketing_channels, &["Social Media", "Content Marketing"]);
            fill(&mut p.competition_level, "Medium");
            fill(&mut p.monetization_potential, "Medium");
            fill(&mut p.estimated_demand, "Medium");
            p
        })
        .collect();

    let product_suggestions = reply
        .product_suggestions
        .into_iter()
        .enumerate()
        .map(|(i, mut s)| {
            fill(&mut s.id, format!("product-{}", i));
            fill(&mut s.product_type, "ebook");
            fill(&mut s.title, format!("{} Solution Guide", topic));
            fill(&mut s.description, "Product description");
            fill(&mut s.target_audience, "General audience");
            fill_list(&mut s.marketing_strategy, &["Social Media Marketing"]);
            fill(&mut s.price_range, "$19.99 - $49.99");
            fill(&mut s.time_to_market, "2-4 weeks");
            fill(&mut s.competitive_advantage, "Addresses specific pain points");
            fill_list(&mut s.validation_steps, &["Survey target audience", "Create MVP"]);
            s
        })
        .collect();

    PainPointAnalysis {
        pain_points,
        product_suggestions,
        market_insights: reply.market_insights.unwrap_or_else(|| MarketInsights {
            total_market_size: "Medium".into(),
            growth_trend: "Growing".into(),
            key_opportunities: vec![format!("Growing demand for {} solutions", topic)],
            threats: strings(&["Increasing competition"]),
        }),
        action_plan: reply.action_plan.unwrap_or_else(|| ActionPlan {
            immediate_actions: strings(&["Research target audience", "Validate pain points"]),
            short_term: strings(&["Create MVP", "Test with small audience"]),
            long_term: strings(&["Scale marketing", "Expand product line"]),
        }),
    }
}

fn fallback_analysis(topic: &str, target_audience: Option<&str>) -> PainPointAnalysis {
    PainPointAnalysis {
        pain_points: vec![
            PainPoint {
                id: "pain-1".into(),
                title: format!("Lack of comprehensive {} guidance", topic),
                description: format!(
                    "Many people struggle to find reliable, actionable information about {}",
                    topic
                ),
                platform: "Reddit".into(),
                audience: target_audience.unwrap_or(DEFAULT_AUDIENCE).into(),
                urgency: "High".into(),
                market_size: "Large".into(),
                keywords: vec![topic.to_string(), "guide".into(), "help".into(), "tutorial".into()],
                related_problems: strings(&[
                    "Information overload",
                    "Conflicting advice",
                    "Lack of step-by-step guidance",
                ]),
                suggested_solutions: strings(&[
                    "Comprehensive guide",
                    "Step-by-step tutorials",
                    "Expert insights",
                ]),
                marketing_channels: strings(&["Social Media", "Content Marketing", "SEO"]),
                competition_level: "Medium".into(),
                monetization_potential: "High".into(),
                estimated_demand: "High".into(),
            },
            PainPoint {
                id: "pain-2".into(),
                title: format!("Time management challenges with {}", topic),
                description: format!(
                    "People find it difficult to efficiently manage their time when dealing with {}",
                    topic
                ),
                platform: "Twitter".into(),
                audience: "Busy professionals".into(),
                urgency: "High".into(),
                market_size: "Medium".into(),
                keywords: vec![
                    topic.to_string(),
                    "time management".into(),
                    "productivity".into(),
                    "efficiency".into(),
                ],
                related_problems: strings(&["Overwhelm", "Procrastination", "Poor planning"]),
                suggested_solutions: strings(&[
                    "Time management templates",
                    "Productivity systems",
                    "Planning tools",
                ]),
                marketing_channels: strings(&["LinkedIn", "Productivity blogs", "YouTube"]),
                competition_level: "Medium".into(),
                monetization_potential: "High".into(),
                estimated_demand: "High".into(),
            },
        ],
        product_suggestions: vec![
            ProductSuggestion {
                id: "product-1".into(),
                product_type: "ebook".into(),
                title: format!("The Complete {} Mastery Guide", topic),
                description: format!("Comprehensive guide addressing all aspects of {}", topic),
                target_audience: target_audience
                    .unwrap_or("Beginners and intermediate learners")
                    .into(),
                pain_points_addressed: strings(&["Lack of guidance", "Information overload"]),
                marketing_strategy: strings(&["Content marketing", "Social media", "SEO"]),
                price_range: "$29.99 - $79.99".into(),
                time_to_market: "3-4 weeks".into(),
                competitive_advantage: "Comprehensive, actionable content".into(),
                validation_steps: strings(&[
                    "Survey target audience",
                    "Create outline",
                    "Test with beta readers",
                ]),
            },
            ProductSuggestion {
                id: "product-2".into(),
                product_type: "planner".into(),
                title: format!("{} Productivity Planner", topic),
                description: format!("Time management and planning system for {}", topic),
                target_audience: "Busy professionals and entrepreneurs".into(),
                pain_points_addressed: strings(&["Time management", "Poor planning"]),
                marketing_strategy: strings(&[
                    "LinkedIn marketing",
                    "Productivity communities",
                    "Influencer partnerships",
                ]),
                price_range: "$19.99 - $39.99".into(),
                time_to_market: "2-3 weeks".into(),
                competitive_advantage: "Specifically designed for busy professionals".into(),
                validation_steps: strings(&[
                    "Test with target users",
                    "Gather feedback",
                    "Iterate design",
                ]),
            },
        ],
        market_insights: MarketInsights {
            total_market_size: "Large and growing".into(),
            growth_trend: "Growing".into(),
            key_opportunities: vec![
                format!("Increasing interest in {}", topic),
                "Underserved niche markets".into(),
                "Digital product demand growth".into(),
            ],
            threats: strings(&[
                "Increasing competition",
                "Market saturation in some areas",
                "Changing consumer preferences",
            ]),
        },
        action_plan: ActionPlan {
            immediate_actions: strings(&[
                "Validate pain points with target audience",
                "Research existing solutions",
                "Create detailed product outline",
            ]),
            short_term: strings(&[
                "Develop MVP",
                "Test with small audience",
                "Gather feedback and iterate",
                "Build marketing presence",
            ]),
            long_term: strings(&[
                "Scale marketing efforts",
                "Expand product line",
                "Build brand authority",
                "Explore new markets",
            ]),
        },
    }
}

fn fallback_spec(pain_point: &PainPoint) -> ProductSpec {
    ProductSpec {
        product_type: "ebook".into(),
        niche: pain_point.title.clone(),
        target_audience: pain_point.audience.clone(),
        tone: "Professional".into(),
        length: "Medium (15-25 pages)".into(),
        additional_requirements: format!(
            "Address the following pain points: {}. Include practical solutions: {}",
            pain_point.description,
            pain_point.suggested_solutions.join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::testing::{FailingGenerator, MockGenerator, MockSearch};
    use crate::services::providers::RawSearchResult;

    fn service(
        openrouter: Arc<dyn TextGenerator>,
        gateway: Arc<dyn TextGenerator>,
        search: Arc<MockSearch>,
    ) -> PainPointService {
        PainPointService::new(Arc::new(Catalog::embedded().unwrap()), openrouter, gateway, search)
    }

    fn headlines(title: &str) -> SearchResponse {
        SearchResponse {
            news_results: vec![RawSearchResult {
                title: Some(title.into()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    const ANALYSIS_JSON: &str = r#"```json
{
  "painPoints": [
    {"title": "Dough never rises", "urgency": "Critical", "suggestedSolutions": ["Proofing guide"]},
    {}
  ],
  "productSuggestions": [{"title": "Proofing Masterclass", "priceRange": "$49"}],
  "actionPlan": {"immediateActions": ["Interview bakers"], "shortTerm": [], "longTerm": []}
}
```"#;

    #[tokio::test]
    async fn test_discover_tolerates_failed_searches_and_fills_defaults() {
        let mut search = MockSearch::with("baking problems complaints", headlines("Flat loaves"));
        search
            .responses
            .insert("baking help needed advice".into(), headlines("Starter advice"));
        let search = Arc::new(search);
        let openrouter = Arc::new(MockGenerator::replying(ANALYSIS_JSON));
        let svc = service(openrouter.clone(), Arc::new(FailingGenerator), search.clone());

        let analysis = svc.discover("baking", &[], None).await;

        assert_eq!(search.queries.lock().unwrap().len(), 5);
        let call = &openrouter.calls()[0];
        assert_eq!(call.model.as_deref(), Some("moonshotai/kimi-dev-72b:free"));
        assert_eq!(call.max_tokens, 6000);
        assert_eq!(call.system_prompt.as_deref(), Some(PAIN_POINT_ANALYST_PROMPT));
        assert!(call.prompt.contains("Flat loaves"));
        assert!(call.prompt.contains("Starter advice"));
        assert!(call.prompt.contains("PLATFORMS: reddit, twitter, facebook, linkedin"));
        assert!(call.prompt.contains("TARGET AUDIENCE: General public"));

        assert_eq!(analysis.pain_points.len(), 2);
        let first = &analysis.pain_points[0];
        assert_eq!(first.id, "pain-0");
        assert_eq!(first.urgency, "Critical");
        assert_eq!(first.keywords, vec!["baking"]);
        assert_eq!(first.suggested_solutions, vec!["Proofing guide"]);
        let second = &analysis.pain_points[1];
        assert_eq!(second.title, "baking Challenge 2");
        assert_eq!(second.platform, "Social Media");
        assert_eq!(second.marketing_channels, vec!["Social Media", "Content Marketing"]);

        let suggestion = &analysis.product_suggestions[0];
        assert_eq!(suggestion.price_range, "$49");
        assert_eq!(suggestion.product_type, "ebook");
        assert_eq!(suggestion.time_to_market, "2-4 weeks");

        assert_eq!(analysis.market_insights.growth_trend, "Growing");
        assert_eq!(
            analysis.market_insights.key_opportunities,
            vec!["Growing demand for baking solutions"]
        );
        assert_eq!(analysis.action_plan.immediate_actions, vec!["Interview bakers"]);
        assert!(analysis.action_plan.short_term.is_empty());
    }

    #[tokio::test]
    async fn test_discover_falls_back_to_gateway_then_canned_analysis() {
        let gateway = Arc::new(MockGenerator::replying(r#"{"painPoints": [{"title": "From gateway"}]}"#));
        let svc = service(Arc::new(FailingGenerator), gateway.clone(), Arc::new(MockSearch::default()));
        let analysis = svc
            .discover("budgeting", &["tiktok".to_string()], Some("students"))
            .await;
        assert_eq!(analysis.pain_points[0].title, "From gateway");
        assert!(gateway.calls()[0].prompt.contains("PLATFORMS: tiktok"));
        assert!(gateway.calls()[0].prompt.contains("TARGET AUDIENCE: students"));

        let svc = service(
            Arc::new(MockGenerator::replying("I could not find anything useful.")),
            Arc::new(FailingGenerator),
            Arc::new(MockSearch::default()),
        );
        let analysis = svc.discover("budgeting", &[], Some("students")).await;
        assert_eq!(analysis.pain_points.len(), 2);
        assert_eq!(analysis.pain_points[0].title, "Lack of comprehensive budgeting guidance");
        assert_eq!(analysis.pain_points[0].audience, "students");
        assert_eq!(analysis.pain_points[1].audience, "Busy professionals");
        assert_eq!(analysis.product_suggestions[0].title, "The Complete budgeting Mastery Guide");
        assert_eq!(analysis.product_suggestions[0].target_audience, "students");
        assert_eq!(analysis.action_plan.long_term.len(), 4);

        let svc = service(
            Arc::new(FailingGenerator),
            Arc::new(FailingGenerator),
            Arc::new(MockSearch::default()),
        );
        let analysis = svc.discover("budgeting", &[], None).await;
        assert_eq!(analysis.pain_points[0].audience, "General public");
        assert_eq!(
            analysis.product_suggestions[0].target_audience,
            "Beginners and intermediate learners"
        );
    }

    fn pain_point() -> PainPoint {
        PainPoint {
            title: "Meal prep takes all Sunday".into(),
            description: "Parents lose their weekend to cooking".into(),
            audience: "Working parents".into(),
            suggested_solutions: vec!["Batch recipes".into(), "Shopping lists".into()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_product_spec_from_reply() {
        let openrouter = Arc::new(MockGenerator::replying(
            r#"{"productType": "planner", "niche": "Weeknight meal prep", "targetAudience": "Parents",
               "tone": "Friendly", "length": "Short (5-10 pages)", "additionalRequirements": "Grocery lists"}"#,
        ));
        let svc = service(openrouter.clone(), Arc::new(FailingGenerator), Arc::new(MockSearch::default()));

        let spec = svc.product_spec(&pain_point()).await;
        assert_eq!(spec.product_type, "planner");
        assert_eq!(spec.niche, "Weeknight meal prep");

        let call = &openrouter.calls()[0];
        assert_eq!(call.model.as_deref(), Some("microsoft/mai-ds-r1:free"));
        assert_eq!(call.max_tokens, 1500);
        assert!(call.prompt.contains("- Title: Meal prep takes all Sunday"));
    }

    #[tokio::test]
    async fn test_product_spec_fallback() {
        let svc = service(
            Arc::new(MockGenerator::replying(r#"{"tone": "Friendly"}"#)),
            Arc::new(FailingGenerator),
            Arc::new(MockSearch::default()),
        );
        let spec = svc.product_spec(&pain_point()).await;
        assert_eq!(spec.product_type, "ebook");
        assert_eq!(spec.niche, "Meal prep takes all Sunday");
        assert_eq!(spec.target_audience, "Working parents");
        assert_eq!(spec.length, "Medium (15-25 pages)");
        assert_eq!(
            spec.additional_requirements,
            "Address the following pain points: Parents lose their weekend to cooking. Include practical solutions: Batch recipes, Shopping lists"
        );
    }
}
