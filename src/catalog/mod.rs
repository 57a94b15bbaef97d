//! Product catalog and default tables
//!
//! Everything static lives in one YAML document: product types, the AI model
//! registry, parser defaults, social platform tables, export metadata and
//! trending fallbacks. The document is embedded at compile time and can be
//! replaced at runtime with `catalog.path`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::models::{GenerationRequest, TrendingTopic};

const EMBEDDED_CATALOG: &str = include_str!("catalog.yaml");

/// Category name that disables category filtering
pub const ALL_CATEGORIES: &str = "All";

/// A product type users can generate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductType {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub icon: String,
    pub estimated_time: String,
    /// Beginner, Intermediate or Advanced
    pub difficulty: String,
    /// Low, Medium, High or Very High
    pub monetization_potential: String,
}

/// A curated, ready-to-run product idea
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickIdea {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub product_type: String,
    pub difficulty: String,
    pub estimated_time: String,
    pub monetization_potential: String,
    /// 0-100; ideas at or above [`TRENDING_IDEA_SCORE`] count as trending
    pub trending_score: u32,
    pub tags: Vec<String>,
    pub icon: String,
    pub popularity_rank: u32,
    pub length: String,
    pub selected_models: Vec<String>,
    /// Prefilled generation form
    pub request: GenerationRequest,
}

pub const TRENDING_IDEA_SCORE: u32 = 80;

/// Quick-idea lookup; every set field must match
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaFilter {
    /// Substring of title, description, category or any tag
    pub q: Option<String>,
    /// `"All"` disables the predicate
    pub category: Option<String>,
    pub product_type: Option<String>,
    pub difficulty: Option<String>,
    pub monetization: Option<String>,
    /// Comma-separated; an idea matches when any tag contains any of them
    pub tags: Option<String>,
}

/// An OpenRouter model entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub specialization: String,
    pub description: String,
    pub context_length: u32,
    pub is_active: bool,
    /// Extra prompt paragraph steering the model to its strength
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
}

/// Enhancement kind routed to a specialized model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialist {
    /// Canonical id or alias
    pub model: String,
    pub instruction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    pub price_range: String,
    pub cover_colors: Vec<String>,
    /// Keyed by a product-type substring; `ebook` is the fallback
    pub table_of_contents: HashMap<String, Vec<String>>,
    pub monetization: Vec<String>,
    pub marketing: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialTables {
    pub platform_specs: HashMap<String, String>,
    pub base_reach: HashMap<String, u32>,
    pub default_reach: u32,
    pub engagement_tips: HashMap<String, Vec<String>>,
    pub posting_times: HashMap<String, Vec<String>>,
    pub platform_hashtags: HashMap<String, Vec<String>>,
}

/// `{id, name, description}` listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTables {
    pub formats: Vec<Choice>,
    pub templates: Vec<Choice>,
    pub instructions: HashMap<String, String>,
    pub default_instruction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingTables {
    pub topics: Vec<TrendingTopic>,
    pub image_prompts: Vec<String>,
    pub generic_image_prompts: Vec<String>,
}

/// The parsed catalog document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub categories: Vec<String>,
    pub product_types: Vec<ProductType>,
    pub models: Vec<ModelInfo>,
    pub aliases: HashMap<String, String>,
    pub default_model: String,
    pub default_focus: String,
    pub specialists: HashMap<String, Specialist>,
    pub defaults: Defaults,
    pub social: SocialTables,
    pub export: ExportTables,
    pub trending: TrendingTables,
    #[serde(default)]
    pub quick_ideas: Vec<QuickIdea>,
}

impl Catalog {
    /// The catalog compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_yaml(EMBEDDED_CATALOG).context("Embedded catalog is invalid")
    }

    /// Load a replacement catalog from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog: {:?}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid catalog: {:?}", path))
    }

    /// External catalog when configured, embedded otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::info!("Loading catalog from {:?}", path);
                Self::from_path(path)
            }
            None => Self::embedded(),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(content)?;
        if catalog.resolve_model(&catalog.default_model).is_none() {
            anyhow::bail!("default model {} is not in the model list", catalog.default_model);
        }
        Ok(catalog)
    }

    /// Replace the default model. The id may be an alias but must resolve.
    pub fn override_default_model(&mut self, id: &str) -> Result<()> {
        let canonical = self
            .resolve_model(id)
            .map(|m| m.id.clone())
            .with_context(|| format!("default model {} is not in the model list", id))?;
        self.default_model = canonical;
        Ok(())
    }

    /// Product types matching a name/description substring and a category.
    ///
    /// Both predicates must hold. An empty query matches everything and
    /// `"All"` (or no category) disables the category predicate.
    pub fn filter_product_types(&self, query: &str, category: Option<&str>) -> Vec<&ProductType> {
        let query = query.trim().to_lowercase();
        let category = category.filter(|c| !c.is_empty() && *c != ALL_CATEGORIES);

        self.product_types
            .iter()
            .filter(|p| {
                query.is_empty()
                    || p.name.to_lowercase().contains(&query)
                    || p.description.to_lowercase().contains(&query)
            })
            .filter(|p| category.map_or(true, |c| p.category == c))
            .collect()
    }

    /// Quick ideas passing `filter`, highest trending score first
    pub fn filter_ideas(&self, filter: &IdeaFilter) -> Vec<&QuickIdea> {
        let present = |v: &Option<String>| -> Option<String> {
            v.as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_lowercase)
        };
        let query = present(&filter.q);
        let category = present(&filter.category).filter(|c| c != &ALL_CATEGORIES.to_lowercase());
        let product_type = present(&filter.product_type);
        let difficulty = present(&filter.difficulty);
        let monetization = present(&filter.monetization);
        let tags: Vec<String> = present(&filter.tags)
            .map(|t| {
                t.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let mut ideas: Vec<&QuickIdea> = self
            .quick_ideas
            .iter()
            .filter(|i| {
                query.as_deref().map_or(true, |q| {
                    i.title.to_lowercase().contains(q)
                        || i.description.to_lowercase().contains(q)
                        || i.category.to_lowercase().contains(q)
                        || i.tags.iter().any(|t| t.to_lowercase().contains(q))
                })
            })
            .filter(|i| category.as_deref().map_or(true, |c| i.category.to_lowercase() == c))
            .filter(|i| product_type.as_deref().map_or(true, |p| i.product_type == p))
            .filter(|i| difficulty.as_deref().map_or(true, |d| i.difficulty.to_lowercase() == d))
            .filter(|i| {
                monetization
                    .as_deref()
                    .map_or(true, |m| i.monetization_potential.to_lowercase() == m)
            })
            .filter(|i| {
                tags.is_empty()
                    || i.tags.iter().any(|t| {
                        let t = t.to_lowercase();
                        tags.iter().any(|wanted| t.contains(wanted.as_str()))
                    })
            })
            .collect();
        ideas.sort_by(|a, b| b.trending_score.cmp(&a.trending_score));
        ideas
    }

    /// Up to `limit` ideas scoring at least [`TRENDING_IDEA_SCORE`]
    pub fn trending_ideas(&self, limit: usize) -> Vec<&QuickIdea> {
        let mut ideas: Vec<&QuickIdea> = self
            .quick_ideas
            .iter()
            .filter(|i| i.trending_score >= TRENDING_IDEA_SCORE)
            .collect();
        ideas.sort_by(|a, b| b.trending_score.cmp(&a.trending_score));
        ideas.truncate(limit);
        ideas
    }

    pub fn quick_idea(&self, id: &str) -> Option<&QuickIdea> {
        self.quick_ideas.iter().find(|i| i.id == id)
    }

    /// `count` distinct ideas in random order
    pub fn random_ideas(&self, rng: &mut fastrand::Rng, count: usize) -> Vec<&QuickIdea> {
        let mut ideas: Vec<&QuickIdea> = self.quick_ideas.iter().collect();
        rng.shuffle(&mut ideas);
        ideas.truncate(count);
        ideas
    }

    /// Model for a canonical id or a legacy alias
    pub fn resolve_model(&self, id: &str) -> Option<&ModelInfo> {
        let canonical = self.aliases.get(id).map(String::as_str).unwrap_or(id);
        self.models.iter().find(|m| m.id == canonical)
    }

    pub fn is_openrouter_model(&self, id: &str) -> bool {
        self.resolve_model(id).is_some()
    }

    /// Canonical OpenRouter id; unknown ids map to the default model
    pub fn openrouter_model_id(&self, id: &str) -> &str {
        self.resolve_model(id)
            .map(|m| m.id.as_str())
            .unwrap_or(self.default_model.as_str())
    }

    pub fn active_models(&self) -> Vec<&ModelInfo> {
        self.models.iter().filter(|m| m.is_active).collect()
    }

    /// Specialization paragraph appended to generation prompts
    pub fn focus_for(&self, id: &str) -> &str {
        self.resolve_model(id)
            .and_then(|m| m.focus.as_deref())
            .unwrap_or(self.default_focus.as_str())
    }

    /// First TOC template whose key occurs in the lower-cased product type
    pub fn default_toc(&self, product_type: &str) -> Vec<String> {
        let product_type = product_type.to_lowercase();
        // Fixed order so "ebook template" resolves the same way every time
        for key in ["ebook", "planner", "worksheet", "template"] {
            if product_type.contains(key) {
                if let Some(toc) = self.defaults.table_of_contents.get(key) {
                    return toc.clone();
                }
            }
        }
        self.defaults
            .table_of_contents
            .get("ebook")
            .cloned()
            .unwrap_or_default()
    }

    pub fn engagement_tips(&self, platform: &str) -> Vec<String> {
        lookup_or(&self.social.engagement_tips, platform, "instagram")
    }

    pub fn posting_times(&self, platform: &str) -> Vec<String> {
        lookup_or(&self.social.posting_times, platform, "instagram")
    }

    pub fn platform_spec(&self, platform: &str) -> String {
        self.social
            .platform_specs
            .get(platform)
            .or_else(|| self.social.platform_specs.get("general"))
            .cloned()
            .unwrap_or_default()
    }

    pub fn base_reach(&self, platform: &str) -> u32 {
        self.social
            .base_reach
            .get(platform)
            .copied()
            .unwrap_or(self.social.default_reach)
    }

    pub fn platform_hashtags(&self, platform: &str) -> Vec<String> {
        lookup_or(&self.social.platform_hashtags, platform, "general")
    }

    pub fn export_instructions(&self, format: &str) -> &str {
        self.export
            .instructions
            .get(&format.to_lowercase())
            .map(String::as_str)
            .unwrap_or(self.export.default_instruction.as_str())
    }
}

fn lookup_or(table: &HashMap<String, Vec<String>>, key: &str, fallback: &str) -> Vec<String> {
    table
        .get(key)
        .or_else(|| table.get(fallback))
        .cloned()
        .unwrap_or_default()
}
