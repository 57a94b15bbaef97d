//! Generated product models
//!
//! `GenerationRequest` drives the pipeline, `GeneratedContent` is what the
//! parser produces, and `SavedProduct` is the library record that combines
//! both with an owner and timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default cover palette: primary, accent, background
pub const DEFAULT_COVER_COLORS: [&str; 3] = ["#6366F1", "#F59E0B", "#FFFFFF"];

/// Maximum number of records a library listing returns
pub const LIBRARY_LIST_LIMIT: i64 = 100;

/// User input for a generation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub product_type: String,
    pub niche: String,
    pub target_audience: String,
    pub tone: String,
    #[serde(default)]
    pub requirements: String,
    /// Canonical model id, legacy alias, or anything else (gateway)
    #[serde(default)]
    pub ai_model: String,
}

impl GenerationRequest {
    /// The request fields worth persisting next to the content
    pub fn metadata(&self) -> ProductMetadata {
        ProductMetadata {
            product_type: self.product_type.clone(),
            niche: self.niche.clone(),
            target_audience: self.target_audience.clone(),
            tone: self.tone.clone(),
            requirements: self.requirements.clone(),
            ai_model: self.ai_model.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverDesign {
    pub title: String,
    pub subtitle: String,
    pub colors: Vec<String>,
}

impl CoverDesign {
    pub fn new(title: &str, subtitle: &str) -> Self {
        Self {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            colors: DEFAULT_COVER_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Structured product extracted from a model response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    pub title: String,
    pub subtitle: String,
    pub content: String,
    pub table_of_contents: Vec<String>,
    pub monetization_suggestions: Vec<String>,
    pub marketing_channels: Vec<String>,
    pub price_range: String,
    pub cover_design: CoverDesign,
}

/// Request metadata stored alongside a saved product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMetadata {
    pub product_type: String,
    pub niche: String,
    pub target_audience: String,
    pub tone: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub ai_model: String,
}

/// Library record owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProduct {
    pub id: String,
    pub user_id: i64,
    pub title: String,
    pub product_type: String,
    pub niche: String,
    pub target_audience: String,
    pub tone: String,
    pub requirements: String,
    pub ai_model: String,
    pub content: String,
    pub table_of_contents: Vec<String>,
    pub monetization_suggestions: Vec<String>,
    pub marketing_channels: Vec<String>,
    pub price_range: String,
    pub export_formats: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavedProduct {
    /// Build an unsaved record from parsed content and its request metadata
    pub fn new(user_id: i64, content: &GeneratedContent, metadata: &ProductMetadata) -> Self {
        let now = Utc::now();
        Self {
            id: new_product_id(now),
            user_id,
            title: content.title.clone(),
            product_type: metadata.product_type.clone(),
            niche: metadata.niche.clone(),
            target_audience: metadata.target_audience.clone(),
            tone: metadata.tone.clone(),
            requirements: metadata.requirements.clone(),
            ai_model: metadata.ai_model.clone(),
            content: content.content.clone(),
            table_of_contents: content.table_of_contents.clone(),
            monetization_suggestions: content.monetization_suggestions.clone(),
            marketing_channels: content.marketing_channels.clone(),
            price_range: content.price_range.clone(),
            export_formats: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild the exportable content; the subtitle is not stored
    pub fn to_generated_content(&self) -> GeneratedContent {
        let subtitle = format!("A comprehensive guide for {}", self.target_audience);
        GeneratedContent {
            title: self.title.clone(),
            cover_design: CoverDesign::new(&self.title, &subtitle),
            subtitle,
            content: self.content.clone(),
            table_of_contents: self.table_of_contents.clone(),
            monetization_suggestions: self.monetization_suggestions.clone(),
            marketing_channels: self.marketing_channels.clone(),
            price_range: self.price_range.clone(),
        }
    }

    /// Apply a partial update in place and bump `updated_at`
    pub fn apply(&mut self, update: ProductUpdate) {
        if let Some(v) = update.title {
            self.title = v;
        }
        if let Some(v) = update.product_type {
            self.product_type = v;
        }
        if let Some(v) = update.niche {
            self.niche = v;
        }
        if let Some(v) = update.target_audience {
            self.target_audience = v;
        }
        if let Some(v) = update.tone {
            self.tone = v;
        }
        if let Some(v) = update.requirements {
            self.requirements = v;
        }
        if let Some(v) = update.content {
            self.content = v;
        }
        if let Some(v) = update.table_of_contents {
            self.table_of_contents = v;
        }
        if let Some(v) = update.monetization_suggestions {
            self.monetization_suggestions = v;
        }
        if let Some(v) = update.marketing_channels {
            self.marketing_channels = v;
        }
        if let Some(v) = update.price_range {
            self.price_range = v;
        }
        if let Some(v) = update.export_formats {
            self.export_formats = v;
        }
        self.updated_at = Utc::now();
    }
}

/// `product_{unix_millis}_{9 base36 chars}`
pub fn new_product_id(now: DateTime<Utc>) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut entropy = uuid::Uuid::new_v4().as_u128();
    let suffix: String = (0..9)
        .map(|_| {
            let c = ALPHABET[(entropy % 36) as usize] as char;
            entropy /= 36;
            c
        })
        .collect();
    format!("product_{}_{}", now.timestamp_millis(), suffix)
}

/// Partial update of a saved product; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub product_type: Option<String>,
    pub niche: Option<String>,
    pub target_audience: Option<String>,
    pub tone: Option<String>,
    pub requirements: Option<String>,
    pub content: Option<String>,
    pub table_of_contents: Option<Vec<String>>,
    pub monetization_suggestions: Option<Vec<String>>,
    pub marketing_channels: Option<Vec<String>>,
    pub price_range: Option<String>,
    pub export_formats: Option<Vec<String>>,
}

/// Library listing filters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    /// Exact match
    pub product_type: Option<String>,
    /// Exact match
    pub niche: Option<String>,
    /// Case-insensitive substring over title, niche and audience
    #[serde(alias = "q")]
    pub search_query: Option<String>,
}

impl ProductFilter {
    /// Whether `product` passes the free-text part of the filter
    pub fn matches_query(&self, product: &SavedProduct) -> bool {
        match self.search_query.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let query = query.to_lowercase();
                product.title.to_lowercase().contains(&query)
                    || product.niche.to_lowercase().contains(&query)
                    || product.target_audience.to_lowercase().contains(&query)
            }
        }
    }
}

/// Library dashboard numbers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub total_products: usize,
    pub products_by_type: BTreeMap<String, usize>,
    pub recent_products: Vec<SavedProduct>,
    pub total_revenue_potential: String,
}
