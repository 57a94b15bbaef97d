//! Pain-point discovery models

use serde::{Deserialize, Serialize};

use super::GenerationRequest;

/// A problem people keep running into around a topic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PainPoint {
    pub id: String,
    pub title: String,
    pub description: String,
    pub platform: String,
    pub audience: String,
    /// Low, Medium, High or Critical
    pub urgency: String,
    pub market_size: String,
    pub keywords: Vec<String>,
    pub related_problems: Vec<String>,
    pub suggested_solutions: Vec<String>,
    pub marketing_channels: Vec<String>,
    /// Low, Medium or High
    pub competition_level: String,
    /// Low, Medium, High or Very High
    pub monetization_potential: String,
    pub estimated_demand: String,
}

/// A product idea answering one or more pain points
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductSuggestion {
    pub id: String,
    pub product_type: String,
    pub title: String,
    pub description: String,
    pub target_audience: String,
    pub pain_points_addressed: Vec<String>,
    pub marketing_strategy: Vec<String>,
    pub price_range: String,
    pub time_to_market: String,
    pub competitive_advantage: String,
    pub validation_steps: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketInsights {
    pub total_market_size: String,
    /// Growing, Stable or Declining
    pub growth_trend: String,
    pub key_opportunities: Vec<String>,
    pub threats: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionPlan {
    pub immediate_actions: Vec<String>,
    pub short_term: Vec<String>,
    pub long_term: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainPointAnalysis {
    pub pain_points: Vec<PainPoint>,
    pub product_suggestions: Vec<ProductSuggestion>,
    pub market_insights: MarketInsights,
    pub action_plan: ActionPlan,
}

/// Generation form derived from a pain point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductSpec {
    pub product_type: String,
    pub niche: String,
    pub target_audience: String,
    pub tone: String,
    pub length: String,
    pub additional_requirements: String,
}

impl ProductSpec {
    /// The spec as a generation request; the length travels with the
    /// requirements
    pub fn to_request(&self, ai_model: &str) -> GenerationRequest {
        let requirements = match (self.length.is_empty(), self.additional_requirements.is_empty()) {
            (true, _) => self.additional_requirements.clone(),
            (false, true) => format!("Length: {}", self.length),
            (false, false) => format!("Length: {}. {}", self.length, self.additional_requirements),
        };
        GenerationRequest {
            product_type: self.product_type.clone(),
            niche: self.niche.clone(),
            target_audience: self.target_audience.clone(),
            tone: self.tone.clone(),
            requirements,
            ai_model: ai_model.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_pain_point_deserializes() {
        let point: PainPoint =
            serde_json::from_str(r#"{"title": "Slow onboarding", "keywords": ["setup"]}"#).unwrap();
        assert_eq!(point.title, "Slow onboarding");
        assert_eq!(point.keywords, vec!["setup"]);
        assert!(point.id.is_empty());
        assert!(point.suggested_solutions.is_empty());
    }

    #[test]
    fn test_spec_to_request() {
        let spec = ProductSpec {
            product_type: "planner".into(),
            niche: "Meal prep".into(),
            target_audience: "Parents".into(),
            tone: "Friendly".into(),
            length: "Short (5-10 pages)".into(),
            additional_requirements: "Add shopping lists".into(),
        };
        let request = spec.to_request("kimi");
        assert_eq!(request.product_type, "planner");
        assert_eq!(request.requirements, "Length: Short (5-10 pages). Add shopping lists");
        assert_eq!(request.ai_model, "kimi");

        let bare = ProductSpec {
            additional_requirements: "Only this".into(),
            ..Default::default()
        };
        assert_eq!(bare.to_request("mai").requirements, "Only this");
    }
}
