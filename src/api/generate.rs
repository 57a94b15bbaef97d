//! Generation endpoints
//!
//! - POST /api/v1/generate - One product, parsed
//! - POST /api/v1/generate/comprehensive - Primary text plus alternatives
//! - POST /api/v1/generate/multi - Same prompt across several models
//! - POST /api/v1/generate/search-enhanced - Prompt enriched with news
//! - POST /api/v1/generate/enhance - General rewrite
//! - POST /api/v1/generate/enhance/specialist - Rewrite by a specialist model

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::ContentResponse;
use crate::models::{GeneratedContent, GenerationRequest};
use crate::services::prompt::{EnhancementKind, SpecialistKind};
use crate::services::{ComprehensiveResult, GenerationOptions};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveRequest {
    #[serde(flatten)]
    pub request: GenerationRequest,
    #[serde(default)]
    pub selected_models: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiModelRequest {
    pub prompt: String,
    pub models: Vec<String>,
    #[serde(default)]
    pub options: GenerationOptions,
}

#[derive(Debug, Serialize)]
pub struct MultiModelResponse {
    pub results: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEnhancedRequest {
    pub topic: String,
    pub product_type: String,
    #[serde(default)]
    pub target_audience: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequest {
    pub content: String,
    pub enhancement_type: EnhancementKind,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialistRequest {
    pub content: String,
    #[serde(alias = "enhancementType")]
    pub specialist: SpecialistKind,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(generate))
        .route("/comprehensive", post(generate_comprehensive))
        .route("/multi", post(generate_multi))
        .route("/search-enhanced", post(search_enhanced))
        .route("/enhance", post(enhance))
        .route("/enhance/specialist", post(enhance_specialist))
}

fn validate_request(request: &GenerationRequest) -> Result<(), ApiError> {
    if request.product_type.trim().is_empty() || request.niche.trim().is_empty() {
        return Err(ApiError::validation_error("productType and niche are required"));
    }
    Ok(())
}

fn require(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation_error(format!("{} is required", field)));
    }
    Ok(())
}

/// POST /api/v1/generate
///
/// Never fails on provider errors; the fallback product is returned instead.
async fn generate(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<GeneratedContent>, ApiError> {
    validate_request(&request)?;
    tracing::info!(
        "User {} generating {} for {} with {:?}",
        user.id,
        request.product_type,
        request.niche,
        request.ai_model
    );
    Ok(Json(state.generation.generate_content(&request).await))
}

/// POST /api/v1/generate/comprehensive
async fn generate_comprehensive(
    State(state): State<AppState>,
    Json(body): Json<ComprehensiveRequest>,
) -> Result<Json<ComprehensiveResult>, ApiError> {
    validate_request(&body.request)?;
    let result = state
        .generation
        .generate_comprehensive(&body.request, &body.selected_models)
        .await?;
    Ok(Json(result))
}

/// POST /api/v1/generate/multi
///
/// Always answers 200; failed models carry an error marker string.
async fn generate_multi(
    State(state): State<AppState>,
    Json(body): Json<MultiModelRequest>,
) -> Result<Json<MultiModelResponse>, ApiError> {
    require(&body.prompt, "prompt")?;
    if body.models.is_empty() {
        return Err(ApiError::validation_error("At least one model is required"));
    }
    let results = state
        .generation
        .generate_with_models(&body.prompt, &body.models, &body.options)
        .await;
    Ok(Json(MultiModelResponse { results }))
}

/// POST /api/v1/generate/search-enhanced
async fn search_enhanced(
    State(state): State<AppState>,
    Json(body): Json<SearchEnhancedRequest>,
) -> Result<Json<ContentResponse>, ApiError> {
    require(&body.topic, "topic")?;
    let content = state
        .generation
        .search_enhanced_generation(&body.topic, &body.product_type, &body.target_audience)
        .await?;
    Ok(Json(ContentResponse { content }))
}

/// POST /api/v1/generate/enhance
async fn enhance(
    State(state): State<AppState>,
    Json(body): Json<EnhanceRequest>,
) -> Result<Json<ContentResponse>, ApiError> {
    require(&body.content, "content")?;
    let content = state
        .generation
        .enhance_content(&body.content, body.enhancement_type)
        .await?;
    Ok(Json(ContentResponse { content }))
}

/// POST /api/v1/generate/enhance/specialist
async fn enhance_specialist(
    State(state): State<AppState>,
    Json(body): Json<SpecialistRequest>,
) -> Result<Json<ContentResponse>, ApiError> {
    require(&body.content, "content")?;
    let content = state
        .generation
        .enhance_with_specialist(&body.content, body.specialist)
        .await?;
    Ok(Json(ContentResponse { content }))
}
