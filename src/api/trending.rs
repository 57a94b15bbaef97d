//! Trending research endpoints
//!
//! - POST /api/v1/trending/search
//! - POST /api/v1/trending/image-prompts
//! - POST /api/v1/trending/enhance-prompt

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::models::TrendingResponse;

#[derive(Debug, Deserialize)]
pub struct TrendingSearchRequest {
    pub query: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePromptRequest {
    pub product_type: String,
    pub niche: String,
}

#[derive(Debug, Serialize)]
pub struct ImagePromptResponse {
    pub prompts: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancePromptRequest {
    pub prompt: String,
    #[serde(default)]
    pub product_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancePromptResponse {
    pub enhanced_prompt: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", post(search))
        .route("/image-prompts", post(image_prompts))
        .route("/enhance-prompt", post(enhance_prompt))
}

/// POST /api/v1/trending/search
async fn search(
    State(state): State<AppState>,
    Json(body): Json<TrendingSearchRequest>,
) -> Result<Json<TrendingResponse>, ApiError> {
    if body.query.trim().is_empty() {
        return Err(ApiError::validation_error("query is required"));
    }
    let category = body.category.as_deref().filter(|c| !c.is_empty());
    Ok(Json(state.trending.search_trending(&body.query, category).await))
}

/// POST /api/v1/trending/image-prompts
async fn image_prompts(
    State(state): State<AppState>,
    Json(body): Json<ImagePromptRequest>,
) -> Json<ImagePromptResponse> {
    let prompts = state
        .trending
        .image_prompt_suggestions(&body.product_type, &body.niche)
        .await;
    Json(ImagePromptResponse { prompts })
}

/// POST /api/v1/trending/enhance-prompt
async fn enhance_prompt(
    State(state): State<AppState>,
    Json(body): Json<EnhancePromptRequest>,
) -> Result<Json<EnhancePromptResponse>, ApiError> {
    if body.prompt.trim().is_empty() {
        return Err(ApiError::validation_error("prompt is required"));
    }
    let enhanced_prompt = state
        .trending
        .enhance_prompt(&body.prompt, &body.product_type)
        .await;
    Ok(Json(EnhancePromptResponse { enhanced_prompt }))
}
