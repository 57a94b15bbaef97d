//! Social content endpoints
//!
//! - POST /api/v1/social/post
//! - POST /api/v1/social/blog
//! - POST /api/v1/social/meme
//! - POST /api/v1/social/hashtags
//! - POST /api/v1/social/enhance

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::ContentResponse;
use crate::models::{BlogPost, Meme, SocialPost, SocialRequest};
use crate::services::prompt::SocialEnhancement;

#[derive(Debug, Deserialize)]
pub struct HashtagRequest {
    pub topic: String,
    #[serde(default)]
    pub platform: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HashtagResponse {
    pub hashtags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialEnhanceRequest {
    pub content: String,
    pub enhancement_type: SocialEnhancement,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/post", post(generate_post))
        .route("/blog", post(generate_blog))
        .route("/meme", post(generate_meme))
        .route("/hashtags", post(hashtags))
        .route("/enhance", post(enhance))
}

fn require_topic(topic: &str) -> Result<(), ApiError> {
    if topic.trim().is_empty() {
        return Err(ApiError::validation_error("topic is required"));
    }
    Ok(())
}

/// POST /api/v1/social/post
async fn generate_post(
    State(state): State<AppState>,
    Json(request): Json<SocialRequest>,
) -> Result<Json<SocialPost>, ApiError> {
    require_topic(&request.topic)?;
    Ok(Json(state.social.generate_post(&request).await))
}

/// POST /api/v1/social/blog
async fn generate_blog(
    State(state): State<AppState>,
    Json(request): Json<SocialRequest>,
) -> Result<Json<BlogPost>, ApiError> {
    require_topic(&request.topic)?;
    Ok(Json(state.social.generate_blog(&request).await))
}

/// POST /api/v1/social/meme
async fn generate_meme(
    State(state): State<AppState>,
    Json(request): Json<SocialRequest>,
) -> Result<Json<Meme>, ApiError> {
    require_topic(&request.topic)?;
    Ok(Json(state.social.generate_meme(&request).await))
}

/// POST /api/v1/social/hashtags
async fn hashtags(
    State(state): State<AppState>,
    Json(body): Json<HashtagRequest>,
) -> Result<Json<HashtagResponse>, ApiError> {
    require_topic(&body.topic)?;
    let platform = body
        .platform
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or("general");
    let hashtags = state.social.trending_hashtags(&body.topic, platform).await;
    Ok(Json(HashtagResponse { hashtags }))
}

/// POST /api/v1/social/enhance
///
/// Returns the input unchanged when the rewrite fails.
async fn enhance(
    State(state): State<AppState>,
    Json(body): Json<SocialEnhanceRequest>,
) -> Result<Json<ContentResponse>, ApiError> {
    if body.content.trim().is_empty() {
        return Err(ApiError::validation_error("content is required"));
    }
    let content = state.social.enhance(&body.content, body.enhancement_type).await;
    Ok(Json(ContentResponse { content }))
}
