//! Pain-point discovery endpoints
//!
//! - POST /api/v1/pain-points/discover
//! - POST /api/v1/pain-points/product-spec

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::{PainPoint, PainPointAnalysis, ProductSpec};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverRequest {
    pub topic: String,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSpecRequest {
    pub pain_point: PainPoint,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/discover", post(discover))
        .route("/product-spec", post(product_spec))
}

/// POST /api/v1/pain-points/discover
async fn discover(
    State(state): State<AppState>,
    Json(body): Json<DiscoverRequest>,
) -> Result<Json<PainPointAnalysis>, ApiError> {
    let topic = body.topic.trim();
    if topic.is_empty() {
        return Err(ApiError::validation_error("topic is required"));
    }
    let analysis = state
        .pain_points
        .discover(topic, &body.platforms, body.target_audience.as_deref())
        .await;
    Ok(Json(analysis))
}

/// POST /api/v1/pain-points/product-spec
async fn product_spec(
    State(state): State<AppState>,
    Json(body): Json<ProductSpecRequest>,
) -> Result<Json<ProductSpec>, ApiError> {
    if body.pain_point.title.trim().is_empty() {
        return Err(ApiError::validation_error("painPoint.title is required"));
    }
    Ok(Json(state.pain_points.product_spec(&body.pain_point).await))
}
