//! Catalog and status endpoints
//!
//! - GET /api/v1/catalog/product-types?q=&category=
//! - GET /api/v1/catalog/categories
//! - GET /api/v1/catalog/models
//! - GET /api/v1/stats/requests

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::AppState;
use crate::catalog::{ModelInfo, ProductType};

#[derive(Debug, Default, Deserialize)]
pub struct ProductTypeQuery {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStatsResponse {
    pub total_requests: u64,
    pub avg_response_time_ms: f64,
    pub uptime_seconds: u64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/product-types", get(list_product_types))
        .route("/categories", get(list_categories))
        .route("/models", get(list_models))
}

pub fn stats_router() -> Router<AppState> {
    Router::new().route("/requests", get(request_stats))
}

/// GET /api/v1/catalog/product-types
async fn list_product_types(
    State(state): State<AppState>,
    Query(query): Query<ProductTypeQuery>,
) -> Json<Vec<ProductType>> {
    Json(
        state
            .catalog
            .filter_product_types(&query.q, query.category.as_deref())
            .into_iter()
            .cloned()
            .collect(),
    )
}

/// GET /api/v1/catalog/categories
async fn list_categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.categories.clone())
}

/// GET /api/v1/catalog/models
async fn list_models(State(state): State<AppState>) -> Json<Vec<ModelInfo>> {
    Json(state.catalog.active_models().into_iter().cloned().collect())
}

/// GET /api/v1/stats/requests
async fn request_stats(State(state): State<AppState>) -> Json<RequestStatsResponse> {
    let stats = &state.request_stats;
    Json(RequestStatsResponse {
        total_requests: stats.total_requests(),
        avg_response_time_ms: stats.avg_response_time_us() / 1000.0,
        uptime_seconds: stats.uptime_seconds(),
    })
}
