//! Saved product library endpoints
//!
//! Every route is scoped to the signed-in user.
//!
//! - GET /api/v1/library?productType=&niche=&q=
//! - POST /api/v1/library
//! - GET /api/v1/library/stats
//! - GET /api/v1/library/{id}
//! - PUT /api/v1/library/{id}
//! - DELETE /api/v1/library/{id}
//! - POST /api/v1/library/{id}/export

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::export_response;
use crate::models::{
    ExportOptions, GeneratedContent, ProductFilter, ProductMetadata, ProductStats, ProductUpdate,
    SavedProduct,
};

#[derive(Debug, Deserialize)]
pub struct SaveProductRequest {
    pub content: GeneratedContent,
    pub metadata: ProductMetadata,
}

#[derive(Debug, Serialize)]
pub struct SaveProductResponse {
    pub id: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(save_product))
        .route("/stats", get(product_stats))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/export", post(export_product))
}

/// GET /api/v1/library
async fn list_products(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<SavedProduct>>, ApiError> {
    Ok(Json(state.library.list(user.id, &filter).await?))
}

/// POST /api/v1/library
async fn save_product(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(body): Json<SaveProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.content.title.trim().is_empty() {
        return Err(ApiError::validation_error("content.title is required"));
    }
    let id = state
        .library
        .save(user.id, &body.content, &body.metadata)
        .await?;
    Ok((StatusCode::CREATED, Json(SaveProductResponse { id })))
}

/// GET /api/v1/library/stats
async fn product_stats(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<ProductStats>, ApiError> {
    Ok(Json(state.library.stats(user.id).await?))
}

/// GET /api/v1/library/{id}
async fn get_product(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<SavedProduct>, ApiError> {
    state
        .library
        .get(user.id, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {}", id)))
}

/// PUT /api/v1/library/{id}
async fn update_product(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<SavedProduct>, ApiError> {
    Ok(Json(state.library.update(user.id, &id, update).await?))
}

/// DELETE /api/v1/library/{id}
async fn delete_product(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.library.delete(user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/library/{id}/export
///
/// Renders the saved product and remembers the format on the record.
async fn export_product(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
    Json(options): Json<ExportOptions>,
) -> Result<Response, ApiError> {
    let product = state
        .library
        .get(user.id, &id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {}", id)))?;

    let content = product.to_generated_content();
    let output = state.export.export(&content, &options, Utc::now())?;
    state
        .library
        .record_export(user.id, &id, options.format.as_str())
        .await?;

    export_response(output)
}
