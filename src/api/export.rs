//! Export endpoints
//!
//! - GET /api/v1/export/formats
//! - GET /api/v1/export/templates
//! - GET /api/v1/export/instructions/{format}
//! - POST /api/v1/export - Render posted content (authenticated)

use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::export_response;
use crate::catalog::Choice;
use crate::models::ExportOptions;
use crate::services::ExportContent;

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub content: ExportContent,
    pub options: ExportOptions,
}

#[derive(Debug, Serialize)]
pub struct InstructionsResponse {
    pub format: String,
    pub instructions: String,
}

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/formats", get(list_formats))
        .route("/templates", get(list_templates))
        .route("/instructions/{format}", get(instructions))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/", post(export_content))
}

/// GET /api/v1/export/formats
async fn list_formats(State(state): State<AppState>) -> Json<Vec<Choice>> {
    Json(state.export.available_formats().to_vec())
}

/// GET /api/v1/export/templates
async fn list_templates(State(state): State<AppState>) -> Json<Vec<Choice>> {
    Json(state.export.available_templates().to_vec())
}

/// GET /api/v1/export/instructions/{format}
async fn instructions(
    State(state): State<AppState>,
    Path(format): Path<String>,
) -> Json<InstructionsResponse> {
    Json(InstructionsResponse {
        instructions: state.export.instructions(&format).to_string(),
        format,
    })
}

/// POST /api/v1/export
async fn export_content(
    State(state): State<AppState>,
    Json(body): Json<ExportRequest>,
) -> Result<Response, ApiError> {
    let output = state
        .export
        .export(body.content.as_exportable(), &body.options, Utc::now())?;
    export_response(output)
}
