//! Shared API response types
//!
//! Response bodies used by more than one route module, plus the mapping
//! from service errors to [`ApiError`].

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::api::middleware::ApiError;
use crate::services::{
    ExportError, ExportOutput, GenerationError, LibraryError, UserServiceError,
};

/// Public view of an account
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

impl From<crate::models::User> for UserResponse {
    fn from(user: crate::models::User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role.to_string(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Response for successful authentication
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// A single rewritten or generated text
#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub content: String,
}

/// Where a redirect-style export continues
#[derive(Debug, Serialize)]
pub struct UrlResponse {
    pub url: String,
}

// ============================================================================
// Exports
// ============================================================================

/// File exports become attachments; redirect exports answer `{url}`
pub fn export_response(output: ExportOutput) -> Result<Response, ApiError> {
    match output {
        ExportOutput::File {
            filename,
            mime,
            bytes,
        } => {
            let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
                .map_err(|e| ApiError::internal_error(format!("Invalid filename header: {}", e)))?;
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static(mime)),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response())
        }
        ExportOutput::Redirect { url } => Ok(Json(UrlResponse { url }).into_response()),
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<UserServiceError> for ApiError {
    fn from(e: UserServiceError) -> Self {
        match e {
            UserServiceError::AuthenticationError(msg) => ApiError::unauthorized(msg),
            UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            UserServiceError::UserExists(msg) => ApiError::conflict(msg),
            UserServiceError::SessionExpired | UserServiceError::SessionNotFound => {
                ApiError::unauthorized("Invalid or expired session")
            }
            UserServiceError::InternalError(e) => {
                tracing::error!("User service error: {:#}", e);
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<LibraryError> for ApiError {
    fn from(e: LibraryError) -> Self {
        match e {
            LibraryError::NotFound(id) => ApiError::not_found(format!("Product not found: {}", id)),
            LibraryError::InternalError(e) => {
                tracing::error!("Library error: {:#}", e);
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(e: GenerationError) -> Self {
        match e {
            GenerationError::UnknownSpecialist(kind) => {
                ApiError::validation_error(format!("Unknown enhancement type: {}", kind))
            }
            other => {
                tracing::warn!("Generation failed: {}", other);
                ApiError::bad_gateway(other.to_string())
            }
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        tracing::error!("Export failed: {}", e);
        ApiError::internal_error(e.to_string())
    }
}
