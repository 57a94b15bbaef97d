//! Authentication API endpoints
//!
//! - POST /api/v1/auth/register - Create an account and sign in
//! - POST /api/v1/auth/login - Sign in
//! - POST /api/v1/auth/logout - End the current session
//! - GET /api/v1/auth/me - Current user

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::net::IpAddr;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{AuthResponse, UserResponse};
use crate::models::{LoginInput, RegisterInput};
use crate::services::UserServiceError;

const USERNAME_RETRY_AFTER_SECS: u64 = 15 * 60;
const IP_RETRY_AFTER_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(alias = "username")]
    pub username_or_email: String,
    pub password: String,
}

/// Build public auth routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Build protected auth routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(get_current_user))
}

fn session_cookie(token: &str, max_age_secs: i64) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(&format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        token, max_age_secs
    ))
    .map_err(|e| ApiError::internal_error(format!("Invalid session cookie: {}", e)))
}

/// POST /api/v1/auth/register
///
/// The first account becomes the admin.
async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterInput>,
) -> Result<impl IntoResponse, ApiError> {
    let password = body.password.clone();
    let user = state.user_service.register(body).await?;

    let (user, session) = state
        .user_service
        .login(LoginInput {
            username: user.username,
            password,
        })
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        session_cookie(&session.id, state.session_max_age_secs)?,
    );

    Ok((
        StatusCode::CREATED,
        headers,
        Json(AuthResponse {
            user: user.into(),
            token: session.id,
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Limited to 10 requests per client IP per minute and 5 failures per
/// username per 15 minutes.
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(ip) = extract_ip_address(&headers) {
        if state.rate_limiter.is_ip_limited(ip).await {
            tracing::warn!("Login rate limit hit for {}", ip);
            return Err(ApiError::rate_limited(
                "Too many requests, please try again later",
                IP_RETRY_AFTER_SECS,
            ));
        }
        state.rate_limiter.record_ip_request(ip).await;
    }

    let username = body.username_or_email.trim().to_string();
    if state.rate_limiter.is_username_limited(&username).await {
        return Err(ApiError::rate_limited(
            "Too many failed login attempts, please try again in 15 minutes",
            USERNAME_RETRY_AFTER_SECS,
        ));
    }

    let (user, session) = match state
        .user_service
        .login(LoginInput {
            username: username.clone(),
            password: body.password,
        })
        .await
    {
        Ok(pair) => pair,
        Err(e) => {
            if matches!(e, UserServiceError::AuthenticationError(_)) {
                state.rate_limiter.record_failed_attempt(&username).await;
            }
            return Err(e.into());
        }
    };

    state.rate_limiter.clear_username_attempts(&username).await;
    tracing::info!("User {} logged in", user.username);

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::SET_COOKIE,
        session_cookie(&session.id, state.session_max_age_secs)?,
    );

    Ok((
        response_headers,
        Json(AuthResponse {
            user: user.into(),
            token: session.id,
        }),
    ))
}

/// POST /api/v1/auth/logout
async fn logout(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|h| h.to_str().ok())
                .and_then(|s| {
                    s.split(';')
                        .map(str::trim)
                        .find_map(|c| c.strip_prefix("session="))
                })
        })
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    state.user_service.logout(token).await?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_static("session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
    );

    Ok((StatusCode::NO_CONTENT, response_headers))
}

/// GET /api/v1/auth/me
async fn get_current_user(user: AuthenticatedUser) -> Json<UserResponse> {
    Json(user.0.into())
}

/// Client address as reported by a proxy
fn extract_ip_address(headers: &HeaderMap) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim);
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .map(str::trim);

    forwarded.or(real_ip).and_then(|ip| ip.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_ip_address() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_ip_address(&headers), None);

        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(extract_ip_address(&headers), Some("10.0.0.2".parse().unwrap()));

        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        assert_eq!(extract_ip_address(&headers), Some("203.0.113.7".parse().unwrap()));

        headers.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));
        assert_eq!(extract_ip_address(&headers), None);
    }

    #[test]
    fn test_session_cookie() {
        let cookie = session_cookie("abc", 604800).unwrap();
        assert_eq!(cookie, "session=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=604800");
        assert!(session_cookie("bad\nvalue", 1).is_err());
    }
}
