//! API layer - HTTP handlers and routing
//!
//! Everything is served under `/api/v1`:
//! - Auth endpoints (register, login, logout, me)
//! - Catalog and export metadata (public)
//! - Quick ideas (public)
//! - Generation, social, trending and pain-point endpoints
//! - The saved product library and exports
//! - Request statistics

pub mod auth;
pub mod catalog;
pub mod export;
pub mod generate;
pub mod ideas;
pub mod library;
pub mod middleware;
pub mod pain_points;
pub mod responses;
pub mod social;
pub mod trending;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware, Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use middleware::{ApiError, AppState, RequestStats};

/// Build the `/api/v1` routes
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Protected routes (need a valid session)
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .nest("/generate", generate::router())
        .nest("/social", social::router())
        .nest("/trending", trending::router())
        .nest("/pain-points", pain_points::router())
        .nest("/library", library::router())
        .nest("/export", export::protected_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .nest("/auth", auth::public_router())
        .nest("/catalog", catalog::router())
        .nest("/ideas", ideas::router())
        .nest("/export", export::public_router())
        .nest("/stats", catalog::stats_router())
        .merge(protected_routes)
}

/// CORS for the configured origin; `*` allows any origin without cookies
fn cors_layer(cors_origin: &str) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE]);

    if cors_origin == "*" {
        return base.allow_origin(Any);
    }
    match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => base.allow_origin(origin).allow_credentials(true),
        Err(e) => {
            tracing::warn!("Invalid CORS origin {:?} ({}), allowing any", cors_origin, e);
            base.allow_origin(Any)
        }
    }
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(cors_layer(cors_origin))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        // Request stats middleware (outermost layer, runs for all requests)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::request_stats_middleware,
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::create_cache;
    use crate::catalog::Catalog;
    use crate::config::CacheConfig;
    use crate::db::{
        create_test_pool, migrations,
        repositories::{SqlxProductRepository, SqlxSessionRepository, SqlxUserRepository},
    };
    use crate::services::providers::testing::{FailingGenerator, MockGenerator, MockSearch};
    use crate::services::providers::TextGenerator;
    use crate::services::{
        ExportService, GenerationService, LibraryService, LoginRateLimiter, PainPointService,
        SocialService, TrendingService, UserService,
    };
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    const PRODUCT_REPLY: &str = "TITLE: Windowsill Herbs\nSUBTITLE: Grow basil anywhere\n\n\
        ## Getting Started\nPick a sunny spot.\n\nPRICE RANGE: $12 - $24";

    async fn test_app(generator: Arc<dyn TextGenerator>) -> Router {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let catalog = Arc::new(Catalog::embedded().unwrap());
        let cache = create_cache(&CacheConfig::default());
        let search = Arc::new(MockSearch::default());

        let state = AppState {
            catalog: catalog.clone(),
            user_service: Arc::new(UserService::new(
                SqlxUserRepository::boxed(pool.clone()),
                SqlxSessionRepository::boxed(pool.clone()),
            )),
            rate_limiter: Arc::new(LoginRateLimiter::new()),
            generation: Arc::new(
                GenerationService::new(
                    catalog.clone(),
                    generator.clone(),
                    generator.clone(),
                    search.clone(),
                )
                .unwrap(),
            ),
            social: Arc::new(SocialService::new(catalog.clone(), generator.clone()).unwrap()),
            trending: Arc::new(TrendingService::new(
                catalog.clone(),
                generator.clone(),
                search.clone(),
                cache,
            )),
            pain_points: Arc::new(PainPointService::new(
                catalog.clone(),
                generator.clone(),
                generator,
                search,
            )),
            library: Arc::new(LibraryService::new(SqlxProductRepository::boxed(pool)).unwrap()),
            export: Arc::new(ExportService::new(catalog.clone()).unwrap()),
            request_stats: Arc::new(RequestStats::new()),
            session_max_age_secs: 7 * 86400,
        };
        build_router(state, "*")
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn register(app: &Router, username: &str) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/register",
                None,
                json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "correct-horse-battery",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.headers().contains_key(header::SET_COOKIE));
        body_json(response).await["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_catalog_routes_are_public() {
        let app = test_app(Arc::new(MockGenerator::replying(PRODUCT_REPLY))).await;

        let response = app
            .clone()
            .oneshot(get("/api/v1/catalog/product-types?q=planner", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let types = body_json(response).await;
        assert!(types.as_array().is_some_and(|t| !t.is_empty()));

        let response = app.oneshot(get("/api/v1/export/formats", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_routes_require_session() {
        let app = test_app(Arc::new(MockGenerator::replying(PRODUCT_REPLY))).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/generate",
                None,
                json!({ "productType": "eBook", "niche": "herbs", "targetAudience": "", "tone": "" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(get("/api/v1/library", Some("not-a-session")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_register_then_me() {
        let app = test_app(Arc::new(MockGenerator::replying(PRODUCT_REPLY))).await;
        let token = register(&app, "maker").await;

        let response = app.oneshot(get("/api/v1/auth/me", Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let me = body_json(response).await;
        assert_eq!(me["username"], "maker");
        assert_eq!(me["role"], "admin");
    }

    #[tokio::test]
    async fn test_generate_save_and_scope_library() {
        let app = test_app(Arc::new(MockGenerator::replying(PRODUCT_REPLY))).await;
        let owner = register(&app, "owner").await;
        let other = register(&app, "other").await;

        let request = json!({
            "productType": "eBook",
            "niche": "herbs",
            "targetAudience": "renters",
            "tone": "friendly",
        });
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/v1/generate", Some(&owner), request.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content = body_json(response).await;
        assert_eq!(content["title"], "Windowsill Herbs");

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/library",
                Some(&owner),
                json!({ "content": content, "metadata": request }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(get("/api/v1/library", Some(&owner)))
            .await
            .unwrap();
        assert_eq!(body_json(response).await.as_array().map(Vec::len), Some(1));

        let response = app
            .clone()
            .oneshot(get("/api/v1/library", Some(&other)))
            .await
            .unwrap();
        assert_eq!(body_json(response).await.as_array().map(Vec::len), Some(0));

        let response = app
            .clone()
            .oneshot(get(&format!("/api/v1/library/{}", id), Some(&other)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/library/{}/export", id),
                Some(&owner),
                json!({ "format": "markdown" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"windowsill-herbs-"));

        let response = app
            .oneshot(get(&format!("/api/v1/library/{}", id), Some(&owner)))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["exportFormats"], json!(["markdown"]));
    }

    #[tokio::test]
    async fn test_generate_survives_provider_failure() {
        let app = test_app(Arc::new(FailingGenerator)).await;
        let token = register(&app, "unlucky").await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/generate",
                Some(&token),
                json!({ "productType": "Planner", "niche": "fitness", "targetAudience": "", "tone": "" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content = body_json(response).await;
        assert_eq!(content["title"], "Planner: fitness Guide");
        assert_eq!(content["monetizationSuggestions"].as_array().map(Vec::len), Some(7));
    }

    #[tokio::test]
    async fn test_adhoc_canva_export_returns_url() {
        let app = test_app(Arc::new(MockGenerator::replying(PRODUCT_REPLY))).await;
        let token = register(&app, "designer").await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/export",
                Some(&token),
                json!({
                    "content": {
                        "type": "post",
                        "content": {
                            "title": "Basil Tips",
                            "content": "Pinch the tops.",
                            "hashtags": ["#basil"],
                            "platform": "instagram",
                            "estimatedReach": "1,200+ impressions",
                            "engagementTips": [],
                            "bestPostingTimes": [],
                        },
                    },
                    "options": { "format": "canva" },
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let url = body_json(response).await["url"].as_str().unwrap().to_string();
        assert!(url.starts_with("https://www.canva.com/design?template=ebook&title=Basil%20Tips"));
    }

    #[tokio::test]
    async fn test_request_stats_are_counted() {
        let app = test_app(Arc::new(MockGenerator::replying(PRODUCT_REPLY))).await;
        app.clone()
            .oneshot(get("/api/v1/catalog/categories", None))
            .await
            .unwrap();

        let response = app.oneshot(get("/api/v1/stats/requests", None)).await.unwrap();
        let stats = body_json(response).await;
        assert!(stats["totalRequests"].as_u64().unwrap() >= 1);
        assert!(stats.get("avgResponseTimeMs").is_some());
    }
    #[tokio::test]
    async fn test_idea_routes_are_public() {
        let app = test_app(Arc::new(MockGenerator::replying(PRODUCT_REPLY))).await;

        let response = app
            .clone()
            .oneshot(get("/api/v1/ideas?productType=planner", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let ideas = body_json(response).await;
        let scores: Vec<u64> = ideas
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["trendingScore"].as_u64().unwrap())
            .collect();
        assert_eq!(scores, vec![90, 89]);

        let response = app
            .clone()
            .oneshot(get("/api/v1/ideas/trending?limit=3", None))
            .await
            .unwrap();
        assert_eq!(body_json(response).await.as_array().map(Vec::len), Some(3));

        let response = app
            .clone()
            .oneshot(get("/api/v1/ideas/random?count=4", None))
            .await
            .unwrap();
        assert_eq!(body_json(response).await.as_array().map(Vec::len), Some(4));

        let response = app
            .clone()
            .oneshot(get("/api/v1/ideas/side-hustle-starter", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["trendingScore"], 88);

        let response = app.oneshot(get("/api/v1/ideas/no-such-idea", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_pain_point_routes() {
        let app = test_app(Arc::new(MockGenerator::replying(PRODUCT_REPLY))).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/pain-points/discover",
                None,
                json!({ "topic": "gardening" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let token = register(&app, "researcher").await;
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/pain-points/discover",
                Some(&token),
                json!({ "topic": "  " }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // The canned reply is not JSON, so the topic's fallback analysis comes back
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/pain-points/discover",
                Some(&token),
                json!({ "topic": "gardening", "targetAudience": "renters" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let analysis = body_json(response).await;
        assert_eq!(analysis["painPoints"].as_array().map(Vec::len), Some(2));
        assert_eq!(analysis["painPoints"][0]["audience"], "renters");
        let pain_point = analysis["painPoints"][0].clone();

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/pain-points/product-spec",
                Some(&token),
                json!({ "painPoint": pain_point }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let spec = body_json(response).await;
        assert_eq!(spec["productType"], "ebook");
        assert_eq!(spec["niche"], "Lack of comprehensive gardening guidance");
    }
}
