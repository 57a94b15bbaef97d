//! Productforge - AI digital product generator

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use productforge::{
    api::{self, AppState, RequestStats},
    cache::create_cache,
    catalog::Catalog,
    config::Config,
    db::{
        self,
        repositories::{SqlxProductRepository, SqlxSessionRepository, SqlxUserRepository},
    },
    services::{
        providers::{
            GatewayProvider, HttpFetcher, HttpSearchClient, OpenRouterProvider,
            ReqwestFetcher, TextGenerator, WebSearch,
        },
        ExportService, GenerationService, LibraryService, LoginRateLimiter, PainPointService,
        SocialService, TrendingService, UserService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "productforge=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting productforge...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    config.validate()?;
    tracing::info!("Configuration loaded");

    let mut catalog = Catalog::load(config.catalog.path.as_deref())?;
    if let Some(model) = &config.providers.openrouter.default_model {
        catalog.override_default_model(model)?;
    }
    let catalog = Arc::new(catalog);
    tracing::info!(
        "Catalog loaded: {} product types, {} models, default {}",
        catalog.product_types.len(),
        catalog.models.len(),
        catalog.default_model
    );

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    let applied = db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed ({} applied)", applied);

    let cache = create_cache(&config.cache);

    // Providers. Each one sets its own per-request timeout; the client-wide
    // value only bounds requests that carry none.
    let providers = &config.providers;
    let timeout = Duration::from_secs(
        providers
            .openrouter
            .timeout_secs
            .max(providers.gateway.timeout_secs)
            .max(providers.search.timeout_secs),
    );
    let fetcher: Arc<dyn HttpFetcher> = Arc::new(ReqwestFetcher::new(timeout, config.secrets())?);
    let openrouter: Arc<dyn TextGenerator> = Arc::new(OpenRouterProvider::new(
        fetcher.clone(),
        catalog.clone(),
        &providers.openrouter,
    ));
    let gateway: Arc<dyn TextGenerator> =
        Arc::new(GatewayProvider::new(fetcher.clone(), &providers.gateway));
    let search: Arc<dyn WebSearch> = Arc::new(HttpSearchClient::new(
        fetcher,
        cache.clone(),
        &providers.search,
    ));

    // Repositories and services
    let user_service = Arc::new(UserService::with_session_expiration(
        SqlxUserRepository::boxed(pool.clone()),
        SqlxSessionRepository::boxed(pool.clone()),
        config.session.lifetime_days,
    ));
    let rate_limiter = Arc::new(LoginRateLimiter::new());
    let generation = Arc::new(GenerationService::new(
        catalog.clone(),
        openrouter.clone(),
        gateway.clone(),
        search.clone(),
    )?);
    let social = Arc::new(SocialService::new(catalog.clone(), gateway.clone())?);
    let trending = Arc::new(TrendingService::new(
        catalog.clone(),
        gateway.clone(),
        search.clone(),
        cache,
    ));
    let pain_points = Arc::new(PainPointService::new(
        catalog.clone(),
        openrouter,
        gateway,
        search,
    ));
    let library = Arc::new(LibraryService::new(SqlxProductRepository::boxed(pool.clone()))?);
    let export = Arc::new(ExportService::new(catalog.clone())?);

    let state = AppState {
        catalog,
        user_service: user_service.clone(),
        rate_limiter: rate_limiter.clone(),
        generation,
        social,
        trending,
        pain_points,
        library,
        export,
        request_stats: Arc::new(RequestStats::new()),
        session_max_age_secs: config.session.lifetime_days * 86400,
    };

    // Start rate limiter cleanup task (runs every 5 minutes)
    {
        let limiter = rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            loop {
                interval.tick().await;
                limiter.cleanup().await;
            }
        });
    }

    // Expired sessions, hourly
    {
        let users = user_service.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(3600));
            loop {
                interval.tick().await;
                match users.cleanup_expired_sessions().await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!("Removed {} expired sessions", n),
                    Err(e) => tracing::warn!("Session cleanup failed: {}", e),
                }
            }
        });
    }

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
