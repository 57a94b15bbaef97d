//! Quick idea endpoints (public)
//!
//! - GET /api/v1/ideas?q=&category=&productType=&difficulty=&monetization=&tags=
//! - GET /api/v1/ideas/trending?limit=
//! - GET /api/v1/ideas/random?count=
//! - GET /api/v1/ideas/{id}

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::catalog::{IdeaFilter, QuickIdea};

const DEFAULT_TRENDING_LIMIT: usize = 10;
const DEFAULT_RANDOM_COUNT: usize = 3;

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CountQuery {
    pub count: Option<usize>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_ideas))
        .route("/trending", get(trending_ideas))
        .route("/random", get(random_ideas))
        .route("/{id}", get(get_idea))
}

fn owned(ideas: Vec<&QuickIdea>) -> Json<Vec<QuickIdea>> {
    Json(ideas.into_iter().cloned().collect())
}

/// GET /api/v1/ideas
async fn list_ideas(
    State(state): State<AppState>,
    Query(filter): Query<IdeaFilter>,
) -> Json<Vec<QuickIdea>> {
    owned(state.catalog.filter_ideas(&filter))
}

/// GET /api/v1/ideas/trending
async fn trending_ideas(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<QuickIdea>> {
    owned(state.catalog.trending_ideas(query.limit.unwrap_or(DEFAULT_TRENDING_LIMIT)))
}

/// GET /api/v1/ideas/random
async fn random_ideas(
    State(state): State<AppState>,
    Query(query): Query<CountQuery>,
) -> Json<Vec<QuickIdea>> {
    let mut rng = fastrand::Rng::new();
    owned(
        state
            .catalog
            .random_ideas(&mut rng, query.count.unwrap_or(DEFAULT_RANDOM_COUNT)),
    )
}

/// GET /api/v1/ideas/{id}
async fn get_idea(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QuickIdea>, ApiError> {
    state
        .catalog
        .quick_idea(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Quick idea {} not found", id)))
}
