//! Data models
//!
//! This module contains the data structures shared by services and the API:
//! - Database entities (User, Session, SavedProduct)
//! - Generation input and parsed output
//! - Export, social, trending and pain-point records

mod export;
mod pain_point;
mod product;
mod session;
mod social;
mod trending;
mod user;

pub use export::{
    CustomBranding, ExportFormat, ExportOptions, ExportTemplate, Orientation, PageSize,
};
pub use pain_point::{
    ActionPlan, MarketInsights, PainPoint, PainPointAnalysis, ProductSpec, ProductSuggestion,
};
pub use product::{
    new_product_id, CoverDesign, GeneratedContent, GenerationRequest, ProductFilter,
    ProductMetadata, ProductStats, ProductUpdate, SavedProduct, DEFAULT_COVER_COLORS,
    LIBRARY_LIST_LIMIT,
};
pub use session::Session;
pub use social::{BlogPost, ContentLength, Meme, SocialPost, SocialRequest};
pub use trending::{SearchResult, TrendingResponse, TrendingTopic};
pub use user::{LoginInput, RegisterInput, User, UserRole};
