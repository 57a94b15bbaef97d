//! Productforge - AI digital product generator
//!
//! Builds prompts for digital products, sends them to text-generation
//! providers with fallback, parses the replies into structured content,
//! keeps a per-user library and exports to documents.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
