//! Cache layer
//!
//! In-process cache for web-search and trending lookups. Both are slow
//! network round-trips whose answers stay useful for a few minutes.
//!
//! # Usage
//!
//! ```rust,ignore
//! use productforge::cache::create_cache;
//! use productforge::config::CacheConfig;
//!
//! let cache = create_cache(&CacheConfig::default());
//! cache.set("search:rust:news:10", &response).await?;
//! ```

pub mod memory;

use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;

pub use memory::MemoryCache;

/// Create the shared cache from configuration
pub fn create_cache(config: &CacheConfig) -> Arc<MemoryCache> {
    Arc::new(MemoryCache::with_capacity_and_ttl(
        config.max_capacity,
        Duration::from_secs(config.ttl_seconds),
    ))
}

/// Build a cache key from its parts, `prefix:part1:part2`.
///
/// Parts are lower-cased and trimmed so that equivalent queries share an
/// entry.
pub fn cache_key(prefix: &str, parts: &[&str]) -> String {
    let mut key = prefix.to_string();
    for part in parts {
        key.push(':');
        key.push_str(&part.trim().to_lowercase());
    }
    key
}
