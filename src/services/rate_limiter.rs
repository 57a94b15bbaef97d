//! Login rate limiting
//!
//! Two sliding windows guard the login endpoint:
//! - failed attempts per username (5 per 15 minutes)
//! - requests per client IP (10 per minute)

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::net::IpAddr;
use tokio::sync::RwLock;

/// Timestamps per key, trimmed to a fixed window on access
struct SlidingWindow<K> {
    limit: usize,
    window: Duration,
    hits: RwLock<HashMap<K, Vec<DateTime<Utc>>>>,
}

impl<K: Eq + Hash> SlidingWindow<K> {
    fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            hits: RwLock::new(HashMap::new()),
        }
    }

    async fn is_limited(&self, key: K) -> bool {
        let cutoff = Utc::now() - self.window;
        let mut hits = self.hits.write().await;
        let entry = hits.entry(key).or_default();
        entry.retain(|t| *t > cutoff);
        entry.len() >= self.limit
    }

    async fn record(&self, key: K) {
        self.hits.write().await.entry(key).or_default().push(Utc::now());
    }

    async fn clear(&self, key: &K) {
        self.hits.write().await.remove(key);
    }

    async fn cleanup(&self) {
        let cutoff = Utc::now() - self.window;
        self.hits.write().await.retain(|_, times| {
            times.retain(|t| *t > cutoff);
            !times.is_empty()
        });
    }
}

/// Login rate limiter shared by the auth handlers
pub struct LoginRateLimiter {
    usernames: SlidingWindow<String>,
    ips: SlidingWindow<IpAddr>,
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self::with_limits(5, Duration::minutes(15), 10, Duration::minutes(1))
    }

    pub fn with_limits(
        username_limit: usize,
        username_window: Duration,
        ip_limit: usize,
        ip_window: Duration,
    ) -> Self {
        Self {
            usernames: SlidingWindow::new(username_limit, username_window),
            ips: SlidingWindow::new(ip_limit, ip_window),
        }
    }

    /// Usernames compare case-insensitively
    pub async fn is_username_limited(&self, username: &str) -> bool {
        self.usernames.is_limited(username.to_lowercase()).await
    }

    pub async fn record_failed_attempt(&self, username: &str) {
        self.usernames.record(username.to_lowercase()).await;
    }

    /// Forget failures after a successful login
    pub async fn clear_username_attempts(&self, username: &str) {
        self.usernames.clear(&username.to_lowercase()).await;
    }

    pub async fn is_ip_limited(&self, ip: IpAddr) -> bool {
        self.ips.is_limited(ip).await
    }

    pub async fn record_ip_request(&self, ip: IpAddr) {
        self.ips.record(ip).await;
    }

    /// Drop expired entries; run periodically from a background task
    pub async fn cleanup(&self) {
        self.usernames.cleanup().await;
        self.ips.cleanup().await;
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.usernames.hits.read().await.len() + self.ips.hits.read().await.len()
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_username_rate_limit() {
        let limiter = LoginRateLimiter::new();

        for _ in 0..4 {
            assert!(!limiter.is_username_limited("testuser").await);
            limiter.record_failed_attempt("testuser").await;
        }
        limiter.record_failed_attempt("testuser").await;
        assert!(limiter.is_username_limited("testuser").await);

        limiter.clear_username_attempts("testuser").await;
        assert!(!limiter.is_username_limited("testuser").await);
    }

    #[tokio::test]
    async fn test_ip_rate_limit() {
        let limiter = LoginRateLimiter::new();
        let ip = IpAddr::from_str("127.0.0.1").unwrap();

        for _ in 0..9 {
            assert!(!limiter.is_ip_limited(ip).await);
            limiter.record_ip_request(ip).await;
        }
        limiter.record_ip_request(ip).await;
        assert!(limiter.is_ip_limited(ip).await);
    }

    #[tokio::test]
    async fn test_case_insensitive_username() {
        let limiter = LoginRateLimiter::new();
        for name in ["TestUser", "testuser", "TESTUSER", "testUser", "testuseR"] {
            limiter.record_failed_attempt(name).await;
        }
        assert!(limiter.is_username_limited("TestUser").await);
    }

    #[tokio::test]
    async fn test_window_expiry_and_cleanup() {
        let limiter = LoginRateLimiter::with_limits(
            1,
            Duration::milliseconds(-1),
            1,
            Duration::milliseconds(-1),
        );
        limiter.record_failed_attempt("ghost").await;
        limiter
            .record_ip_request(IpAddr::from_str("10.0.0.1").unwrap())
            .await;

        // A negative window means every recorded hit is already stale
        assert!(!limiter.is_username_limited("ghost").await);
        limiter.cleanup().await;
        assert_eq!(limiter.tracked_keys().await, 0);
    }
}
