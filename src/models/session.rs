//! Session model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A login session; `id` doubles as the bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// New session for `user_id` that lives `lifetime`
    pub fn new(user_id: i64, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple()),
            user_id,
            expires_at: now + lifetime,
            created_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_token_is_64_hex_chars() {
        let session = Session::new(1, Duration::days(7));
        assert_eq!(session.id.len(), 64);
        assert!(session.id.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!session.is_expired());
    }

    #[test]
    fn test_negative_lifetime_is_expired() {
        let session = Session::new(1, Duration::seconds(-1));
        assert!(session.is_expired());
    }
}
