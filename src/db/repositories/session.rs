//! Session repository
//!
//! Database operations for login sessions.
//!
//! This module provides:
//! - `SessionRepository` trait defining the interface for session data access
//! - `SqlxSessionRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql, sqlite};
use crate::db::DynDatabasePool;
use crate::models::Session;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<Session>;

    /// Get session by ID (token)
    async fn get_by_id(&self, id: &str) -> Result<Option<Session>>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// Delete all sessions for a user
    async fn delete_by_user(&self, user_id: i64) -> Result<()>;

    /// Delete expired sessions, returning how many were removed
    async fn delete_expired(&self) -> Result<i64>;
}

/// SQLx-based session repository implementation
pub struct SqlxSessionRepository {
    pool: DynDatabasePool,
}

impl SqlxSessionRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn create(&self, session: &Session) -> Result<Session> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_session_sqlite(sqlite(&self.pool)?, session).await,
            DatabaseDriver::Mysql => create_session_mysql(mysql(&self.pool)?, session).await,
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Session>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_session_by_id_sqlite(sqlite(&self.pool)?, id).await,
            DatabaseDriver::Mysql => get_session_by_id_mysql(mysql(&self.pool)?, id).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let sql = "DELETE FROM sessions WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query(sql)
                    .bind(id)
                    .execute(sqlite(&self.pool)?)
                    .await
                    .context("Failed to delete session")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query(sql)
                    .bind(id)
                    .execute(mysql(&self.pool)?)
                    .await
                    .context("Failed to delete session")?;
            }
        }
        Ok(())
    }

    async fn delete_by_user(&self, user_id: i64) -> Result<()> {
        let sql = "DELETE FROM sessions WHERE user_id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query(sql)
                    .bind(user_id)
                    .execute(sqlite(&self.pool)?)
                    .await
                    .context("Failed to delete sessions by user")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query(sql)
                    .bind(user_id)
                    .execute(mysql(&self.pool)?)
                    .await
                    .context("Failed to delete sessions by user")?;
            }
        }
        Ok(())
    }

    async fn delete_expired(&self) -> Result<i64> {
        let sql = "DELETE FROM sessions WHERE expires_at < ?";
        let now = Utc::now();
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(now)
                .execute(sqlite(&self.pool)?)
                .await
                .context("Failed to delete expired sessions")?
                .rows_affected(),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(now)
                .execute(mysql(&self.pool)?)
                .await
                .context("Failed to delete expired sessions")?
                .rows_affected(),
        };
        Ok(affected as i64)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_session_sqlite(pool: &SqlitePool, session: &Session) -> Result<Session> {
    sqlx::query(
        r#"
        INSERT INTO sessions (id, user_id, expires_at, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&session.id)
    .bind(session.user_id)
    .bind(session.expires_at)
    .bind(session.created_at)
    .execute(pool)
    .await
    .context("Failed to create session")?;

    Ok(session.clone())
}

async fn get_session_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Session>> {
    let row = sqlx::query("SELECT id, user_id, expires_at, created_at FROM sessions WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get session by ID")?;

    Ok(row.map(|row| Session {
        id: row.get("id"),
        user_id: row.get("user_id"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    }))
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_session_mysql(pool: &MySqlPool, session: &Session) -> Result<Session> {
    sqlx::query(
        r#"
        INSERT INTO sessions (id, user_id, expires_at, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&session.id)
    .bind(session.user_id)
    .bind(session.expires_at)
    .bind(session.created_at)
    .execute(pool)
    .await
    .context("Failed to create session")?;

    Ok(session.clone())
}

async fn get_session_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Session>> {
    let row = sqlx::query("SELECT id, user_id, expires_at, created_at FROM sessions WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get session by ID")?;

    Ok(row.map(|row| Session {
        id: row.get("id"),
        user_id: row.get("user_id"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::Duration;

    async fn setup_test_repo() -> (DynDatabasePool, SqlxSessionRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxSessionRepository::new(pool.clone());
        (pool, repo)
    }

    // Sessions reference users through a foreign key
    async fn create_test_user(pool: &DynDatabasePool, id: i64) {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(format!("user{}", id))
        .bind(format!("user{}@example.com", id))
        .bind("hash")
        .bind("user")
        .bind(now)
        .bind(now)
        .execute(pool.as_sqlite().unwrap())
        .await
        .expect("Failed to create test user");
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let (pool, repo) = setup_test_repo().await;
        create_test_user(&pool, 1).await;

        let session = Session::new(1, Duration::days(7));
        repo.create(&session).await.expect("Failed to create session");

        let found = repo
            .get_by_id(&session.id)
            .await
            .expect("Failed to get session")
            .expect("Session not found");

        assert_eq!(found.id, session.id);
        assert_eq!(found.user_id, 1);
        assert!(!found.is_expired());
        assert!(repo.get_by_id("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_session() {
        let (pool, repo) = setup_test_repo().await;
        create_test_user(&pool, 1).await;

        let session = Session::new(1, Duration::days(7));
        repo.create(&session).await.unwrap();
        repo.delete(&session.id).await.expect("Failed to delete session");

        assert!(repo.get_by_id(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_sessions_by_user() {
        let (pool, repo) = setup_test_repo().await;
        create_test_user(&pool, 1).await;
        create_test_user(&pool, 2).await;

        let session1 = Session::new(1, Duration::days(7));
        let session2 = Session::new(1, Duration::days(7));
        let other = Session::new(2, Duration::days(7));
        for s in [&session1, &session2, &other] {
            repo.create(s).await.unwrap();
        }

        repo.delete_by_user(1).await.unwrap();

        assert!(repo.get_by_id(&session1.id).await.unwrap().is_none());
        assert!(repo.get_by_id(&session2.id).await.unwrap().is_none());
        assert!(repo.get_by_id(&other.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_expired_sessions() {
        let (pool, repo) = setup_test_repo().await;
        create_test_user(&pool, 1).await;

        let expired = Session::new(1, Duration::days(-1));
        let valid = Session::new(1, Duration::days(7));
        repo.create(&expired).await.unwrap();
        repo.create(&valid).await.unwrap();

        assert_eq!(repo.delete_expired().await.unwrap(), 1);
        assert!(repo.get_by_id(&expired.id).await.unwrap().is_none());
        assert!(repo.get_by_id(&valid.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sessions_cascade_with_user() {
        let (pool, repo) = setup_test_repo().await;
        create_test_user(&pool, 1).await;
        let session = Session::new(1, Duration::days(7));
        repo.create(&session).await.unwrap();

        pool.execute("DELETE FROM users WHERE id = 1").await.unwrap();

        assert!(repo.get_by_id(&session.id).await.unwrap().is_none());
    }
}
