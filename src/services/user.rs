//! User service
//!
//! Account registration, login/logout and session validation. The first
//! account ever registered becomes the admin.

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{LoginInput, RegisterInput, Session, User, UserRole};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use chrono::Duration;
use std::sync::Arc;

/// Default session expiration time in days
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

const MIN_PASSWORD_LEN: usize = 8;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Invalid credentials
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_lifetime: Duration,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self::with_session_expiration(user_repo, session_repo, DEFAULT_SESSION_EXPIRATION_DAYS)
    }

    pub fn with_session_expiration(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_expiration_days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_lifetime: Duration::days(session_expiration_days),
        }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// - `ValidationError` for a malformed username, email or short password
    /// - `UserExists` if the username or email is taken
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        let username = input.username.trim().to_string();
        let email = input.email.trim().to_lowercase();
        validate_registration(&username, &email, &input.password)?;

        if self
            .user_repo
            .get_by_username(&username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                username
            )));
        }

        if self
            .user_repo
            .get_by_email(&email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        let role = if self.is_first_user().await? {
            UserRole::Admin
        } else {
            UserRole::User
        };

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let user = User::new(username, email, password_hash, role);

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        tracing::info!("Registered user {} ({})", created.username, created.role);
        Ok(created)
    }

    /// Verify credentials and open a session. `username` may be an email.
    pub async fn login(&self, input: LoginInput) -> Result<(User, Session), UserServiceError> {
        let invalid =
            || UserServiceError::AuthenticationError("Invalid username or password".to_string());

        let user = self
            .find_user_by_username_or_email(input.username.trim())
            .await?
            .ok_or_else(invalid)?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;
        if !password_valid {
            return Err(invalid());
        }

        let session = Session::new(user.id, self.session_lifetime);
        let session = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        Ok((user, session))
    }

    pub async fn logout(&self, session_id: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Expired sessions are deleted on sight.
    pub async fn validate_session(&self, token: &str) -> Result<User, UserServiceError> {
        let session = self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
            .ok_or(UserServiceError::SessionNotFound)?;

        if session.is_expired() {
            if let Err(e) = self.session_repo.delete(token).await {
                tracing::warn!("Failed to delete expired session: {}", e);
            }
            return Err(UserServiceError::SessionExpired);
        }

        self.user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::SessionNotFound)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user by ID")?)
    }

    pub async fn is_first_user(&self) -> Result<bool, UserServiceError> {
        let count = self
            .user_repo
            .count()
            .await
            .context("Failed to count users")?;
        Ok(count == 0)
    }

    /// Delete all expired sessions, returning how many were removed
    pub async fn cleanup_expired_sessions(&self) -> Result<i64, UserServiceError> {
        Ok(self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?)
    }

    async fn find_user_by_username_or_email(
        &self,
        username_or_email: &str,
    ) -> Result<Option<User>, UserServiceError> {
        if let Some(user) = self
            .user_repo
            .get_by_username(username_or_email)
            .await
            .context("Failed to get user by username")?
        {
            return Ok(Some(user));
        }

        Ok(self
            .user_repo
            .get_by_email(&username_or_email.to_lowercase())
            .await
            .context("Failed to get user by email")?)
    }
}

fn validate_registration(username: &str, email: &str, password: &str) -> Result<(), UserServiceError> {
    let username_ok = (3..=32).contains(&username.chars().count())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !username_ok {
        return Err(UserServiceError::ValidationError(
            "Username must be 3-32 characters of letters, digits, '_' or '-'".to_string(),
        ));
    }

    let email_ok = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    };
    if !email_ok {
        return Err(UserServiceError::ValidationError(
            "Invalid email format".to_string(),
        ));
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(UserServiceError::ValidationError(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    Ok(())
}
