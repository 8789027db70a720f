//! Storage traits
//!
//! Handlers and services only see these traits, so the backend
//! (SQLite, JSON files) can be swapped through configuration.
//! Every mutating operation is atomic per key.

use async_trait::async_trait;

use super::models::User;
use crate::error::AppError;

/// Credential store
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Whether a user with this email exists
    async fn exists(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    /// Persist a new user
    ///
    /// # Errors
    /// `AppError::DuplicateUser` if the email is already registered.
    async fn create(&self, user: User) -> Result<User, AppError>;

    /// Number of registered users
    async fn count(&self) -> Result<u64, AppError>;
}

/// Session token allow-list
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Add a token to the allow-list. Inserting an existing token is a no-op.
    async fn insert_token(&self, token: &str) -> Result<(), AppError>;

    /// Remove a token, returning whether it was present
    async fn remove_token(&self, token: &str) -> Result<bool, AppError>;

    /// Whether the token is on the allow-list
    async fn contains_token(&self, token: &str) -> Result<bool, AppError>;

    /// Snapshot of every token on the allow-list
    async fn list_tokens(&self) -> Result<Vec<String>, AppError>;

    /// Remove a batch of tokens, returning how many were present
    async fn remove_tokens(&self, tokens: &[String]) -> Result<u64, AppError>;
}
