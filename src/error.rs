//! Error types for lendauth
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failures of the persistence layer, whichever backend is in use.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Application-wide error type
///
/// This enum represents all possible errors that can occur
/// in the application. It implements `IntoResponse` to
/// automatically convert errors to appropriate HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Email already registered (400)
    #[error("User already exists")]
    DuplicateUser,

    /// User not found (404)
    #[error("User not found")]
    NotFound,

    /// Wrong password (401)
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Password hashing failed (500)
    #[error("Error hashing password: {0}")]
    Hashing(String),

    /// Persistence failure (500)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// No Authorization header (403)
    #[error("Token not provided")]
    MissingToken,

    /// Signature or encoding check failed (401)
    #[error("Invalid token")]
    InvalidToken,

    /// Token not on the allow-list, or past its expiry (401)
    #[error("Token has been revoked or expired")]
    RevokedOrExpired,

    /// Validation error (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Store(StoreError::Database(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Store(StoreError::Io(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Store(StoreError::Serde(err))
    }
}

impl AppError {
    /// HTTP status and metric label for this error
    pub fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::DuplicateUser => (StatusCode::BAD_REQUEST, "duplicate_user"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AppError::Hashing(_) => (StatusCode::INTERNAL_SERVER_ERROR, "hashing"),
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store"),
            AppError::MissingToken => (StatusCode::FORBIDDEN, "missing_token"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AppError::RevokedOrExpired => (StatusCode::UNAUTHORIZED, "revoked_or_expired"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Maps each error variant to appropriate HTTP status code
    /// and JSON error body. Server-side failures are logged and
    /// reported with a generic message.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, error_type) = self.status_and_kind();

        let error_message = match &self {
            AppError::Store(_) => "Store error".to_string(),
            AppError::Hashing(_) => "Error hashing password".to_string(),
            AppError::Config(_) | AppError::Internal(_) => "Internal server error".to_string(),
            AppError::Validation(msg) => msg.clone(),
            _ => self.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, error_type, "Request failed");
        }

        // Record error metric
        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[error_type]).inc();

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
