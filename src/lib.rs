//! lendauth - account and session backend for a peer-to-peer lending platform
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - /register, /login                                        │
//! │  - /logout, /user, /hello (session guard)                   │
//! │  - /health, /metrics                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Accounts: registration, password login                   │
//! │  - Sessions: token issue, revoke, allow-list checks         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - UserStore / TokenStore traits                            │
//! │  - SQLite (sqlx) or JSON files                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers
//! - `service`: Business logic layer
//! - `data`: Storage traits and backends
//! - `auth`: Password hashing, signed tokens, session guard
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// This struct is cloned for each request and contains
/// shared resources like the stores and services.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Storage backend handles
    pub stores: data::Stores,

    /// Token issue, revocation and authentication
    pub sessions: Arc<service::SessionService>,

    /// Registration, login and profile lookup
    pub accounts: Arc<service::AccountService>,
}

impl AppState {
    /// Initialize application state
    ///
    /// Opens the configured storage backend and wires the services.
    ///
    /// # Errors
    /// Returns error if the store cannot be opened
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!(backend = ?config.storage.backend, "Initializing application state...");

        let stores = data::Stores::open(&config.storage).await?;
        let state = Self::with_stores(config, stores);

        let users = state.accounts.refresh_user_count().await?;
        let pruned = state.sessions.prune().await?;
        tracing::info!(users, pruned, "Application state initialized successfully");

        Ok(state)
    }

    /// Build state around already opened stores
    pub fn with_stores(config: config::AppConfig, stores: data::Stores) -> Self {
        let sessions = Arc::new(service::SessionService::new(
            stores.tokens.clone(),
            config.auth.token_secret.clone(),
            config.auth.token_ttl_seconds,
        ));
        let accounts = Arc::new(service::AccountService::new(
            stores.users.clone(),
            sessions.clone(),
        ));

        Self {
            config: Arc::new(config),
            stores,
            sessions,
            accounts,
        }
    }
}

/// Maximum accepted request body size
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::{Router, extract::DefaultBodyLimit};
    use tower_http::trace::TraceLayer;

    let cors_layer = build_cors_layer(&state.config.server);

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(api::accounts_router(state.clone()))
        .merge(api::metrics_router(state.clone()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

fn build_cors_layer(server: &config::ServerConfig) -> tower_http::cors::CorsLayer {
    use axum::http::HeaderValue;
    use tower_http::cors::{Any, CorsLayer};

    let origin = server.cors_origin.trim();
    if origin == "*" {
        return CorsLayer::permissive();
    }

    match HeaderValue::from_str(origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin([origin])
            .allow_methods(Any)
            .allow_headers(Any),
        Err(error) => {
            tracing::error!(
                %error,
                origin = %origin,
                "Failed to parse CORS origin; denying cross-origin requests"
            );
            CorsLayer::new().allow_methods(Any).allow_headers(Any)
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}
