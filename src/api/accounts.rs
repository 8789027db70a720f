//! Account endpoints
//!
//! Registration, login, logout and the current user's profile.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    middleware,
    routing::{get, post},
};

use super::dto::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use crate::AppState;
use crate::auth::{CurrentUser, require_auth};
use crate::error::AppError;

/// Create account router
///
/// Routes:
/// - POST /register - Create a user
/// - POST /login - Exchange credentials for a token
/// - POST /logout - Revoke the presented token (guarded)
/// - GET /user - Current user's profile (guarded)
/// - GET /hello - Token check (guarded)
pub fn accounts_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/user", get(current_user))
        .route("/hello", get(hello))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(protected)
}

/// POST /register
async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<&'static str, AppError> {
    let Json(body) = body?;
    let new_user = body.validate()?;
    state.accounts.register(new_user).await?;
    Ok("User registered successfully")
}

/// POST /login
async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(body) = body?;
    let issued = state
        .accounts
        .login(body.email.trim(), &body.password)
        .await?;
    Ok(Json(LoginResponse {
        token: issued.token,
    }))
}

/// POST /logout
async fn logout(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<&'static str, AppError> {
    state.accounts.logout(&session.token).await?;
    Ok("Logout successful")
}

/// GET /user
async fn current_user(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.accounts.current_user(&session.claims.sub).await?;
    Ok(Json(user.into()))
}

/// GET /hello
async fn hello(CurrentUser(_session): CurrentUser) -> &'static str {
    "Hello, World!"
}
