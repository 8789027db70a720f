//! Authentication middleware
//!
//! Protects routes that require a session token.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use super::token::Claims;
use crate::AppState;
use crate::error::AppError;
use crate::metrics::observe_auth_event;

/// An authenticated request's token and its decoded claims
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub claims: Claims,
}

/// Read the token from the Authorization header
///
/// The `Bearer ` prefix is optional. Returns `None` when the header is
/// absent, unreadable or empty.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };
    if token.is_empty() {
        None
    } else {
        Some(token.to_owned())
    }
}

async fn authenticate_headers(headers: &HeaderMap, state: &AppState) -> Result<AuthSession, AppError> {
    let token = extract_bearer_token(headers).ok_or(AppError::MissingToken)?;

    match state.sessions.authenticate(&token).await {
        Ok(claims) => {
            observe_auth_event("guard", true);
            Ok(AuthSession { token, claims })
        }
        Err(error) => {
            observe_auth_event("guard", false);
            tracing::debug!(%error, "Bearer token rejected");
            Err(error)
        }
    }
}

/// Middleware to require authentication
///
/// Verifies the bearer token against the allow-list and its signature.
/// Adds `AuthSession` and `Claims` to request extensions if valid.
///
/// # Usage
/// ```ignore
/// let protected_routes = Router::new()
///     .route("/user", ...)
///     .route_layer(middleware::from_fn_with_state(state, require_auth));
/// ```
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = authenticate_headers(request.headers(), &state).await?;

    request.extensions_mut().insert(session.claims.clone());
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

/// Extractor for the current authenticated session
///
/// Reuses the session attached by [`require_auth`]; on routes without the
/// middleware it authenticates the request itself.
///
/// # Usage
/// ```ignore
/// async fn handler(CurrentUser(session): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}", session.claims.sub)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthSession);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<AuthSession>().cloned() {
            return Ok(CurrentUser(session));
        }

        let state = AppState::from_ref(state);
        let session = authenticate_headers(&parts.headers, &state).await?;
        parts.extensions.insert(session.clone());

        Ok(CurrentUser(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn strips_bearer_prefix() {
        assert_eq!(
            extract_bearer_token(&headers_with("Bearer abc.def")).as_deref(),
            Some("abc.def")
        );
    }

    #[test]
    fn accepts_raw_token() {
        assert_eq!(
            extract_bearer_token(&headers_with("abc.def")).as_deref(),
            Some("abc.def")
        );
    }

    #[test]
    fn missing_or_empty_header_yields_none() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
        assert_eq!(extract_bearer_token(&headers_with("Bearer ")), None);
    }
}
