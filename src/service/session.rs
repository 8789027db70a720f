//! Session service
//!
//! Issues tokens, revokes them and authenticates bearer tokens against
//! both their signature and the allow-list.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::auth::{Claims, create_token, verify_token};
use crate::data::TokenStore;
use crate::error::AppError;
use crate::metrics::{ACTIVE_TOKENS, TOKENS_ISSUED_TOTAL, TOKENS_PRUNED_TOTAL};

/// A freshly issued token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

impl IssuedToken {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at()
    }
}

/// Session service
pub struct SessionService {
    tokens: Arc<dyn TokenStore>,
    secret: String,
    ttl: Duration,
}

impl SessionService {
    /// Create new session service
    ///
    /// # Arguments
    /// * `tokens` - Allow-list storage
    /// * `secret` - HMAC secret used to sign tokens
    /// * `ttl_seconds` - Lifetime of issued tokens
    pub fn new(tokens: Arc<dyn TokenStore>, secret: String, ttl_seconds: i64) -> Self {
        Self {
            tokens,
            secret,
            ttl: Duration::try_seconds(ttl_seconds).unwrap_or(Duration::MAX),
        }
    }

    /// Mint a token for `email` and add it to the allow-list
    pub async fn issue(&self, email: &str) -> Result<IssuedToken, AppError> {
        let claims = Claims::new(email, self.ttl);
        let token = create_token(&claims, &self.secret)?;

        self.tokens.insert_token(&token).await?;
        TOKENS_ISSUED_TOTAL.inc();

        tracing::debug!(
            subject = %claims.sub,
            expires_at = %claims.expires_at(),
            "Session token issued"
        );

        Ok(IssuedToken { token, claims })
    }

    /// Remove a token from the allow-list
    ///
    /// Returns whether the token was present.
    pub async fn revoke(&self, token: &str) -> Result<bool, AppError> {
        self.tokens.remove_token(token).await
    }

    /// Drop every allow-list entry whose signature or expiry check fails
    ///
    /// # Returns
    /// Number of tokens removed
    pub async fn prune(&self) -> Result<u64, AppError> {
        let listed = self.tokens.list_tokens().await?;
        let total = listed.len();

        let doomed: Vec<String> = listed
            .into_iter()
            .filter(|token| verify_token(token, &self.secret).is_err())
            .collect();

        let removed = self.tokens.remove_tokens(&doomed).await?;
        if removed > 0 {
            TOKENS_PRUNED_TOTAL.inc_by(removed);
            tracing::debug!(removed, "Pruned invalid tokens from allow-list");
        }
        ACTIVE_TOKENS.set(total.saturating_sub(doomed.len()) as i64);

        Ok(removed)
    }

    /// Authenticate a presented bearer token
    ///
    /// # Steps
    /// 1. Prune the allow-list
    /// 2. Reject tokens not on the pruned list (`RevokedOrExpired`)
    /// 3. Verify the token's own signature (`InvalidToken`)
    pub async fn authenticate(&self, token: &str) -> Result<Claims, AppError> {
        self.prune().await?;

        if !self.tokens.contains_token(token).await? {
            return Err(AppError::RevokedOrExpired);
        }

        verify_token(token, &self.secret).map_err(|_| AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::JsonFileStore;
    use tempfile::TempDir;

    const SECRET: &str = "session-test-secret-at-least-32-bytes";

    async fn service() -> (SessionService, Arc<JsonFileStore>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(JsonFileStore::open(temp_dir.path()).await.unwrap());
        let service = SessionService::new(store.clone(), SECRET.to_string(), 3600);
        (service, store, temp_dir)
    }

    #[tokio::test]
    async fn issued_token_authenticates() {
        let (service, store, _dir) = service().await;

        let issued = service.issue("a@b.com").await.unwrap();
        assert!(store.contains_token(&issued.token).await.unwrap());
        assert!(issued.expires_at() > Utc::now());

        let claims = service.authenticate(&issued.token).await.unwrap();
        assert_eq!(claims.sub, "a@b.com");
    }

    #[tokio::test]
    async fn out_of_range_ttl_still_issues() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(JsonFileStore::open(temp_dir.path()).await.unwrap());
        let service = SessionService::new(store, SECRET.to_string(), i64::MAX);

        let issued = service.issue("a@b.com").await.unwrap();
        assert_eq!(service.authenticate(&issued.token).await.unwrap().sub, "a@b.com");
    }

    #[tokio::test]
    async fn revoked_token_is_rejected() {
        let (service, _store, _dir) = service().await;

        let issued = service.issue("a@b.com").await.unwrap();
        assert!(service.revoke(&issued.token).await.unwrap());
        assert!(!service.revoke(&issued.token).await.unwrap());

        assert!(matches!(
            service.authenticate(&issued.token).await,
            Err(AppError::RevokedOrExpired)
        ));
    }

    #[tokio::test]
    async fn expired_token_is_rejected_and_pruned() {
        let (service, store, _dir) = service().await;
        let live = service.issue("live@b.com").await.unwrap();

        let expired = create_token(
            &Claims {
                sub: "old@b.com".to_string(),
                iat: Utc::now().timestamp() - 7200,
                exp: Utc::now().timestamp() - 1,
                jti: "expired".to_string(),
            },
            SECRET,
        )
        .unwrap();
        store.insert_token(&expired).await.unwrap();

        assert!(matches!(
            service.authenticate(&expired).await,
            Err(AppError::RevokedOrExpired)
        ));
        assert!(!store.contains_token(&expired).await.unwrap());
        assert!(store.contains_token(&live.token).await.unwrap());
    }

    #[tokio::test]
    async fn unlisted_forgery_is_rejected() {
        let (service, _store, _dir) = service().await;
        let forged = create_token(
            &Claims::new("a@b.com", Duration::hours(1)),
            "some-other-secret-which-is-long-enough",
        )
        .unwrap();

        assert!(matches!(
            service.authenticate(&forged).await,
            Err(AppError::RevokedOrExpired)
        ));
    }

    #[tokio::test]
    async fn prune_removes_foreign_and_garbage_entries() {
        let (service, store, _dir) = service().await;
        let live = service.issue("a@b.com").await.unwrap();
        store.insert_token("garbage").await.unwrap();

        assert_eq!(service.prune().await.unwrap(), 1);
        assert_eq!(store.list_tokens().await.unwrap(), vec![live.token]);
    }
}
