//! Account service
//!
//! Registration, password login and profile lookup.

use std::sync::Arc;

use super::session::{IssuedToken, SessionService};
use crate::auth::{hash_password, verify_password};
use crate::data::{User, UserStore};
use crate::error::AppError;
use crate::metrics::{USERS_TOTAL, observe_auth_event};

fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Input for a new registration
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub plz: Option<String>,
    pub ahv_number: Option<String>,
}

/// Account service
pub struct AccountService {
    users: Arc<dyn UserStore>,
    sessions: Arc<SessionService>,
}

impl AccountService {
    /// Create new account service
    pub fn new(users: Arc<dyn UserStore>, sessions: Arc<SessionService>) -> Self {
        Self { users, sessions }
    }

    /// Register a new user
    ///
    /// # Errors
    /// - `DuplicateUser` if the email is taken
    /// - `Hashing` if the password cannot be hashed
    pub async fn register(&self, new_user: NewUser) -> Result<User, AppError> {
        // Fast-path guard before the expensive hash; `create` still enforces uniqueness.
        if self.users.exists(&new_user.email).await? {
            observe_auth_event("register", false);
            return Err(AppError::DuplicateUser);
        }

        let password_hash = hash_password(new_user.password).await?;

        let user = User {
            email: new_user.email,
            password_hash,
            firstname: new_user.firstname,
            lastname: new_user.lastname,
            address: normalize_optional_text(new_user.address),
            city: normalize_optional_text(new_user.city),
            plz: normalize_optional_text(new_user.plz),
            ahv_number: normalize_optional_text(new_user.ahv_number),
            created_at: chrono::Utc::now(),
        };

        let user = match self.users.create(user).await {
            Ok(user) => user,
            Err(error) => {
                observe_auth_event("register", false);
                return Err(error);
            }
        };

        USERS_TOTAL.inc();
        observe_auth_event("register", true);
        tracing::info!(email = %user.email, "User registered");

        Ok(user)
    }

    /// Check credentials and issue a session token
    ///
    /// # Errors
    /// - `NotFound` if no user has this email
    /// - `InvalidCredentials` if the password does not match
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AppError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            observe_auth_event("login", false);
            return Err(AppError::NotFound);
        };

        if !verify_password(password.to_string(), user.password_hash).await? {
            observe_auth_event("login", false);
            tracing::info!(email = %email, "Login rejected: invalid credentials");
            return Err(AppError::InvalidCredentials);
        }

        let issued = self.sessions.issue(&user.email).await?;
        observe_auth_event("login", true);
        tracing::info!(email = %user.email, "User logged in");

        Ok(issued)
    }

    /// Revoke the caller's token
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        let removed = self.sessions.revoke(token).await?;
        observe_auth_event("logout", removed);
        tracing::info!(removed, "User logged out");
        Ok(())
    }

    /// Fetch the user a token was issued to
    pub async fn current_user(&self, email: &str) -> Result<User, AppError> {
        self.users
            .find_by_email(email)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Seed the users gauge from the store
    pub async fn refresh_user_count(&self) -> Result<u64, AppError> {
        let count = self.users.count().await?;
        USERS_TOTAL.set(count as i64);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{JsonFileStore, Stores};
    use tempfile::TempDir;

    async fn service() -> (AccountService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(JsonFileStore::open(temp_dir.path()).await.unwrap());
        let stores = Stores::from_backend(store);
        let sessions = Arc::new(SessionService::new(
            stores.tokens.clone(),
            "account-test-secret-at-least-32-bytes".to_string(),
            3600,
        ));
        (AccountService::new(stores.users, sessions), temp_dir)
    }

    fn new_user(email: &str, password: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password: password.to_string(),
            firstname: "A".to_string(),
            lastname: "B".to_string(),
            address: Some("  ".to_string()),
            city: Some(" Bern ".to_string()),
            plz: None,
            ahv_number: None,
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let (service, _dir) = service().await;

        let user = service.register(new_user("a@b.com", "pw1")).await.unwrap();
        assert_ne!(user.password_hash, "pw1");
        assert_eq!(user.address, None);
        assert_eq!(user.city.as_deref(), Some("Bern"));

        let issued = service.login("a@b.com", "pw1").await.unwrap();
        assert_eq!(issued.claims.sub, "a@b.com");
        assert_eq!(service.current_user("a@b.com").await.unwrap().firstname, "A");
    }

    #[tokio::test]
    async fn register_twice_is_duplicate() {
        let (service, _dir) = service().await;
        service.register(new_user("a@b.com", "pw1")).await.unwrap();

        assert!(matches!(
            service.register(new_user("a@b.com", "pw2")).await,
            Err(AppError::DuplicateUser)
        ));
    }

    #[tokio::test]
    async fn login_failures() {
        let (service, _dir) = service().await;
        service.register(new_user("a@b.com", "pw1")).await.unwrap();

        assert!(matches!(
            service.login("nobody@b.com", "pw1").await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            service.login("a@b.com", "wrong").await,
            Err(AppError::InvalidCredentials)
        ));
    }
}
