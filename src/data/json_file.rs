//! JSON file storage
//!
//! Keeps `users.json` and `tokens.json` as JSON arrays in one directory.
//! Each operation holds the store lock for its whole load-modify-write
//! cycle, and files are replaced atomically via a temp file rename.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use super::models::User;
use super::store::{TokenStore, UserStore};
use crate::error::AppError;

const USERS_FILE: &str = "users.json";
const TOKENS_FILE: &str = "tokens.json";

/// File-backed store for small deployments
pub struct JsonFileStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub async fn open(dir: &Path) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(dir).await?;
        tracing::info!(dir = %dir.display(), "JSON file store opened");

        Ok(Self {
            dir: dir.to_path_buf(),
            lock: Mutex::new(()),
        })
    }

    async fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, AppError> {
        let path = self.dir.join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(error) => Err(error.into()),
        }
    }

    async fn save<T: Serialize>(&self, name: &str, items: &[T]) -> Result<(), AppError> {
        let path = self.dir.join(name);
        let tmp_path = self.dir.join(format!("{name}.tmp"));
        let bytes = serde_json::to_vec_pretty(items)?;

        tokio::fs::write(&tmp_path, bytes).await?;
        tokio::fs::rename(&tmp_path, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for JsonFileStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let _guard = self.lock.lock().await;
        let users: Vec<User> = self.load(USERS_FILE).await?;
        Ok(users.into_iter().find(|user| user.email == email))
    }

    async fn create(&self, user: User) -> Result<User, AppError> {
        let _guard = self.lock.lock().await;
        let mut users: Vec<User> = self.load(USERS_FILE).await?;

        if users.iter().any(|existing| existing.email == user.email) {
            return Err(AppError::DuplicateUser);
        }

        users.push(user.clone());
        self.save(USERS_FILE, &users).await?;
        Ok(user)
    }

    async fn count(&self) -> Result<u64, AppError> {
        let _guard = self.lock.lock().await;
        let users: Vec<User> = self.load(USERS_FILE).await?;
        Ok(users.len() as u64)
    }
}

#[async_trait]
impl TokenStore for JsonFileStore {
    async fn insert_token(&self, token: &str) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;
        let mut tokens: Vec<String> = self.load(TOKENS_FILE).await?;

        if tokens.iter().any(|existing| existing == token) {
            return Ok(());
        }

        tokens.push(token.to_string());
        self.save(TOKENS_FILE, &tokens).await
    }

    async fn remove_token(&self, token: &str) -> Result<bool, AppError> {
        let _guard = self.lock.lock().await;
        let mut tokens: Vec<String> = self.load(TOKENS_FILE).await?;

        let before = tokens.len();
        tokens.retain(|existing| existing != token);
        if tokens.len() == before {
            return Ok(false);
        }

        self.save(TOKENS_FILE, &tokens).await?;
        Ok(true)
    }

    async fn contains_token(&self, token: &str) -> Result<bool, AppError> {
        let _guard = self.lock.lock().await;
        let tokens: Vec<String> = self.load(TOKENS_FILE).await?;
        Ok(tokens.iter().any(|existing| existing == token))
    }

    async fn list_tokens(&self) -> Result<Vec<String>, AppError> {
        let _guard = self.lock.lock().await;
        self.load(TOKENS_FILE).await
    }

    async fn remove_tokens(&self, doomed: &[String]) -> Result<u64, AppError> {
        if doomed.is_empty() {
            return Ok(0);
        }

        let _guard = self.lock.lock().await;
        let mut tokens: Vec<String> = self.load(TOKENS_FILE).await?;

        let before = tokens.len();
        tokens.retain(|existing| !doomed.contains(existing));
        let removed = (before - tokens.len()) as u64;

        if removed > 0 {
            self.save(TOKENS_FILE, &tokens).await?;
        }
        Ok(removed)
    }
}
