//! Data layer module
//!
//! Handles all data persistence:
//! - Storage traits for users and the token allow-list
//! - SQLite backend
//! - JSON file backend

mod database;
mod json_file;
mod models;
mod store;

use std::sync::Arc;

pub use database::Database;
pub use json_file::JsonFileStore;
pub use models::*;
pub use store::{TokenStore, UserStore};

use crate::config::{StorageBackend, StorageConfig};
use crate::error::AppError;

/// Handles to the configured backend, one per storage concern
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<dyn TokenStore>,
}

impl Stores {
    /// Serve both concerns from one backend instance
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserStore + TokenStore + 'static,
    {
        Self {
            users: backend.clone(),
            tokens: backend,
        }
    }

    /// Open the backend selected in configuration
    pub async fn open(config: &StorageConfig) -> Result<Self, AppError> {
        match config.backend {
            StorageBackend::Sqlite => {
                let db = Database::connect(&config.sqlite_path).await?;
                Ok(Self::from_backend(Arc::new(db)))
            }
            StorageBackend::Json => {
                let store = JsonFileStore::open(&config.json_dir).await?;
                Ok(Self::from_backend(Arc::new(store)))
            }
        }
    }
}
