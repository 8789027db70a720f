//! SQLite database operations
//!
//! Row-level storage for users and the token allow-list.
//! Every allow-list mutation is a single keyed statement, so concurrent
//! logins and logouts never overwrite each other.

use async_trait::async_trait;
use sqlx::{Pool, QueryBuilder, Sqlite, SqlitePool};
use std::path::Path;

use super::models::User;
use super::store::{TokenStore, UserStore};
use crate::error::{AppError, StoreError};

/// SQLite binds at most 999 parameters per statement on older builds.
const DELETE_BATCH_SIZE: usize = 500;

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Store(StoreError::Migrate(e))
            })?;

        tracing::info!(path = %path.display(), "Database connected and migrated successfully");

        Ok(Self { pool })
    }
}

// =========================================================================
// Users
// =========================================================================

#[async_trait]
impl UserStore for Database {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn exists(&self, email: &str) -> Result<bool, AppError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    async fn create(&self, user: User) -> Result<User, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                email, password_hash, firstname, lastname,
                address, city, plz, ahv_number, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.firstname)
        .bind(&user.lastname)
        .bind(&user.address)
        .bind(&user.city)
        .bind(&user.plz)
        .bind(&user.ahv_number)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(sqlx::Error::Database(db_error)) if db_error.is_unique_violation() => {
                Err(AppError::DuplicateUser)
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn count(&self) -> Result<u64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}

// =========================================================================
// Token allow-list
// =========================================================================

#[async_trait]
impl TokenStore for Database {
    async fn insert_token(&self, token: &str) -> Result<(), AppError> {
        sqlx::query("INSERT OR IGNORE INTO tokens (token) VALUES (?)")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn remove_token(&self, token: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn contains_token(&self, token: &str) -> Result<bool, AppError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM tokens WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    async fn list_tokens(&self) -> Result<Vec<String>, AppError> {
        let tokens: Vec<String> =
            sqlx::query_scalar("SELECT token FROM tokens ORDER BY created_at, token")
                .fetch_all(&self.pool)
                .await?;

        Ok(tokens)
    }

    async fn remove_tokens(&self, tokens: &[String]) -> Result<u64, AppError> {
        let mut removed = 0u64;

        for chunk in tokens.chunks(DELETE_BATCH_SIZE) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("DELETE FROM tokens WHERE token IN (");
            let mut separated = builder.separated(", ");
            for token in chunk {
                separated.push_bind(token.as_str());
            }
            separated.push_unseparated(")");

            let result = builder.build().execute(&self.pool).await?;
            removed += result.rows_affected();
        }

        Ok(removed)
    }
}
