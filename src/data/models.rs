//! Data models
//!
//! Rust structs representing persisted entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// User
// =============================================================================

/// A registered user
///
/// Keyed by email. Created on registration and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub email: String,
    /// Argon2 PHC string, never the plaintext password
    pub password_hash: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// Postal code
    #[serde(default)]
    pub plz: Option<String>,
    /// National insurance (AHV) number
    #[serde(default)]
    pub ahv_number: Option<String>,
    pub created_at: DateTime<Utc>,
}
