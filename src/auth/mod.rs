//! Authentication
//!
//! Handles:
//! - Password hashing
//! - Signed session tokens
//! - Authentication middleware

mod middleware;
mod password;
pub mod token;

pub use middleware::{AuthSession, CurrentUser, extract_bearer_token, require_auth};
pub use password::{hash_password, verify_password};
pub use token::{Claims, create_token, verify_token};
