//! Request and response DTOs
//!
//! Typed bodies for every account route.

use serde::{Deserialize, Serialize};

use crate::data::User;
use crate::error::AppError;
use crate::service::NewUser;

/// POST /register body
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub plz: Option<String>,
    #[serde(default)]
    pub ahv_number: Option<String>,
}

impl RegisterRequest {
    /// Check required fields and turn the body into service input
    pub fn validate(self) -> Result<NewUser, AppError> {
        let email = self.email.trim().to_string();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::Validation(
                "email must be a valid address".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(AppError::Validation("password cannot be empty".to_string()));
        }

        let firstname = self.firstname.trim().to_string();
        let lastname = self.lastname.trim().to_string();
        if firstname.is_empty() || lastname.is_empty() {
            return Err(AppError::Validation(
                "firstname and lastname are required".to_string(),
            ));
        }

        Ok(NewUser {
            email,
            password: self.password,
            firstname,
            lastname,
            address: self.address,
            city: self.city,
            plz: self.plz,
            ahv_number: self.ahv_number,
        })
    }
}

/// POST /login body
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// GET /user response: public profile fields only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            firstname: user.firstname,
            lastname: user.lastname,
        }
    }
}
