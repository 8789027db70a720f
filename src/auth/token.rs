//! Session tokens
//!
//! Token format: base64(claims_json).base64(hmac_sha256(base64(claims_json)))
//!
//! A token is only accepted while it is also on the allow-list; see
//! [`crate::service::SessionService`].

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Data signed into every session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject email
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
    /// Unique token id, keeps same-second logins distinct
    pub jti: String,
}

impl Claims {
    /// Claims for `subject` valid for `ttl` from now
    pub fn new(subject: &str, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .timestamp(),
            jti: ulid::Ulid::new().to_string(),
        }
    }

    /// Check if the token is past its expiry
    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

fn mac_for(secret: &str) -> Result<HmacSha256, AppError> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid HMAC key: {e}")))
}

/// Create a signed token
///
/// # Arguments
/// * `claims` - Claims to encode
/// * `secret` - HMAC secret key
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, AppError> {
    let payload = serde_json::to_vec(claims).map_err(|e| AppError::Internal(e.into()))?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload);

    let mut mac = mac_for(secret)?;
    mac.update(payload_b64.as_bytes());
    let signature_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", payload_b64, signature_b64))
}

/// Verify and decode a token
///
/// # Errors
/// - `InvalidToken` if the token is malformed or its signature does not match
/// - `RevokedOrExpired` if the signature is good but the token has expired
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let (payload_b64, signature_b64) = token.split_once('.').ok_or(AppError::InvalidToken)?;
    if signature_b64.contains('.') {
        return Err(AppError::InvalidToken);
    }

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AppError::InvalidToken)?;

    let mut mac = mac_for(secret)?;
    mac.update(payload_b64.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| AppError::InvalidToken)?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| AppError::InvalidToken)?;
    let claims: Claims = serde_json::from_slice(&payload).map_err(|_| AppError::InvalidToken)?;

    if claims.is_expired() {
        return Err(AppError::RevokedOrExpired);
    }

    Ok(claims)
}
