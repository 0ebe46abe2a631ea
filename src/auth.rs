// ABOUTME: JWT-based user authentication: token issue/validation and password hashing
// ABOUTME: Route handlers extract the acting user from the Authorization header here
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Authentication and Session Management
//!
//! HS256 JWTs signed with the configured secret. The core only needs a
//! "current user" context; everything here exists to produce one from a
//! bearer token.

use crate::errors::{AppError, AppResult};
use crate::models::User;
use chrono::{DateTime, Duration, Utc};
use http::HeaderMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `JWT` claims for user authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Username at issue time
    pub username: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Authenticated caller context extracted from a validated token
#[derive(Debug, Clone, Copy)]
pub struct AuthResult {
    /// The acting user
    pub user_id: Uuid,
}

/// Authentication manager issuing and validating tokens
#[derive(Clone)]
pub struct AuthManager {
    secret: Vec<u8>,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a new authentication manager
    #[must_use]
    pub fn new(secret: Vec<u8>, token_expiry_hours: i64) -> Self {
        Self {
            secret,
            token_expiry_hours,
        }
    }

    /// Generate a `JWT` token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails.
    pub fn generate_token(&self, user: &User) -> AppResult<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.token_expiry_hours);

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;

        Ok((token, expiry))
    }

    /// Validate a `JWT` token and return its claims
    ///
    /// # Errors
    ///
    /// Returns `AuthExpired` for an expired token and `AuthInvalid` for a
    /// bad signature or malformed token.
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        decode::<Claims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::auth_expired(),
                _ => AppError::auth_invalid(format!("Invalid token: {e}")),
            })
    }

    /// Authenticate a request from its `Authorization` header
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when the header is missing and `AuthInvalid`
    /// when the scheme is not `Bearer` or the token fails validation.
    pub fn authenticate(&self, headers: &HeaderMap) -> AppResult<AuthResult> {
        let auth_value = headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(AppError::auth_required)?;

        let token = auth_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::auth_invalid("Expected Bearer authorization"))?;

        let claims = self.validate_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|e| AppError::auth_invalid(format!("Invalid token subject: {e}")))?;

        Ok(AuthResult { user_id })
    }
}

/// Hash a password with bcrypt at the default cost
pub fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

/// Verify a password off the async executor
///
/// Bcrypt verification is CPU-bound, so it runs under `spawn_blocking`.
pub async fn verify_password(password: String, password_hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Password verification error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::new("lifter".into(), "hash".into(), None)
    }

    #[test]
    fn test_token_roundtrip() {
        let manager = AuthManager::new(b"test-secret".to_vec(), 24);
        let user = test_user();

        let (token, expiry) = manager.generate_token(&user).unwrap();
        assert!(expiry > Utc::now());

        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.username, "lifter");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let manager = AuthManager::new(b"test-secret".to_vec(), 24);
        let other = AuthManager::new(b"other-secret".to_vec(), 24);
        let (token, _) = manager.generate_token(&test_user()).unwrap();

        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_authenticate_requires_bearer_scheme() {
        let manager = AuthManager::new(b"test-secret".to_vec(), 24);
        let mut headers = HeaderMap::new();

        assert!(manager.authenticate(&headers).is_err());

        headers.insert("authorization", "Basic abc".parse().unwrap());
        assert!(manager.authenticate(&headers).is_err());
    }

    #[test]
    fn test_authenticate_extracts_user_id() {
        let manager = AuthManager::new(b"test-secret".to_vec(), 24);
        let user = test_user();
        let (token, _) = manager.generate_token(&user).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("authorization", format!("Bearer {token}").parse().unwrap());

        let auth = manager.authenticate(&headers).unwrap();
        assert_eq!(auth.user_id, user.id);
    }
}
