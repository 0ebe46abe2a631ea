// ABOUTME: User authentication route handlers for registration and login
// ABOUTME: Thin wrappers delegating to the AuthManager and user store
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication routes for account creation and token issuance

use crate::auth::{hash_password, verify_password};
use crate::errors::AppError;
use crate::models::User;
use crate::resources::ServerResources;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Minimum accepted password length
const MIN_PASSWORD_LENGTH: usize = 6;

/// User registration request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// Unique login name
    pub username: String,
    /// Plaintext password, hashed before storage
    pub password: String,
    /// Optional contact email
    pub email: Option<String>,
}

/// User registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// Identifier of the created account
    pub user_id: String,
    /// Human-readable confirmation
    pub message: String,
}

/// User login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name
    pub username: String,
    /// Plaintext password to verify
    pub password: String,
}

/// User info for login response
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// Account identifier
    pub user_id: String,
    /// Login name
    pub username: String,
    /// Contact email, if set
    pub email: Option<String>,
}

/// User login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub jwt_token: String,
    /// RFC 3339 token expiry timestamp
    pub expires_at: String,
    /// Profile summary of the authenticated user
    pub user: UserInfo,
}

/// Authentication routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/users/register", post(Self::handle_register))
            .route("/api/users/login", post(Self::handle_login))
            .with_state(resources)
    }

    /// Handle POST /api/users/register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        tracing::info!("User registration attempt for username: {}", request.username);

        if request.username.trim().is_empty() {
            return Err(AppError::invalid_input("Username must not be empty"));
        }
        if request.password.len() < MIN_PASSWORD_LENGTH {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        if let Some(email) = &request.email {
            if !email.contains('@') {
                return Err(AppError::invalid_input("Invalid email format"));
            }
        }

        let password_hash = hash_password(&request.password)?;
        let user = User::new(request.username.clone(), password_hash, request.email);

        let user_id = resources.database.create_user(&user).await?;
        tracing::info!("User registered successfully: {} ({user_id})", request.username);

        let response = RegisterResponse {
            user_id: user_id.to_string(),
            message: format!("{} successfully registered", request.username),
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle POST /api/users/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        tracing::info!("User login attempt for username: {}", request.username);

        // A missing user and a bad password produce the same error
        let user = resources
            .database
            .get_user_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid username or password"))?;

        let is_valid = verify_password(request.password, user.password_hash.clone()).await?;
        if !is_valid {
            tracing::warn!("Invalid password for user: {}", request.username);
            return Err(AppError::auth_invalid("Invalid username or password"));
        }

        let (jwt_token, expires_at) = resources.auth_manager.generate_token(&user)?;
        resources.database.touch_last_active(user.id).await?;

        let response = LoginResponse {
            jwt_token,
            expires_at: expires_at.to_rfc3339(),
            user: UserInfo {
                user_id: user.id.to_string(),
                username: user.username,
                email: user.email,
            },
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
