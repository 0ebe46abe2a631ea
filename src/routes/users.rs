// ABOUTME: Profile route handlers for fetching and updating the current user
// ABOUTME: Password changes are hashed here before reaching the store
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User profile routes

use crate::auth::hash_password;
use crate::database::users::UpdateUserRequest;
use crate::errors::AppError;
use crate::resources::ServerResources;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Profile update request body; absent fields are left untouched and an
/// explicit `null` clears a nullable field
#[derive(Debug, Deserialize)]
pub struct UpdateProfileBody {
    /// New contact email, or `null` to clear it
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub email: Option<Option<String>>,
    /// New password, hashed before storage
    pub password: Option<String>,
    /// New given name, or `null` to clear it
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub first_name: Option<Option<String>>,
    /// New family name, or `null` to clear it
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub last_name: Option<Option<String>>,
    /// New height in centimetres, or `null` to clear it
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub height_cm: Option<Option<i64>>,
    /// New date of birth, or `null` to clear it
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub dob: Option<Option<chrono::NaiveDate>>,
}

/// User profile routes handler
pub struct UserRoutes;

impl UserRoutes {
    /// Create all user profile routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/users/me", get(Self::handle_get_profile))
            .route("/api/users/update", patch(Self::handle_update_profile))
            .with_state(resources)
    }

    /// Handle GET /api/users/me
    async fn handle_get_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;

        let user = resources
            .database
            .get_user(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        Ok((StatusCode::OK, Json(user)).into_response())
    }

    /// Handle PATCH /api/users/update
    async fn handle_update_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<UpdateProfileBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;

        if let Some(Some(email)) = &body.email {
            if !email.contains('@') {
                return Err(AppError::invalid_input("Invalid email format"));
            }
        }

        let password_hash = match body.password {
            Some(password) => {
                if password.len() < 6 {
                    return Err(AppError::invalid_input(
                        "Password must be at least 6 characters",
                    ));
                }
                Some(hash_password(&password)?)
            }
            None => None,
        };

        let request = UpdateUserRequest {
            email: body.email,
            first_name: body.first_name,
            last_name: body.last_name,
            height_cm: body.height_cm,
            dob: body.dob,
            password_hash,
        };

        let user = resources
            .database
            .update_user(auth.user_id, &request)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        tracing::info!("Profile updated for user {}", auth.user_id);
        Ok((StatusCode::OK, Json(user)).into_response())
    }
}
