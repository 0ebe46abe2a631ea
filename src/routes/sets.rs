// ABOUTME: Set route handlers for edits, completion, skipping, moving, and duplication
// ABOUTME: Every handler verifies ownership through the parent workout first
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Set routes

use crate::database::sets::{SetsManager, UpdateSetRequest};
use crate::errors::AppError;
use crate::resources::ServerResources;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{patch, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Move request body
#[derive(Debug, Deserialize)]
pub struct MoveSetBody {
    /// Desired 1-based position within the workout
    pub target_position: i64,
}

/// Set routes handler
pub struct SetRoutes;

impl SetRoutes {
    /// Create all set routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/sets/:id",
                patch(Self::handle_update_set).delete(Self::handle_delete_set),
            )
            .route("/api/sets/:id/complete", post(Self::handle_complete_set))
            .route("/api/sets/:id/skip", post(Self::handle_skip_set))
            .route("/api/sets/:id/move", post(Self::handle_move_set))
            .route("/api/sets/:id/duplicate", post(Self::handle_duplicate_set))
            .with_state(resources)
    }

    fn sets(resources: &ServerResources) -> SetsManager {
        SetsManager::new(resources.database.pool().clone())
    }

    /// Handle PATCH /api/sets/:id
    async fn handle_update_set(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(set_id): Path<Uuid>,
        Json(request): Json<UpdateSetRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;
        let manager = Self::sets(&resources);

        manager
            .get_owned(set_id, auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Set"))?;

        if let Some(exercise_name) = &request.exercise_name {
            if exercise_name.trim().is_empty() {
                return Err(AppError::invalid_input("Exercise name must not be empty"));
            }
        }

        let set = manager.update(set_id, &request).await?;
        Ok((StatusCode::OK, Json(set)).into_response())
    }

    /// Handle DELETE /api/sets/:id
    async fn handle_delete_set(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(set_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;
        let manager = Self::sets(&resources);

        let set = manager
            .get_owned(set_id, auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Set"))?;

        manager.delete(set_id, set.workout_id).await?;

        tracing::info!("Set deleted: {set_id}");
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/sets/:id/complete
    async fn handle_complete_set(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(set_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;
        let manager = Self::sets(&resources);

        manager
            .get_owned(set_id, auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Set"))?;

        let set = manager.toggle_complete(set_id, Utc::now()).await?;
        Ok((StatusCode::OK, Json(set)).into_response())
    }

    /// Handle POST /api/sets/:id/skip
    async fn handle_skip_set(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(set_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;
        let manager = Self::sets(&resources);

        manager
            .get_owned(set_id, auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Set"))?;

        let set = manager.skip(set_id, Utc::now()).await?;
        Ok((StatusCode::OK, Json(set)).into_response())
    }

    /// Handle POST /api/sets/:id/move
    async fn handle_move_set(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(set_id): Path<Uuid>,
        Json(body): Json<MoveSetBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;
        let manager = Self::sets(&resources);

        manager
            .get_owned(set_id, auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Set"))?;

        let set = manager
            .move_set(set_id, body.target_position, Utc::now())
            .await?;
        Ok((StatusCode::OK, Json(set)).into_response())
    }

    /// Handle POST /api/sets/:id/duplicate
    async fn handle_duplicate_set(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(set_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;
        let manager = Self::sets(&resources);

        let original = manager
            .get_owned(set_id, auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Set"))?;

        let copy = manager.duplicate(&original).await?;
        Ok((StatusCode::CREATED, Json(copy)).into_response())
    }
}
