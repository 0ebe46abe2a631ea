// ABOUTME: Workout route handlers covering CRUD, timer lifecycle, and duplication
// ABOUTME: Starting a workout also activates the first eligible set
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workout routes

use crate::database::sets::{CreateSetRequest, SetsManager};
use crate::database::workouts::{CreateWorkoutRequest, UpdateWorkoutRequest, WorkoutsManager};
use crate::errors::AppError;
use crate::resources::ServerResources;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Workout routes handler
pub struct WorkoutRoutes;

impl WorkoutRoutes {
    /// Create all workout routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/workouts",
                get(Self::handle_list_workouts).post(Self::handle_create_workout),
            )
            .route(
                "/api/workouts/:id",
                get(Self::handle_get_workout)
                    .patch(Self::handle_update_workout)
                    .delete(Self::handle_delete_workout),
            )
            .route("/api/workouts/:id/start", post(Self::handle_start_workout))
            .route(
                "/api/workouts/:id/complete",
                post(Self::handle_complete_workout),
            )
            .route(
                "/api/workouts/:id/duplicate",
                post(Self::handle_duplicate_workout),
            )
            .route(
                "/api/workouts/:id/sets",
                get(Self::handle_list_sets).post(Self::handle_create_set),
            )
            .with_state(resources)
    }

    fn workouts(resources: &ServerResources) -> WorkoutsManager {
        WorkoutsManager::new(resources.database.pool().clone())
    }

    fn sets(resources: &ServerResources) -> SetsManager {
        SetsManager::new(resources.database.pool().clone())
    }

    /// Handle POST /api/workouts
    async fn handle_create_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateWorkoutRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;

        if request.workout_name.trim().is_empty() {
            return Err(AppError::invalid_input("Workout name must not be empty"));
        }

        let workout = Self::workouts(&resources)
            .create(auth.user_id, &request)
            .await?;

        tracing::info!("Workout created: {} for user {}", workout.id, auth.user_id);
        Ok((StatusCode::CREATED, Json(workout)).into_response())
    }

    /// Handle GET /api/workouts
    async fn handle_list_workouts(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;

        let workouts = Self::workouts(&resources).list(auth.user_id).await?;
        Ok((StatusCode::OK, Json(workouts)).into_response())
    }

    /// Handle GET /api/workouts/:id
    async fn handle_get_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(workout_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;

        let workout = Self::workouts(&resources)
            .get(workout_id, auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout"))?;

        Ok((StatusCode::OK, Json(workout)).into_response())
    }

    /// Handle PATCH /api/workouts/:id
    async fn handle_update_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(workout_id): Path<Uuid>,
        Json(request): Json<UpdateWorkoutRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;

        if let Some(name) = &request.workout_name {
            if name.trim().is_empty() {
                return Err(AppError::invalid_input("Workout name must not be empty"));
            }
        }

        let workout = Self::workouts(&resources)
            .update(workout_id, auth.user_id, &request)
            .await?
            .ok_or_else(|| AppError::not_found("Workout"))?;

        Ok((StatusCode::OK, Json(workout)).into_response())
    }

    /// Handle DELETE /api/workouts/:id
    async fn handle_delete_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(workout_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;

        let deleted = Self::workouts(&resources)
            .delete(workout_id, auth.user_id)
            .await?;
        if !deleted {
            return Err(AppError::not_found("Workout"));
        }

        tracing::info!("Workout deleted: {workout_id}");
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/workouts/:id/start
    async fn handle_start_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(workout_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;
        let manager = Self::workouts(&resources);

        let existing = manager
            .get(workout_id, auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout"))?;
        let started_before = existing.is_started();

        let now = Utc::now();
        let workout = manager
            .start(workout_id, auth.user_id, now)
            .await?
            .ok_or_else(|| AppError::not_found("Workout"))?;

        // The first start also picks the opening active set
        if !started_before {
            Self::sets(&resources).refresh_active(workout_id, now).await?;
        }

        let message = if started_before {
            "Workout timer restarted"
        } else {
            "Workout timer started"
        };
        tracing::info!("{message}: {workout_id}");
        Ok((
            StatusCode::OK,
            Json(json!({ "message": message, "workout": workout })),
        )
            .into_response())
    }

    /// Handle POST /api/workouts/:id/complete
    async fn handle_complete_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(workout_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;

        let workout = Self::workouts(&resources)
            .complete(workout_id, auth.user_id, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("Workout"))?;

        tracing::info!("Workout completed: {workout_id}");
        Ok((StatusCode::OK, Json(workout)).into_response())
    }

    /// Handle POST /api/workouts/:id/duplicate
    async fn handle_duplicate_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(workout_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;

        let copy = Self::workouts(&resources)
            .duplicate(workout_id, auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout"))?;

        tracing::info!("Workout duplicated: {workout_id} -> {}", copy.id);
        Ok((StatusCode::CREATED, Json(copy)).into_response())
    }

    /// Handle GET /api/workouts/:id/sets
    async fn handle_list_sets(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(workout_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;

        // Ownership check before touching the sets table
        Self::workouts(&resources)
            .get(workout_id, auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout"))?;

        let sets = Self::sets(&resources).list_for_workout(workout_id).await?;
        Ok((StatusCode::OK, Json(sets)).into_response())
    }

    /// Handle POST /api/workouts/:id/sets
    async fn handle_create_set(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(workout_id): Path<Uuid>,
        Json(request): Json<CreateSetRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;

        Self::workouts(&resources)
            .get(workout_id, auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout"))?;

        if request.exercise_name.trim().is_empty() {
            return Err(AppError::invalid_input("Exercise name must not be empty"));
        }

        let set = Self::sets(&resources).create(workout_id, &request).await?;
        Ok((StatusCode::CREATED, Json(set)).into_response())
    }
}
