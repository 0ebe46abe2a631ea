// ABOUTME: Bodyweight tracking route handlers
// ABOUTME: Records, lists, and deletes weight entries for the current user
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bodyweight log routes

use crate::errors::AppError;
use crate::resources::ServerResources;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Weight entry creation body
#[derive(Debug, Deserialize)]
pub struct CreateWeightBody {
    /// Bodyweight in kilograms, must be positive
    pub weight_kg: f64,
}

/// Bodyweight log routes handler
pub struct WeightRoutes;

impl WeightRoutes {
    /// Create all bodyweight routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/weights",
                get(Self::handle_list_weights).post(Self::handle_create_weight),
            )
            .route("/api/weights/:id", delete(Self::handle_delete_weight))
            .with_state(resources)
    }

    /// Handle POST /api/weights
    async fn handle_create_weight(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateWeightBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;

        if body.weight_kg <= 0.0 {
            return Err(
                AppError::value_out_of_range("Weight must be greater than zero")
                    .with_details(serde_json::json!({ "weight_kg": body.weight_kg })),
            );
        }

        let weight = resources
            .database
            .create_weight(auth.user_id, body.weight_kg)
            .await?;

        Ok((StatusCode::CREATED, Json(weight)).into_response())
    }

    /// Handle GET /api/weights
    async fn handle_list_weights(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;

        let weights = resources.database.list_weights(auth.user_id).await?;
        Ok((StatusCode::OK, Json(weights)).into_response())
    }

    /// Handle DELETE /api/weights/:id
    async fn handle_delete_weight(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(weight_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;

        let deleted = resources
            .database
            .delete_weight(weight_id, auth.user_id)
            .await?;
        if !deleted {
            return Err(AppError::not_found("Weight entry"));
        }

        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
