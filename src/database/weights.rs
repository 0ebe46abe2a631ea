// ABOUTME: Body-weight log database operations
// ABOUTME: Weights are owner-scoped; deletes against another user's entry report not found
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::users::parse_timestamp;
use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::Weight;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Log a new body-weight entry with a server-stamped recording time
    pub async fn create_weight(&self, user_id: Uuid, weight_kg: f64) -> AppResult<Weight> {
        let weight = Weight {
            id: Uuid::new_v4(),
            user_id,
            weight_kg,
            recorded_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO weights (id, user_id, weight_kg, recorded_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(weight.id.to_string())
        .bind(user_id.to_string())
        .bind(weight_kg)
        .bind(weight.recorded_at.to_rfc3339())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to log weight: {e}")))?;

        Ok(weight)
    }

    /// List a user's weight entries, newest first
    pub async fn list_weights(&self, user_id: Uuid) -> AppResult<Vec<Weight>> {
        let rows = sqlx::query(
            "SELECT * FROM weights WHERE user_id = $1 ORDER BY recorded_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list weights: {e}")))?;

        rows.iter().map(row_to_weight).collect()
    }

    /// Delete one weight entry; returns false when it doesn't exist or
    /// belongs to another user
    pub async fn delete_weight(&self, weight_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM weights WHERE id = $1 AND user_id = $2")
            .bind(weight_id.to_string())
            .bind(user_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to delete weight: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_weight(row: &SqliteRow) -> AppResult<Weight> {
    let id_str: String = row.get("id");
    let user_id_str: String = row.get("user_id");
    let recorded_at_str: String = row.get("recorded_at");

    Ok(Weight {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        user_id: Uuid::parse_str(&user_id_str)
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        weight_kg: row.get("weight_kg"),
        recorded_at: parse_timestamp(&recorded_at_str)?,
    })
}
