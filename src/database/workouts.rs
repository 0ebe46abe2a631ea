// ABOUTME: Workout aggregate database operations: CRUD plus start/complete/duplicate lifecycle
// ABOUTME: Every query scopes by owning user; misses surface as None for not-found mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::sets::row_to_set;
use super::users::parse_timestamp;
use crate::errors::{AppError, AppResult};
use crate::models::Workout;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Request to create a new workout
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkoutRequest {
    /// Display name
    pub workout_name: String,
    /// Session date; defaults to today when absent
    pub date: Option<NaiveDate>,
    /// Body weight noted for the session
    pub user_weight: Option<f64>,
    /// Sleep score noted for the session
    pub sleep_score: Option<i64>,
    /// Free-text sleep quality notes
    pub sleep_quality: Option<String>,
    /// Free-text session notes
    pub notes: Option<String>,
}

/// Typed partial update for a workout; absent fields are left untouched and
/// an explicit `null` clears a nullable field
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWorkoutRequest {
    /// New display name
    pub workout_name: Option<String>,
    /// New session date
    pub date: Option<NaiveDate>,
    /// New session body weight, or `null` to clear it
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub user_weight: Option<Option<f64>>,
    /// New sleep score, or `null` to clear it
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub sleep_score: Option<Option<i64>>,
    /// New sleep quality notes, or `null` to clear them
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub sleep_quality: Option<Option<String>>,
    /// New session notes, or `null` to clear them
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub notes: Option<Option<String>>,
}

/// Workout database operations manager
pub struct WorkoutsManager {
    pool: SqlitePool,
}

impl WorkoutsManager {
    /// Create a new workouts manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a workout for a user
    pub async fn create(&self, user_id: Uuid, request: &CreateWorkoutRequest) -> AppResult<Workout> {
        let workout = Workout {
            id: Uuid::new_v4(),
            user_id,
            workout_name: request.workout_name.clone(),
            date: request.date.unwrap_or_else(|| Utc::now().date_naive()),
            complete: false,
            user_weight: request.user_weight,
            sleep_score: request.sleep_score,
            sleep_quality: request.sleep_quality.clone(),
            notes: request.notes.clone(),
            start_time: None,
            duration: None,
        };

        sqlx::query(
            r"
            INSERT INTO workouts (
                id, user_id, workout_name, date, complete, user_weight,
                sleep_score, sleep_quality, notes, start_time, duration
            ) VALUES ($1, $2, $3, $4, 0, $5, $6, $7, $8, NULL, NULL)
            ",
        )
        .bind(workout.id.to_string())
        .bind(user_id.to_string())
        .bind(&workout.workout_name)
        .bind(workout.date.to_string())
        .bind(workout.user_weight)
        .bind(workout.sleep_score)
        .bind(&workout.sleep_quality)
        .bind(&workout.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create workout: {e}")))?;

        Ok(workout)
    }

    /// Get a workout by ID, scoped to its owner
    pub async fn get(&self, workout_id: Uuid, user_id: Uuid) -> AppResult<Option<Workout>> {
        let row = sqlx::query("SELECT * FROM workouts WHERE id = $1 AND user_id = $2")
            .bind(workout_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get workout: {e}")))?;

        row.map(|r| row_to_workout(&r)).transpose()
    }

    /// List a user's workouts, newest date first
    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<Workout>> {
        let rows = sqlx::query("SELECT * FROM workouts WHERE user_id = $1 ORDER BY date DESC")
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list workouts: {e}")))?;

        rows.iter().map(row_to_workout).collect()
    }

    /// Apply a typed partial update; returns `None` when not owned or missing
    pub async fn update(
        &self,
        workout_id: Uuid,
        user_id: Uuid,
        request: &UpdateWorkoutRequest,
    ) -> AppResult<Option<Workout>> {
        let Some(mut workout) = self.get(workout_id, user_id).await? else {
            return Ok(None);
        };

        if let Some(workout_name) = &request.workout_name {
            workout.workout_name = workout_name.clone();
        }
        if let Some(date) = request.date {
            workout.date = date;
        }
        if let Some(user_weight) = request.user_weight {
            workout.user_weight = user_weight;
        }
        if let Some(sleep_score) = request.sleep_score {
            workout.sleep_score = sleep_score;
        }
        if let Some(sleep_quality) = &request.sleep_quality {
            workout.sleep_quality = sleep_quality.clone();
        }
        if let Some(notes) = &request.notes {
            workout.notes = notes.clone();
        }

        sqlx::query(
            r"
            UPDATE workouts SET
                workout_name = $3,
                date = $4,
                user_weight = $5,
                sleep_score = $6,
                sleep_quality = $7,
                notes = $8
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(workout_id.to_string())
        .bind(user_id.to_string())
        .bind(&workout.workout_name)
        .bind(workout.date.to_string())
        .bind(workout.user_weight)
        .bind(workout.sleep_score)
        .bind(&workout.sleep_quality)
        .bind(&workout.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update workout: {e}")))?;

        Ok(Some(workout))
    }

    /// Delete a workout and (by cascade) its sets; returns false on miss
    pub async fn delete(&self, workout_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM workouts WHERE id = $1 AND user_id = $2")
            .bind(workout_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete workout: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Start the workout timer.
    ///
    /// Stamps `start_time` once; a second start is an idempotent restart that
    /// changes nothing and returns the workout as-is. The caller refreshes
    /// the active set afterwards.
    pub async fn start(
        &self,
        workout_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Workout>> {
        let Some(mut workout) = self.get(workout_id, user_id).await? else {
            return Ok(None);
        };

        if workout.start_time.is_none() {
            workout.start_time = Some(now);
            sqlx::query("UPDATE workouts SET start_time = $2 WHERE id = $1")
                .bind(workout_id.to_string())
                .bind(now.to_rfc3339())
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to start workout: {e}")))?;
            tracing::info!("Workout {workout_id} timer started");
        }

        Ok(Some(workout))
    }

    /// Mark the workout complete, computing its duration in whole seconds.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when the workout was never started, and a
    /// distinct `InvalidState` when it is already complete.
    pub async fn complete(
        &self,
        workout_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Workout>> {
        let Some(mut workout) = self.get(workout_id, user_id).await? else {
            return Ok(None);
        };

        let Some(start_time) = workout.start_time else {
            return Err(AppError::invalid_state(
                "Workout cannot be marked complete before it has been started",
            ));
        };

        if workout.complete {
            return Err(AppError::invalid_state("Workout already marked as complete"));
        }

        let duration = now.signed_duration_since(start_time).num_seconds();
        workout.duration = Some(duration);
        workout.complete = true;

        sqlx::query("UPDATE workouts SET complete = 1, duration = $2 WHERE id = $1")
            .bind(workout_id.to_string())
            .bind(duration)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to complete workout: {e}")))?;

        tracing::info!("Workout {workout_id} completed after {duration}s");
        Ok(Some(workout))
    }

    /// Duplicate a workout with a " (Copy)" name suffix, dated today.
    ///
    /// Deep-copies every set preserving exercise name, type, reps, loading,
    /// rest, focus, notes, and the original `set_order`/`set_number` values
    /// verbatim. Copies start incomplete, inactive, and untimed. The whole
    /// copy runs in one transaction.
    pub async fn duplicate(&self, workout_id: Uuid, user_id: Uuid) -> AppResult<Option<Workout>> {
        let Some(original) = self.get(workout_id, user_id).await? else {
            return Ok(None);
        };

        let copy = Workout {
            id: Uuid::new_v4(),
            user_id,
            workout_name: format!("{} (Copy)", original.workout_name),
            date: Utc::now().date_naive(),
            complete: false,
            user_weight: None,
            sleep_score: None,
            sleep_quality: None,
            notes: original.notes.clone(),
            start_time: None,
            duration: None,
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO workouts (
                id, user_id, workout_name, date, complete, user_weight,
                sleep_score, sleep_quality, notes, start_time, duration
            ) VALUES ($1, $2, $3, $4, 0, NULL, NULL, NULL, $5, NULL, NULL)
            ",
        )
        .bind(copy.id.to_string())
        .bind(user_id.to_string())
        .bind(&copy.workout_name)
        .bind(copy.date.to_string())
        .bind(&copy.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to duplicate workout: {e}")))?;

        let rows = sqlx::query("SELECT * FROM sets WHERE workout_id = $1 ORDER BY set_order")
            .bind(workout_id.to_string())
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to load sets for copy: {e}")))?;

        for row in &rows {
            let set = row_to_set(row)?;
            sqlx::query(
                r"
                INSERT INTO sets (
                    id, workout_id, exercise_name, set_order, set_number,
                    set_type, loading, reps, focus, rest, notes,
                    complete, is_active_set, set_start_time, set_duration
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0, 0, NULL, NULL)
                ",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(copy.id.to_string())
            .bind(&set.exercise_name)
            .bind(set.set_order)
            .bind(set.set_number)
            .bind(&set.set_type)
            .bind(set.loading)
            .bind(set.reps)
            .bind(&set.focus)
            .bind(set.rest)
            .bind(&set.notes)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to copy set: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit duplicate: {e}")))?;

        tracing::info!(
            "Workout {workout_id} duplicated as {} with {} sets",
            copy.id,
            rows.len()
        );
        Ok(Some(copy))
    }
}

/// Convert a database row to a `Workout`
pub(super) fn row_to_workout(row: &SqliteRow) -> AppResult<Workout> {
    let id_str: String = row.get("id");
    let user_id_str: String = row.get("user_id");
    let date_str: String = row.get("date");
    let complete: i64 = row.get("complete");
    let start_time_str: Option<String> = row.get("start_time");

    Ok(Workout {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        user_id: Uuid::parse_str(&user_id_str)
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        workout_name: row.get("workout_name"),
        date: date_str
            .parse()
            .map_err(|e| AppError::internal(format!("Invalid date: {e}")))?,
        complete: complete == 1,
        user_weight: row.get("user_weight"),
        sleep_score: row.get("sleep_score"),
        sleep_quality: row.get("sleep_quality"),
        notes: row.get("notes"),
        start_time: start_time_str.as_deref().map(parse_timestamp).transpose()?,
        duration: row.get("duration"),
    })
}
