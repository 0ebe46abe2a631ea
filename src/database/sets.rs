// ABOUTME: Set database operations: CRUD, duplicate, skip, move, completion toggle, active-set refresh
// ABOUTME: Applies the ordering module's change plans inside single transactions
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Set storage for one workout's ordered collection.
//!
//! Structural changes (create, update, delete, duplicate, skip) explicitly
//! call [`ordering::recompute`] and apply the returned plan in the same
//! transaction as the triggering write, so no request ever observes a gap or
//! duplicate in `set_order`. Move applies a complete arrangement from
//! [`ordering::plan_move`] instead and never triggers a recompute.

use super::users::parse_timestamp;
use super::workouts::row_to_workout;
use crate::errors::{AppError, AppResult};
use crate::models::SetDict;
use crate::ordering::{self, Activation, OrderChange};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

/// Request to create a new set; `set_order`/`set_number` are assigned by the
/// sequencer and never taken from the caller
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSetRequest {
    /// Free-text exercise name
    pub exercise_name: String,
    /// Set type label
    pub set_type: Option<String>,
    /// Load in kilograms
    pub loading: Option<f64>,
    /// Target repetitions
    pub reps: Option<i64>,
    /// Training focus label
    pub focus: Option<String>,
    /// Configured rest in seconds
    pub rest: Option<i64>,
    /// Free-text notes
    pub notes: Option<String>,
}

/// Typed partial update for a set; absent fields are left untouched and an
/// explicit `null` clears a nullable field. Completion and ordering change
/// through their dedicated operations only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSetRequest {
    /// New exercise name; renaming re-derives `set_number` grouping
    pub exercise_name: Option<String>,
    /// New set type label, or `null` to clear it
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub set_type: Option<Option<String>>,
    /// New load in kilograms, or `null` to clear it
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub loading: Option<Option<f64>>,
    /// New target repetitions, or `null` to clear them
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub reps: Option<Option<i64>>,
    /// New focus label, or `null` to clear it
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub focus: Option<Option<String>>,
    /// New rest in seconds, or `null` to clear it
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub rest: Option<Option<i64>>,
    /// New notes, or `null` to clear them
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub notes: Option<Option<String>>,
}

/// Set database operations manager
pub struct SetsManager {
    pool: SqlitePool,
}

impl SetsManager {
    /// Create a new sets manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List a workout's sets in ascending `set_order`
    pub async fn list_for_workout(&self, workout_id: Uuid) -> AppResult<Vec<SetDict>> {
        let rows = sqlx::query("SELECT * FROM sets WHERE workout_id = $1 ORDER BY set_order")
            .bind(workout_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list sets: {e}")))?;

        rows.iter().map(row_to_set).collect()
    }

    /// Get a set by ID, scoped to the owner of its workout
    pub async fn get_owned(&self, set_id: Uuid, user_id: Uuid) -> AppResult<Option<SetDict>> {
        let row = sqlx::query(
            r"
            SELECT s.* FROM sets s
            JOIN workouts w ON w.id = s.workout_id
            WHERE s.id = $1 AND w.user_id = $2
            ",
        )
        .bind(set_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get set: {e}")))?;

        row.map(|r| row_to_set(&r)).transpose()
    }

    /// Append a new set to a workout.
    ///
    /// The set receives `set_order` = current count + 1 regardless of any
    /// caller-supplied ordering, then a recompute settles `set_number`
    /// grouping in the same transaction.
    pub async fn create(&self, workout_id: Uuid, request: &CreateSetRequest) -> AppResult<SetDict> {
        let id = Uuid::new_v4();

        let mut tx = self.begin().await?;

        let count = count_sets(&mut tx, workout_id).await?;
        sqlx::query(
            r"
            INSERT INTO sets (
                id, workout_id, exercise_name, set_order, set_number,
                set_type, loading, reps, focus, rest, notes,
                complete, is_active_set, set_start_time, set_duration
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0, 0, NULL, NULL)
            ",
        )
        .bind(id.to_string())
        .bind(workout_id.to_string())
        .bind(&request.exercise_name)
        .bind(count + 1)
        .bind(count + 1)
        .bind(&request.set_type)
        .bind(request.loading)
        .bind(request.reps)
        .bind(&request.focus)
        .bind(request.rest)
        .bind(&request.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create set: {e}")))?;

        let sets = load_sets(&mut tx, workout_id).await?;
        apply_changes(&mut tx, &ordering::recompute(&sets)).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit set create: {e}")))?;

        self.fetch(id).await
    }

    /// Apply a typed partial update, then recompute ordering.
    ///
    /// The recompute matters when `exercise_name` changes: the per-exercise
    /// `set_number` grouping is re-derived across the workout.
    pub async fn update(&self, set_id: Uuid, request: &UpdateSetRequest) -> AppResult<SetDict> {
        let mut set = self.fetch(set_id).await?;

        if let Some(exercise_name) = &request.exercise_name {
            set.exercise_name = exercise_name.clone();
        }
        if let Some(set_type) = &request.set_type {
            set.set_type = set_type.clone();
        }
        if let Some(loading) = request.loading {
            set.loading = loading;
        }
        if let Some(reps) = request.reps {
            set.reps = reps;
        }
        if let Some(focus) = &request.focus {
            set.focus = focus.clone();
        }
        if let Some(rest) = request.rest {
            set.rest = rest;
        }
        if let Some(notes) = &request.notes {
            set.notes = notes.clone();
        }

        let mut tx = self.begin().await?;

        sqlx::query(
            r"
            UPDATE sets SET
                exercise_name = $2, set_type = $3, loading = $4, reps = $5,
                focus = $6, rest = $7, notes = $8
            WHERE id = $1
            ",
        )
        .bind(set_id.to_string())
        .bind(&set.exercise_name)
        .bind(&set.set_type)
        .bind(set.loading)
        .bind(set.reps)
        .bind(&set.focus)
        .bind(set.rest)
        .bind(&set.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update set: {e}")))?;

        let sets = load_sets(&mut tx, set.workout_id).await?;
        apply_changes(&mut tx, &ordering::recompute(&sets)).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit set update: {e}")))?;

        self.fetch(set_id).await
    }

    /// Delete a set and renumber the remaining collection in one transaction
    pub async fn delete(&self, set_id: Uuid, workout_id: Uuid) -> AppResult<()> {
        let mut tx = self.begin().await?;

        sqlx::query("DELETE FROM sets WHERE id = $1")
            .bind(set_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete set: {e}")))?;

        let remaining = load_sets(&mut tx, workout_id).await?;
        apply_changes(&mut tx, &ordering::recompute(&remaining)).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit set delete: {e}")))?;

        Ok(())
    }

    /// Duplicate a set within its workout, appended at the end.
    ///
    /// The copy starts incomplete, inactive, and untimed; the recompute in
    /// the same transaction settles its `set_number`.
    pub async fn duplicate(&self, original: &SetDict) -> AppResult<SetDict> {
        let id = Uuid::new_v4();

        let mut tx = self.begin().await?;

        let count = count_sets(&mut tx, original.workout_id).await?;
        sqlx::query(
            r"
            INSERT INTO sets (
                id, workout_id, exercise_name, set_order, set_number,
                set_type, loading, reps, focus, rest, notes,
                complete, is_active_set, set_start_time, set_duration
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0, 0, NULL, NULL)
            ",
        )
        .bind(id.to_string())
        .bind(original.workout_id.to_string())
        .bind(&original.exercise_name)
        .bind(count + 1)
        .bind(count + 1)
        .bind(&original.set_type)
        .bind(original.loading)
        .bind(original.reps)
        .bind(&original.focus)
        .bind(original.rest)
        .bind(&original.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to duplicate set: {e}")))?;

        let sets = load_sets(&mut tx, original.workout_id).await?;
        apply_changes(&mut tx, &ordering::recompute(&sets)).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit set duplicate: {e}")))?;

        self.fetch(id).await
    }

    /// Toggle a set's completion flag, then refresh the active set.
    ///
    /// Completing stamps the realized duration as `now - set_start_time` only
    /// when the start time is in the past; un-completing clears both the
    /// duration and the start time.
    pub async fn toggle_complete(&self, set_id: Uuid, now: DateTime<Utc>) -> AppResult<SetDict> {
        let set = self.fetch(set_id).await?;

        if set.complete {
            sqlx::query(
                "UPDATE sets SET complete = 0, set_duration = NULL, set_start_time = NULL WHERE id = $1",
            )
            .bind(set_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to un-complete set: {e}")))?;
        } else {
            let duration = set
                .set_start_time
                .filter(|start| *start <= now)
                .map(|start| now.signed_duration_since(start).num_seconds());
            sqlx::query("UPDATE sets SET complete = 1, set_duration = $2 WHERE id = $1")
                .bind(set_id.to_string())
                .bind(duration)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to complete set: {e}")))?;
        }

        self.refresh_active(set.workout_id, now).await?;
        self.fetch(set_id).await
    }

    /// Skip a set: push it beyond the current maximum `set_order`, clear its
    /// active flag and start time, renumber, then activate the next
    /// candidate immediately with no rest offset.
    ///
    /// The push to count + 1 guarantees the skipped set lands last even while
    /// the renumbering settles, rather than relying on the recompute alone.
    pub async fn skip(&self, set_id: Uuid, now: DateTime<Utc>) -> AppResult<SetDict> {
        let set = self.fetch(set_id).await?;

        let mut tx = self.begin().await?;

        let count = count_sets(&mut tx, set.workout_id).await?;
        sqlx::query(
            r"
            UPDATE sets SET set_order = $2, is_active_set = 0, set_start_time = NULL
            WHERE id = $1
            ",
        )
        .bind(set_id.to_string())
        .bind(count + 1)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to skip set: {e}")))?;

        let sets = load_sets(&mut tx, set.workout_id).await?;
        apply_changes(&mut tx, &ordering::recompute(&sets)).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit skip: {e}")))?;

        let start_time = self.workout_start_time(set.workout_id).await?;
        let sets = self.list_for_workout(set.workout_id).await?;
        let activation = ordering::select_active_after_skip(start_time, &sets, set_id, now);
        self.apply_activation(set.workout_id, activation).await?;

        tracing::debug!("Set {set_id} skipped to position {}", count + 1);
        self.fetch(set_id).await
    }

    /// Move a set to a 1-based target position.
    ///
    /// The complete final arrangement comes from [`ordering::plan_move`] and
    /// is applied as one transaction, so no concurrent recompute can
    /// interleave with the shift. The active set is refreshed afterwards.
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` when the target is outside `[1, N]`.
    pub async fn move_set(
        &self,
        set_id: Uuid,
        target_position: i64,
        now: DateTime<Utc>,
    ) -> AppResult<SetDict> {
        let set = self.fetch(set_id).await?;

        let mut tx = self.begin().await?;

        let sets = load_sets(&mut tx, set.workout_id).await?;
        let plan = ordering::plan_move(&sets, set_id, target_position)?;
        apply_changes(&mut tx, &plan).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit move: {e}")))?;

        self.refresh_active(set.workout_id, now).await?;

        tracing::debug!("Set {set_id} moved to position {target_position}");
        self.fetch(set_id).await
    }

    /// Recompute which single set is active for a workout.
    ///
    /// Clears `is_active_set` everywhere, then applies the selection from
    /// [`ordering::select_active`]: nothing for an unstarted workout or a
    /// fully completed one, otherwise the first incomplete set with a start
    /// time honoring the rest offset of an adjacent completed predecessor.
    pub async fn refresh_active(&self, workout_id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        let start_time = self.workout_start_time(workout_id).await?;
        let sets = self.list_for_workout(workout_id).await?;
        let activation = ordering::select_active(start_time, &sets, now);
        self.apply_activation(workout_id, activation).await
    }

    /// Clear all active flags for a workout, then mark the selected set
    async fn apply_activation(
        &self,
        workout_id: Uuid,
        activation: Option<Activation>,
    ) -> AppResult<()> {
        let mut tx = self.begin().await?;

        sqlx::query("UPDATE sets SET is_active_set = 0 WHERE workout_id = $1 AND is_active_set = 1")
            .bind(workout_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear active flags: {e}")))?;

        if let Some(activation) = activation {
            sqlx::query("UPDATE sets SET is_active_set = 1, set_start_time = $2 WHERE id = $1")
                .bind(activation.id.to_string())
                .bind(activation.set_start_time.to_rfc3339())
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to mark active set: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit activation: {e}")))?;

        Ok(())
    }

    /// Read the start time of a workout (None when unstarted or missing)
    async fn workout_start_time(&self, workout_id: Uuid) -> AppResult<Option<DateTime<Utc>>> {
        let row = sqlx::query("SELECT * FROM workouts WHERE id = $1")
            .bind(workout_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get workout: {e}")))?;

        Ok(row
            .map(|r| row_to_workout(&r))
            .transpose()?
            .and_then(|w| w.start_time))
    }

    /// Fetch one set by ID
    async fn fetch(&self, set_id: Uuid) -> AppResult<SetDict> {
        let row = sqlx::query("SELECT * FROM sets WHERE id = $1")
            .bind(set_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get set: {e}")))?;

        row.map(|r| row_to_set(&r))
            .transpose()?
            .ok_or_else(|| AppError::not_found("Set"))
    }

    async fn begin(&self) -> AppResult<sqlx::Transaction<'_, sqlx::Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))
    }
}

/// Count the sets in a workout
async fn count_sets(conn: &mut SqliteConnection, workout_id: Uuid) -> AppResult<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM sets WHERE workout_id = $1")
        .bind(workout_id.to_string())
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to count sets: {e}")))?;
    Ok(row.get("count"))
}

/// Load a workout's sets inside a transaction, ordered by `set_order`
async fn load_sets(conn: &mut SqliteConnection, workout_id: Uuid) -> AppResult<Vec<SetDict>> {
    let rows = sqlx::query("SELECT * FROM sets WHERE workout_id = $1 ORDER BY set_order")
        .bind(workout_id.to_string())
        .fetch_all(conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to load sets: {e}")))?;
    rows.iter().map(row_to_set).collect()
}

/// Apply a renumbering plan as a batch of updates on one connection
async fn apply_changes(conn: &mut SqliteConnection, changes: &[OrderChange]) -> AppResult<()> {
    for change in changes {
        sqlx::query("UPDATE sets SET set_order = $2, set_number = $3 WHERE id = $1")
            .bind(change.id.to_string())
            .bind(change.set_order)
            .bind(change.set_number)
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to renumber set: {e}")))?;
    }
    Ok(())
}

/// Convert a database row to a `SetDict`
pub(super) fn row_to_set(row: &SqliteRow) -> AppResult<SetDict> {
    let id_str: String = row.get("id");
    let workout_id_str: String = row.get("workout_id");
    let complete: i64 = row.get("complete");
    let is_active_set: i64 = row.get("is_active_set");
    let set_start_time_str: Option<String> = row.get("set_start_time");

    Ok(SetDict {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        workout_id: Uuid::parse_str(&workout_id_str)
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        exercise_name: row.get("exercise_name"),
        set_order: row.get("set_order"),
        set_number: row.get("set_number"),
        set_type: row.get("set_type"),
        loading: row.get("loading"),
        reps: row.get("reps"),
        focus: row.get("focus"),
        rest: row.get("rest"),
        notes: row.get("notes"),
        complete: complete == 1,
        is_active_set: is_active_set == 1,
        set_start_time: set_start_time_str.as_deref().map(parse_timestamp).transpose()?,
        set_duration: row.get("set_duration"),
    })
}
