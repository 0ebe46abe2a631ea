// ABOUTME: User management database operations
// ABOUTME: Handles user registration, lookup, and typed partial profile updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::User;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

/// Typed partial update for a user profile; absent fields are left untouched
/// and an explicit `null` clears a nullable field
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    /// New contact email, or `null` to clear it
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub email: Option<Option<String>>,
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
    pub dob: Option<Option<NaiveDate>>,
    /// New bcrypt password hash; hashing happens in the route layer
    #[serde(skip)]
    pub password_hash: Option<String>,
}

impl Database {
    /// Create a new user
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the username or email is taken,
    /// or a database error on other failures.
    pub async fn create_user(&self, user: &User) -> AppResult<Uuid> {
        if self.get_user_by_username(&user.username).await?.is_some() {
            return Err(AppError::already_exists("Username already in use"));
        }
        if let Some(email) = &user.email {
            let taken = sqlx::query("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(self.pool())
                .await
                .map_err(|e| AppError::database(format!("Failed to check email: {e}")))?;
            if taken.is_some() {
                return Err(AppError::already_exists("Email already in use"));
            }
        }

        sqlx::query(
            r"
            INSERT INTO users (
                id, username, email, password_hash, first_name, last_name,
                height_cm, dob, created_at, last_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.height_cm)
        .bind(user.dob.map(|d| d.to_string()))
        .bind(user.created_at.to_rfc3339())
        .bind(user.last_active.to_rfc3339())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create user: {e}")))?;

        Ok(user.id)
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(user_id.to_string())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Get a user by username
    pub async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Stamp the user's last successful authentication
    pub async fn touch_last_active(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_active = $2 WHERE id = $1")
            .bind(user_id.to_string())
            .bind(Utc::now().to_rfc3339())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to update last_active: {e}")))?;
        Ok(())
    }

    /// Apply a typed partial update to a user profile
    ///
    /// Only fields present in the request are written. Returns the updated
    /// user, or `None` when the user does not exist.
    pub async fn update_user(
        &self,
        user_id: Uuid,
        request: &UpdateUserRequest,
    ) -> AppResult<Option<User>> {
        let Some(mut user) = self.get_user(user_id).await? else {
            return Ok(None);
        };

        if let Some(email) = &request.email {
            user.email = email.clone();
        }
        if let Some(first_name) = &request.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &request.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(height_cm) = request.height_cm {
            user.height_cm = height_cm;
        }
        if let Some(dob) = request.dob {
            user.dob = dob;
        }
        if let Some(password_hash) = &request.password_hash {
            user.password_hash = password_hash.clone();
        }

        sqlx::query(
            r"
            UPDATE users SET
                email = $2,
                first_name = $3,
                last_name = $4,
                height_cm = $5,
                dob = $6,
                password_hash = $7
            WHERE id = $1
            ",
        )
        .bind(user_id.to_string())
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.height_cm)
        .bind(user.dob.map(|d| d.to_string()))
        .bind(&user.password_hash)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to update user: {e}")))?;

        Ok(Some(user))
    }
}

/// Convert a database row to a `User`
fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let id_str: String = row.get("id");
    let created_at_str: String = row.get("created_at");
    let last_active_str: String = row.get("last_active");
    let dob_str: Option<String> = row.get("dob");

    Ok(User {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        height_cm: row.get("height_cm"),
        dob: dob_str
            .map(|s| {
                s.parse::<NaiveDate>()
                    .map_err(|e| AppError::internal(format!("Invalid date: {e}")))
            })
            .transpose()?,
        created_at: parse_timestamp(&created_at_str)?,
        last_active: parse_timestamp(&last_active_str)?,
    })
}

/// Parse an RFC3339 timestamp stored as TEXT
pub(super) fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))
}
