// ABOUTME: Database management over SQLite with migrate-on-connect schema setup
// ABOUTME: Owns the connection pool shared by the per-domain managers
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Database Management
//!
//! Connection handling and schema migration. User and weight operations hang
//! off [`Database`] directly; the workout domain gets dedicated managers in
//! [`workouts`] and [`sets`].

pub mod sets;
pub mod users;
pub mod weights;
pub mod workouts;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Database manager for user, weight, workout, and set storage
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema
    /// migration fails.
    pub async fn new(database_url: &str) -> Result<Self> {
        // Create the SQLite file if it doesn't exist; cascade deletes rely on
        // foreign key enforcement being on for every pooled connection
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database exists per connection, so the pool must hold
        // exactly one connection and never recycle it
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePool::connect_with(options).await?
        };

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Access the underlying connection pool
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE,
                password_hash TEXT NOT NULL,
                first_name TEXT,
                last_name TEXT,
                height_cm INTEGER,
                dob TEXT,
                created_at TEXT NOT NULL,
                last_active TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS weights (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                weight_kg REAL NOT NULL,
                recorded_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workouts (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                workout_name TEXT NOT NULL,
                date TEXT NOT NULL,
                complete INTEGER NOT NULL DEFAULT 0,
                user_weight REAL,
                sleep_score INTEGER,
                sleep_quality TEXT,
                notes TEXT,
                start_time TEXT,
                duration INTEGER
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS sets (
                id TEXT PRIMARY KEY,
                workout_id TEXT NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
                exercise_name TEXT NOT NULL,
                set_order INTEGER NOT NULL,
                set_number INTEGER NOT NULL,
                set_type TEXT,
                loading REAL,
                reps INTEGER,
                focus TEXT,
                rest INTEGER,
                notes TEXT,
                complete INTEGER NOT NULL DEFAULT 0,
                is_active_set INTEGER NOT NULL DEFAULT 0,
                set_start_time TEXT,
                set_duration INTEGER
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_username ON users(username)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_weights_user_recorded ON weights(user_id, recorded_at)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_workouts_user_date ON workouts(user_id, date)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sets_workout_order ON sets(workout_id, set_order)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
