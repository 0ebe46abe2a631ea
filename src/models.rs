// ABOUTME: Core data structures for users, body weight entries, workouts, and sets
// ABOUTME: Every entity is owned by exactly one user; workouts own their sets
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Data Models
//!
//! Entities persisted by the database layer. Ordering invariants on
//! [`SetDict`] (`set_order` contiguous 1..N per workout, `set_number`
//! contiguous 1..M per exercise name) are maintained by the
//! [`crate::ordering`] module, not by these types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Deserialize a nullable partial-update field.
///
/// An absent field leaves the stored value untouched (`None`), an explicit
/// `null` clears it (`Some(None)`), and a value replaces it
/// (`Some(Some(value))`). Pair with `#[serde(default)]` so absence works.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// A registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Login name, unique across the system
    pub username: String,
    /// Optional contact email, unique when present
    pub email: Option<String>,
    /// Bcrypt password hash, never serialized in responses
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Given name
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
    /// Height in centimetres
    pub height_cm: Option<i64>,
    /// Date of birth
    pub dob: Option<NaiveDate>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last successful authentication
    pub last_active: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and current timestamps
    #[must_use]
    pub fn new(username: String, password_hash: String, email: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            first_name: None,
            last_name: None,
            height_cm: None,
            dob: None,
            created_at: now,
            last_active: now,
        }
    }
}

/// A logged body-weight entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weight {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Body weight in kilograms
    pub weight_kg: f64,
    /// Server-stamped recording time
    pub recorded_at: DateTime<Utc>,
}

/// A workout session owned by one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Display name
    pub workout_name: String,
    /// Calendar date of the session
    pub date: NaiveDate,
    /// Whether the session has been completed
    pub complete: bool,
    /// Body weight noted for the session, in kilograms
    pub user_weight: Option<f64>,
    /// Sleep score noted for the session
    pub sleep_score: Option<i64>,
    /// Free-text sleep quality notes
    pub sleep_quality: Option<String>,
    /// Free-text session notes
    pub notes: Option<String>,
    /// Timer start, set once by the start operation
    pub start_time: Option<DateTime<Utc>>,
    /// Realized duration in whole seconds, set by the complete operation
    pub duration: Option<i64>,
}

impl Workout {
    /// Whether the workout timer has been started
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.start_time.is_some()
    }
}

/// One logged unit of an exercise within a workout
///
/// `set_order` is the global 1-based position within the workout;
/// `set_number` is the 1-based position among sets sharing the same
/// exercise name, assigned in ascending `set_order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetDict {
    /// Unique identifier
    pub id: Uuid,
    /// Owning workout
    pub workout_id: Uuid,
    /// Free-text exercise name (not a catalog reference)
    pub exercise_name: String,
    /// Global 1-based position within the workout
    pub set_order: i64,
    /// 1-based position among sets of the same exercise
    pub set_number: i64,
    /// Set type label (e.g. warmup, working)
    pub set_type: Option<String>,
    /// Load in kilograms
    pub loading: Option<f64>,
    /// Target repetitions
    pub reps: Option<i64>,
    /// Training focus label
    pub focus: Option<String>,
    /// Configured rest before the following set, in seconds
    pub rest: Option<i64>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Whether the set has been completed
    pub complete: bool,
    /// Whether this is the single set currently up next
    pub is_active_set: bool,
    /// Computed start time for the active set, honoring rest offsets
    pub set_start_time: Option<DateTime<Utc>>,
    /// Realized duration in whole seconds
    pub set_duration: Option<i64>,
}
