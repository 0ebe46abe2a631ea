// ABOUTME: Integration tests for the workouts database module
// ABOUTME: Covers CRUD, start/complete lifecycle, duplication, and ownership scoping
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(missing_docs, clippy::unwrap_used)]

use chrono::{Duration, NaiveDate, Utc};
use trainlog::database::sets::{CreateSetRequest, SetsManager};
use trainlog::database::workouts::{CreateWorkoutRequest, UpdateWorkoutRequest, WorkoutsManager};
use trainlog::database::Database;
use trainlog::errors::ErrorCode;
use trainlog::models::User;
use uuid::Uuid;

async fn setup() -> (Database, Uuid) {
    let db = Database::new("sqlite::memory:").await.unwrap();
    let user = User::new("lifter".into(), "hash".into(), None);
    let user_id = db.create_user(&user).await.unwrap();
    (db, user_id)
}

fn workouts_manager(db: &Database) -> WorkoutsManager {
    WorkoutsManager::new(db.pool().clone())
}

fn workout_request(name: &str) -> CreateWorkoutRequest {
    CreateWorkoutRequest {
        workout_name: name.into(),
        date: None,
        user_weight: None,
        sleep_score: None,
        sleep_quality: None,
        notes: None,
    }
}

#[tokio::test]
async fn test_create_and_get_workout() {
    let (db, user_id) = setup().await;
    let manager = workouts_manager(&db);

    let request = CreateWorkoutRequest {
        workout_name: "Push Day".into(),
        date: Some(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()),
        user_weight: Some(82.5),
        sleep_score: Some(88),
        sleep_quality: None,
        notes: Some("felt strong".into()),
    };
    let created = manager.create(user_id, &request).await.unwrap();

    let fetched = manager.get(created.id, user_id).await.unwrap().unwrap();
    assert_eq!(fetched.workout_name, "Push Day");
    assert_eq!(fetched.date, NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());
    assert_eq!(fetched.user_weight, Some(82.5));
    assert_eq!(fetched.sleep_score, Some(88));
    assert!(!fetched.complete);
    assert!(fetched.start_time.is_none());
    assert!(fetched.duration.is_none());
}

#[tokio::test]
async fn test_create_defaults_date_to_today() {
    let (db, user_id) = setup().await;
    let manager = workouts_manager(&db);

    let workout = manager
        .create(user_id, &workout_request("Leg Day"))
        .await
        .unwrap();
    assert_eq!(workout.date, Utc::now().date_naive());
}

#[tokio::test]
async fn test_list_orders_by_date_descending() {
    let (db, user_id) = setup().await;
    let manager = workouts_manager(&db);

    for (name, date) in [("old", "2026-01-05"), ("new", "2026-02-10"), ("mid", "2026-01-20")] {
        manager
            .create(
                user_id,
                &CreateWorkoutRequest {
                    workout_name: name.into(),
                    date: Some(date.parse().unwrap()),
                    user_weight: None,
                    sleep_score: None,
                    sleep_quality: None,
                    notes: None,
                },
            )
            .await
            .unwrap();
    }

    let workouts = manager.list(user_id).await.unwrap();
    let names: Vec<&str> = workouts.iter().map(|w| w.workout_name.as_str()).collect();
    assert_eq!(names, vec!["new", "mid", "old"]);
}

#[tokio::test]
async fn test_update_touches_only_supplied_fields() {
    let (db, user_id) = setup().await;
    let manager = workouts_manager(&db);

    let workout = manager
        .create(
            user_id,
            &CreateWorkoutRequest {
                workout_name: "Pull Day".into(),
                date: None,
                user_weight: Some(80.0),
                sleep_score: None,
                sleep_quality: None,
                notes: Some("original".into()),
            },
        )
        .await
        .unwrap();

    let request = UpdateWorkoutRequest {
        sleep_score: Some(Some(75)),
        ..UpdateWorkoutRequest::default()
    };
    let updated = manager
        .update(workout.id, user_id, &request)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.sleep_score, Some(75));
    assert_eq!(updated.workout_name, "Pull Day");
    assert_eq!(updated.user_weight, Some(80.0));
    assert_eq!(updated.notes, Some("original".into()));

    // An explicit null clears; absence leaves the rest alone
    let request: UpdateWorkoutRequest = serde_json::from_str(r#"{"notes": null}"#).unwrap();
    let cleared = manager
        .update(workout.id, user_id, &request)
        .await
        .unwrap()
        .unwrap();

    assert!(cleared.notes.is_none());
    assert_eq!(cleared.user_weight, Some(80.0));
    assert_eq!(cleared.sleep_score, Some(75));
}

#[tokio::test]
async fn test_start_stamps_time_and_activates_first_set() {
    let (db, user_id) = setup().await;
    let manager = workouts_manager(&db);
    let sets = SetsManager::new(db.pool().clone());

    let workout = manager
        .create(user_id, &workout_request("Leg Day"))
        .await
        .unwrap();
    let first = sets
        .create(
            workout.id,
            &CreateSetRequest {
                exercise_name: "Squat".into(),
                set_type: None,
                loading: None,
                reps: Some(5),
                focus: None,
                rest: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    let now = Utc::now();
    let started = manager.start(workout.id, user_id, now).await.unwrap().unwrap();
    sets.refresh_active(workout.id, now).await.unwrap();

    assert_eq!(started.start_time, Some(now));

    let stored = sets.list_for_workout(workout.id).await.unwrap();
    assert!(stored[0].is_active_set);
    assert_eq!(stored[0].id, first.id);
    assert_eq!(stored[0].set_start_time, Some(now));
}

#[tokio::test]
async fn test_restart_keeps_original_start_time() {
    let (db, user_id) = setup().await;
    let manager = workouts_manager(&db);

    let workout = manager
        .create(user_id, &workout_request("Leg Day"))
        .await
        .unwrap();

    let first_start = Utc::now();
    manager.start(workout.id, user_id, first_start).await.unwrap();

    let later = first_start + Duration::minutes(5);
    let restarted = manager.start(workout.id, user_id, later).await.unwrap().unwrap();
    assert_eq!(restarted.start_time, Some(first_start));
}

#[tokio::test]
async fn test_complete_computes_duration() {
    let (db, user_id) = setup().await;
    let manager = workouts_manager(&db);

    let workout = manager
        .create(user_id, &workout_request("Leg Day"))
        .await
        .unwrap();

    let start = Utc::now();
    manager.start(workout.id, user_id, start).await.unwrap();

    let end = start + Duration::seconds(3600);
    let completed = manager
        .complete(workout.id, user_id, end)
        .await
        .unwrap()
        .unwrap();

    assert!(completed.complete);
    assert_eq!(completed.duration, Some(3600));
}

#[tokio::test]
async fn test_complete_requires_started_workout() {
    let (db, user_id) = setup().await;
    let manager = workouts_manager(&db);

    let workout = manager
        .create(user_id, &workout_request("Leg Day"))
        .await
        .unwrap();

    let err = manager
        .complete(workout.id, user_id, Utc::now())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidState);
}

#[tokio::test]
async fn test_complete_rejects_already_complete_workout() {
    let (db, user_id) = setup().await;
    let manager = workouts_manager(&db);

    let workout = manager
        .create(user_id, &workout_request("Leg Day"))
        .await
        .unwrap();

    let start = Utc::now();
    manager.start(workout.id, user_id, start).await.unwrap();
    manager.complete(workout.id, user_id, start).await.unwrap();

    let err = manager
        .complete(workout.id, user_id, start)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidState);
}

#[tokio::test]
async fn test_duplicate_copies_structure_not_progress() {
    let (db, user_id) = setup().await;
    let manager = workouts_manager(&db);
    let sets = SetsManager::new(db.pool().clone());

    let workout = manager
        .create(
            user_id,
            &CreateWorkoutRequest {
                workout_name: "Leg Day".into(),
                date: Some("2026-01-05".parse().unwrap()),
                user_weight: Some(82.0),
                sleep_score: Some(90),
                sleep_quality: Some("good".into()),
                notes: Some("heavy triples".into()),
            },
        )
        .await
        .unwrap();

    for exercise in ["Squat", "Squat", "Lunge"] {
        sets.create(
            workout.id,
            &CreateSetRequest {
                exercise_name: exercise.into(),
                set_type: None,
                loading: Some(120.0),
                reps: Some(3),
                focus: None,
                rest: Some(180),
                notes: None,
            },
        )
        .await
        .unwrap();
    }

    // Run the original through its lifecycle so there is progress to not copy
    let start = Utc::now();
    manager.start(workout.id, user_id, start).await.unwrap();
    let originals = sets.list_for_workout(workout.id).await.unwrap();
    sets.toggle_complete(originals[0].id, start).await.unwrap();

    let copy = manager.duplicate(workout.id, user_id).await.unwrap().unwrap();

    assert_eq!(copy.workout_name, "Leg Day (Copy)");
    assert_eq!(copy.date, Utc::now().date_naive());
    assert_eq!(copy.notes, Some("heavy triples".into()));
    assert!(copy.user_weight.is_none());
    assert!(copy.sleep_score.is_none());
    assert!(copy.start_time.is_none());
    assert!(!copy.complete);

    let copied = sets.list_for_workout(copy.id).await.unwrap();
    assert_eq!(copied.len(), 3);
    let originals = sets.list_for_workout(workout.id).await.unwrap();
    for (copied_set, original_set) in copied.iter().zip(&originals) {
        assert_eq!(copied_set.exercise_name, original_set.exercise_name);
        assert_eq!(copied_set.set_order, original_set.set_order);
        assert_eq!(copied_set.set_number, original_set.set_number);
        assert_eq!(copied_set.loading, original_set.loading);
        assert_eq!(copied_set.rest, original_set.rest);
        assert_ne!(copied_set.id, original_set.id);
        assert!(!copied_set.complete);
        assert!(!copied_set.is_active_set);
        assert!(copied_set.set_start_time.is_none());
    }
}

#[tokio::test]
async fn test_delete_cascades_to_sets() {
    let (db, user_id) = setup().await;
    let manager = workouts_manager(&db);
    let sets = SetsManager::new(db.pool().clone());

    let workout = manager
        .create(user_id, &workout_request("Leg Day"))
        .await
        .unwrap();
    sets.create(
        workout.id,
        &CreateSetRequest {
            exercise_name: "Squat".into(),
            set_type: None,
            loading: None,
            reps: None,
            focus: None,
            rest: None,
            notes: None,
        },
    )
    .await
    .unwrap();

    assert!(manager.delete(workout.id, user_id).await.unwrap());

    let remaining = sets.list_for_workout(workout.id).await.unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn test_workouts_are_scoped_to_their_owner() {
    let (db, user_id) = setup().await;
    let manager = workouts_manager(&db);

    let workout = manager
        .create(user_id, &workout_request("Private Session"))
        .await
        .unwrap();

    let other = User::new("other".into(), "hash".into(), None);
    let other_id = db.create_user(&other).await.unwrap();

    assert!(manager.get(workout.id, other_id).await.unwrap().is_none());
    assert!(!manager.delete(workout.id, other_id).await.unwrap());
    assert!(manager
        .duplicate(workout.id, other_id)
        .await
        .unwrap()
        .is_none());
    assert!(manager.list(other_id).await.unwrap().is_empty());
}
