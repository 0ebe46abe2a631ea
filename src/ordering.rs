// ABOUTME: Pure set-sequencing core: renumbering plans, move arrangements, active-set selection
// ABOUTME: Computes explicit change plans over in-memory set collections; the store applies them
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Set Sequencer and Active-Set Tracker
//!
//! The ordering rules for one workout's set collection, expressed as pure
//! functions so they are auditable and testable in isolation from the store.
//!
//! - [`recompute`] restores the sequencing invariants after a structural
//!   change: `set_order` contiguous 1..N across the workout, `set_number`
//!   contiguous 1..M per exercise name, assigned in ascending `set_order`.
//! - [`plan_move`] computes the complete final arrangement for a manual move,
//!   so no automatic renumbering pass can overwrite it.
//! - [`select_active`] and [`select_active_after_skip`] decide which single
//!   incomplete set is up next and what its start time is, including the
//!   rest-timer offset after an adjacent completed set.
//!
//! Nothing here touches the database. [`crate::database::sets::SetsManager`]
//! applies the returned plans in single transactions.

use crate::errors::{AppError, AppResult};
use crate::models::SetDict;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// One row of a renumbering plan: the new ordering values for a set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderChange {
    /// Set to update
    pub id: Uuid,
    /// New global position within the workout
    pub set_order: i64,
    /// New position among sets of the same exercise
    pub set_number: i64,
}

/// The set to mark active and the start time it receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    /// Set to flag as the active set
    pub id: Uuid,
    /// Computed start time, rest offset already applied
    pub set_start_time: DateTime<Utc>,
}

/// Walk the collection in ascending `set_order` and assign fresh contiguous
/// `set_order` (1..N) and per-exercise `set_number` values.
///
/// Returns changes only for rows whose values differ, so applying the plan is
/// a no-op when the invariants already hold. The walk is a stable sort: sets
/// pushed beyond the maximum (a skipped set at N+1) land last and keep their
/// relative order otherwise.
#[must_use]
pub fn recompute(sets: &[SetDict]) -> Vec<OrderChange> {
    let mut ordered: Vec<&SetDict> = sets.iter().collect();
    ordered.sort_by_key(|s| s.set_order);

    renumber(&ordered)
        .into_iter()
        .zip(ordered)
        .filter(|(change, set)| {
            change.set_order != set.set_order || change.set_number != set.set_number
        })
        .map(|(change, _)| change)
        .collect()
}

/// Compute the final arrangement for moving one set to `target_position`.
///
/// All other sets keep their relative order and shift around the target slot;
/// the moved set is assigned exactly the target position. `set_number` values
/// are re-derived over the final arrangement. The returned plan is complete,
/// so the caller applies it as one atomic write with no follow-up recompute.
///
/// # Errors
///
/// Returns `ValueOutOfRange` when `target_position` is outside `[1, N]` and
/// `ResourceNotFound` when `set_id` is not in the collection.
pub fn plan_move(sets: &[SetDict], set_id: Uuid, target_position: i64) -> AppResult<Vec<OrderChange>> {
    let count = sets.len() as i64;
    if target_position < 1 || target_position > count {
        return Err(AppError::value_out_of_range(format!(
            "target position {target_position} outside [1, {count}]"
        ))
        .with_details(serde_json::json!({ "field": "target_position" })));
    }

    let moved = sets
        .iter()
        .find(|s| s.id == set_id)
        .ok_or_else(|| AppError::not_found("Set"))?;

    let mut others: Vec<&SetDict> = sets.iter().filter(|s| s.id != set_id).collect();
    others.sort_by_key(|s| s.set_order);

    // Sets before the target slot keep positions 1..target-1, the rest shift
    // one past it; the moved set takes the slot itself.
    let mut arranged: Vec<&SetDict> = Vec::with_capacity(sets.len());
    for (index, other) in others.iter().enumerate() {
        let position = index as i64 + 1;
        if position == target_position {
            arranged.push(moved);
        }
        arranged.push(other);
    }
    if arranged.len() < sets.len() {
        arranged.push(moved);
    }

    Ok(renumber(&arranged)
        .into_iter()
        .zip(arranged)
        .filter(|(change, set)| {
            change.set_order != set.set_order || change.set_number != set.set_number
        })
        .map(|(change, _)| change)
        .collect())
}

/// Assign contiguous positions and per-exercise counters over an arrangement
fn renumber(arranged: &[&SetDict]) -> Vec<OrderChange> {
    let mut per_exercise: HashMap<&str, i64> = HashMap::new();
    arranged
        .iter()
        .enumerate()
        .map(|(index, set)| {
            let counter = per_exercise.entry(set.exercise_name.as_str()).or_insert(0);
            *counter += 1;
            OrderChange {
                id: set.id,
                set_order: index as i64 + 1,
                set_number: *counter,
            }
        })
        .collect()
}

/// Decide which set becomes active after a workout start, completion toggle,
/// or move.
///
/// Returns `None` when no set may be active: the workout has not been started
/// or every set is complete. The caller clears `is_active_set` on all sets
/// either way, then applies the activation if one is returned.
///
/// The next set's start time is `now + rest` only when the most recently
/// completed set (highest `set_order` among complete sets) sits directly
/// before the next set and carries a nonzero rest duration; otherwise it
/// starts now.
#[must_use]
pub fn select_active(
    workout_start: Option<DateTime<Utc>>,
    sets: &[SetDict],
    now: DateTime<Utc>,
) -> Option<Activation> {
    workout_start?;

    let next = sets
        .iter()
        .filter(|s| !s.complete)
        .min_by_key(|s| s.set_order)?;

    let last_completed = sets
        .iter()
        .filter(|s| s.complete)
        .max_by_key(|s| s.set_order);

    let set_start_time = match last_completed {
        Some(prev) if prev.set_order == next.set_order - 1 => match prev.rest {
            Some(rest) if rest > 0 => now + Duration::seconds(rest),
            _ => now,
        },
        _ => now,
    };

    Some(Activation {
        id: next.id,
        set_start_time,
    })
}

/// Decide which set becomes active after an explicit skip.
///
/// The skipped set is excluded from candidacy and the successor starts
/// immediately: skipping always forfeits the rest delay, regardless of
/// adjacency. An unstarted workout still gets no active set.
#[must_use]
pub fn select_active_after_skip(
    workout_start: Option<DateTime<Utc>>,
    sets: &[SetDict],
    skipped_id: Uuid,
    now: DateTime<Utc>,
) -> Option<Activation> {
    workout_start?;

    let next = sets
        .iter()
        .filter(|s| !s.complete && s.id != skipped_id)
        .min_by_key(|s| s.set_order)?;

    Some(Activation {
        id: next.id,
        set_start_time: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_set(name: &str, set_order: i64, set_number: i64) -> SetDict {
        SetDict {
            id: Uuid::new_v4(),
            workout_id: Uuid::nil(),
            exercise_name: name.to_owned(),
            set_order,
            set_number,
            set_type: None,
            loading: None,
            reps: None,
            focus: None,
            rest: None,
            notes: None,
            complete: false,
            is_active_set: false,
            set_start_time: None,
            set_duration: None,
        }
    }

    fn apply(sets: &mut [SetDict], changes: &[OrderChange]) {
        for change in changes {
            let set = sets.iter_mut().find(|s| s.id == change.id).unwrap();
            set.set_order = change.set_order;
            set.set_number = change.set_number;
        }
    }

    fn orders(sets: &[SetDict]) -> Vec<i64> {
        let mut ordered: Vec<&SetDict> = sets.iter().collect();
        ordered.sort_by_key(|s| s.set_order);
        ordered.iter().map(|s| s.set_order).collect()
    }

    #[test]
    fn recompute_is_noop_when_invariants_hold() {
        let sets = vec![
            make_set("Squat", 1, 1),
            make_set("Squat", 2, 2),
            make_set("Squat", 3, 3),
        ];
        assert!(recompute(&sets).is_empty());
    }

    #[test]
    fn recompute_closes_gap_after_deletion() {
        // Three squat sets, the middle one deleted: remaining rows renumber
        // to order [1,2] and set_number [1,2]
        let sets = vec![make_set("Squat", 1, 1), make_set("Squat", 3, 3)];
        let changes = recompute(&sets);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].id, sets[1].id);
        assert_eq!(changes[0].set_order, 2);
        assert_eq!(changes[0].set_number, 2);
    }

    #[test]
    fn recompute_numbers_mixed_exercises_per_name() {
        // Squat, Bench, Squat created in that order -> set_numbers [1,1,2]
        let mut sets = vec![
            make_set("Squat", 1, 0),
            make_set("Bench", 2, 0),
            make_set("Squat", 3, 0),
        ];
        let changes = recompute(&sets);
        apply(&mut sets, &changes);
        assert_eq!(sets[0].set_number, 1);
        assert_eq!(sets[1].set_number, 1);
        assert_eq!(sets[2].set_number, 2);
        assert_eq!(orders(&sets), vec![1, 2, 3]);
    }

    #[test]
    fn recompute_lands_skipped_set_last() {
        // Skip pushed the first set to order 4 (beyond max of 3); the
        // renumbering settles to [1,2,3] with the skipped set last
        let mut sets = vec![
            make_set("Squat", 4, 1),
            make_set("Squat", 2, 2),
            make_set("Squat", 3, 3),
        ];
        let skipped = sets[0].id;
        let changes = recompute(&sets);
        apply(&mut sets, &changes);
        assert_eq!(orders(&sets), vec![1, 2, 3]);
        assert_eq!(sets.iter().find(|s| s.id == skipped).unwrap().set_order, 3);
    }

    #[test]
    fn plan_move_swaps_two_sets() {
        // Move position 1 to position 2 in a 2-set workout: the sets swap
        let mut sets = vec![make_set("Squat", 1, 1), make_set("Bench", 2, 1)];
        let moved = sets[0].id;
        let changes = plan_move(&sets, moved, 2).unwrap();
        apply(&mut sets, &changes);
        assert_eq!(sets[0].set_order, 2);
        assert_eq!(sets[1].set_order, 1);
    }

    #[test]
    fn plan_move_shifts_later_sets_past_target() {
        let mut sets = vec![
            make_set("Squat", 1, 1),
            make_set("Bench", 2, 1),
            make_set("Row", 3, 1),
            make_set("Curl", 4, 1),
        ];
        let moved = sets[3].id;
        let changes = plan_move(&sets, moved, 2).unwrap();
        apply(&mut sets, &changes);

        let mut ordered: Vec<&SetDict> = sets.iter().collect();
        ordered.sort_by_key(|s| s.set_order);
        let names: Vec<&str> = ordered.iter().map(|s| s.exercise_name.as_str()).collect();
        assert_eq!(names, vec!["Squat", "Curl", "Bench", "Row"]);
        assert_eq!(orders(&sets), vec![1, 2, 3, 4]);
    }

    #[test]
    fn plan_move_renumbers_per_exercise_over_final_arrangement() {
        let mut sets = vec![
            make_set("Squat", 1, 1),
            make_set("Squat", 2, 2),
            make_set("Bench", 3, 1),
        ];
        // Move the second squat after bench: the squat counters re-derive
        let moved = sets[1].id;
        let changes = plan_move(&sets, moved, 3).unwrap();
        apply(&mut sets, &changes);
        assert_eq!(sets[1].set_order, 3);
        assert_eq!(sets[1].set_number, 2);
        assert_eq!(sets[2].set_order, 2);
        assert_eq!(sets[2].set_number, 1);
    }

    #[test]
    fn plan_move_rejects_out_of_range_target() {
        let sets = vec![make_set("Squat", 1, 1), make_set("Bench", 2, 1)];
        assert!(plan_move(&sets, sets[0].id, 0).is_err());
        assert!(plan_move(&sets, sets[0].id, 3).is_err());
    }

    #[test]
    fn plan_move_rejects_unknown_set() {
        let sets = vec![make_set("Squat", 1, 1)];
        assert!(plan_move(&sets, Uuid::new_v4(), 1).is_err());
    }

    #[test]
    fn no_activation_before_workout_start() {
        let sets = vec![make_set("Squat", 1, 1)];
        assert!(select_active(None, &sets, Utc::now()).is_none());
        assert!(select_active_after_skip(None, &sets, Uuid::new_v4(), Utc::now()).is_none());
    }

    #[test]
    fn no_activation_when_all_sets_complete() {
        let mut sets = vec![make_set("Squat", 1, 1)];
        sets[0].complete = true;
        assert!(select_active(Some(Utc::now()), &sets, Utc::now()).is_none());
    }

    #[test]
    fn first_incomplete_set_becomes_active_without_rest() {
        let now = Utc::now();
        let sets = vec![make_set("Squat", 1, 1), make_set("Squat", 2, 2)];
        let activation = select_active(Some(now), &sets, now).unwrap();
        assert_eq!(activation.id, sets[0].id);
        assert_eq!(activation.set_start_time, now);
    }

    #[test]
    fn rest_offset_applies_when_previous_completed_set_is_adjacent() {
        let now = Utc::now();
        let mut sets = vec![make_set("Squat", 1, 1), make_set("Squat", 2, 2)];
        sets[0].complete = true;
        sets[0].rest = Some(60);
        let activation = select_active(Some(now), &sets, now).unwrap();
        assert_eq!(activation.id, sets[1].id);
        assert_eq!(activation.set_start_time, now + Duration::seconds(60));
    }

    #[test]
    fn rest_offset_skipped_when_completed_set_not_adjacent() {
        let now = Utc::now();
        let mut sets = vec![
            make_set("Squat", 1, 1),
            make_set("Squat", 2, 2),
            make_set("Squat", 3, 3),
        ];
        // The completed set is at order 3, the next incomplete at order 1:
        // not adjacent, so no rest offset even though rest is configured
        sets[2].complete = true;
        sets[2].rest = Some(90);
        let activation = select_active(Some(now), &sets, now).unwrap();
        assert_eq!(activation.id, sets[0].id);
        assert_eq!(activation.set_start_time, now);
    }

    #[test]
    fn rest_offset_skipped_when_rest_zero_or_unset() {
        let now = Utc::now();
        let mut sets = vec![make_set("Squat", 1, 1), make_set("Squat", 2, 2)];
        sets[0].complete = true;
        sets[0].rest = Some(0);
        let activation = select_active(Some(now), &sets, now).unwrap();
        assert_eq!(activation.set_start_time, now);
    }

    #[test]
    fn skip_activates_successor_immediately() {
        let now = Utc::now();
        let mut sets = vec![make_set("Squat", 1, 1), make_set("Squat", 2, 2)];
        // Even with a rest configured on a completed adjacent set, skipping
        // forfeits the delay
        sets[0].rest = Some(120);
        let activation = select_active_after_skip(Some(now), &sets, sets[0].id, now).unwrap();
        assert_eq!(activation.id, sets[1].id);
        assert_eq!(activation.set_start_time, now);
    }

    #[test]
    fn skip_with_no_remaining_candidate_activates_nothing() {
        let now = Utc::now();
        let sets = vec![make_set("Squat", 1, 1)];
        assert!(select_active_after_skip(Some(now), &sets, sets[0].id, now).is_none());
    }
}
