//! Parking space allocation tests

use parking_bridge::config::ParkingCapacities;
use parking_bridge::parking::{ParkingSpot, ParkingTracker, ReserveError};

fn tracker_with(areas: &[(&str, usize)]) -> ParkingTracker {
    let capacities = ParkingCapacities::new(areas.iter().map(|(id, c)| (*id, *c)))
        .expect("valid capacities");
    ParkingTracker::new(&capacities)
}

/// Free pool and assignments of an area must exactly cover [0, capacity)
fn assert_partition(tracker: &ParkingTracker, area_id: &str) {
    let capacity = tracker.capacity(area_id).expect("area exists");
    let free = tracker.free_indices(area_id).expect("area exists");
    let mut assigned: Vec<usize> = tracker.occupants(area_id).map(|(_, index)| index).collect();
    assigned.sort_unstable();

    assert!(free.windows(2).all(|w| w[0] < w[1]), "free pool not sorted: {free:?}");
    assert_eq!(free.len() + assigned.len(), capacity);
    for index in &assigned {
        assert!(!free.contains(index), "index {index} both free and assigned");
    }
    let mut all: Vec<usize> = free.iter().copied().chain(assigned).collect();
    all.sort_unstable();
    assert_eq!(all, (0..capacity).collect::<Vec<_>>());
}

#[test]
fn test_new_tracker_has_full_pools() {
    let tracker = ParkingTracker::new(&ParkingCapacities::default());
    assert_eq!(tracker.areas(), vec!["pa_0", "pa_1", "pa_2", "pa_3"]);
    assert_eq!(tracker.free_indices("pa_2"), Some(&[0, 1, 2][..]));
    assert_eq!(tracker.capacity("pa_3"), Some(2));
    assert_eq!(tracker.occupied_count(), 0);
    assert_eq!(tracker.free_count("nope"), None);
}

#[test]
fn test_reserve_takes_lowest_free_index() {
    let mut tracker = tracker_with(&[("pa_1", 4)]);
    assert_eq!(tracker.reserve("a", "pa_1"), Ok(0));
    assert_eq!(tracker.reserve("b", "pa_1"), Ok(1));
    assert_eq!(tracker.reserve("c", "pa_1"), Ok(2));

    // Free {0, 2, 3} after releasing a and c
    tracker.release("a");
    tracker.release("c");
    assert_eq!(tracker.free_indices("pa_1"), Some(&[0, 2, 3][..]));
    assert_eq!(tracker.reserve("d", "pa_1"), Ok(0));
    assert_eq!(tracker.reserve("e", "pa_1"), Ok(2));
    assert_partition(&tracker, "pa_1");
}

#[test]
fn test_full_pool_rejects_without_side_effects() {
    let mut tracker = tracker_with(&[("pa_3", 2)]);
    assert_eq!(tracker.reserve("v1", "pa_3"), Ok(0));
    assert_eq!(tracker.reserve("v2", "pa_3"), Ok(1));

    let before = (tracker.free_indices("pa_3").map(<[usize]>::to_vec), tracker.occupied_count());
    assert_eq!(
        tracker.reserve("v3", "pa_3"),
        Err(ReserveError::Exhausted("pa_3".to_string()))
    );
    let after = (tracker.free_indices("pa_3").map(<[usize]>::to_vec), tracker.occupied_count());

    assert_eq!(before, after);
    assert!(!tracker.is_assigned("v3"));
    assert_partition(&tracker, "pa_3");
}

#[test]
fn test_unknown_area_is_rejected() {
    let mut tracker = tracker_with(&[("pa_0", 1)]);
    assert_eq!(
        tracker.reserve("v1", "pa_9"),
        Err(ReserveError::UnknownArea("pa_9".to_string()))
    );
    assert!(!tracker.is_assigned("v1"));
    assert_eq!(tracker.free_count("pa_0"), Some(1));
}

#[test]
fn test_reserve_twice_for_same_vehicle_is_rejected() {
    let mut tracker = tracker_with(&[("pa_0", 2), ("pa_1", 2)]);
    assert_eq!(tracker.reserve("v1", "pa_0"), Ok(0));

    let err = tracker.reserve("v1", "pa_1").unwrap_err();
    assert_eq!(
        err,
        ReserveError::AlreadyAssigned {
            vehicle: "v1".to_string(),
            spot: ParkingSpot::new("pa_0", 0),
        }
    );
    assert_eq!(tracker.free_count("pa_1"), Some(2));
    assert_eq!(tracker.assignment("v1"), Some(&ParkingSpot::new("pa_0", 0)));
}

#[test]
fn test_round_trip_restores_pool() {
    let mut tracker = tracker_with(&[("pa_2", 3)]);
    tracker.reserve("other", "pa_2").unwrap();
    let before = tracker.free_indices("pa_2").unwrap().to_vec();

    let index = tracker.reserve("v", "pa_2").unwrap();
    assert_eq!(tracker.release("v"), Some(ParkingSpot::new("pa_2", index)));
    assert_eq!(tracker.free_indices("pa_2").unwrap(), before.as_slice());
}

#[test]
fn test_second_release_is_not_found() {
    let mut tracker = tracker_with(&[("pa_1", 2)]);
    tracker.reserve("v", "pa_1").unwrap();
    tracker.reserve("w", "pa_1").unwrap();

    assert_eq!(tracker.release("v"), Some(ParkingSpot::new("pa_1", 0)));
    let pool = tracker.free_indices("pa_1").unwrap().to_vec();

    assert_eq!(tracker.release("v"), None);
    assert_eq!(tracker.free_indices("pa_1").unwrap(), pool.as_slice());
    assert_eq!(tracker.occupied_count(), 1);
}

#[test]
fn test_release_of_unknown_vehicle_is_not_found() {
    let mut tracker = tracker_with(&[("pa_1", 2)]);
    assert_eq!(tracker.release("ghost"), None);
    assert_eq!(tracker.free_count("pa_1"), Some(2));
}

#[test]
fn test_capacity_invariant_over_mixed_sequence() {
    let mut tracker = tracker_with(&[("a", 3), ("b", 2)]);
    let ops: &[(&str, Option<&str>)] = &[
        ("v1", Some("a")),
        ("v2", Some("a")),
        ("v3", Some("b")),
        ("v1", None),
        ("v4", Some("a")),
        ("v5", Some("a")),
        ("v6", Some("a")),
        ("v3", None),
        ("v7", Some("b")),
        ("v8", Some("b")),
        ("v9", Some("b")),
        ("v2", None),
        ("v2", None),
        ("v10", Some("a")),
    ];

    for (vehicle, target) in ops {
        match target {
            Some(area) => {
                let _ = tracker.reserve(vehicle, area);
            }
            None => {
                tracker.release(vehicle);
            }
        }
        for area in ["a", "b"] {
            let occupied = tracker.occupants(area).count();
            let capacity = tracker.capacity(area).unwrap();
            assert_eq!(tracker.free_count(area), Some(capacity - occupied));
            assert_partition(&tracker, area);
        }
    }
}

#[test]
fn test_released_index_is_reused() {
    let mut tracker = tracker_with(&[("pa_1", 4)]);
    assert_eq!(tracker.reserve("v1", "pa_1"), Ok(0));
    tracker.release("v1");
    assert_eq!(tracker.reserve("v2", "pa_1"), Ok(0));
}
