//! Parking space allocation
//!
//! Tracks which space index of each parking area is held by which vehicle
//! so the visualisation receives stable slot numbers. For every area the
//! free pool and the assigned indices together always partition
//! `[0, capacity)`.

use log::debug;
use sorted_vec::SortedVec;
use std::collections::HashMap;
use thiserror::Error;

use crate::config::ParkingCapacities;

/// A single space inside a parking area
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParkingSpot {
    pub area_id: String,
    pub index: usize,
}

impl ParkingSpot {
    pub fn new(area_id: impl Into<String>, index: usize) -> Self {
        Self {
            area_id: area_id.into(),
            index,
        }
    }
}

/// Why a reservation could not be made
///
/// A failed reservation never changes tracker state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReserveError {
    #[error("parking area {0} is not configured")]
    UnknownArea(String),

    #[error("parking area {0} has no free space")]
    Exhausted(String),

    #[error("vehicle {vehicle} already holds space {} in {}", .spot.index, .spot.area_id)]
    AlreadyAssigned { vehicle: String, spot: ParkingSpot },
}

/// Free indices of one area, kept in ascending order
#[derive(Debug, Clone)]
struct AreaPool {
    capacity: usize,
    free: SortedVec<usize>,
}

impl AreaPool {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            free: SortedVec::from_unsorted((0..capacity).collect()),
        }
    }

    /// Take the lowest free index
    fn take_lowest(&mut self) -> Option<usize> {
        if self.free.is_empty() {
            None
        } else {
            Some(self.free.remove_index(0))
        }
    }

    fn put_back(&mut self, index: usize) {
        debug_assert!(index < self.capacity);
        debug_assert!(self.free.binary_search(&index).is_err());
        self.free.insert(index);
    }
}

/// Allocator of parking space indices, keyed by area and vehicle
#[derive(Debug, Clone)]
pub struct ParkingTracker {
    pools: HashMap<String, AreaPool>,
    assignments: HashMap<String, ParkingSpot>,
}

impl ParkingTracker {
    pub fn new(capacities: &ParkingCapacities) -> Self {
        let pools = capacities
            .iter()
            .map(|(area_id, capacity)| (area_id.to_string(), AreaPool::new(capacity)))
            .collect();
        Self {
            pools,
            assignments: HashMap::new(),
        }
    }

    /// Assign the lowest free index of `area_id` to `vehicle_id`
    pub fn reserve(&mut self, vehicle_id: &str, area_id: &str) -> Result<usize, ReserveError> {
        if let Some(spot) = self.assignments.get(vehicle_id) {
            return Err(ReserveError::AlreadyAssigned {
                vehicle: vehicle_id.to_string(),
                spot: spot.clone(),
            });
        }

        let pool = self
            .pools
            .get_mut(area_id)
            .ok_or_else(|| ReserveError::UnknownArea(area_id.to_string()))?;
        let index = pool
            .take_lowest()
            .ok_or_else(|| ReserveError::Exhausted(area_id.to_string()))?;

        self.assignments
            .insert(vehicle_id.to_string(), ParkingSpot::new(area_id, index));
        debug!("Reserved {area_id}[{index}] for {vehicle_id}");
        Ok(index)
    }

    /// Free the space held by `vehicle_id`
    ///
    /// Returns `None` if the vehicle holds no space; nothing changes then.
    pub fn release(&mut self, vehicle_id: &str) -> Option<ParkingSpot> {
        let spot = self.assignments.remove(vehicle_id)?;
        if let Some(pool) = self.pools.get_mut(&spot.area_id) {
            pool.put_back(spot.index);
        }
        debug!("Released {}[{}] from {vehicle_id}", spot.area_id, spot.index);
        Some(spot)
    }

    pub fn is_assigned(&self, vehicle_id: &str) -> bool {
        self.assignments.contains_key(vehicle_id)
    }

    pub fn assignment(&self, vehicle_id: &str) -> Option<&ParkingSpot> {
        self.assignments.get(vehicle_id)
    }

    pub fn capacity(&self, area_id: &str) -> Option<usize> {
        self.pools.get(area_id).map(|pool| pool.capacity)
    }

    /// Free indices of an area in ascending order
    pub fn free_indices(&self, area_id: &str) -> Option<&[usize]> {
        self.pools.get(area_id).map(|pool| &pool.free[..])
    }

    pub fn free_count(&self, area_id: &str) -> Option<usize> {
        self.pools.get(area_id).map(|pool| pool.free.len())
    }

    /// Number of active assignments across all areas
    pub fn occupied_count(&self) -> usize {
        self.assignments.len()
    }

    /// Vehicles currently holding a space in `area_id`
    pub fn occupants<'a>(&'a self, area_id: &'a str) -> impl Iterator<Item = (&'a str, usize)> + 'a {
        self.assignments
            .iter()
            .filter(move |(_, spot)| spot.area_id == area_id)
            .map(|(vehicle, spot)| (vehicle.as_str(), spot.index))
    }

    /// Configured area ids, sorted
    pub fn areas(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.pools.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
