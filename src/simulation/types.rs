//! Core types for the built-in parking simulation

use crate::oracle::StopDescriptor;
use crate::types::Position;

/// Where a driving vehicle is heading and what it does on arrival
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    /// Park in the area with this index
    Park(usize),
    /// Stop briefly on the lane
    Roadside,
    /// Leave the network
    Exit,
}

/// What a vehicle is doing right now
#[derive(Debug, Clone, PartialEq)]
pub enum VehiclePhase {
    Driving {
        from: Position,
        to: Position,
        elapsed: u32,
        duration: u32,
        purpose: Purpose,
    },
    Parked {
        area: usize,
        remaining: u32,
    },
    RoadsideStop {
        remaining: u32,
    },
}

/// A parking area as the simulation sees it
#[derive(Debug, Clone)]
pub struct SimArea {
    pub id: String,
    pub capacity: usize,
    pub position: Position,
    /// Vehicles physically parked here
    pub occupied: usize,
}

impl SimArea {
    pub fn has_room(&self) -> bool {
        self.occupied < self.capacity
    }

    pub fn stop(&self) -> StopDescriptor {
        StopDescriptor::at(self.id.as_str())
    }
}

/// Where vehicles enter the network
pub const ENTRY_POSITION: Position = Position {
    x: 0.0,
    y: 0.0,
    z: None,
};

/// Spacing between parking areas along the road
pub const AREA_SPACING: f64 = 30.0;

/// Lateral offset of parking areas from the road
pub const AREA_OFFSET: f64 = 20.0;

/// Ticks a roadside stop lasts
pub const ROADSIDE_STOP_TICKS: u32 = 1;
