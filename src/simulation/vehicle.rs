//! Vehicle movement and stop logic for the built-in simulation

use super::types::{Purpose, VehiclePhase};
use crate::oracle::StopDescriptor;
use crate::types::Position;

/// Result of a vehicle update indicating what the world has to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleUpdateResult {
    Continue,                // Still driving or still stopped
    Arrived(Purpose),        // Reached the end of the current leg
    StopEnded,               // Stop duration is over
}

/// A vehicle in the parking simulation
#[derive(Debug, Clone)]
pub struct SimVehicle {
    pub id: String,
    pub vehicle_type: String,
    pub position: Position,
    pub phase: VehiclePhase,
    /// Current stop first; empty while driving
    pub stops: Vec<StopDescriptor>,
}

impl SimVehicle {
    pub fn new(
        id: String,
        vehicle_type: String,
        position: Position,
        to: Position,
        duration: u32,
        purpose: Purpose,
    ) -> Self {
        Self {
            id,
            vehicle_type,
            position,
            phase: VehiclePhase::Driving {
                from: position,
                to,
                elapsed: 0,
                duration: duration.max(1),
                purpose,
            },
            stops: Vec::new(),
        }
    }

    /// Advance the vehicle by one tick
    pub fn update(&mut self) -> VehicleUpdateResult {
        match &mut self.phase {
            VehiclePhase::Driving {
                from,
                to,
                elapsed,
                duration,
                purpose,
            } => {
                *elapsed += 1;
                let t = f64::from(*elapsed) / f64::from(*duration);
                self.position = from.lerp(to, t.min(1.0));
                if *elapsed >= *duration {
                    VehicleUpdateResult::Arrived(*purpose)
                } else {
                    VehicleUpdateResult::Continue
                }
            }
            VehiclePhase::Parked { remaining, .. } | VehiclePhase::RoadsideStop { remaining } => {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    VehicleUpdateResult::StopEnded
                } else {
                    VehicleUpdateResult::Continue
                }
            }
        }
    }

    /// Start a new leg from the current position
    pub fn drive_to(&mut self, to: Position, duration: u32, purpose: Purpose) {
        self.stops.clear();
        self.phase = VehiclePhase::Driving {
            from: self.position,
            to,
            elapsed: 0,
            duration: duration.max(1),
            purpose,
        };
    }

    pub fn park(&mut self, area: usize, stop: StopDescriptor, dwell: u32) {
        self.stops = vec![stop];
        self.phase = VehiclePhase::Parked {
            area,
            remaining: dwell.max(1),
        };
    }

    pub fn stop_roadside(&mut self, duration: u32) {
        self.stops = vec![StopDescriptor::roadside()];
        self.phase = VehiclePhase::RoadsideStop {
            remaining: duration.max(1),
        };
    }

    /// Area the vehicle is parked in, if any
    pub fn parked_area(&self) -> Option<usize> {
        match self.phase {
            VehiclePhase::Parked { area, .. } => Some(area),
            _ => None,
        }
    }
}
