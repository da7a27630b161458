//! Built-in parking simulation
//!
//! A standalone stand-in for a full traffic engine. It implements
//! [`SimulationOracle`](crate::oracle::SimulationOracle), so the bridge can
//! be run and tested without an external simulator.

mod types;
mod vehicle;
mod world;

pub use types::{Purpose, SimArea, VehiclePhase, ENTRY_POSITION};
pub use vehicle::{SimVehicle, VehicleUpdateResult};
pub use world::SimParkingWorld;
