//! Interface to the traffic simulation engine
//!
//! The bridge only advances the simulation and queries it; it never
//! changes the simulated world. Event lists refer to the most recent tick.

use thiserror::Error;

use crate::types::Position;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("failed to advance the simulation: {0}")]
    Advance(String),

    #[error("{query} query failed: {reason}")]
    Query { query: &'static str, reason: String },

    #[error("vehicle {0} is not known to the simulation")]
    UnknownVehicle(String),

    #[error("the simulation has been shut down")]
    Closed,
}

pub type OracleResult<T> = Result<T, OracleError>;

/// A scheduled or active stop of a vehicle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopDescriptor {
    /// Id of the stopping place (parking area) the stop is at; empty for
    /// stops on a plain lane
    pub stopping_place_id: String,
}

impl StopDescriptor {
    pub fn at(stopping_place_id: impl Into<String>) -> Self {
        Self {
            stopping_place_id: stopping_place_id.into(),
        }
    }

    pub fn roadside() -> Self {
        Self {
            stopping_place_id: String::new(),
        }
    }
}

/// The simulation engine as seen by the bridge
///
/// All methods take `&mut self` so implementations backed by a remote
/// connection can perform I/O on every query.
pub trait SimulationOracle {
    /// Advance the simulation by exactly one tick, blocking until done
    fn advance_tick(&mut self) -> OracleResult<()>;

    /// Vehicles that entered the network during the last tick
    fn departed(&mut self) -> OracleResult<Vec<String>>;

    /// Vehicles that started parking during the last tick
    fn parking_started(&mut self) -> OracleResult<Vec<String>>;

    /// Vehicles whose stop (of any kind) ended during the last tick
    fn stop_ended(&mut self) -> OracleResult<Vec<String>>;

    fn vehicle_type(&mut self, vehicle_id: &str) -> OracleResult<String>;

    fn vehicle_position(&mut self, vehicle_id: &str) -> OracleResult<Position>;

    /// Stops of the vehicle, the current one first
    fn active_stops(&mut self, vehicle_id: &str) -> OracleResult<Vec<StopDescriptor>>;

    /// Close the simulation; no further calls are valid afterwards
    fn shutdown(&mut self) -> OracleResult<()>;
}
