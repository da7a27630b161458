//! Main simulation world that ties everything together
//!
//! A small parking lot road: vehicles enter at one end, drive to a parking
//! area (or make a roadside stop), dwell, and leave at the far end. It
//! answers the same queries a full traffic engine would, so the bridge can
//! run without one.

use log::debug;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap};

use super::types::{
    Purpose, SimArea, AREA_OFFSET, AREA_SPACING, ENTRY_POSITION, ROADSIDE_STOP_TICKS,
};
use super::vehicle::{SimVehicle, VehicleUpdateResult};
use crate::config::{ParkingCapacities, SimulationConfig};
use crate::oracle::{OracleError, OracleResult, SimulationOracle, StopDescriptor};
use crate::types::Position;

/// The built-in parking simulation
pub struct SimParkingWorld {
    config: SimulationConfig,

    /// Parking areas in id order
    areas: Vec<SimArea>,

    /// Active vehicles keyed by spawn sequence, so iteration follows
    /// insertion order
    vehicles: BTreeMap<u64, SimVehicle>,

    /// Vehicle id to spawn sequence
    index: HashMap<String, u64>,

    /// Next spawn sequence number
    next_id: u64,

    exit: Position,
    tick: u64,

    departed: Vec<String>,
    parking_started: Vec<String>,
    stop_ended: Vec<String>,
    arrived: Vec<String>,

    /// Areas whose space is vacated at the start of the next tick
    vacating: Vec<usize>,

    rng: StdRng,
    closed: bool,
}

impl SimParkingWorld {
    pub fn new(config: &SimulationConfig, capacities: &ParkingCapacities) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let areas: Vec<SimArea> = capacities
            .iter()
            .enumerate()
            .map(|(i, (id, capacity))| {
                let side = if i % 2 == 0 { AREA_OFFSET } else { -AREA_OFFSET };
                SimArea {
                    id: id.to_string(),
                    capacity,
                    position: Position::planar(AREA_SPACING * (i + 1) as f64, side),
                    occupied: 0,
                }
            })
            .collect();
        let exit = Position::planar(AREA_SPACING * (areas.len() + 1) as f64, 0.0);

        Self {
            config: config.clone(),
            areas,
            vehicles: BTreeMap::new(),
            index: HashMap::new(),
            next_id: 0,
            exit,
            tick: 0,
            departed: Vec::new(),
            parking_started: Vec::new(),
            stop_ended: Vec::new(),
            arrived: Vec::new(),
            vacating: Vec::new(),
            rng,
            closed: false,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    /// Vehicles that reached the exit during the last tick
    pub fn arrived(&self) -> &[String] {
        &self.arrived
    }

    /// Vehicles physically parked in the area
    pub fn occupied(&self, area_id: &str) -> Option<usize> {
        self.areas
            .iter()
            .find(|area| area.id == area_id)
            .map(|area| area.occupied)
    }

    pub fn vehicle(&self, vehicle_id: &str) -> Option<&SimVehicle> {
        self.index
            .get(vehicle_id)
            .and_then(|key| self.vehicles.get(key))
    }

    pub fn summary(&self) -> String {
        let parked: usize = self.areas.iter().map(|area| area.occupied).sum();
        format!(
            "Tick: {} | Vehicles: {} | Parked: {}",
            self.tick,
            self.vehicles.len(),
            parked
        )
    }

    fn travel_ticks(&mut self) -> u32 {
        self.rng
            .random_range(self.config.min_travel_ticks..=self.config.max_travel_ticks)
    }

    fn dwell_ticks(&mut self) -> u32 {
        self.rng
            .random_range(self.config.min_dwell_ticks..=self.config.max_dwell_ticks)
    }

    fn roadside_position(&self) -> Position {
        Position::planar(self.exit.x / 2.0, -AREA_OFFSET / 4.0)
    }

    fn checked(&self) -> OracleResult<()> {
        if self.closed {
            Err(OracleError::Closed)
        } else {
            Ok(())
        }
    }

    fn lookup(&self, vehicle_id: &str) -> OracleResult<&SimVehicle> {
        self.checked()?;
        self.vehicle(vehicle_id)
            .ok_or_else(|| OracleError::UnknownVehicle(vehicle_id.to_string()))
    }

    fn update_vehicles(&mut self) {
        let keys: Vec<u64> = self.vehicles.keys().copied().collect();

        for key in keys {
            let Some(result) = self.vehicles.get_mut(&key).map(SimVehicle::update) else {
                continue;
            };

            match result {
                VehicleUpdateResult::Continue => {}
                VehicleUpdateResult::Arrived(purpose) => self.handle_arrival(key, purpose),
                VehicleUpdateResult::StopEnded => self.handle_stop_end(key),
            }
        }
    }

    fn handle_arrival(&mut self, key: u64, purpose: Purpose) {
        match purpose {
            Purpose::Park(area) => {
                if self.areas[area].has_room() {
                    let dwell = self.dwell_ticks();
                    self.areas[area].occupied += 1;
                    let stop = self.areas[area].stop();
                    if let Some(vehicle) = self.vehicles.get_mut(&key) {
                        vehicle.park(area, stop, dwell);
                        self.parking_started.push(vehicle.id.clone());
                    }
                } else {
                    let travel = self.travel_ticks();
                    let exit = self.exit;
                    if let Some(vehicle) = self.vehicles.get_mut(&key) {
                        debug!("{} is full, {} drives on", self.areas[area].id, vehicle.id);
                        vehicle.drive_to(exit, travel, Purpose::Exit);
                    }
                }
            }
            Purpose::Roadside => {
                if let Some(vehicle) = self.vehicles.get_mut(&key) {
                    vehicle.stop_roadside(ROADSIDE_STOP_TICKS);
                }
            }
            Purpose::Exit => {
                if let Some(vehicle) = self.vehicles.remove(&key) {
                    self.index.remove(&vehicle.id);
                    self.arrived.push(vehicle.id);
                }
            }
        }
    }

    fn handle_stop_end(&mut self, key: u64) {
        let travel = self.travel_ticks();
        let exit = self.exit;
        let Some(vehicle) = self.vehicles.get_mut(&key) else {
            return;
        };

        // The space only frees up next tick, after the end has been reported
        if let Some(area) = vehicle.parked_area() {
            self.vacating.push(area);
        }
        self.stop_ended.push(vehicle.id.clone());
        vehicle.drive_to(exit, travel, Purpose::Exit);
    }

    fn maybe_spawn(&mut self) {
        if self.vehicles.len() >= self.config.max_vehicles {
            return;
        }
        if !self.rng.random_bool(self.config.spawn_probability) {
            return;
        }

        let vehicle_type = match self.config.vehicle_types.choose(&mut self.rng) {
            Some(vehicle_type) => vehicle_type.clone(),
            None => return,
        };

        let (purpose, target) = if self.areas.is_empty()
            || self.rng.random_bool(self.config.roadside_stop_probability)
        {
            (Purpose::Roadside, self.roadside_position())
        } else {
            let area = self.rng.random_range(0..self.areas.len());
            (Purpose::Park(area), self.areas[area].position)
        };
        let travel = self.travel_ticks();

        let key = self.next_id;
        self.next_id += 1;
        let id = format!("veh_{key}");

        let vehicle = SimVehicle::new(
            id.clone(),
            vehicle_type,
            ENTRY_POSITION,
            target,
            travel,
            purpose,
        );
        self.vehicles.insert(key, vehicle);
        self.index.insert(id.clone(), key);
        self.departed.push(id);
    }
}

impl SimulationOracle for SimParkingWorld {
    fn advance_tick(&mut self) -> OracleResult<()> {
        self.checked()?;

        self.departed.clear();
        self.parking_started.clear();
        self.stop_ended.clear();
        self.arrived.clear();

        for area in std::mem::take(&mut self.vacating) {
            self.areas[area].occupied = self.areas[area].occupied.saturating_sub(1);
        }

        self.tick += 1;
        self.update_vehicles();
        self.maybe_spawn();
        Ok(())
    }

    fn departed(&mut self) -> OracleResult<Vec<String>> {
        self.checked()?;
        Ok(self.departed.clone())
    }

    fn parking_started(&mut self) -> OracleResult<Vec<String>> {
        self.checked()?;
        Ok(self.parking_started.clone())
    }

    fn stop_ended(&mut self) -> OracleResult<Vec<String>> {
        self.checked()?;
        Ok(self.stop_ended.clone())
    }

    fn vehicle_type(&mut self, vehicle_id: &str) -> OracleResult<String> {
        self.lookup(vehicle_id).map(|vehicle| vehicle.vehicle_type.clone())
    }

    fn vehicle_position(&mut self, vehicle_id: &str) -> OracleResult<Position> {
        self.lookup(vehicle_id).map(|vehicle| vehicle.position)
    }

    fn active_stops(&mut self, vehicle_id: &str) -> OracleResult<Vec<StopDescriptor>> {
        self.lookup(vehicle_id).map(|vehicle| vehicle.stops.clone())
    }

    fn shutdown(&mut self) -> OracleResult<()> {
        self.checked()?;
        self.closed = true;
        debug!("Simulation closed at tick {}", self.tick);
        Ok(())
    }
}
