//! Startup configuration for the bridge
//!
//! Everything here is read once at process start and never changes during
//! a run. The parking capacity table must mirror the capacities configured
//! in the simulation itself; a mismatch is a deployment error.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Port the visualisation listens on when nothing else is configured
pub const DEFAULT_PORT: u16 = 9000;

/// Host the visualisation runs on when nothing else is configured
pub const DEFAULT_HOST: &str = "localhost";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("parking area id must not be empty")]
    EmptyAreaId,

    #[error("parking area {0} must have a positive capacity")]
    ZeroCapacity(String),

    #[error("invalid simulation setting: {0}")]
    Simulation(String),
}

/// Static mapping from parking area id to capacity
///
/// Validated on construction: every id is non-empty and every capacity is
/// positive. Iteration order is sorted by area id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingCapacities {
    areas: BTreeMap<String, usize>,
}

impl ParkingCapacities {
    pub fn new<I, S>(areas: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        let mut table = BTreeMap::new();
        for (id, capacity) in areas {
            let id = id.into();
            if id.is_empty() {
                return Err(ConfigError::EmptyAreaId);
            }
            if capacity == 0 {
                return Err(ConfigError::ZeroCapacity(id));
            }
            table.insert(id, capacity);
        }
        Ok(Self { areas: table })
    }

    pub fn get(&self, area_id: &str) -> Option<usize> {
        self.areas.get(area_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.areas.iter().map(|(id, capacity)| (id.as_str(), *capacity))
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Sum of all capacities
    pub fn total(&self) -> usize {
        self.areas.values().sum()
    }
}

impl Default for ParkingCapacities {
    /// The four areas of the reference parking lot scenario
    fn default() -> Self {
        let areas = [("pa_0", 4), ("pa_1", 4), ("pa_2", 3), ("pa_3", 2)]
            .into_iter()
            .map(|(id, capacity)| (id.to_string(), capacity))
            .collect();
        Self { areas }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub host: String,
    pub port: u16,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Parameters of the built-in parking simulation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for reproducible runs; a random seed is used when absent
    pub seed: Option<u64>,
    /// Chance that a new vehicle enters the network on a given tick
    pub spawn_probability: f64,
    /// Chance that a new vehicle makes a roadside stop instead of parking
    pub roadside_stop_probability: f64,
    pub min_travel_ticks: u32,
    pub max_travel_ticks: u32,
    pub min_dwell_ticks: u32,
    pub max_dwell_ticks: u32,
    /// Upper bound on vehicles present at once
    pub max_vehicles: usize,
    pub vehicle_types: Vec<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            spawn_probability: 0.35,
            roadside_stop_probability: 0.15,
            min_travel_ticks: 3,
            max_travel_ticks: 8,
            min_dwell_ticks: 5,
            max_dwell_ticks: 20,
            max_vehicles: 40,
            vehicle_types: vec!["passenger".to_string(), "delivery".to_string()],
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Simulation(msg));

        for (name, p) in [
            ("spawn_probability", self.spawn_probability),
            ("roadside_stop_probability", self.roadside_stop_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("{name} must be within [0, 1], got {p}"));
            }
        }
        if self.min_travel_ticks == 0 || self.min_dwell_ticks == 0 {
            return invalid("travel and dwell ticks must be at least 1".to_string());
        }
        if self.min_travel_ticks > self.max_travel_ticks {
            return invalid(format!(
                "min_travel_ticks ({}) exceeds max_travel_ticks ({})",
                self.min_travel_ticks, self.max_travel_ticks
            ));
        }
        if self.min_dwell_ticks > self.max_dwell_ticks {
            return invalid(format!(
                "min_dwell_ticks ({}) exceeds max_dwell_ticks ({})",
                self.min_dwell_ticks, self.max_dwell_ticks
            ));
        }
        if self.vehicle_types.is_empty() {
            return invalid("vehicle_types must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Stop after this many ticks; run until interrupted when absent
    pub max_ticks: Option<u64>,
    /// Wall-clock pause between ticks so the visualisation can keep up
    pub step_delay_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_ticks: None,
            step_delay_ms: 100,
        }
    }
}

/// On-disk layout of the configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    transport: TransportConfig,
    parking_areas: Option<BTreeMap<String, usize>>,
    simulation: SimulationConfig,
    run: RunConfig,
}

/// Complete, validated bridge configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BridgeConfig {
    pub transport: TransportConfig,
    pub parking: ParkingCapacities,
    pub simulation: SimulationConfig,
    pub run: RunConfig,
}

impl BridgeConfig {
    /// Parse and validate a TOML document
    ///
    /// `origin` only names the source in error messages.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;

        let parking = match raw.parking_areas {
            Some(areas) => ParkingCapacities::new(areas)?,
            None => ParkingCapacities::default(),
        };
        raw.simulation.validate()?;

        Ok(Self {
            transport: raw.transport,
            parking,
            simulation: raw.simulation,
            run: raw.run,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: origin.clone(),
            source,
        })?;
        Self::from_toml_str(&text, &origin)
    }

    /// Load from `path` if given, otherwise fall back to the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
