//! Tick loop that turns simulation events into visualisation messages
//!
//! Every tick runs three phases in a fixed order: departures, parking
//! starts, stop ends. Within a phase, vehicles are handled in the order
//! the simulation reports them, and each message is written before the
//! next event is looked at.

use log::{debug, error, info, trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::error::{BridgeError, BridgeResult};
use super::message::OutboundMessage;
use crate::oracle::SimulationOracle;
use crate::parking::{ParkingSpot, ParkingTracker};
use crate::stats::BridgeStats;
use crate::transport::Transport;

/// Lifecycle of a bridge
///
/// `Idle -> Connected -> Running -> Stopped`; nothing leaves `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Idle,
    Connected,
    Running,
    Stopped,
}

/// What a single tick produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub departed: usize,
    pub parked: usize,
    pub unparked: usize,
    /// Parking starts that did not result in a message
    pub parks_skipped: usize,
}

impl TickReport {
    pub fn messages_sent(&self) -> usize {
        self.departed + self.parked + self.unparked
    }
}

/// Bounds for [`EventBridge::run`]
#[derive(Debug, Clone, Default)]
pub struct RunLimits {
    /// Stop after this many ticks of the run
    pub max_ticks: Option<u64>,
    /// Pause between ticks
    pub step_delay: Duration,
}

/// Relays simulation events to a visualisation while tracking parking spaces
pub struct EventBridge<O: SimulationOracle, T: Transport> {
    oracle: O,
    transport: Option<T>,
    tracker: ParkingTracker,
    state: BridgeState,
    tick: u64,
    stats: BridgeStats,
    /// Set once the oracle and transport have been closed
    released: bool,
}

impl<O: SimulationOracle, T: Transport> EventBridge<O, T> {
    pub fn new(oracle: O, tracker: ParkingTracker) -> Self {
        Self {
            oracle,
            transport: None,
            tracker,
            state: BridgeState::Idle,
            tick: 0,
            stats: BridgeStats::default(),
            released: false,
        }
    }

    /// Attach an established channel to the visualisation
    pub fn connect(&mut self, transport: T) -> BridgeResult<()> {
        match self.state {
            BridgeState::Idle => {
                self.transport = Some(transport);
                self.state = BridgeState::Connected;
                Ok(())
            }
            BridgeState::Stopped => Err(BridgeError::Stopped),
            BridgeState::Connected | BridgeState::Running => Err(BridgeError::AlreadyConnected),
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Number of ticks advanced so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn tracker(&self) -> &ParkingTracker {
        &self.tracker
    }

    pub fn stats(&self) -> &BridgeStats {
        &self.stats
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Advance the simulation one tick and send a message per event
    ///
    /// A transport, simulation or encoding failure stops the bridge; the
    /// caller is still expected to call [`EventBridge::shutdown`].
    pub fn step(&mut self) -> BridgeResult<TickReport> {
        match self.state {
            BridgeState::Idle => return Err(BridgeError::NotConnected),
            BridgeState::Stopped => return Err(BridgeError::Stopped),
            BridgeState::Connected => self.state = BridgeState::Running,
            BridgeState::Running => {}
        }

        let result = self.run_tick();
        if let Err(e) = &result {
            error!("Tick {} failed: {e}", self.tick);
            self.state = BridgeState::Stopped;
        }
        result
    }

    fn run_tick(&mut self) -> BridgeResult<TickReport> {
        self.oracle.advance_tick()?;
        self.tick += 1;
        self.stats.ticks += 1;

        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };
        self.send_departures(&mut report)?;
        self.send_parking_starts(&mut report)?;
        self.send_stop_ends(&mut report)?;
        Ok(report)
    }

    fn send_departures(&mut self, report: &mut TickReport) -> BridgeResult<()> {
        for id in self.oracle.departed()? {
            let vehicle_type = self.oracle.vehicle_type(&id)?;
            let position = self.oracle.vehicle_position(&id)?;
            self.emit(OutboundMessage::Depart {
                id,
                vehicle_type,
                position,
            })?;
            report.departed += 1;
            self.stats.departures_sent += 1;
        }
        Ok(())
    }

    fn send_parking_starts(&mut self, report: &mut TickReport) -> BridgeResult<()> {
        for id in self.oracle.parking_started()? {
            let stops = self.oracle.active_stops(&id)?;
            let Some(stop) = stops.first() else {
                debug!("Vehicle {id} started parking without an active stop, skipping");
                report.parks_skipped += 1;
                self.stats.parks_without_stop += 1;
                continue;
            };
            let area_id = stop.stopping_place_id.clone();

            let index = match self.tracker.reserve(&id, &area_id) {
                Ok(index) => index,
                Err(e) => {
                    warn!("Skipping park of vehicle {id}: {e}");
                    report.parks_skipped += 1;
                    self.stats.parks_skipped += 1;
                    continue;
                }
            };

            info!("Vehicle {id} parked in {area_id} at index {index}");
            self.emit(OutboundMessage::Park {
                id,
                spot: ParkingSpot::new(area_id, index),
            })?;
            report.parked += 1;
            self.stats.parks_sent += 1;
        }
        Ok(())
    }

    fn send_stop_ends(&mut self, report: &mut TickReport) -> BridgeResult<()> {
        for id in self.oracle.stop_ended()? {
            // Stop ends cover every kind of stop; only tracked parking matters
            let Some(spot) = self.tracker.release(&id) else {
                debug!("Vehicle {id} ended an untracked stop");
                self.stats.stop_ends_ignored += 1;
                continue;
            };

            debug!("Vehicle {id} left {}[{}]", spot.area_id, spot.index);
            self.emit(OutboundMessage::Unpark { id, spot })?;
            report.unparked += 1;
            self.stats.unparks_sent += 1;
        }
        Ok(())
    }

    fn emit(&mut self, message: OutboundMessage) -> BridgeResult<()> {
        let frame = message
            .encode_frame()
            .map_err(|source| BridgeError::Encode {
                vehicle: message.vehicle_id().to_string(),
                source,
            })?;
        let transport = self.transport.as_mut().ok_or(BridgeError::NotConnected)?;
        trace!("-> {}", String::from_utf8_lossy(&frame).trim_end());
        transport.send(&frame).map_err(BridgeError::Transport)
    }

    /// Step until `stop` is set, the tick limit is hit, or a tick fails
    ///
    /// The flag is only checked between ticks. Returns the number of ticks
    /// run by this call.
    pub fn run(&mut self, stop: &AtomicBool, limits: &RunLimits) -> BridgeResult<u64> {
        let mut ticks = 0;
        loop {
            if stop.load(Ordering::Relaxed) {
                info!("Stop requested after tick {}", self.tick);
                break;
            }
            if limits.max_ticks.is_some_and(|max| ticks >= max) {
                info!("Reached tick limit of {ticks}");
                break;
            }

            self.step()?;
            ticks += 1;

            if !limits.step_delay.is_zero() {
                std::thread::sleep(limits.step_delay);
            }
        }
        Ok(ticks)
    }

    /// Close the simulation, then the transport
    ///
    /// Both are attempted even if the first fails; the first error is
    /// returned. Calling this again does nothing.
    pub fn shutdown(&mut self) -> BridgeResult<()> {
        self.state = BridgeState::Stopped;
        if self.released {
            return Ok(());
        }
        self.released = true;

        let oracle_result = self.oracle.shutdown().map_err(BridgeError::from);
        if let Err(e) = &oracle_result {
            warn!("Failed to close the simulation: {e}");
        }

        let transport_result = match self.transport.take() {
            Some(mut transport) => transport.close().map_err(BridgeError::Transport),
            None => Ok(()),
        };
        if let Err(e) = &transport_result {
            warn!("Failed to close the transport: {e}");
        }

        oracle_result.and(transport_result)
    }
}
