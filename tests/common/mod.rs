//! Shared test doubles for the simulation and the transport

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::rc::Rc;

use parking_bridge::oracle::{OracleError, OracleResult, SimulationOracle, StopDescriptor};
use parking_bridge::transport::Transport;
use parking_bridge::types::Position;

/// Ordered record of calls made on the doubles
pub type CallLog = Rc<RefCell<Vec<String>>>;

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Events reported for one tick
#[derive(Debug, Clone, Default)]
pub struct TickScript {
    pub departed: Vec<(String, String, Position)>,
    pub parking_started: Vec<(String, Option<String>)>,
    pub stop_ended: Vec<String>,
}

impl TickScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depart(mut self, id: &str, vehicle_type: &str, position: Position) -> Self {
        self.departed
            .push((id.to_string(), vehicle_type.to_string(), position));
        self
    }

    pub fn park(mut self, id: &str, area_id: &str) -> Self {
        self.parking_started
            .push((id.to_string(), Some(area_id.to_string())));
        self
    }

    /// Parking start reported without any stop on the vehicle
    pub fn park_without_stop(mut self, id: &str) -> Self {
        self.parking_started.push((id.to_string(), None));
        self
    }

    pub fn end_stop(mut self, id: &str) -> Self {
        self.stop_ended.push(id.to_string());
        self
    }
}

/// Simulation that replays a fixed list of ticks, then reports nothing
pub struct ScriptedOracle {
    script: VecDeque<TickScript>,
    current: TickScript,
    types: HashMap<String, String>,
    positions: HashMap<String, Position>,
    stops: HashMap<String, Vec<StopDescriptor>>,
    /// Fail `advance_tick` once this many ticks have run
    pub fail_advance_after: Option<usize>,
    pub fail_shutdown: bool,
    ticks: usize,
    log: CallLog,
}

impl ScriptedOracle {
    pub fn new(script: Vec<TickScript>, log: CallLog) -> Self {
        Self {
            script: script.into(),
            current: TickScript::default(),
            types: HashMap::new(),
            positions: HashMap::new(),
            stops: HashMap::new(),
            fail_advance_after: None,
            fail_shutdown: false,
            ticks: 0,
            log,
        }
    }
}

impl SimulationOracle for ScriptedOracle {
    fn advance_tick(&mut self) -> OracleResult<()> {
        if self.fail_advance_after == Some(self.ticks) {
            return Err(OracleError::Advance("engine crashed".to_string()));
        }
        self.ticks += 1;
        self.log.borrow_mut().push("oracle.advance".to_string());

        self.current = self.script.pop_front().unwrap_or_default();
        for (id, vehicle_type, position) in &self.current.departed {
            self.types.insert(id.clone(), vehicle_type.clone());
            self.positions.insert(id.clone(), *position);
        }
        for (id, area) in &self.current.parking_started {
            let stops = area.iter().map(|a| StopDescriptor::at(a.as_str())).collect();
            self.stops.insert(id.clone(), stops);
        }
        Ok(())
    }

    fn departed(&mut self) -> OracleResult<Vec<String>> {
        Ok(self.current.departed.iter().map(|(id, _, _)| id.clone()).collect())
    }

    fn parking_started(&mut self) -> OracleResult<Vec<String>> {
        Ok(self
            .current
            .parking_started
            .iter()
            .map(|(id, _)| id.clone())
            .collect())
    }

    fn stop_ended(&mut self) -> OracleResult<Vec<String>> {
        Ok(self.current.stop_ended.clone())
    }

    fn vehicle_type(&mut self, vehicle_id: &str) -> OracleResult<String> {
        self.types
            .get(vehicle_id)
            .cloned()
            .ok_or_else(|| OracleError::UnknownVehicle(vehicle_id.to_string()))
    }

    fn vehicle_position(&mut self, vehicle_id: &str) -> OracleResult<Position> {
        self.positions
            .get(vehicle_id)
            .copied()
            .ok_or_else(|| OracleError::UnknownVehicle(vehicle_id.to_string()))
    }

    fn active_stops(&mut self, vehicle_id: &str) -> OracleResult<Vec<StopDescriptor>> {
        Ok(self.stops.get(vehicle_id).cloned().unwrap_or_default())
    }

    fn shutdown(&mut self) -> OracleResult<()> {
        self.log.borrow_mut().push("oracle.shutdown".to_string());
        if self.fail_shutdown {
            Err(OracleError::Advance("shutdown refused".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Transport that keeps every frame it is given
pub struct RecordingTransport {
    pub frames: Rc<RefCell<Vec<Vec<u8>>>>,
    /// Reject the send after this many frames were accepted
    pub fail_after: Option<usize>,
    pub fail_close: bool,
    log: CallLog,
}

impl RecordingTransport {
    pub fn new(log: CallLog) -> Self {
        Self {
            frames: Rc::new(RefCell::new(Vec::new())),
            fail_after: None,
            fail_close: false,
            log,
        }
    }

    /// Handle to the recorded frames that survives moving the transport
    pub fn frames(&self) -> Rc<RefCell<Vec<Vec<u8>>>> {
        Rc::clone(&self.frames)
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        if self.fail_after == Some(self.frames.borrow().len()) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer went away"));
        }
        self.log.borrow_mut().push("transport.send".to_string());
        self.frames.borrow_mut().push(frame.to_vec());
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.log.borrow_mut().push("transport.close".to_string());
        if self.fail_close {
            Err(io::Error::new(io::ErrorKind::Other, "close failed"))
        } else {
            Ok(())
        }
    }
}

/// Recorded frames as strings, delimiter stripped
pub fn frame_lines(frames: &Rc<RefCell<Vec<Vec<u8>>>>) -> Vec<String> {
    frames
        .borrow()
        .iter()
        .map(|frame| {
            assert_eq!(frame.last(), Some(&b'\n'), "frame must end with a newline");
            String::from_utf8(frame[..frame.len() - 1].to_vec()).expect("frame is not UTF-8")
        })
        .collect()
}
