//! Event relay between the simulation and the visualisation

mod error;
mod event_bridge;
mod message;

pub use error::{BridgeError, BridgeResult};
pub use event_bridge::{BridgeState, EventBridge, RunLimits, TickReport};
pub use message::{OutboundMessage, FRAME_DELIMITER};
