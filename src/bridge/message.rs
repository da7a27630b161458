//! Messages sent to the visualisation
//!
//! Each message is encoded as one compact JSON object followed by `\n`.
//! The encoder escapes control characters inside strings, so a frame never
//! contains a newline other than its terminator.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::parking::ParkingSpot;
use crate::types::Position;

/// Frame delimiter on the wire
pub const FRAME_DELIMITER: u8 = b'\n';

/// One observed transition of a vehicle
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// The vehicle entered the network
    Depart {
        id: String,
        vehicle_type: String,
        position: Position,
    },
    /// The vehicle occupied a parking space
    Park { id: String, spot: ParkingSpot },
    /// The vehicle left its parking space
    Unpark { id: String, spot: ParkingSpot },
}

impl OutboundMessage {
    pub fn vehicle_id(&self) -> &str {
        match self {
            OutboundMessage::Depart { id, .. }
            | OutboundMessage::Park { id, .. }
            | OutboundMessage::Unpark { id, .. } => id,
        }
    }

    /// Value of the `action` field
    pub fn action(&self) -> &'static str {
        match self {
            OutboundMessage::Depart { .. } => "depart",
            OutboundMessage::Park { .. } => "park",
            OutboundMessage::Unpark { .. } => "unpark",
        }
    }

    /// Serialise into a single newline-terminated frame
    pub fn encode_frame(&self) -> serde_json::Result<Vec<u8>> {
        let mut frame = serde_json::to_vec(self)?;
        frame.push(FRAME_DELIMITER);
        Ok(frame)
    }
}

impl Serialize for OutboundMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("id", self.vehicle_id())?;
        map.serialize_entry("action", self.action())?;
        match self {
            OutboundMessage::Depart {
                vehicle_type,
                position,
                ..
            } => {
                map.serialize_entry("type", vehicle_type)?;
                map.serialize_entry("position", position)?;
            }
            OutboundMessage::Park { spot, .. } | OutboundMessage::Unpark { spot, .. } => {
                map.serialize_entry("parking_area_id", &spot.area_id)?;
                map.serialize_entry("parking_index", &spot.index)?;
            }
        }
        map.end()
    }
}
