//! Core types shared by the oracle, the simulation and the outbound messages

use serde::ser::{Serialize, SerializeSeq, Serializer};

/// A position reported by the simulation
///
/// Most traffic engines report planar coordinates; the height is kept
/// optional so 3D positions pass through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    pub fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z.unwrap_or(0.0) - other.z.unwrap_or(0.0);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Linear interpolation; the result is 3D only if both ends are
    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        let z = match (self.z, other.z) {
            (Some(a), Some(b)) => Some(a + (b - a) * t),
            _ => None,
        };
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z,
        }
    }

    /// Number of coordinates this position carries (2 or 3)
    pub fn dimensions(&self) -> usize {
        if self.z.is_some() {
            3
        } else {
            2
        }
    }
}

/// Serialised as `[x, y]` or `[x, y, z]`
impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.dimensions()))?;
        seq.serialize_element(&self.x)?;
        seq.serialize_element(&self.y)?;
        if let Some(z) = self.z {
            seq.serialize_element(&z)?;
        }
        seq.end()
    }
}
