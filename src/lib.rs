//! Parking Bridge Library
//!
//! Relays vehicle events from a traffic simulation to an external
//! visualisation over a TCP connection, assigning stable parking space
//! indices along the way.

pub mod bridge;
pub mod config;
pub mod oracle;
pub mod parking;
pub mod simulation;
pub mod stats;
pub mod transport;
pub mod types;
