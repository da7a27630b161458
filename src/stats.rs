use log::info;

/// Running totals for one bridge run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub ticks: u64,
    pub departures_sent: u64,
    pub parks_sent: u64,
    pub unparks_sent: u64,
    /// Parking starts dropped because the tracker refused the reservation
    pub parks_skipped: u64,
    /// Parking starts dropped because the vehicle had no stop
    pub parks_without_stop: u64,
    /// Stop ends for vehicles that held no tracked space
    pub stop_ends_ignored: u64,
}

impl BridgeStats {
    pub fn messages_sent(&self) -> u64 {
        self.departures_sent + self.parks_sent + self.unparks_sent
    }

    /// Log the end-of-run summary
    pub fn log_summary(&self, occupied_spaces: usize) {
        info!("=== BRIDGE STOPPED ===");
        info!("Ticks: {}", self.ticks);
        info!("Departures sent: {}", self.departures_sent);
        info!("Parks sent: {}", self.parks_sent);
        info!("Unparks sent: {}", self.unparks_sent);
        info!(
            "Parks skipped: {}",
            self.parks_skipped + self.parks_without_stop
        );
        info!("Stop ends ignored: {}", self.stop_ends_ignored);
        info!("Occupied spaces: {}", occupied_spaces);
    }
}
