use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_bridge::bridge::{EventBridge, RunLimits};
use parking_bridge::config::BridgeConfig;
use parking_bridge::parking::ParkingTracker;
use parking_bridge::simulation::SimParkingWorld;
use parking_bridge::transport::TcpTransport;

#[derive(Parser)]
#[command(name = "parking_bridge")]
#[command(about = "Relay parking events from a traffic simulation to a visualisation")]
struct Cli {
    /// Path to a TOML configuration file
    config: Option<PathBuf>,

    /// Host the visualisation runs on
    #[arg(long)]
    host: Option<String>,

    /// Port the visualisation listens on [default: 9000]
    #[arg(long)]
    port: Option<u16>,

    /// Stop after this many ticks instead of running until interrupted
    #[arg(long)]
    ticks: Option<u64>,

    /// Seed for a reproducible simulation
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between ticks in milliseconds
    #[arg(long)]
    step_delay_ms: Option<u64>,
}

impl Cli {
    /// Command line values win over the configuration file
    fn apply(&self, config: &mut BridgeConfig) {
        if let Some(host) = &self.host {
            config.transport.host = host.clone();
        }
        if let Some(port) = self.port {
            config.transport.port = port;
        }
        if self.ticks.is_some() {
            config.run.max_ticks = self.ticks;
        }
        if self.seed.is_some() {
            config.simulation.seed = self.seed;
        }
        if let Some(delay) = self.step_delay_ms {
            config.run.step_delay_ms = delay;
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = BridgeConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    cli.apply(&mut config);

    let stop = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&stop);
    ctrlc::set_handler(move || handler_flag.store(true, Ordering::Relaxed))
        .context("Failed to install interrupt handler")?;

    run(&config, &stop)
}

/// Run the bridge and always tear it down, whatever the outcome
fn run(config: &BridgeConfig, stop: &AtomicBool) -> Result<()> {
    for (area_id, capacity) in config.parking.iter() {
        info!("Parking area {area_id}: {capacity} spaces");
    }

    let tracker = ParkingTracker::new(&config.parking);
    let world = SimParkingWorld::new(&config.simulation, &config.parking);
    let mut bridge = EventBridge::new(world, tracker);

    let outcome = connect_and_run(&mut bridge, config, stop);
    let teardown = bridge.shutdown();

    info!("{}", bridge.oracle().summary());
    bridge
        .stats()
        .log_summary(bridge.tracker().occupied_count());

    outcome?;
    teardown.context("Failed to shut down cleanly")?;
    Ok(())
}

fn connect_and_run(
    bridge: &mut EventBridge<SimParkingWorld, TcpTransport>,
    config: &BridgeConfig,
    stop: &AtomicBool,
) -> Result<()> {
    let host = &config.transport.host;
    let port = config.transport.port;
    info!("Connecting to visualisation at {host}:{port}");

    let transport = TcpTransport::connect(host, port)
        .with_context(|| format!("Failed to connect to {host}:{port}"))?;
    bridge.connect(transport)?;

    let limits = RunLimits {
        max_ticks: config.run.max_ticks,
        step_delay: Duration::from_millis(config.run.step_delay_ms),
    };
    let ticks = bridge.run(stop, &limits).context("Bridge stopped on error")?;
    info!("Ran {ticks} ticks");
    Ok(())
}
