//! SensorNode: Main Entry Point (host simulation)
//!
//! Hexagonal architecture: the role selected by configuration runs on a
//! fixed cadence against whatever adapters are plugged into the ports.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimGpio        SimRadio       SimPeripheral   MonotonicClock  │
//! │  (GpioPort)     (RadioPort)    (PeripheralPort)(ClockPort)     │
//! │  PortPin        LogEventSink   ConsoleLogger                   │
//! │  (OutputPin)    (EventSink)    (log backend)                   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │           DeviceRole (pure logic, one per node)        │    │
//! │  │  SamplingEngine · PeerBroadcastEngine · ControlLoop    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::{Context, Result};
use log::{info, warn};

use sensornode::adapters::console_log;
use sensornode::adapters::log_sink::LogEventSink;
use sensornode::adapters::port_pin::PortPin;
use sensornode::adapters::sim_gpio::SimGpio;
use sensornode::adapters::sim_peripheral::SimPeripheral;
use sensornode::adapters::sim_radio::SimRadio;
use sensornode::adapters::time::MonotonicClock;
use sensornode::app::ports::PeerAddress;
use sensornode::app::roles::build_role;
use sensornode::config::NodeConfig;
use sensornode::pins;

/// Environment variable naming a JSON config file.
const CONFIG_ENV: &str = "SENSORNODE_CONFIG";

fn load_config() -> Result<NodeConfig> {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        info!("{} not set, using default config", CONFIG_ENV);
        return Ok(NodeConfig::default());
    };
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config file {}", path))?;
    let config = NodeConfig::from_json(&text)
        .with_context(|| format!("loading config file {}", path))?;
    info!("Config loaded from {}", path);
    Ok(config)
}

/// `SetLoggerError` is not a `std::error::Error` without the `log/std`
/// feature, so it is converted by hand.
fn install_logger() -> Result<()> {
    console_log::init().map_err(|e| anyhow::anyhow!("installing console logger: {}", e))
}

/// A bench with the three sensors wired and a few numbers that move.
fn sim_board() -> SimGpio {
    let mut hw = SimGpio::host();
    hw.set_analog(pins::LIGHT, &[1800, 1820, 1850, 1900, 1870, 1830, 1790, 1760]);
    hw.set_analog(pins::SOUND, &[1900, 2200, 1600, 2400, 1500, 2100]);
    hw.set_default_echo(Some(5800));
    hw
}

/// Every known peer on the air plus some unrelated advertisers.
fn sim_air(config: &NodeConfig) -> SimRadio {
    let mut radio = SimRadio::new();
    radio.set_echo_writes(true);
    radio.advertise(PeerAddress([0xC0, 0xFF, 0xEE, 0, 0, 0x10]), None, -80);
    for (i, &service) in config.broadcast.known_peers.iter().enumerate() {
        let address = PeerAddress([0xE4, 0x5F, 0x01, 0x00, 0x00, i as u8 + 1]);
        radio.advertise(address, Some(service), -55 - 5 * i as i8);
    }
    radio.advertise(PeerAddress([0xC0, 0xFF, 0xEE, 0, 0, 0x11]), Some(0xFEED), -90);
    radio
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    install_logger()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SensorNode v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config (file or defaults) ──────────────────────────
    let config = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Config load failed ({:#}), using defaults", e);
            NodeConfig::default()
        }
    };
    info!(
        "Role: {}, loop delay {}ms, {} known peer(s)",
        config.role.name(),
        config.loop_delay_ms,
        config.broadcast.known_peers.len()
    );

    // ── 3. Adapters ───────────────────────────────────────────
    let hw = sim_board();
    let radio = sim_air(&config);
    let clock = MonotonicClock::new();
    let peripheral = SimPeripheral::new();
    let led = PortPin::new(SimGpio::host(), pins::STATUS_LED);
    let mut sink = LogEventSink::new();

    // ── 4. Role ───────────────────────────────────────────────
    let mut role = build_role(&config, hw, radio, clock, peripheral, led);
    role.start(&mut sink);

    info!("System ready. Entering control loop.");

    // ── 5. Fixed-cadence loop ─────────────────────────────────
    loop {
        role.run_tick(&mut sink);
    }
}
