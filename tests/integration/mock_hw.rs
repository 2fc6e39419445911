//! Shared fixtures for integration tests.
//!
//! The library's simulated adapters (`SimGpio`, `SimRadio`,
//! `SimPeripheral`, `ManualClock`) stand in for the board; this file adds
//! the recording sink, a recording status LED and a small-number config so
//! tests can step through countdowns in a handful of ticks.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use sensornode::adapters::sim_gpio::SimGpio;
use sensornode::adapters::sim_radio::SimRadio;
use sensornode::app::events::AppEvent;
use sensornode::app::ports::{EventSink, PeerAddress};
use sensornode::app::roles::RoleKind;
use sensornode::broadcast::LinkState;
use sensornode::config::{NodeConfig, PEER_A_SERVICE, PEER_B_SERVICE};
use sensornode::pins;

pub const ADDR_A: PeerAddress = PeerAddress([0xE4, 0x5F, 0x01, 0x00, 0x00, 0x01]);
pub const ADDR_B: PeerAddress = PeerAddress([0xE4, 0x5F, 0x01, 0x00, 0x00, 0x02]);

/// Defaults with a 3-tick countdown, small bursts and no loop delay.
pub fn fast_config(role: RoleKind) -> NodeConfig {
    let mut c = NodeConfig::default();
    c.role = role;
    c.light.samples = 4;
    c.sound.samples = 6;
    c.broadcast.countdown_ticks = 3;
    c.loop_delay_ms = 0;
    c
}

/// A board reading a mid-scale light level, a 2900-count sound swing and a
/// 100 cm echo.
pub fn bench() -> SimGpio {
    let mut hw = SimGpio::new();
    hw.set_analog(pins::LIGHT, &[2048]);
    hw.set_analog(pins::SOUND, &[100, 3000]);
    hw.set_default_echo(Some(5800));
    hw
}

/// Both known peers on the air between two unrelated advertisers.
pub fn two_peer_air() -> SimRadio {
    let mut radio = SimRadio::new();
    radio.advertise(PeerAddress([0xAA; 6]), None, -90);
    radio.advertise(ADDR_A, Some(PEER_A_SERVICE), -55);
    radio.advertise(PeerAddress([0xBB; 6]), Some(0x1234), -70);
    radio.advertise(ADDR_B, Some(PEER_B_SERVICE), -60);
    radio.advertise(PeerAddress([0xCC; 6]), None, -85);
    radio
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    /// `(from, to)` for every state change of `service`, in order.
    pub fn transitions(&self, service: u128) -> Vec<(LinkState, LinkState)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::PeerStateChanged { service: s, from, to } if *s == service => {
                    Some((*from, *to))
                }
                _ => None,
            })
            .collect()
    }

    pub fn toggles(&self) -> Vec<(bool, u8, u8)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::BroadcastToggled {
                    value,
                    delivered,
                    failed,
                } => Some((*value, *delivered, *failed)),
                _ => None,
            })
            .collect()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── MockLed ───────────────────────────────────────────────────

pub struct MockLed {
    pub levels: Vec<bool>,
}

#[allow(dead_code)]
impl MockLed {
    pub fn new() -> Self {
        Self { levels: Vec::new() }
    }

    pub fn is_on(&self) -> bool {
        self.levels.last().copied().unwrap_or(false)
    }
}

impl Default for MockLed {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorType for MockLed {
    type Error = Infallible;
}

impl OutputPin for MockLed {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.push(true);
        Ok(())
    }
}
