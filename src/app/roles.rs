//! Device roles selected at startup.
//!
//! A node runs exactly one role for its whole uptime.  Each role owns the
//! adapters it needs and implements [`DeviceRole`], so the entry point can
//! hold a `Box<dyn DeviceRole>` and call `run_tick` forever.
//!
//! | Role         | Sampling | Broadcast (central) | GATT server |
//! |--------------|----------|---------------------|-------------|
//! | `Sensor`     | yes      |                     |             |
//! | `Central`    |          | yes                 |             |
//! | `Combined`   | yes      | yes                 |             |
//! | `Peripheral` |          |                     | yes         |

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::events::AppEvent;
use super::ports::{ClockPort, EventSink, GpioPort, PeripheralPort, RadioPort};
use super::service::ControlLoop;
use crate::broadcast::PeerBroadcastEngine;
use crate::config::NodeConfig;
use crate::error::NotifyError;
use crate::notifications::NOTIFY_DEPTH;
use crate::sensors::SamplingEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Sensor,
    Central,
    Combined,
    Peripheral,
}

impl RoleKind {
    /// Whether the role scans for and links to known peers.
    pub fn uses_broadcast(self) -> bool {
        matches!(self, Self::Central | Self::Combined)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sensor => "sensor",
            Self::Central => "central",
            Self::Combined => "combined",
            Self::Peripheral => "peripheral",
        }
    }
}

/// Common capability of every role.
pub trait DeviceRole {
    fn kind(&self) -> RoleKind;

    /// One-time setup (pin modes, advertising).
    fn start(&mut self, sink: &mut dyn EventSink);

    /// One iteration, including the role's fixed delay.
    fn run_tick(&mut self, sink: &mut dyn EventSink);
}

// ───────────────────────────────────────────────────────────────
// Sensor
// ───────────────────────────────────────────────────────────────

pub struct SensorRole<G> {
    hw: G,
    sampler: SamplingEngine,
    loop_delay_ms: u32,
}

impl<G: GpioPort> SensorRole<G> {
    pub fn new(hw: G, config: &NodeConfig) -> Self {
        Self {
            hw,
            sampler: SamplingEngine::new(config),
            loop_delay_ms: config.loop_delay_ms,
        }
    }

    pub fn hw(&self) -> &G {
        &self.hw
    }

    pub fn sampler(&self) -> &SamplingEngine {
        &self.sampler
    }
}

impl<G: GpioPort> DeviceRole for SensorRole<G> {
    fn kind(&self) -> RoleKind {
        RoleKind::Sensor
    }

    fn start(&mut self, sink: &mut dyn EventSink) {
        self.sampler.init(&mut self.hw);
        sink.emit(&AppEvent::Started(RoleKind::Sensor));
    }

    fn run_tick(&mut self, sink: &mut dyn EventSink) {
        let sample = self.sampler.sample(&mut self.hw);
        sink.emit(&AppEvent::Sample(sample));
        self.hw.delay_ms(self.loop_delay_ms);
    }
}

// ───────────────────────────────────────────────────────────────
// Central
// ───────────────────────────────────────────────────────────────

pub struct CentralRole<D, R, C> {
    delay: D,
    radio: R,
    clock: C,
    engine: PeerBroadcastEngine,
    loop_delay_ms: u32,
}

impl<D: DelayNs, R: RadioPort, C: ClockPort> CentralRole<D, R, C> {
    pub fn new(delay: D, radio: R, clock: C, config: &NodeConfig) -> Self {
        Self {
            delay,
            radio,
            clock,
            engine: PeerBroadcastEngine::new(config.broadcast.clone()),
            loop_delay_ms: config.loop_delay_ms,
        }
    }

    pub fn engine(&self) -> &PeerBroadcastEngine {
        &self.engine
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }
}

impl<D: DelayNs, R: RadioPort, C: ClockPort> DeviceRole for CentralRole<D, R, C> {
    fn kind(&self) -> RoleKind {
        RoleKind::Central
    }

    fn start(&mut self, sink: &mut dyn EventSink) {
        sink.emit(&AppEvent::Started(RoleKind::Central));
    }

    fn run_tick(&mut self, mut sink: &mut dyn EventSink) {
        let now = self.clock.now_ms();
        self.engine.tick(&mut self.radio, now, &mut sink);
        self.delay.delay_ms(self.loop_delay_ms);
    }
}

// ───────────────────────────────────────────────────────────────
// Combined (sampling + broadcast on one cadence)
// ───────────────────────────────────────────────────────────────

pub struct CombinedRole<G, R, C> {
    hw: G,
    radio: R,
    clock: C,
    control: ControlLoop,
}

impl<G: GpioPort, R: RadioPort, C: ClockPort> CombinedRole<G, R, C> {
    pub fn new(hw: G, radio: R, clock: C, config: &NodeConfig) -> Self {
        Self {
            hw,
            radio,
            clock,
            control: ControlLoop::new(config),
        }
    }

    pub fn control(&self) -> &ControlLoop {
        &self.control
    }

    pub fn hw(&self) -> &G {
        &self.hw
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }
}

impl<G: GpioPort, R: RadioPort, C: ClockPort> DeviceRole for CombinedRole<G, R, C> {
    fn kind(&self) -> RoleKind {
        RoleKind::Combined
    }

    fn start(&mut self, mut sink: &mut dyn EventSink) {
        self.control.start(&mut self.hw, &mut sink);
    }

    fn run_tick(&mut self, mut sink: &mut dyn EventSink) {
        self.control
            .tick(&mut self.hw, &mut self.radio, &self.clock, &mut sink);
    }
}

// ───────────────────────────────────────────────────────────────
// Peripheral (remote node)
// ───────────────────────────────────────────────────────────────

/// Receives the broadcast bit, mirrors it on the status LED and echoes the
/// applied byte back to the central.
pub struct PeripheralRole<P, L, D> {
    port: P,
    led: L,
    delay: D,
    service: u128,
    status: bool,
    loop_delay_ms: u32,
}

impl<P: PeripheralPort, L: OutputPin, D: DelayNs> PeripheralRole<P, L, D> {
    pub fn new(port: P, led: L, delay: D, config: &NodeConfig) -> Self {
        Self {
            port,
            led,
            delay,
            service: config.own_service,
            status: false,
            loop_delay_ms: config.loop_delay_ms,
        }
    }

    pub fn status(&self) -> bool {
        self.status
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn led(&self) -> &L {
        &self.led
    }

    fn ensure_advertising(&mut self) {
        if self.port.is_advertising() {
            return;
        }
        match self.port.start_advertising(self.service) {
            Ok(()) => info!("Advertising service {:032x}", self.service),
            Err(e) => warn!("Advertising failed ({}), retrying next tick", e),
        }
    }

    fn apply(&mut self, value: bool, sink: &mut dyn EventSink) {
        let led = if value {
            self.led.set_high()
        } else {
            self.led.set_low()
        };
        if let Err(e) = led {
            warn!("Status LED write failed: {:?}", e);
        }
        if value != self.status {
            self.status = value;
            sink.emit(&AppEvent::StatusApplied { value });
        }
        if let Err(e) = self.port.notify(&[u8::from(value)]) {
            warn!("Status echo failed: {}", e);
        }
    }
}

impl<P: PeripheralPort, L: OutputPin, D: DelayNs> DeviceRole for PeripheralRole<P, L, D> {
    fn kind(&self) -> RoleKind {
        RoleKind::Peripheral
    }

    fn start(&mut self, sink: &mut dyn EventSink) {
        if let Err(e) = self.led.set_low() {
            warn!("Status LED init failed: {:?}", e);
        }
        self.ensure_advertising();
        sink.emit(&AppEvent::Started(RoleKind::Peripheral));
    }

    fn run_tick(&mut self, sink: &mut dyn EventSink) {
        self.ensure_advertising();
        for _ in 0..NOTIFY_DEPTH {
            let Some(write) = self.port.take_status_write() else {
                break;
            };
            match write.first() {
                Some(&byte) => self.apply(byte != 0, sink),
                None => sink.emit(&AppEvent::NotificationDiscarded(NotifyError::EmptyPayload)),
            }
        }
        self.delay.delay_ms(self.loop_delay_ms);
    }
}

/// Build the role named by `config.role` from the given adapters.
///
/// `G` serves as GPIO port for the sampling roles and as the delay source
/// for the others; `L` is only used by the peripheral role.
pub fn build_role<G, R, C, P, L>(
    config: &NodeConfig,
    hw: G,
    radio: R,
    clock: C,
    peripheral: P,
    led: L,
) -> Box<dyn DeviceRole>
where
    G: GpioPort + 'static,
    R: RadioPort + 'static,
    C: ClockPort + 'static,
    P: PeripheralPort + 'static,
    L: OutputPin + 'static,
{
    match config.role {
        RoleKind::Sensor => Box::new(SensorRole::new(hw, config)),
        RoleKind::Central => Box::new(CentralRole::new(hw, radio, clock, config)),
        RoleKind::Combined => Box::new(CombinedRole::new(hw, radio, clock, config)),
        RoleKind::Peripheral => Box::new(PeripheralRole::new(peripheral, led, hw, config)),
    }
}
