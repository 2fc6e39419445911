//! Control loop: the hexagonal core.
//!
//! [`ControlLoop`] owns the sampling engine and the peer broadcast engine
//! and runs them on one fixed cadence.  All I/O flows through port traits
//! injected at call sites, making the loop testable with mock adapters.
//!
//! ```text
//!   GpioPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                │       ControlLoop         │
//!  RadioPort ◀──▶│ Sampling · PeerBroadcast  │◀── ClockPort
//!                └──────────────────────────┘
//! ```
//!
//! The two engines never exchange data; the only coupling is that they
//! share an iteration.

use log::info;

use crate::broadcast::{PeerBroadcastEngine, TickOutcome};
use crate::config::NodeConfig;
use crate::sensors::{SamplingEngine, SensorSample};

use super::events::AppEvent;
use super::ports::{ClockPort, EventSink, GpioPort, RadioPort};
use super::roles::RoleKind;

// ───────────────────────────────────────────────────────────────
// ControlLoop
// ───────────────────────────────────────────────────────────────

pub struct ControlLoop {
    sampler: SamplingEngine,
    broadcast: PeerBroadcastEngine,
    /// Fixed delay at the end of every iteration.
    loop_delay_ms: u32,
    iterations: u64,
    last_sample: Option<SensorSample>,
}

impl ControlLoop {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            sampler: SamplingEngine::new(config),
            broadcast: PeerBroadcastEngine::new(config.broadcast.clone()),
            loop_delay_ms: config.loop_delay_ms,
            iterations: 0,
            last_sample: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, hw: &mut impl GpioPort, sink: &mut impl EventSink) {
        self.sampler.init(hw);
        sink.emit(&AppEvent::Started(RoleKind::Combined));
        info!("Control loop started, delay={}ms", self.loop_delay_ms);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one iteration: sample → report → broadcast tick → delay.
    pub fn tick(
        &mut self,
        hw: &mut impl GpioPort,
        radio: &mut impl RadioPort,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) -> (SensorSample, TickOutcome) {
        self.iterations += 1;

        // 1. Acquire
        let sample = self.sampler.sample(hw);
        self.last_sample = Some(sample);

        // 2. Report
        sink.emit(&AppEvent::Sample(sample));

        // 3. Peer fan-out (independent of the sample)
        let outcome = self.broadcast.tick(radio, clock.now_ms(), sink);

        // 4. Fixed cadence
        hw.delay_ms(self.loop_delay_ms);

        (sample, outcome)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn last_sample(&self) -> Option<&SensorSample> {
        self.last_sample.as_ref()
    }

    pub fn broadcast(&self) -> &PeerBroadcastEngine {
        &self.broadcast
    }

    pub fn sampler(&self) -> &SamplingEngine {
        &self.sampler
    }
}
