//! Simulated GPIO/ADC board.
//!
//! Implements [`GpioPort`] for host builds and tests.  Analog pins replay
//! a scripted pattern (cycling), echo pulses come from a queue with a
//! fallback value, and every call can be recorded for assertions.  Delays
//! are accumulated and, for the host binary, actually slept.

use std::collections::{HashMap, VecDeque};

use embedded_hal::delay::DelayNs;

use crate::app::ports::{GpioPort, Level, PinMode};
use crate::pins::Pin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioCall {
    Mode(Pin, PinMode),
    Write(Pin, Level),
    DelayNs(u64),
    PulseIn(Pin, Level, u32),
}

struct Pattern {
    values: Vec<u16>,
    pos: usize,
}

impl Pattern {
    fn advance(&mut self) -> u16 {
        let v = self.values[self.pos];
        self.pos = (self.pos + 1) % self.values.len();
        v
    }
}

pub struct SimGpio {
    analog: HashMap<Pin, Pattern>,
    echoes: VecDeque<Option<u32>>,
    default_echo: Option<u32>,
    levels: HashMap<Pin, Level>,
    calls: Vec<GpioCall>,
    record: bool,
    sleep: bool,
    delayed_ns: u64,
    analog_reads: u64,
}

impl Default for SimGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl SimGpio {
    /// Recording, non-sleeping board for tests.
    pub fn new() -> Self {
        Self {
            analog: HashMap::new(),
            echoes: VecDeque::new(),
            default_echo: None,
            levels: HashMap::new(),
            calls: Vec::new(),
            record: true,
            sleep: false,
            delayed_ns: 0,
            analog_reads: 0,
        }
    }

    /// Non-recording board that really sleeps, for the host binary.
    pub fn host() -> Self {
        Self {
            record: false,
            sleep: true,
            ..Self::new()
        }
    }

    /// Replay `values` (cyclically) on every `analog_read(pin)`.
    /// An empty pattern reads as 0.
    pub fn set_analog(&mut self, pin: Pin, values: &[u16]) {
        if values.is_empty() {
            self.analog.remove(&pin);
            return;
        }
        self.analog.insert(
            pin,
            Pattern {
                values: values.to_vec(),
                pos: 0,
            },
        );
    }

    /// Queue one echo result for the next `pulse_in`.
    pub fn push_echo(&mut self, echo_us: Option<u32>) {
        self.echoes.push_back(echo_us);
    }

    /// Echo result once the queue is empty.
    pub fn set_default_echo(&mut self, echo_us: Option<u32>) {
        self.default_echo = echo_us;
    }

    pub fn calls(&self) -> &[GpioCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn level(&self, pin: Pin) -> Option<Level> {
        self.levels.get(&pin).copied()
    }

    pub fn delayed_ns(&self) -> u64 {
        self.delayed_ns
    }

    pub fn analog_reads(&self) -> u64 {
        self.analog_reads
    }

    fn push(&mut self, call: GpioCall) {
        if self.record {
            self.calls.push(call);
        }
    }
}

impl DelayNs for SimGpio {
    fn delay_ns(&mut self, ns: u32) {
        self.delayed_ns += u64::from(ns);
        self.push(GpioCall::DelayNs(u64::from(ns)));
        if self.sleep {
            std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
        }
    }
}

impl GpioPort for SimGpio {
    fn pin_mode(&mut self, pin: Pin, mode: PinMode) {
        self.push(GpioCall::Mode(pin, mode));
    }

    fn digital_write(&mut self, pin: Pin, level: Level) {
        self.levels.insert(pin, level);
        self.push(GpioCall::Write(pin, level));
    }

    fn analog_read(&mut self, pin: Pin) -> u16 {
        self.analog_reads += 1;
        self.analog.get_mut(&pin).map_or(0, Pattern::advance)
    }

    fn pulse_in(&mut self, pin: Pin, level: Level, timeout_us: u32) -> Option<u32> {
        self.push(GpioCall::PulseIn(pin, level, timeout_us));
        let echo = self.echoes.pop_front().unwrap_or(self.default_echo);
        // A real pulse longer than the bound is never observed.
        echo.filter(|&us| us <= timeout_us)
    }
}
