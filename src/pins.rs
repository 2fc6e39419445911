//! GPIO / ADC pin assignments for the sensor node.
//!
//! Single source of truth: every channel references this module rather than
//! hard-coding pin numbers.  Numbers follow the Particle Gen3 header labels
//! (`D0`–`D7` digital, `A0`–`A5` analog).

/// Logical pin identifier passed through [`GpioPort`](crate::app::ports::GpioPort).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pin {
    D(u8),
    A(u8),
}

impl core::fmt::Display for Pin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::D(n) => write!(f, "D{n}"),
            Self::A(n) => write!(f, "A{n}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Ultrasonic rangefinder (HC-SR04)
// ---------------------------------------------------------------------------

/// Digital input: echo pulse, HIGH for the time-of-flight.
pub const ECHO: Pin = Pin::D(0);
/// Digital output: 10 µs trigger pulse.
pub const TRIGGER: Pin = Pin::D(1);

// ---------------------------------------------------------------------------
// Analog sensors (12-bit ADC, 3.3 V full scale)
// ---------------------------------------------------------------------------

/// Photoresistor in a divider against a 10 kΩ reference resistor.
pub const LIGHT: Pin = Pin::A(1);
/// Electret microphone amplifier output.
pub const SOUND: Pin = Pin::A(2);

// ---------------------------------------------------------------------------
// Status LED
// ---------------------------------------------------------------------------

/// On-board blue LED.  Driven by the peripheral role from the broadcast bit.
pub const STATUS_LED: Pin = Pin::D(7);
