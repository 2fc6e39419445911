//! HC-SR04 ultrasonic rangefinder channel.
//!
//! A 10 µs trigger pulse starts a ping; the echo pin then stays HIGH for
//! the round-trip time of flight.  At 343 m/s that is 58 µs per
//! centimetre of range.  The echo wait is bounded so a missing echo can
//! never stall the loop.

use crate::app::ports::{GpioPort, Level, PinMode};
use crate::config::DistanceConfig;
use crate::error::SensorError;
use crate::pins;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceReading {
    /// Echo pulse width, `None` on timeout.
    pub echo_us: Option<u32>,
    /// Range in whole centimetres; 0 when `fault` is set.
    pub cm: u16,
    pub fault: Option<SensorError>,
}

pub struct DistanceSensor {
    cfg: DistanceConfig,
}

impl DistanceSensor {
    pub fn new(cfg: DistanceConfig) -> Self {
        Self { cfg }
    }

    pub fn init(&self, hw: &mut impl GpioPort) {
        hw.pin_mode(pins::ECHO, PinMode::Input);
        hw.pin_mode(pins::TRIGGER, PinMode::Output);
        hw.digital_write(pins::TRIGGER, Level::Low);
    }

    pub fn read(&self, hw: &mut impl GpioPort) -> DistanceReading {
        hw.digital_write(pins::TRIGGER, Level::Low);
        hw.delay_us(self.cfg.settle_us);
        hw.digital_write(pins::TRIGGER, Level::High);
        hw.delay_us(self.cfg.pulse_us);
        hw.digital_write(pins::TRIGGER, Level::Low);

        let echo_us = hw.pulse_in(pins::ECHO, Level::High, self.cfg.echo_timeout_us);
        self.convert(echo_us)
    }

    pub fn convert(&self, echo_us: Option<u32>) -> DistanceReading {
        let Some(us) = echo_us.filter(|&us| us > 0) else {
            return DistanceReading {
                echo_us: None,
                cm: 0,
                fault: Some(SensorError::AcquisitionTimeout),
            };
        };
        let cm = us / self.cfg.us_per_cm;
        if cm > u32::from(self.cfg.max_range_cm) {
            return DistanceReading {
                echo_us,
                cm: 0,
                fault: Some(SensorError::OutOfRange),
            };
        }
        DistanceReading {
            echo_us,
            cm: cm as u16,
            fault: None,
        }
    }
}
