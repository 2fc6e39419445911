//! Sampling engine: the three sensor channels and the aggregating
//! [`SamplingEngine`].
//!
//! The engine owns every channel driver (and with it the light channel's
//! hysteresis memory) and produces one immutable [`SensorSample`] per
//! control-loop iteration.  There is no error return: a channel that
//! cannot measure reports its sentinel value instead.

pub mod calibration;
pub mod distance;
pub mod light;
pub mod sound;

use crate::app::ports::GpioPort;
use crate::config::NodeConfig;
use distance::{DistanceReading, DistanceSensor};
use light::{LightReading, LightSensor};
use sound::{SoundReading, SoundSensor};

/// One iteration's worth of readings.  Superseded, never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    /// Monotonic sample counter, starting at 1.
    pub tick: u64,
    pub light: LightReading,
    pub sound: SoundReading,
    pub distance: DistanceReading,
}

impl SensorSample {
    pub fn light_lux(&self) -> f32 {
        self.light.lux
    }

    pub fn previous_light_lux(&self) -> f32 {
        self.light.previous_lux
    }

    pub fn sound_dba(&self) -> f32 {
        self.sound.dba
    }

    pub fn distance_cm(&self) -> u16 {
        self.distance.cm
    }
}

/// Aggregates the three channels and produces a unified sample.
pub struct SamplingEngine {
    light: LightSensor,
    sound: SoundSensor,
    distance: DistanceSensor,
    tick: u64,
}

impl SamplingEngine {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            light: LightSensor::new(config.light.clone(), config.adc),
            sound: SoundSensor::new(config.sound.clone(), config.adc),
            distance: DistanceSensor::new(config.distance.clone()),
            tick: 0,
        }
    }

    /// Configure the rangefinder pins.  Call once before the first sample.
    pub fn init(&self, hw: &mut impl GpioPort) {
        self.distance.init(hw);
    }

    /// Read every channel in order: light burst, sound burst, ping.
    pub fn sample(&mut self, hw: &mut impl GpioPort) -> SensorSample {
        self.tick += 1;
        let light = self.light.read(hw);
        let sound = self.sound.read(hw);
        let distance = self.distance.read(hw);

        SensorSample {
            tick: self.tick,
            light,
            sound,
            distance,
        }
    }

    /// Samples taken since construction.
    pub fn samples_taken(&self) -> u64 {
        self.tick
    }
}
