//! Microphone sound-level channel.
//!
//! Samples the amplifier output in one blocking burst, keeps the running
//! minimum and maximum, and converts the peak-to-peak swing to an A-weighted
//! level with the fitted curve `dBA = k1 · ln(V) + k2`.  No state carries
//! over between bursts.

use super::light::adc_to_voltage;
use crate::app::ports::GpioPort;
use crate::config::{AdcConfig, SoundConfig};
use crate::pins;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundReading {
    pub min_adc: u16,
    pub max_adc: u16,
    pub peak_to_peak: u16,
    pub voltage: f32,
    /// 0.0 when the burst saw no swing at all.
    pub dba: f32,
}

pub struct SoundSensor {
    cfg: SoundConfig,
    adc: AdcConfig,
}

impl SoundSensor {
    pub fn new(cfg: SoundConfig, adc: AdcConfig) -> Self {
        Self { cfg, adc }
    }

    pub fn read(&self, hw: &mut impl GpioPort) -> SoundReading {
        let mut min_adc = u16::MAX;
        let mut max_adc = u16::MIN;
        for _ in 0..self.cfg.samples {
            let v = hw.analog_read(pins::SOUND);
            min_adc = min_adc.min(v);
            max_adc = max_adc.max(v);
        }
        self.convert(min_adc, max_adc)
    }

    pub fn convert(&self, min_adc: u16, max_adc: u16) -> SoundReading {
        let peak_to_peak = max_adc.saturating_sub(min_adc);
        let voltage = adc_to_voltage(&self.adc, f32::from(peak_to_peak));
        let dba = if voltage > 0.0 {
            self.cfg.k1 * voltage.ln() + self.cfg.k2
        } else {
            0.0
        };
        SoundReading {
            min_adc,
            max_adc,
            peak_to_peak,
            voltage,
            dba,
        }
    }
}
