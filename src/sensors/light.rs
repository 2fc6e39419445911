//! Photoresistor ambient light channel.
//!
//! The LDR sits in a voltage divider against a fixed reference resistor.
//! Each sample averages a burst of ADC conversions, derives the LDR
//! resistance from the divider relation and maps it to illuminance with
//! the datasheet power law `lux = k1 · R^k2`.  A [`HysteresisCurve`]
//! then removes the direction-dependent drift above 10 lux.
//!
//! A floating or reversed sensor is not detected: the divider maths clamps
//! to a sentinel of 0 lux whenever the voltage leaves the open interval
//! (0, v_ref).

use super::calibration::{Correction, HysteresisCurve};
use crate::app::ports::GpioPort;
use crate::config::{AdcConfig, LightConfig};
use crate::pins;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightReading {
    /// Mean of the raw burst.
    pub mean_adc: f32,
    pub voltage: f32,
    pub resistance_ohms: f32,
    /// Illuminance before hysteresis correction.
    pub raw_lux: f32,
    /// Previous uncorrected illuminance (equals `raw_lux` on the first sample).
    pub previous_lux: f32,
    /// Illuminance after hysteresis correction.
    pub lux: f32,
    pub correction: Correction,
}

pub struct LightSensor {
    cfg: LightConfig,
    adc: AdcConfig,
    curve: HysteresisCurve,
}

impl LightSensor {
    pub fn new(cfg: LightConfig, adc: AdcConfig) -> Self {
        let curve = HysteresisCurve::from_config(&cfg);
        Self { cfg, adc, curve }
    }

    pub fn read(&mut self, hw: &mut impl GpioPort) -> LightReading {
        let mut sum: u32 = 0;
        for _ in 0..self.cfg.samples {
            sum += u32::from(hw.analog_read(pins::LIGHT));
        }
        let mean_adc = sum as f32 / f32::from(self.cfg.samples);
        self.convert(mean_adc)
    }

    /// Run the transfer chain on an already-averaged ADC value.
    pub fn convert(&mut self, mean_adc: f32) -> LightReading {
        let voltage = adc_to_voltage(&self.adc, mean_adc);
        let resistance_ohms = divider_resistance(voltage, self.adc.v_ref, self.cfg.reference_ohms);
        let raw_lux = resistance_to_lux(resistance_ohms, self.cfg.k1, self.cfg.k2);
        let previous_lux = self.curve.previous().unwrap_or(raw_lux);
        let (lux, correction) = self.curve.apply(raw_lux);

        LightReading {
            mean_adc,
            voltage,
            resistance_ohms,
            raw_lux,
            previous_lux,
            lux,
            correction,
        }
    }
}

/// `v_ref · code / resolution`
pub fn adc_to_voltage(adc: &AdcConfig, code: f32) -> f32 {
    adc.v_ref * code / f32::from(adc.resolution)
}

/// LDR resistance on the low side of a divider fed from `v_ref`.
/// Returns 0 outside (0, v_ref), where the relation has no solution.
pub fn divider_resistance(voltage: f32, v_ref: f32, reference_ohms: f32) -> f32 {
    if voltage <= 0.0 || voltage >= v_ref {
        return 0.0;
    }
    reference_ohms * voltage / (v_ref - voltage)
}

pub fn resistance_to_lux(resistance_ohms: f32, k1: f32, k2: f32) -> f32 {
    if resistance_ohms <= 0.0 {
        return 0.0;
    }
    let lux = k1 * resistance_ohms.powf(k2);
    if lux.is_finite() { lux } else { 0.0 }
}
