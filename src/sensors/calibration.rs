//! Direction-dependent illuminance correction.
//!
//! Photoresistors settle differently on a rising light level than on a
//! falling one.  [`HysteresisCurve`] subtracts one of two quadratic
//! offsets depending on whether the new raw reading is above or below the
//! previous one.  Its only state is that previous reading.

use crate::config::{LightConfig, Quadratic};

/// Which correction, if any, was applied to a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// Below threshold, or first reading with no history.
    None,
    Rising,
    Falling,
}

#[derive(Debug, Clone)]
pub struct HysteresisCurve {
    threshold: f32,
    rising: Quadratic,
    falling: Quadratic,
    previous: Option<f32>,
}

impl HysteresisCurve {
    pub fn new(threshold: f32, rising: Quadratic, falling: Quadratic) -> Self {
        Self {
            threshold,
            rising,
            falling,
            previous: None,
        }
    }

    pub fn from_config(cfg: &LightConfig) -> Self {
        Self::new(cfg.correction_threshold_lux, cfg.rising, cfg.falling)
    }

    /// Previous uncorrected reading, `None` before the first call.
    pub fn previous(&self) -> Option<f32> {
        self.previous
    }

    /// Correct `raw` and remember it for the next direction decision.
    ///
    /// A correction larger than `raw` floors at 0 lux, the same sentinel an
    /// invalid divider reading produces, so a negative illuminance is never
    /// reported.
    pub fn apply(&mut self, raw: f32) -> (f32, Correction) {
        let previous = self.previous.replace(raw);
        let branch = match previous {
            _ if raw <= self.threshold => Correction::None,
            None => Correction::None,
            Some(prev) if raw >= prev => Correction::Rising,
            Some(_) => Correction::Falling,
        };
        let corrected = match branch {
            Correction::None => raw,
            Correction::Rising => (raw - self.rising.eval(raw)).max(0.0),
            Correction::Falling => (raw - self.falling.eval(raw)).max(0.0),
        };
        (corrected, branch)
    }
}
