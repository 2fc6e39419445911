//! Node configuration parameters
//!
//! Every tunable constant of the sampling and broadcast engines lives here.
//! Defaults match the deployed board and sensors; a JSON file can
//! override them at startup.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::app::roles::RoleKind;

/// Maximum number of known peers the broadcast engine tracks.
pub const MAX_PEERS: usize = 4;

/// Scan result buffer depth (the radio never returns more than this).
pub const SCAN_BUFFER: usize = 30;

/// Quadratic correction `a2·x² + a1·x + a0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadratic {
    pub a2: f32,
    pub a1: f32,
    pub a0: f32,
}

impl Quadratic {
    pub const fn new(a2: f32, a1: f32, a0: f32) -> Self {
        Self { a2, a1, a0 }
    }

    pub fn eval(&self, x: f32) -> f32 {
        (self.a2 * x + self.a1) * x + self.a0
    }
}

/// ADC conversion parameters shared by the analog channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdcConfig {
    /// Full-scale voltage.
    pub v_ref: f32,
    /// Number of codes (4096 for a 12-bit converter).
    pub resolution: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightConfig {
    /// Raw reads averaged per sample.
    pub samples: u16,
    /// Fixed divider resistor (Ω).
    pub reference_ohms: f32,
    /// `lux = k1 · R^k2`
    pub k1: f32,
    pub k2: f32,
    /// Hysteresis correction applies strictly above this illuminance.
    pub correction_threshold_lux: f32,
    /// Subtracted when the reading is rising (or steady).
    pub rising: Quadratic,
    /// Subtracted when the reading is falling.
    pub falling: Quadratic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundConfig {
    /// Raw reads per peak-to-peak burst.
    pub samples: u16,
    /// `dBA = k1 · ln(V) + k2`
    pub k1: f32,
    pub k2: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceConfig {
    /// Trigger settle time, pin held LOW.
    pub settle_us: u32,
    /// Trigger pulse width.
    pub pulse_us: u32,
    /// Upper bound on the echo wait.
    pub echo_timeout_us: u32,
    /// Round-trip microseconds per centimetre.
    pub us_per_cm: u32,
    /// Rated range; anything above reports 0.
    pub max_range_cm: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Service identifiers of the peers to link with.
    pub known_peers: heapless::Vec<u128, MAX_PEERS>,
    /// Minimum spacing between scans while nothing is connected.
    pub scan_interval_ms: u32,
    /// Radio scan window.
    pub scan_timeout_ms: u32,
    /// Result cap handed to the radio (≤ [`SCAN_BUFFER`]).
    pub scan_max_results: u8,
    /// Upper bound on a single connect attempt.
    pub connect_timeout_ms: u32,
    /// Iterations between broadcast toggles.
    pub countdown_ticks: u32,
}

/// Core node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub role: RoleKind,
    pub adc: AdcConfig,
    pub light: LightConfig,
    pub sound: SoundConfig,
    pub distance: DistanceConfig,
    pub broadcast: BroadcastConfig,
    /// Service identifier this node advertises in the peripheral role.
    pub own_service: u128,
    /// Fixed delay at the end of every iteration (milliseconds).
    pub loop_delay_ms: u32,
}

/// Status link service for the first remote node.
pub const PEER_A_SERVICE: u128 = 0x6e400001_b5a3_f393_e0a9_e50e24dcca9e;
/// Status link service for the second remote node.
pub const PEER_B_SERVICE: u128 = 0x6e400101_b5a3_f393_e0a9_e50e24dcca9e;

impl Default for NodeConfig {
    fn default() -> Self {
        let mut known_peers = heapless::Vec::new();
        known_peers.push(PEER_A_SERVICE).ok();
        known_peers.push(PEER_B_SERVICE).ok();

        Self {
            role: RoleKind::Combined,
            adc: AdcConfig {
                v_ref: 3.3,
                resolution: 4096,
            },
            light: LightConfig {
                samples: 100,
                reference_ohms: 10_000.0,
                k1: 5.0e11,
                k2: -2.335,
                correction_threshold_lux: 10.0,
                rising: Quadratic::new(1.2e-5, 0.021, 0.35),
                falling: Quadratic::new(9.0e-6, 0.012, -0.15),
            },
            sound: SoundConfig {
                samples: 500,
                k1: 17.831,
                k2: 87.579,
            },
            distance: DistanceConfig {
                settle_us: 2,
                pulse_us: 10,
                echo_timeout_us: 30_000,
                us_per_cm: 58,
                max_range_cm: 400,
            },
            broadcast: BroadcastConfig {
                known_peers,
                scan_interval_ms: 2000,
                scan_timeout_ms: 500,
                scan_max_results: 20,
                connect_timeout_ms: 5000,
                countdown_ticks: 10_000,
            },
            own_service: PEER_A_SERVICE,
            loop_delay_ms: 500,
        }
    }
}

impl NodeConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no engine can run with.  Nothing is silently clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.adc.resolution == 0 || self.adc.v_ref <= 0.0 {
            return Err(ConfigError::ValidationFailed("adc: resolution and v_ref must be > 0"));
        }
        if self.light.samples == 0 || self.sound.samples == 0 {
            return Err(ConfigError::ValidationFailed("sample counts must be > 0"));
        }
        if self.light.reference_ohms <= 0.0 {
            return Err(ConfigError::ValidationFailed("light.reference_ohms must be > 0"));
        }
        if self.distance.us_per_cm == 0 {
            return Err(ConfigError::ValidationFailed("distance.us_per_cm must be > 0"));
        }
        if self.distance.echo_timeout_us == 0 {
            return Err(ConfigError::ValidationFailed("distance.echo_timeout_us must be bounded"));
        }
        let b = &self.broadcast;
        if b.scan_max_results == 0 || b.scan_max_results as usize > SCAN_BUFFER {
            return Err(ConfigError::ValidationFailed("broadcast.scan_max_results out of 1..=30"));
        }
        if b.countdown_ticks == 0 {
            return Err(ConfigError::ValidationFailed("broadcast.countdown_ticks must be > 0"));
        }
        if b.connect_timeout_ms == 0 || b.scan_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("radio timeouts must be bounded"));
        }
        if self.role.uses_broadcast() && b.known_peers.is_empty() {
            return Err(ConfigError::ValidationFailed("broadcast role needs known peers"));
        }
        for (i, id) in b.known_peers.iter().enumerate() {
            if b.known_peers[..i].contains(id) {
                return Err(ConfigError::ValidationFailed("duplicate known peer service id"));
            }
        }
        Ok(())
    }
}
