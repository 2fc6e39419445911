//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the `log`
//! facade (which goes to the serial console on the device and to stdout
//! on the host).  Sensor samples become one line per reported quantity;
//! these are debug lines, not a wire format.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::sensors::calibration::Correction;

/// Adapter that logs every [`AppEvent`] to the console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Sample(s) => {
                let branch = match s.light.correction {
                    Correction::None => "uncorrected",
                    Correction::Rising => "rising",
                    Correction::Falling => "falling",
                };
                info!(
                    "SAMPLE #{} | light={:.1}lux (raw={:.1} prev={:.1} {}) adc={:.0}",
                    s.tick,
                    s.light.lux,
                    s.light.raw_lux,
                    s.light.previous_lux,
                    branch,
                    s.light.mean_adc,
                );
                info!(
                    "SAMPLE #{} | sound={:.2}dBA (pkpk={} vout={:.4}V)",
                    s.tick, s.sound.dba, s.sound.peak_to_peak, s.sound.voltage,
                );
                match s.distance.fault {
                    None => info!("SAMPLE #{} | distance={}cm", s.tick, s.distance.cm),
                    Some(fault) => info!(
                        "SAMPLE #{} | distance={}cm ({})",
                        s.tick, s.distance.cm, fault
                    ),
                }
            }
            AppEvent::PeerStateChanged { service, from, to } => {
                info!("PEER | {:032x} {:?} -> {:?}", service, from, to);
            }
            AppEvent::LinkFailed { service, error } => {
                info!("PEER | {:032x} failed: {}", service, error);
            }
            AppEvent::ScanCompleted { results, matched } => {
                info!("SCAN | results={} matched={}", results, matched);
            }
            AppEvent::BroadcastToggled {
                value,
                delivered,
                failed,
            } => {
                info!(
                    "BCAST | state={} delivered={} failed={}",
                    if *value { "ON" } else { "OFF" },
                    delivered,
                    failed
                );
            }
            AppEvent::DataReceived {
                service,
                first_byte,
            } => {
                info!("RECV | {:032x} data=0x{:02x}", service, first_byte);
            }
            AppEvent::NotificationDiscarded(reason) => {
                info!("RECV | discarded: {}", reason);
            }
            AppEvent::StatusApplied { value } => {
                info!("STATUS | {}", if *value { "ON" } else { "OFF" });
            }
            AppEvent::Started(role) => {
                info!("START | role={}", role.name());
            }
        }
    }
}
