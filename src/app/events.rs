//! Outbound application events.
//!
//! The engines emit these through the [`EventSink`](super::ports::EventSink)
//! port.  Adapters on the other side decide what to do with them: print
//! to the serial console, record them in a test, etc.

use super::roles::RoleKind;
use crate::broadcast::LinkState;
use crate::error::{LinkError, NotifyError};
use crate::sensors::SensorSample;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A role has started (carries the selected role).
    Started(RoleKind),

    /// One iteration's sensor readings.
    Sample(SensorSample),

    /// A peer link moved between states.
    PeerStateChanged {
        service: u128,
        from: LinkState,
        to: LinkState,
    },

    /// A connection attempt ended without a usable link.
    LinkFailed { service: u128, error: LinkError },

    /// A scan window closed.
    ScanCompleted { results: u8, matched: u8 },

    /// The shared bit flipped and was written to the connected peers.
    BroadcastToggled {
        value: bool,
        delivered: u8,
        failed: u8,
    },

    /// A connected peer notified a value.
    DataReceived { service: u128, first_byte: u8 },

    /// A notification was ignored.
    NotificationDiscarded(NotifyError),

    /// Peripheral role: a central wrote the status bit and it was applied.
    StatusApplied { value: bool },
}
