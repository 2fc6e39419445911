//! Unified error types for the sensor node.
//!
//! Nothing in this system is fatal.  Every variant here describes a
//! degraded outcome (a sentinel reading, a peer left Disconnected, a
//! discarded notification) that the control loop logs and moves past.
//! All variants are `Copy` so they can be stored inside readings and
//! events without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every degraded outcome in the node funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor channel could not produce a valid reading.
    Sensor(SensorError),
    /// A peer link could not be established.
    Link(LinkError),
    /// A peer notification was ignored.
    Notify(NotifyError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Notify(e) => write!(f, "notify: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Why a channel reported its sentinel value instead of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The echo pulse did not arrive within the bounded wait.
    AcquisitionTimeout,
    /// The computed distance exceeds the sensor's rated range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AcquisitionTimeout => write!(f, "echo wait timed out"),
            Self::OutOfRange => write!(f, "reading beyond rated range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

/// Which step of link establishment failed.  Every variant leaves the
/// peer Disconnected; it is retried on the next scan window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The radio could not open a connection to the advertiser.
    ConnectionFailed,
    /// The link opened but a required characteristic was not found.
    CharacteristicMissing(u128),
    /// Notify registration on the readable characteristic failed.
    SubscribeFailed,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed => write!(f, "connection failed"),
            Self::CharacteristicMissing(uuid) => {
                write!(f, "characteristic {uuid:032x} not resolved")
            }
            Self::SubscribeFailed => write!(f, "notify subscription failed"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Notification errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyError {
    /// Payload carried no bytes.
    EmptyPayload,
    /// Notification arrived on a link that is no longer Connected.
    UnknownLink,
    /// The bounded notification queue was full; the payload was dropped.
    QueueFull,
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "empty payload"),
            Self::UnknownLink => write!(f, "no connected peer for link"),
            Self::QueueFull => write!(f, "notification queue full"),
        }
    }
}

impl From<NotifyError> for Error {
    fn from(e: NotifyError) -> Self {
        Self::Notify(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Node-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
