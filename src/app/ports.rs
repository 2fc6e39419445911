//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Engines / ControlLoop (domain)
//! ```
//!
//! Driven adapters (GPIO/ADC, radio, console, clock) implement these
//! traits.  The engines consume them via generics, so the domain core never
//! touches hardware directly.
//!
//! ## Bounded waits
//!
//! Every blocking primitive carries an explicit upper bound:
//! [`GpioPort::pulse_in`] takes a timeout, [`RadioPort::scan`] and
//! [`RadioPort::connect`] take one in milliseconds.  Implementations MUST
//! return the "no result" outcome when it expires rather than block.

use embedded_hal::delay::DelayNs;

use crate::config::SCAN_BUFFER;
use crate::pins::Pin;

// ───────────────────────────────────────────────────────────────
// GPIO / ADC port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
}

/// The board primitives the sampling engine needs.  Microsecond and
/// millisecond delays come from [`DelayNs`].
pub trait GpioPort: DelayNs {
    fn pin_mode(&mut self, pin: Pin, mode: PinMode);

    fn digital_write(&mut self, pin: Pin, level: Level);

    /// One raw conversion (0 to resolution-1).
    fn analog_read(&mut self, pin: Pin) -> u16;

    /// Length of the next pulse at `level` in microseconds.
    /// `None` if no complete pulse was seen within `timeout_us`.
    fn pulse_in(&mut self, pin: Pin, level: Level, timeout_us: u32) -> Option<u32>;
}

// ───────────────────────────────────────────────────────────────
// Radio port (driven adapter: domain ↔ BLE central stack)
// ───────────────────────────────────────────────────────────────

/// Opaque peer address as reported by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerAddress(pub [u8; 6]);

impl core::fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// Radio-assigned handle for an open link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkHandle(pub u16);

/// Radio-assigned handle for a resolved characteristic on a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharHandle {
    pub link: LinkHandle,
    pub attr: u16,
}

/// One scan result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advertisement {
    pub address: PeerAddress,
    /// First 128-bit service UUID in the advertising payload, if any.
    pub service: Option<u128>,
    pub rssi: i8,
}

/// Maximum notification payload carried through the queue.
pub const NOTIFY_PAYLOAD: usize = 20;

/// A value delivered on a subscribed characteristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub link: LinkHandle,
    pub data: heapless::Vec<u8, NOTIFY_PAYLOAD>,
}

/// Radio central operations used by the broadcast engine.
///
/// Notifications are never delivered by callback into the engine; the
/// adapter buffers them and the engine pulls them with
/// [`take_notification`](Self::take_notification) once per iteration.
pub trait RadioPort {
    /// Scan for up to `timeout_ms` and return at most `max_results` results.
    fn scan(
        &mut self,
        max_results: usize,
        timeout_ms: u32,
    ) -> heapless::Vec<Advertisement, SCAN_BUFFER>;

    fn connect(&mut self, address: PeerAddress, timeout_ms: u32) -> Result<LinkHandle, RadioError>;

    fn resolve_characteristic(&mut self, link: LinkHandle, uuid: u128)
    -> Result<CharHandle, RadioError>;

    fn write_value(&mut self, handle: CharHandle, data: &[u8]) -> Result<(), RadioError>;

    /// Register for notifications on `handle`.
    fn subscribe(&mut self, handle: CharHandle) -> Result<(), RadioError>;

    fn disconnect(&mut self, link: LinkHandle);

    /// `false` once the stack has observed link loss.
    fn is_connected(&self, link: LinkHandle) -> bool;

    /// Pop the oldest buffered notification.
    fn take_notification(&mut self) -> Option<Notification>;
}

// ───────────────────────────────────────────────────────────────
// Peripheral port (driven adapter: domain ↔ BLE GATT server)
// ───────────────────────────────────────────────────────────────

/// The remote-node side of the status link.
pub trait PeripheralPort {
    /// Start advertising `service` with a writable status characteristic
    /// and a notifiable data characteristic.
    fn start_advertising(&mut self, service: u128) -> Result<(), RadioError>;

    fn is_advertising(&self) -> bool;

    /// Pop the oldest value a central wrote to the status characteristic.
    fn take_status_write(&mut self) -> Option<heapless::Vec<u8, NOTIFY_PAYLOAD>>;

    /// Push `data` to subscribed centrals.
    fn notify(&mut self, data: &[u8]) -> Result<(), RadioError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time since boot.
pub trait ClockPort {
    fn now_ms(&self) -> u64;
}

impl<C: ClockPort + ?Sized> ClockPort for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → console)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

/// Lets roles hand a `&mut dyn EventSink` to the generic engines.
impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: &super::events::AppEvent) {
        (**self).emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`RadioPort`] and [`PeripheralPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// The operation did not complete within its bound.
    Timeout,
    /// The peer refused or dropped the connection.
    Rejected,
    /// No characteristic with the requested UUID on the link.
    NotFound,
    /// The link is gone.
    NotConnected,
    /// Stack-level failure.
    Stack,
}

/// Errors from loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The document failed to parse.
    Corrupted,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for RadioError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out"),
            Self::Rejected => write!(f, "rejected by peer"),
            Self::NotFound => write!(f, "not found"),
            Self::NotConnected => write!(f, "not connected"),
            Self::Stack => write!(f, "radio stack error"),
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
