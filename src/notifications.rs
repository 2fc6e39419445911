//! Bounded queue between radio notify callbacks and the control loop.
//!
//! Radio stacks deliver characteristic notifications from their own
//! callback context.  Adapters push them here with [`NotificationQueue::push`]
//! (lock-free from the caller's point of view, `&self` only) and the
//! broadcast engine drains them once per iteration, so a notification can
//! never mutate engine state in the middle of a scan, connect or broadcast.
//!
//! ```text
//! ┌──────────────┐  Notification  ┌──────────────┐
//! │ Radio stack  │──────────────▶│ Control loop │
//! │ (callbacks)  │   depth 8     │ (drain/tick) │
//! └──────────────┘               └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::app::ports::{LinkHandle, NOTIFY_PAYLOAD, Notification};
use crate::error::NotifyError;

/// Channel depth for inbound notifications.
pub const NOTIFY_DEPTH: usize = 8;

pub struct NotificationQueue {
    channel: Channel<CriticalSectionRawMutex, Notification, NOTIFY_DEPTH>,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue a payload.  Payloads longer than [`NOTIFY_PAYLOAD`] are
    /// truncated; a full queue drops the newest value.
    pub fn push(&self, link: LinkHandle, payload: &[u8]) -> Result<(), NotifyError> {
        let n = payload.len().min(NOTIFY_PAYLOAD);
        let mut data = heapless::Vec::new();
        // Cannot fail: n ≤ capacity.
        let _ = data.extend_from_slice(&payload[..n]);
        self.channel
            .try_send(Notification { link, data })
            .map_err(|_| NotifyError::QueueFull)
    }

    pub fn pop(&self) -> Option<Notification> {
        self.channel.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}
