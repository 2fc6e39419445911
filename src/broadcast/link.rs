//! Per-peer link record and its state machine.
//!
//! ```text
//!  Disconnected ──▶ Discovered ──▶ Connecting ──▶ Connected
//!       ▲               │              │              │
//!       └───────────────┴──────────────┴──────────────┘
//! ```
//!
//! Every state may fall back to Disconnected; forward moves are one step
//! at a time.  In particular Connected never goes straight back to
//! Connecting.

use log::warn;

use crate::app::ports::{CharHandle, LinkHandle, PeerAddress};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Discovered,
    Connecting,
    Connected,
}

impl LinkState {
    pub fn can_transition_to(self, next: LinkState) -> bool {
        use LinkState::*;
        matches!(
            (self, next),
            (_, Disconnected)
                | (Disconnected, Discovered)
                | (Discovered, Connecting)
                | (Connecting, Connected)
        )
    }
}

/// One known peer.  Created from configuration, so there is exactly one
/// record, and therefore at most one live link, per service id.
#[derive(Debug, Clone)]
pub struct PeerLink {
    pub service: u128,
    address: Option<PeerAddress>,
    state: LinkState,
    link: Option<LinkHandle>,
    /// Readable/notifiable channel from the peer.
    notify_char: Option<CharHandle>,
    /// Writable status channel the broadcast bit goes to.
    status_char: Option<CharHandle>,
}

impl PeerLink {
    pub fn new(service: u128) -> Self {
        Self {
            service,
            address: None,
            state: LinkState::Disconnected,
            link: None,
            notify_char: None,
            status_char: None,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// Disconnected is the only state without a live (or pending) link.
    pub fn is_live(&self) -> bool {
        self.state != LinkState::Disconnected
    }

    pub fn address(&self) -> Option<PeerAddress> {
        self.address
    }

    pub fn link(&self) -> Option<LinkHandle> {
        self.link
    }

    pub fn status_char(&self) -> Option<CharHandle> {
        self.status_char
    }

    pub fn notify_char(&self) -> Option<CharHandle> {
        self.notify_char
    }

    /// Move to `next`.  Illegal moves are refused and logged; returns the
    /// previous state on success.
    pub fn transition(&mut self, next: LinkState) -> Option<LinkState> {
        if !self.state.can_transition_to(next) {
            warn!(
                "peer {:032x}: refused {:?} -> {:?}",
                self.service, self.state, next
            );
            return None;
        }
        let prev = self.state;
        self.state = next;
        if next == LinkState::Disconnected {
            self.link = None;
            self.notify_char = None;
            self.status_char = None;
        }
        Some(prev)
    }

    pub(super) fn discovered(&mut self, address: PeerAddress) -> Option<LinkState> {
        let prev = self.transition(LinkState::Discovered)?;
        self.address = Some(address);
        Some(prev)
    }

    pub(super) fn attach(&mut self, link: LinkHandle) {
        self.link = Some(link);
    }

    pub(super) fn established(
        &mut self,
        notify_char: CharHandle,
        status_char: CharHandle,
    ) -> Option<LinkState> {
        let prev = self.transition(LinkState::Connected)?;
        self.notify_char = Some(notify_char);
        self.status_char = Some(status_char);
        Some(prev)
    }
}
