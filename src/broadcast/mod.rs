//! Peer broadcast engine: discovery, linking and the shared status bit.
//!
//! The engine keeps one [`PeerLink`] per configured service id.  Each
//! control-loop iteration does exactly one of two things:
//!
//! - **no peer Connected**: scan (at most once per scan interval) and try
//!   to link every matching advertiser that has no live link yet;
//! - **≥ 1 peer Connected**: count down; on expiry flip the shared
//!   [`BroadcastState`] and write it to every Connected peer.
//!
//! Writes are fire-and-forget: no per-peer acknowledgement, no retry.
//! Link loss is picked up at the start of the next tick.

pub mod link;

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{Advertisement, EventSink, LinkHandle, Notification, PeerAddress, RadioPort};
use crate::config::{BroadcastConfig, MAX_PEERS};
use crate::error::{LinkError, NotifyError};
use crate::notifications::NOTIFY_DEPTH;
pub use link::{LinkState, PeerLink};

/// Writable status characteristic on every peer.
pub const STATUS_CHAR_UUID: u128 = 0x6e400002_b5a3_f393_e0a9_e50e24dcca9e;
/// Readable/notifiable data characteristic on every peer.
pub const DATA_CHAR_UUID: u128 = 0x6e400003_b5a3_f393_e0a9_e50e24dcca9e;

/// The shared on/off bit pushed to all peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BroadcastState(pub bool);

impl BroadcastState {
    pub fn as_byte(self) -> u8 {
        u8::from(self.0)
    }

    fn flip(&mut self) {
        self.0 = !self.0;
    }
}

/// What a single [`PeerBroadcastEngine::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing connected and the scan interval has not elapsed.
    ScanDeferred,
    /// Nothing connected; a scan ran and this many links came up.
    Scanned { connected: u8 },
    /// Connected; countdown decremented to this value.
    CountedDown(u32),
    /// Connected; countdown expired and the new state was written.
    Broadcast(BroadcastState),
}

pub struct PeerBroadcastEngine {
    cfg: BroadcastConfig,
    peers: heapless::Vec<PeerLink, MAX_PEERS>,
    state: BroadcastState,
    countdown: u32,
    last_scan_ms: Option<u64>,
}

impl PeerBroadcastEngine {
    pub fn new(cfg: BroadcastConfig) -> Self {
        let mut peers = heapless::Vec::new();
        for &service in &cfg.known_peers {
            // Same capacity as known_peers.
            let _ = peers.push(PeerLink::new(service));
        }
        Self {
            countdown: cfg.countdown_ticks,
            cfg,
            peers,
            state: BroadcastState::default(),
            last_scan_ms: None,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn broadcast_state(&self) -> BroadcastState {
        self.state
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn peers(&self) -> &[PeerLink] {
        &self.peers
    }

    pub fn peer(&self, service: u128) -> Option<&PeerLink> {
        self.peers.iter().find(|p| p.service == service)
    }

    pub fn connected_count(&self) -> usize {
        self.peers.iter().filter(|p| p.is_connected()).count()
    }

    // ── Per-tick orchestration ────────────────────────────────

    pub fn tick(
        &mut self,
        radio: &mut impl RadioPort,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        self.reap_lost_links(radio, sink);
        self.drain_notifications(radio, sink);

        if self.connected_count() == 0 {
            return self.scan_window(radio, now_ms, sink);
        }

        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 {
            return TickOutcome::CountedDown(self.countdown);
        }
        self.countdown = self.cfg.countdown_ticks;
        self.state.flip();
        self.write_all(radio, sink);
        TickOutcome::Broadcast(self.state)
    }

    /// Link to the known peer advertising `service` at `address`.
    ///
    /// Succeeds only once the connection is open and both characteristics
    /// are resolved and subscribed; any failure tears the link down and
    /// leaves the peer Disconnected.
    pub fn connect(
        &mut self,
        radio: &mut impl RadioPort,
        service: u128,
        address: PeerAddress,
        sink: &mut impl EventSink,
    ) -> crate::error::Result<LinkHandle> {
        let Some(idx) = self.peers.iter().position(|p| p.service == service) else {
            return Err(LinkError::ConnectionFailed.into());
        };
        if self.peers[idx].is_live() {
            debug!("peer {:032x}: already live, not reconnecting", service);
            return Err(LinkError::ConnectionFailed.into());
        }

        if let Some(prev) = self.peers[idx].discovered(address) {
            sink.emit(&state_event(service, prev, LinkState::Discovered));
        }
        self.move_peer(idx, LinkState::Connecting, sink);

        let link = match radio.connect(address, self.cfg.connect_timeout_ms) {
            Ok(link) => link,
            Err(e) => {
                warn!("peer {:032x}: connect to {} failed: {}", service, address, e);
                return Err(self.fail(idx, LinkError::ConnectionFailed, sink).into());
            }
        };
        self.peers[idx].attach(link);

        match establish(radio, link) {
            Ok((notify_char, status_char)) => {
                if let Some(prev) = self.peers[idx].established(notify_char, status_char) {
                    sink.emit(&state_event(service, prev, LinkState::Connected));
                }
                info!("peer {:032x}: connected at {}", service, address);
                Ok(link)
            }
            Err(err) => {
                radio.disconnect(link);
                Err(self.fail(idx, err, sink).into())
            }
        }
    }

    /// Surface a notification's first byte.  No link state changes.
    pub fn on_data_received(
        &mut self,
        notification: &Notification,
        sink: &mut impl EventSink,
    ) -> Result<u8, NotifyError> {
        let outcome = self
            .peers
            .iter()
            .find(|p| p.is_connected() && p.link() == Some(notification.link))
            .ok_or(NotifyError::UnknownLink)
            .and_then(|peer| {
                let first = *notification.data.first().ok_or(NotifyError::EmptyPayload)?;
                Ok((peer.service, first))
            });

        match outcome {
            Ok((service, first_byte)) => {
                sink.emit(&AppEvent::DataReceived {
                    service,
                    first_byte,
                });
                Ok(first_byte)
            }
            Err(e) => {
                debug!("notification on link {} discarded: {}", notification.link.0, e);
                sink.emit(&AppEvent::NotificationDiscarded(e));
                Err(e)
            }
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn scan_window(
        &mut self,
        radio: &mut impl RadioPort,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        if let Some(last) = self.last_scan_ms {
            if now_ms.saturating_sub(last) < u64::from(self.cfg.scan_interval_ms) {
                return TickOutcome::ScanDeferred;
            }
        }
        self.last_scan_ms = Some(now_ms);

        let max = self.cfg.scan_max_results as usize;
        let results = radio.scan(max, self.cfg.scan_timeout_ms);
        let mut matched = 0u8;
        let mut connected = 0u8;

        for adv in results.iter().take(max) {
            let Some(service) = self.match_advertisement(adv) else {
                continue;
            };
            matched += 1;
            if self.connect(radio, service, adv.address, sink).is_ok() {
                connected += 1;
            }
        }

        sink.emit(&AppEvent::ScanCompleted {
            results: results.len().min(max) as u8,
            matched,
        });
        TickOutcome::Scanned { connected }
    }

    /// Known service id with no live link yet.
    fn match_advertisement(&self, adv: &Advertisement) -> Option<u128> {
        let service = adv.service?;
        self.peers
            .iter()
            .find(|p| p.service == service && !p.is_live())
            .map(|p| p.service)
    }

    fn write_all(&mut self, radio: &mut impl RadioPort, sink: &mut impl EventSink) {
        let payload = [self.state.as_byte()];
        let mut delivered = 0u8;
        let mut failed = 0u8;

        for idx in 0..self.peers.len() {
            let Some(handle) = self.peers[idx].status_char() else {
                continue;
            };
            if !self.peers[idx].is_connected() {
                continue;
            }
            match radio.write_value(handle, &payload) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    failed += 1;
                    warn!("peer {:032x}: status write failed: {}", self.peers[idx].service, e);
                }
            }
        }

        sink.emit(&AppEvent::BroadcastToggled {
            value: self.state.0,
            delivered,
            failed,
        });
    }

    fn reap_lost_links(&mut self, radio: &mut impl RadioPort, sink: &mut impl EventSink) {
        for idx in 0..self.peers.len() {
            let peer = &self.peers[idx];
            let lost = match peer.link() {
                Some(link) => peer.is_connected() && !radio.is_connected(link),
                None => false,
            };
            if lost {
                info!("peer {:032x}: link lost", peer.service);
                self.move_peer(idx, LinkState::Disconnected, sink);
            }
        }
    }

    fn drain_notifications(&mut self, radio: &mut impl RadioPort, sink: &mut impl EventSink) {
        for _ in 0..NOTIFY_DEPTH {
            let Some(n) = radio.take_notification() else {
                break;
            };
            let _ = self.on_data_received(&n, sink);
        }
    }

    fn move_peer(&mut self, idx: usize, next: LinkState, sink: &mut impl EventSink) {
        let service = self.peers[idx].service;
        if let Some(prev) = self.peers[idx].transition(next) {
            sink.emit(&state_event(service, prev, next));
        }
    }

    fn fail(&mut self, idx: usize, error: LinkError, sink: &mut impl EventSink) -> LinkError {
        sink.emit(&AppEvent::LinkFailed {
            service: self.peers[idx].service,
            error,
        });
        self.move_peer(idx, LinkState::Disconnected, sink);
        error
    }
}

/// Resolve both characteristics and subscribe to the notify one.
fn establish(
    radio: &mut impl RadioPort,
    link: LinkHandle,
) -> Result<(crate::app::ports::CharHandle, crate::app::ports::CharHandle), LinkError> {
    let notify_char = radio
        .resolve_characteristic(link, DATA_CHAR_UUID)
        .map_err(|_| LinkError::CharacteristicMissing(DATA_CHAR_UUID))?;
    let status_char = radio
        .resolve_characteristic(link, STATUS_CHAR_UUID)
        .map_err(|_| LinkError::CharacteristicMissing(STATUS_CHAR_UUID))?;
    radio
        .subscribe(notify_char)
        .map_err(|_| LinkError::SubscribeFailed)?;
    Ok((notify_char, status_char))
}

fn state_event(service: u128, from: LinkState, to: LinkState) -> AppEvent {
    AppEvent::PeerStateChanged { service, from, to }
}
