//! Peer broadcast engine against the simulated radio.

use crate::mock_hw::{ADDR_A, ADDR_B, RecordingSink, fast_config, two_peer_air};

use sensornode::adapters::sim_radio::SimRadio;
use sensornode::app::events::AppEvent;
use sensornode::app::ports::{LinkHandle, RadioPort};
use sensornode::app::roles::RoleKind;
use sensornode::broadcast::{
    BroadcastState, LinkState, PeerBroadcastEngine, STATUS_CHAR_UUID, TickOutcome,
};
use sensornode::config::{BroadcastConfig, NodeConfig, PEER_A_SERVICE, PEER_B_SERVICE};
use sensornode::error::{Error, LinkError, NotifyError};

use LinkState::*;

fn cfg() -> BroadcastConfig {
    fast_config(RoleKind::Central).broadcast
}

fn linked_pair() -> (PeerBroadcastEngine, SimRadio, RecordingSink) {
    let mut eng = PeerBroadcastEngine::new(cfg());
    let mut radio = two_peer_air();
    let mut sink = RecordingSink::new();
    assert_eq!(
        eng.tick(&mut radio, 0, &mut sink),
        TickOutcome::Scanned { connected: 2 }
    );
    sink.clear();
    (eng, radio, sink)
}

// ── Discovery and linking ─────────────────────────────────────

#[test]
fn both_known_peers_link_from_one_scan() {
    let mut eng = PeerBroadcastEngine::new(cfg());
    let mut radio = two_peer_air();
    let mut sink = RecordingSink::new();

    let outcome = eng.tick(&mut radio, 0, &mut sink);

    assert_eq!(outcome, TickOutcome::Scanned { connected: 2 });
    assert_eq!(eng.connected_count(), 2);
    for (service, addr) in [(PEER_A_SERVICE, ADDR_A), (PEER_B_SERVICE, ADDR_B)] {
        let peer = eng.peer(service).unwrap();
        assert_eq!(peer.state(), Connected);
        assert_eq!(peer.address(), Some(addr));
        assert!(peer.status_char().is_some());
        assert!(peer.notify_char().is_some());
        assert_eq!(
            sink.transitions(service),
            vec![
                (Disconnected, Discovered),
                (Discovered, Connecting),
                (Connecting, Connected)
            ]
        );
    }
    assert!(sink.events.contains(&AppEvent::ScanCompleted {
        results: 5,
        matched: 2
    }));
    assert_eq!(radio.open_links(), 2);
}

#[test]
fn scan_cap_limits_what_is_seen() {
    let mut c = cfg();
    c.scan_max_results = 2;
    let mut eng = PeerBroadcastEngine::new(c);
    let mut radio = two_peer_air();
    let mut sink = RecordingSink::new();

    assert_eq!(
        eng.tick(&mut radio, 0, &mut sink),
        TickOutcome::Scanned { connected: 1 }
    );
    assert!(sink.events.contains(&AppEvent::ScanCompleted {
        results: 2,
        matched: 1
    }));
    assert_eq!(eng.peer(PEER_B_SERVICE).unwrap().state(), Disconnected);
}

#[test]
fn scans_are_spaced_by_the_interval() {
    let mut eng = PeerBroadcastEngine::new(cfg());
    let mut radio = SimRadio::new();
    let mut sink = RecordingSink::new();

    assert_eq!(
        eng.tick(&mut radio, 10_000, &mut sink),
        TickOutcome::Scanned { connected: 0 }
    );
    assert_eq!(eng.tick(&mut radio, 10_500, &mut sink), TickOutcome::ScanDeferred);
    assert_eq!(eng.tick(&mut radio, 11_999, &mut sink), TickOutcome::ScanDeferred);
    assert_eq!(
        eng.tick(&mut radio, 12_000, &mut sink),
        TickOutcome::Scanned { connected: 0 }
    );
    assert_eq!(radio.scans(), 2);
    // No countdown while nothing is connected.
    assert_eq!(eng.countdown(), 3);
}

#[test]
fn refused_connection_leaves_peer_disconnected() {
    let mut eng = PeerBroadcastEngine::new(cfg());
    let mut radio = two_peer_air();
    radio.refuse_connect(ADDR_B);
    let mut sink = RecordingSink::new();

    assert_eq!(
        eng.tick(&mut radio, 0, &mut sink),
        TickOutcome::Scanned { connected: 1 }
    );
    assert_eq!(eng.peer(PEER_A_SERVICE).unwrap().state(), Connected);
    assert_eq!(eng.peer(PEER_B_SERVICE).unwrap().state(), Disconnected);
    assert!(sink.events.contains(&AppEvent::LinkFailed {
        service: PEER_B_SERVICE,
        error: LinkError::ConnectionFailed
    }));
    assert_eq!(
        sink.transitions(PEER_B_SERVICE).last(),
        Some(&(Connecting, Disconnected))
    );
}

#[test]
fn missing_status_characteristic_tears_link_down() {
    let mut eng = PeerBroadcastEngine::new(cfg());
    let mut radio = two_peer_air();
    radio.hide_characteristic(ADDR_A, STATUS_CHAR_UUID);
    let mut sink = RecordingSink::new();

    eng.tick(&mut radio, 0, &mut sink);

    assert_eq!(eng.peer(PEER_A_SERVICE).unwrap().state(), Disconnected);
    assert!(eng.peer(PEER_A_SERVICE).unwrap().link().is_none());
    assert!(sink.events.contains(&AppEvent::LinkFailed {
        service: PEER_A_SERVICE,
        error: LinkError::CharacteristicMissing(STATUS_CHAR_UUID)
    }));
    assert_eq!(radio.link_to(ADDR_A), None);
    assert_eq!(radio.open_links(), 1);
}

#[test]
fn refused_subscription_counts_as_link_failure() {
    let mut eng = PeerBroadcastEngine::new(cfg());
    let mut radio = two_peer_air();
    radio.refuse_subscribe(ADDR_B);
    let mut sink = RecordingSink::new();

    eng.tick(&mut radio, 0, &mut sink);

    assert_eq!(eng.peer(PEER_B_SERVICE).unwrap().state(), Disconnected);
    assert!(sink.events.contains(&AppEvent::LinkFailed {
        service: PEER_B_SERVICE,
        error: LinkError::SubscribeFailed
    }));
}

#[test]
fn live_peer_is_not_reconnected() {
    let (mut eng, mut radio, mut sink) = linked_pair();
    let attempts = radio.connect_attempts();

    let result = eng.connect(&mut radio, PEER_A_SERVICE, ADDR_A, &mut sink);

    assert_eq!(result, Err(Error::Link(LinkError::ConnectionFailed)));
    assert_eq!(radio.connect_attempts(), attempts);
    assert_eq!(eng.peer(PEER_A_SERVICE).unwrap().state(), Connected);
    assert!(sink.transitions(PEER_A_SERVICE).is_empty());
}

#[test]
fn unknown_service_cannot_be_connected() {
    let mut eng = PeerBroadcastEngine::new(cfg());
    let mut radio = two_peer_air();
    let mut sink = RecordingSink::new();
    assert!(eng.connect(&mut radio, 0x1234, ADDR_A, &mut sink).is_err());
    assert_eq!(radio.connect_attempts(), 0);
}

// ── Countdown and fan-out ─────────────────────────────────────

#[test]
fn countdown_toggles_and_writes_the_same_value_everywhere() {
    let (mut eng, mut radio, mut sink) = linked_pair();

    assert_eq!(eng.tick(&mut radio, 1, &mut sink), TickOutcome::CountedDown(2));
    assert_eq!(eng.tick(&mut radio, 2, &mut sink), TickOutcome::CountedDown(1));
    assert!(radio.writes().is_empty());
    assert_eq!(
        eng.tick(&mut radio, 3, &mut sink),
        TickOutcome::Broadcast(BroadcastState(true))
    );
    assert_eq!(eng.countdown(), 3);
    assert_eq!(radio.writes_to(ADDR_A), vec![1]);
    assert_eq!(radio.writes_to(ADDR_B), vec![1]);

    for t in 4..7 {
        eng.tick(&mut radio, t, &mut sink);
    }
    assert_eq!(eng.broadcast_state(), BroadcastState(false));
    assert_eq!(radio.writes_to(ADDR_A), vec![1, 0]);
    assert_eq!(radio.writes_to(ADDR_B), vec![1, 0]);
    assert_eq!(sink.toggles(), vec![(true, 2, 0), (false, 2, 0)]);
}

#[test]
fn default_countdown_toggles_every_ten_thousand_ticks() {
    let mut eng = PeerBroadcastEngine::new(NodeConfig::default().broadcast);
    let mut radio = two_peer_air();
    let mut sink = RecordingSink::new();
    assert_eq!(
        eng.tick(&mut radio, 0, &mut sink),
        TickOutcome::Scanned { connected: 2 }
    );

    let mut toggled_at = Vec::new();
    for t in 1..=30_000u64 {
        if let TickOutcome::Broadcast(state) = eng.tick(&mut radio, t, &mut sink) {
            toggled_at.push((t, state));
        }
    }

    assert_eq!(
        toggled_at,
        vec![
            (10_000, BroadcastState(true)),
            (20_000, BroadcastState(false)),
            (30_000, BroadcastState(true))
        ]
    );
    assert_eq!(radio.writes_to(ADDR_A), vec![1, 0, 1]);
    assert_eq!(radio.writes_to(ADDR_B), vec![1, 0, 1]);
}

#[test]
fn failed_write_is_counted_but_link_kept() {
    let (mut eng, mut radio, mut sink) = linked_pair();
    radio.refuse_write(ADDR_B);

    for t in 1..4 {
        eng.tick(&mut radio, t, &mut sink);
    }

    assert_eq!(sink.toggles(), vec![(true, 1, 1)]);
    assert_eq!(radio.writes_to(ADDR_A), vec![1]);
    assert!(radio.writes_to(ADDR_B).is_empty());
    assert_eq!(eng.peer(PEER_B_SERVICE).unwrap().state(), Connected);
}

// ── Link loss ─────────────────────────────────────────────────

#[test]
fn lost_link_is_reaped_on_next_tick() {
    let (mut eng, mut radio, mut sink) = linked_pair();
    radio.drop_link(ADDR_A);

    let outcome = eng.tick(&mut radio, 1, &mut sink);

    // B is still connected, so this is a countdown tick, not a scan.
    assert_eq!(outcome, TickOutcome::CountedDown(2));
    assert_eq!(sink.transitions(PEER_A_SERVICE), vec![(Connected, Disconnected)]);
    assert_eq!(eng.connected_count(), 1);
    assert_eq!(radio.scans(), 1);

    for t in 2..4 {
        eng.tick(&mut radio, t, &mut sink);
    }
    assert_eq!(sink.toggles(), vec![(true, 1, 0)]);
    assert!(radio.writes_to(ADDR_A).is_empty());
}

#[test]
fn countdown_survives_losing_every_peer() {
    let (mut eng, mut radio, mut sink) = linked_pair();
    eng.tick(&mut radio, 1, &mut sink);
    eng.tick(&mut radio, 2, &mut sink);
    assert_eq!(eng.countdown(), 1);

    radio.drop_link(ADDR_A);
    radio.drop_link(ADDR_B);
    assert_eq!(
        eng.tick(&mut radio, 2_000, &mut sink),
        TickOutcome::Scanned { connected: 2 }
    );
    assert_eq!(eng.countdown(), 1);
    assert_eq!(
        sink.transitions(PEER_A_SERVICE),
        vec![
            (Connected, Disconnected),
            (Disconnected, Discovered),
            (Discovered, Connecting),
            (Connecting, Connected)
        ]
    );

    assert_eq!(
        eng.tick(&mut radio, 2_001, &mut sink),
        TickOutcome::Broadcast(BroadcastState(true))
    );
}

// ── Inbound notifications ─────────────────────────────────────

#[test]
fn echoed_status_surfaces_as_data_received() {
    let (mut eng, mut radio, mut sink) = linked_pair();
    radio.set_echo_writes(true);

    for t in 1..4 {
        eng.tick(&mut radio, t, &mut sink);
    }
    assert_eq!(radio.pending_notifications(), 2);
    sink.clear();

    eng.tick(&mut radio, 4, &mut sink);

    assert_eq!(radio.pending_notifications(), 0);
    assert!(sink.events.contains(&AppEvent::DataReceived {
        service: PEER_A_SERVICE,
        first_byte: 1
    }));
    assert!(sink.events.contains(&AppEvent::DataReceived {
        service: PEER_B_SERVICE,
        first_byte: 1
    }));
    // Notifications never touch link state.
    assert!(sink.transitions(PEER_A_SERVICE).is_empty());
}

#[test]
fn stray_and_empty_notifications_are_discarded() {
    let (mut eng, mut radio, mut sink) = linked_pair();
    assert!(radio.notify_on(LinkHandle(999), &[1]));
    assert!(radio.notify_from(ADDR_A, &[]));

    eng.tick(&mut radio, 1, &mut sink);

    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::NotificationDiscarded(NotifyError::UnknownLink))),
        1
    );
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::NotificationDiscarded(NotifyError::EmptyPayload))),
        1
    );
    assert_eq!(eng.connected_count(), 2);
}

#[test]
fn only_first_byte_is_significant() {
    let (mut eng, mut radio, mut sink) = linked_pair();
    let link = radio.link_to(ADDR_B).unwrap();
    let n = {
        assert!(radio.notify_on(link, &[0x2A, 0xFF, 0xFF]));
        radio.take_notification().unwrap()
    };

    assert_eq!(eng.on_data_received(&n, &mut sink), Ok(0x2A));
    assert_eq!(
        sink.events,
        vec![AppEvent::DataReceived {
            service: PEER_B_SERVICE,
            first_byte: 0x2A
        }]
    );
}

#[test]
fn refused_subscription_leaves_no_notifying_link() {
    let mut eng = PeerBroadcastEngine::new(cfg());
    let mut radio = two_peer_air();
    radio.refuse_subscribe(ADDR_B);
    radio.set_echo_writes(true);
    let mut sink = RecordingSink::new();
    eng.tick(&mut radio, 0, &mut sink);

    assert!(!radio.notify_from(ADDR_B, &[1]));
    assert!(radio.notify_from(ADDR_A, &[1]));
    assert_eq!(radio.pending_notifications(), 1);
}

#[test]
fn cleared_refusal_links_on_the_next_scan() {
    let mut eng = PeerBroadcastEngine::new(cfg());
    let mut radio = two_peer_air();
    radio.refuse_connect(ADDR_A);
    radio.refuse_connect(ADDR_B);
    let mut sink = RecordingSink::new();

    assert_eq!(
        eng.tick(&mut radio, 0, &mut sink),
        TickOutcome::Scanned { connected: 0 }
    );
    radio.clear_faults(ADDR_A);
    assert_eq!(eng.tick(&mut radio, 1_000, &mut sink), TickOutcome::ScanDeferred);
    assert_eq!(
        eng.tick(&mut radio, 2_000, &mut sink),
        TickOutcome::Scanned { connected: 1 }
    );
    assert_eq!(eng.peer(PEER_A_SERVICE).unwrap().state(), Connected);
    assert_eq!(eng.peer(PEER_B_SERVICE).unwrap().state(), Disconnected);
}

#[test]
fn notification_queue_is_bounded() {
    let (_eng, radio, _sink) = linked_pair();
    for i in 0..8 {
        assert!(radio.notify_from(ADDR_A, &[i]));
    }
    assert!(!radio.notify_from(ADDR_A, &[8]));
    assert_eq!(radio.pending_notifications(), 8);
}
