//! Control loop: sampling and broadcast sharing one cadence.

use crate::mock_hw::{ADDR_A, ADDR_B, RecordingSink, bench, fast_config, two_peer_air};

use sensornode::adapters::sim_radio::SimRadio;
use sensornode::adapters::time::ManualClock;
use sensornode::app::events::AppEvent;
use sensornode::app::roles::RoleKind;
use sensornode::app::service::ControlLoop;
use sensornode::broadcast::{BroadcastState, TickOutcome};

#[test]
fn every_iteration_samples_then_runs_the_broadcast_step() {
    let cfg = fast_config(RoleKind::Combined);
    let mut ctl = ControlLoop::new(&cfg);
    let mut hw = bench();
    let mut radio = two_peer_air();
    let clock = ManualClock::new(0);
    let mut sink = RecordingSink::new();
    ctl.start(&mut hw, &mut sink);
    assert_eq!(sink.events, vec![AppEvent::Started(RoleKind::Combined)]);
    sink.clear();

    let (sample, outcome) = ctl.tick(&mut hw, &mut radio, &clock, &mut sink);

    assert_eq!(sample.tick, 1);
    assert_eq!(outcome, TickOutcome::Scanned { connected: 2 });
    assert_eq!(sink.events.first(), Some(&AppEvent::Sample(sample)));
    assert!(matches!(
        sink.events.last(),
        Some(AppEvent::ScanCompleted { .. })
    ));
    assert_eq!(ctl.iterations(), 1);
    assert_eq!(ctl.last_sample(), Some(&sample));
}

#[test]
fn full_cycle_alternates_the_broadcast_bit() {
    let cfg = fast_config(RoleKind::Combined);
    let mut ctl = ControlLoop::new(&cfg);
    let mut hw = bench();
    let mut radio = two_peer_air();
    let clock = ManualClock::new(0);
    let mut sink = RecordingSink::new();
    ctl.start(&mut hw, &mut sink);

    let mut outcomes = Vec::new();
    for _ in 0..7 {
        let (_, o) = ctl.tick(&mut hw, &mut radio, &clock, &mut sink);
        outcomes.push(o);
        clock.advance(500);
    }

    assert_eq!(
        outcomes,
        vec![
            TickOutcome::Scanned { connected: 2 },
            TickOutcome::CountedDown(2),
            TickOutcome::CountedDown(1),
            TickOutcome::Broadcast(BroadcastState(true)),
            TickOutcome::CountedDown(2),
            TickOutcome::CountedDown(1),
            TickOutcome::Broadcast(BroadcastState(false)),
        ]
    );
    assert_eq!(radio.writes_to(ADDR_A), vec![1, 0]);
    assert_eq!(radio.writes_to(ADDR_B), vec![1, 0]);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::Sample(_))),
        7,
        "sampling never pauses for the radio"
    );
}

#[test]
fn sampling_continues_with_nobody_to_talk_to() {
    let cfg = fast_config(RoleKind::Combined);
    let mut ctl = ControlLoop::new(&cfg);
    let mut hw = bench();
    let mut radio = SimRadio::new();
    let clock = ManualClock::new(0);
    let mut sink = RecordingSink::new();

    let (_, first) = ctl.tick(&mut hw, &mut radio, &clock, &mut sink);
    let (s, second) = ctl.tick(&mut hw, &mut radio, &clock, &mut sink);

    assert_eq!(first, TickOutcome::Scanned { connected: 0 });
    assert_eq!(second, TickOutcome::ScanDeferred);
    assert_eq!(s.tick, 2);
    assert_eq!(s.distance_cm(), 100);
    assert_eq!(ctl.broadcast().countdown(), 3);
}

#[test]
fn each_iteration_ends_with_the_loop_delay() {
    let mut cfg = fast_config(RoleKind::Combined);
    cfg.loop_delay_ms = 500;
    let mut ctl = ControlLoop::new(&cfg);
    let mut hw = bench();
    let mut radio = SimRadio::new();
    let clock = ManualClock::new(0);
    let mut sink = RecordingSink::new();

    ctl.tick(&mut hw, &mut radio, &clock, &mut sink);

    // Trigger settle (2 µs) + trigger pulse (10 µs) + 500 ms.
    assert_eq!(hw.delayed_ns(), 2_000 + 10_000 + 500_000_000);
    assert_eq!(ctl.sampler().samples_taken(), 1);
}
