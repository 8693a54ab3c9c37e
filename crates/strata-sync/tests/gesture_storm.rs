//! Storm tests: minutes of adversarial interaction, compressed and seeded.

use proptest::prelude::*;
use strata_core::DepthRange;
use strata_harness::{GestureStorm, StormPattern, assert_converged, attach_recording};
use strata_sync::{Gesture, SyncConfig, SyncEngine};

fn range(top: f64, bottom: f64) -> DepthRange {
    DepthRange::new(top, bottom).unwrap()
}

#[test]
fn mixed_storm_leaves_every_pane_converged() {
    let mut engine = SyncEngine::new(range(0.0, 1000.0));
    let panes = [
        attach_recording(engine.store_mut(), 500).unwrap(),
        attach_recording(engine.store_mut(), 300).unwrap(),
        attach_recording(engine.store_mut(), 750).unwrap(),
    ];
    let origin = panes[0].0;

    let storm = GestureStorm::new(StormPattern::MixedBurst { count: 500 }, 0xDEADBEEF, 500);
    for gesture in storm.generate() {
        engine.handle_gesture(origin, gesture).unwrap();
    }

    assert!(engine.store().state().is_consistent());
    assert_converged(engine.store().state(), &panes).unwrap();
}

#[test]
fn every_pane_sees_the_same_monotonic_sequence() {
    let mut engine = SyncEngine::new(range(0.0, 1000.0));
    let panes = [
        attach_recording(engine.store_mut(), 500).unwrap(),
        attach_recording(engine.store_mut(), 250).unwrap(),
    ];
    let origin = panes[0].0;

    let storm = GestureStorm::new(StormPattern::ScrollFlood { count: 200 }, 7, 500);
    for gesture in storm.generate() {
        engine.handle_gesture(origin, gesture).unwrap();
    }

    // Past their private attach snapshots (four deliveries each), both panes
    // saw every broadcast: identical sequence numbers, strictly increasing,
    // identical payloads.
    let log_a: Vec<_> = panes[0].1.borrow().deliveries()[4..].to_vec();
    let log_b: Vec<_> = panes[1].1.borrow().deliveries()[4..].to_vec();
    assert_eq!(log_a, log_b);
    for pair in log_a.windows(2) {
        assert!(pair[0].meta.seq < pair[1].meta.seq);
    }
}

#[test]
fn coalesced_scroll_burst_matches_sequential_result_away_from_edges() {
    let deltas = [3.0, -7.5, 12.0, 4.25, -1.0, 9.0, -2.25];

    let mut sequential = SyncEngine::new(range(0.0, 1000.0));
    let (id_s, _) = attach_recording(sequential.store_mut(), 500).unwrap();
    sequential
        .store_mut()
        .set_viewport_range(400.0, 500.0)
        .unwrap();

    let mut coalesced = SyncEngine::with_config(
        range(0.0, 1000.0),
        SyncConfig {
            coalesce_input: true,
            ..Default::default()
        },
    );
    let (id_c, _) = attach_recording(coalesced.store_mut(), 500).unwrap();
    coalesced
        .store_mut()
        .set_viewport_range(400.0, 500.0)
        .unwrap();

    for delta_px in deltas {
        sequential
            .handle_gesture(id_s, Gesture::ScrollBy { delta_px })
            .unwrap();
    }
    coalesced
        .handle_gestures(id_c, deltas.map(|delta_px| Gesture::ScrollBy { delta_px }))
        .unwrap();

    // Away from the data edges, one cumulative shift equals the burst.
    assert_eq!(
        sequential.store().state().visible_range(),
        coalesced.store().state().visible_range()
    );
}

#[test]
fn coalescing_reduces_broadcast_count() {
    let mut engine = SyncEngine::with_config(
        range(0.0, 1000.0),
        SyncConfig {
            coalesce_input: true,
            ..Default::default()
        },
    );
    let (id, pane) = attach_recording(engine.store_mut(), 500).unwrap();
    engine.store_mut().set_viewport_range(400.0, 500.0).unwrap();

    let before = pane.borrow().deliveries().len();
    let storm = GestureStorm::new(StormPattern::CursorSweep { count: 100 }, 3, 500);
    engine.handle_gestures(id, storm.generate()).unwrap();

    // A hundred pointer moves collapse to a single cursor broadcast.
    assert_eq!(pane.borrow().deliveries().len() - before, 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn storms_never_break_invariants(seed in any::<u64>(), count in 1usize..300) {
        let mut engine = SyncEngine::new(range(0.0, 1000.0));
        let panes = [
            attach_recording(engine.store_mut(), 500).unwrap(),
            attach_recording(engine.store_mut(), 333).unwrap(),
        ];
        let origin = panes[0].0;

        let storm = GestureStorm::new(StormPattern::MixedBurst { count }, seed, 500);
        for gesture in storm.generate() {
            engine.handle_gesture(origin, gesture).unwrap();
        }

        prop_assert!(engine.store().state().is_consistent());
        prop_assert!(assert_converged(engine.store().state(), &panes).is_ok());
        let visible = engine.store().state().visible_range();
        prop_assert!(visible.is_subrange_of(&engine.store().state().total_range()));
    }
}
