//! End-to-end scheduling scenarios against the public API:
//!   FeatureTrack + TriggerCatalog → CueScheduler → RecordingSink → assertions

use cue_engine_core::{
    parse_track, CueId, CueScheduler, EvaluationMode, FeatureFrame, FeatureTrack,
    RangePredicate, RecordingSink, SchedulerConfig, SchedulerState, SinkCall, TickOutcome,
    TriggerCatalog,
};

// ─── Helpers ───────────────────────────────────────────────────────────────

fn high_energy_only() -> TriggerCatalog {
    let mut catalog = TriggerCatalog::new();
    catalog.add(CueId::HighEnergy);
    catalog.set_ranges(
        CueId::HighEnergy,
        RangePredicate::new(0.7, 1.0),
        RangePredicate::new(0.0, 1.0),
        RangePredicate::new(0.0, 1.0),
    );
    catalog
}

fn start(track: FeatureTrack, catalog: TriggerCatalog, mode: EvaluationMode) -> CueScheduler {
    let mut scheduler = CueScheduler::new(SchedulerConfig {
        mode,
        ..SchedulerConfig::default()
    });
    scheduler.bind(track, catalog).expect("track has frames");
    scheduler.start().expect("track is bound");
    scheduler
}

/// A wandering but deterministic feature curve.
fn synthetic_track(len: usize) -> FeatureTrack {
    let frames = (0..len)
        .map(|i| {
            let t = i as f32;
            FeatureFrame::new(
                (t * 0.37).sin() * 0.5 + 0.5,
                (t * 0.91).cos() * 0.5 + 0.5,
                (t * 0.13).sin().abs(),
            )
        })
        .collect();
    FeatureTrack::new(124, frames)
}

fn replay(track: &FeatureTrack, mode: EvaluationMode) -> Vec<SinkCall> {
    let mut scheduler = start(track.clone(), TriggerCatalog::with_default_presets(), mode);
    let mut sink = RecordingSink::with_clip_length(3);
    while scheduler.is_running() {
        scheduler.advance_one_tick(&mut sink);
        sink.elapse();
    }
    sink.calls().to_vec()
}

// ─── Scenarios ─────────────────────────────────────────────────────────────

#[test]
fn high_energy_scenario() {
    let track = parse_track(
        r#"{ "bpm": 120, "frames": [
            { "energy": 0.9, "spectral_flux": 0.9, "spectral_centroid": 0.9 },
            { "energy": 0.1, "spectral_flux": 0.1, "spectral_centroid": 0.1 },
            { "energy": 0.9, "spectral_flux": 0.9, "spectral_centroid": 0.9 }
        ] }"#,
    )
    .unwrap();
    let mut scheduler = start(track, high_energy_only(), EvaluationMode::MatchedOnly);
    let mut sink = RecordingSink::new();

    let tick0 = scheduler.advance_one_tick(&mut sink);
    assert_eq!(tick0.report().unwrap().activated, vec![CueId::HighEnergy]);
    assert_eq!(sink.calls(), &[SinkCall::Activate(CueId::HighEnergy)]);

    let tick1 = scheduler.advance_one_tick(&mut sink);
    assert!(tick1.report().unwrap().activated.is_empty());
    assert_eq!(sink.calls().len(), 1);

    let tick2 = scheduler.advance_one_tick(&mut sink);
    let report = tick2.report().unwrap();
    assert!(report.activated.is_empty());
    assert!(report.reached_end);
    assert_eq!(sink.calls().len(), 1);
    assert_eq!(scheduler.state(), SchedulerState::Stopped);

    assert_eq!(scheduler.advance_one_tick(&mut sink), TickOutcome::Finished);
    assert_eq!(sink.calls().len(), 1);
}

#[test]
fn replays_are_deterministic() {
    let track = synthetic_track(200);
    for mode in [EvaluationMode::MatchedOnly, EvaluationMode::ExplicitDeactivate] {
        let first = replay(&track, mode);
        let second = replay(&track, mode);
        assert!(!first.is_empty());
        assert_eq!(first, second, "mode {mode}");
    }
}

#[test]
fn stops_exactly_after_last_frame() {
    for len in [1, 2, 7] {
        let mut scheduler = start(
            synthetic_track(len),
            TriggerCatalog::with_default_presets(),
            EvaluationMode::MatchedOnly,
        );
        let mut sink = RecordingSink::new();

        for _ in 0..len - 1 {
            scheduler.advance_one_tick(&mut sink);
            assert!(scheduler.is_running());
        }
        assert!(scheduler.advance_one_tick(&mut sink).is_finished());
        assert_eq!(scheduler.state(), SchedulerState::Stopped);

        let calls = sink.calls().to_vec();
        assert_eq!(scheduler.advance_one_tick(&mut sink), TickOutcome::Finished);
        assert_eq!(sink.calls(), calls.as_slice());
        assert_eq!(scheduler.cursor(), len);
    }
}

#[test]
fn explicit_deactivate_resets_every_non_matching_cue() {
    let mut scheduler = start(
        FeatureTrack::new(90, vec![FeatureFrame::uniform(0.9)]),
        TriggerCatalog::with_default_presets(),
        EvaluationMode::ExplicitDeactivate,
    );
    let mut sink = RecordingSink::new();

    let outcome = scheduler.advance_one_tick(&mut sink);
    let report = outcome.report().unwrap();

    assert_eq!(
        report.activated,
        vec![
            CueId::HighEnergy,
            CueId::HighFlux,
            CueId::HighCentroid,
            CueId::Beat,
            CueId::Drop,
        ]
    );
    assert_eq!(
        report.reset,
        vec![CueId::LowEnergy, CueId::LowFlux, CueId::LowCentroid]
    );
}

#[test]
fn progress_reports_fraction_of_track() {
    assert_eq!(CueScheduler::default().progress(), 0.0);

    let mut scheduler = start(
        synthetic_track(4),
        TriggerCatalog::new(),
        EvaluationMode::MatchedOnly,
    );
    let mut sink = RecordingSink::new();
    scheduler.advance_one_tick(&mut sink);
    scheduler.advance_one_tick(&mut sink);

    assert!((scheduler.progress() - 0.5).abs() < f32::EPSILON);
}
