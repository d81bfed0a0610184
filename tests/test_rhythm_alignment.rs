//! Rhythm segments land on exact sample boundaries

use std::f64::consts::PI;
use tonebench::{BuildableSignal, RhythmBuilder, SampleClock, SignalError, ToneComponent};

fn one(amplitude: f64, freq: f64) -> Vec<ToneComponent> {
    vec![ToneComponent::new(amplitude, freq, 0.0)]
}

#[test]
fn test_segments_occupy_independent_slices() {
    let clock = SampleClock::new(10, 3.0).unwrap();
    let mut track = RhythmBuilder::new(clock, 1.0).unwrap();
    track.add_segment(one(2.0, 1.0), None).unwrap();
    track.add_segment(one(1.0, 2.0), None).unwrap();
    track.add_segment(one(1.0, 3.0), None).unwrap();

    let samples = track.build().unwrap().to_vec();
    assert_eq!(samples.len(), 30);

    for (seg, (amp, freq)) in [(1.0, 1.0), (0.5, 2.0), (0.5, 3.0)].iter().enumerate() {
        assert_eq!(track.segment_range(seg), (seg * 10, seg * 10 + 10));
        for k in 0..10 {
            // Each segment restarts at phase 0; the loudest segment sets the scale
            let expected = amp * (2.0 * PI * freq * k as f64 / 10.0).cos();
            let got = samples[seg * 10 + k];
            assert!(
                (got - expected).abs() < 1e-9,
                "segment {} sample {}: {} vs {}",
                seg,
                k,
                got,
                expected
            );
        }
    }
}

#[test]
fn test_rest_segment_is_silent() {
    let clock = SampleClock::new(100, 3.0).unwrap();
    let mut track = RhythmBuilder::new(clock, 1.0).unwrap();
    track.add_segment(one(1.0, 5.0), Some("A".into())).unwrap();
    track.add_segment(Vec::new(), Some("rest".into())).unwrap();
    track.add_segment(one(1.0, 0.0), Some("placeholder".into())).unwrap();

    let samples = track.build().unwrap();
    assert!(samples[100..300].iter().all(|&s| s == 0.0));
    assert!((samples[0] - 1.0).abs() < 1e-12);
}

#[test]
fn test_capacity_is_enforced() {
    let clock = SampleClock::new(10, 2.0).unwrap();
    let mut track = RhythmBuilder::new(clock, 1.0).unwrap();
    track.add_segment(one(1.0, 1.0), None).unwrap();
    track.add_segment(one(1.0, 1.0), None).unwrap();

    let err = track.add_segment(one(1.0, 1.0), None).unwrap_err();
    assert!(matches!(
        err,
        SignalError::Capacity { segments: 2, .. }
    ));
    assert_eq!(track.segments().len(), 2);
}

#[test]
fn test_timeline_labels() {
    let clock = SampleClock::new(10, 5.0).unwrap();
    let mut track = RhythmBuilder::new(clock, 1.25).unwrap();
    track.add_segment(one(1.0, 1.0), Some("intro".into())).unwrap();
    track.add_segment(one(1.0, 2.0), None).unwrap();

    let timeline = track.timeline();
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[1].start_time, 1.25);
    assert_eq!(timeline[1].end_time(), 2.5);
    assert_eq!(timeline[0].display_label(0), "intro");
    assert_eq!(timeline[1].display_label(1), "Segment 2");
}
