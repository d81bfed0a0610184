//! A pure 440 Hz tone rendered end to end

use tonebench::render::SignalStats;
use tonebench::{BuildState, BuildableSignal, CompositeBuilder, SampleClock, ToneSignal};

fn clock() -> SampleClock {
    SampleClock::new(44100, 1.0).unwrap()
}

#[test]
fn test_a440_starts_at_peak() {
    let mut tone = ToneSignal::new(1.0, 440.0, 0.0, clock());
    assert_eq!(tone.state(), BuildState::Accumulating);

    let samples = tone.build().unwrap().to_vec();
    assert_eq!(samples.len(), 44100);
    assert!((samples[0] - 1.0).abs() < 1e-12);
    assert_eq!(tone.state(), BuildState::Built);
}

#[test]
fn test_a440_first_zero_crossing() {
    // Quarter period is 44100 / 440 / 4 ~= 25.06 samples
    let mut tone = ToneSignal::new(1.0, 440.0, 0.0, clock());
    let samples = tone.build().unwrap();
    let first_negative = samples.iter().position(|&s| s < 0.0).unwrap();
    assert_eq!(first_negative, 26);
    assert!(samples[25].abs() < 0.01);
}

#[test]
fn test_a440_cycle_count() {
    let mut tone = ToneSignal::new(1.0, 440.0, 0.0, clock());
    let stats = SignalStats::from_samples(tone.build().unwrap(), 44100);
    assert!(
        (stats.rising_crossings as i64 - 440).abs() <= 1,
        "rising crossings: {}",
        stats.rising_crossings
    );
    assert!((stats.rms - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-3);
    assert!(stats.dc_offset.abs() < 1e-3);
}

#[test]
fn test_single_component_composite_matches_tone() {
    let mut tone = ToneSignal::new(1.0, 440.0, 0.0, clock());
    let tone_samples = tone.build().unwrap().to_vec();

    let mut composite = CompositeBuilder::new(clock());
    composite.add_component(1.0, 440.0, 0.0);
    let composite_samples = composite.build().unwrap();

    let max_diff = tone_samples
        .iter()
        .zip(composite_samples.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0f64, f64::max);
    assert!(max_diff < 1e-9, "max diff {}", max_diff);
}
