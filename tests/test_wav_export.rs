//! WAV files and metadata sidecars written by the encoder

use std::fs;
use tonebench::render::{metadata_path, save, write_wav};
use tonebench::{
    BuildableSignal, CompositeBuilder, RhythmBuilder, SampleClock, ToneComponent, ToneSignal,
};

#[test]
fn test_wav_format_and_full_scale() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("signal.wav");

    let mut tone = ToneSignal::new(0.5, 440.0, 0.0, SampleClock::new(8000, 0.5).unwrap());
    tone.build().unwrap();
    let saved = save(&tone, &path, false).unwrap();
    assert!(saved.metadata.is_none());
    assert!(!metadata_path(&path).exists());

    let mut reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 8000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);

    let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(samples.len(), 4000);
    // The encoder normalizes again, so a half-amplitude tone is written at full scale
    assert_eq!(samples[0], 32767);
    assert!(samples.iter().all(|&s| s >= -32767));
}

#[test]
fn test_write_wav_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/deeper/out.wav");
    write_wav(&path, &[0.0, 0.25, -0.5], 100).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.len(), 3);
}

#[test]
fn test_silence_is_written_as_zeros() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("silence.wav");
    write_wav(&path, &[0.0; 64], 8000).unwrap();

    let mut reader = hound::WavReader::open(&path).unwrap();
    assert!(reader.samples::<i16>().all(|s| s.unwrap() == 0));
}

#[test]
fn test_composite_metadata_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("composite_signal.wav");
    let clock = SampleClock::new(8000, 0.25).unwrap();

    let mut tone = ToneSignal::new(1.0, 200.0, 0.0, clock);
    tone.build().unwrap();
    let mut composite = CompositeBuilder::new(clock);
    composite.add_component(1.0, 440.0, 0.0);
    composite.add_component(0.8, 523.25, std::f64::consts::FRAC_PI_4);
    composite.add_signal(&tone).unwrap();
    composite.build().unwrap();

    let saved = save(&composite, &path, true).unwrap();
    let meta_path = saved.metadata.unwrap();
    assert_eq!(meta_path, dir.path().join("composite_signal_metadata.json"));

    let meta: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&meta_path).unwrap()).unwrap();
    assert_eq!(meta["kind"], "composite");
    assert_eq!(meta["sample_rate"], 8000);
    assert_eq!(meta["duration_seg"], 0.25);
    assert_eq!(meta["num_signals_added"], 1);
    assert_eq!(meta["components"].as_array().unwrap().len(), 2);
    assert_eq!(meta["components"][1]["freq"], 523.25);
}

#[test]
fn test_rhythm_metadata_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rhythm.wav");
    let clock = SampleClock::new(1000, 2.0).unwrap();

    let mut track = RhythmBuilder::new(clock, 1.0).unwrap();
    track
        .add_segment(vec![ToneComponent::new(1.0, 100.0, 0.0)], Some("low".into()))
        .unwrap();
    track
        .add_segment(vec![ToneComponent::new(1.0, 200.0, 0.0)], None)
        .unwrap();
    track.build().unwrap();

    let saved = save(&track, &path, true).unwrap();
    let meta: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(saved.metadata.unwrap()).unwrap()).unwrap();
    assert_eq!(meta["kind"], "rhythm");
    assert_eq!(meta["unit_time"], 1.0);
    let timeline = meta["timeline"].as_array().unwrap();
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[0]["label"], "low");
    assert_eq!(timeline[1]["start_time"], 1.0);
}
