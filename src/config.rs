//! Synthesis settings and TOML scene files
//!
//! A scene file describes a batch of signals that share one clock:
//!
//! ```toml
//! sample_rate = 44100
//! duration_seg = 5.0
//! output_dir = "output_test"
//!
//! [[signals]]
//! kind = "tone"
//! name = "signal"
//! amplitude = 1.0
//! freq = 440.0
//!
//! [[signals]]
//! kind = "rhythm"
//! name = "rhythm_signal"
//! unit_time = 1.0
//! segments = [
//!     { label = "A4", notes = ["A4"] },
//!     { label = "C Major Chord", notes = ["C4", "E4", "G4"] },
//! ]
//! ```

use crate::error::SignalResult;
use crate::normalize::DEFAULT_SILENCE_THRESHOLD;
use crate::tone::ToneComponent;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

/// Tunable constants of the synthesis core
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthSettings {
    /// Peaks at or below this are left unnormalized
    pub silence_threshold: f64,
    /// Components above `sample_rate * nyquist_ratio` are dropped
    pub nyquist_ratio: f64,
}

impl Default for SynthSettings {
    fn default() -> Self {
        Self {
            silence_threshold: DEFAULT_SILENCE_THRESHOLD,
            nyquist_ratio: 0.5,
        }
    }
}

impl SynthSettings {
    pub fn aliasing_limit(&self, sample_rate: u32) -> f64 {
        sample_rate as f64 * self.nyquist_ratio
    }
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_duration() -> f64 {
    5.0
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output_test")
}

fn default_amplitude() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

/// A batch of signals rendered against one clock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_duration")]
    pub duration_seg: f64,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Write `<name>_metadata.json` next to every WAV
    #[serde(default = "default_true")]
    pub metadata: bool,
    #[serde(default)]
    pub settings: SynthSettings,
    #[serde(default)]
    pub signals: Vec<SignalSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalSpec {
    Tone {
        name: String,
        #[serde(default = "default_amplitude")]
        amplitude: f64,
        freq: f64,
        #[serde(default)]
        phase: f64,
    },
    Composite {
        name: String,
        components: Vec<ToneComponent>,
        /// Tones rendered on their own and superimposed as finished signals
        #[serde(default)]
        added_tones: Vec<ToneComponent>,
    },
    Rhythm {
        name: String,
        unit_time: f64,
        segments: Vec<SegmentSpec>,
    },
}

impl SignalSpec {
    pub fn name(&self) -> &str {
        match self {
            SignalSpec::Tone { name, .. }
            | SignalSpec::Composite { name, .. }
            | SignalSpec::Rhythm { name, .. } => name,
        }
    }
}

/// One rhythm segment; `notes` are resolved through the note table at unit amplitude
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SegmentSpec {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub components: Vec<ToneComponent>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl SceneConfig {
    pub fn load(path: &Path) -> SignalResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> SignalResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The stock demo: an A4 tone, an A4/C5/E5/G4 composite and a five-slot rhythm
    pub fn demo() -> Self {
        let note = |label: &str, notes: &[&str]| SegmentSpec {
            label: Some(label.to_string()),
            components: Vec::new(),
            notes: notes.iter().map(|n| n.to_string()).collect(),
        };
        Self {
            sample_rate: 44100,
            duration_seg: 5.0,
            output_dir: default_output_dir(),
            metadata: true,
            settings: SynthSettings::default(),
            signals: vec![
                SignalSpec::Tone {
                    name: "signal".to_string(),
                    amplitude: 1.0,
                    freq: 440.0,
                    phase: 0.0,
                },
                SignalSpec::Composite {
                    name: "composite_signal".to_string(),
                    components: vec![
                        ToneComponent::new(1.0, 440.0, 0.0),
                        ToneComponent::new(0.8, 523.25, PI / 4.0),
                        ToneComponent::new(0.6, 659.25, PI / 2.0),
                        ToneComponent::new(0.5, 392.0, PI / 6.0),
                    ],
                    added_tones: Vec::new(),
                },
                SignalSpec::Rhythm {
                    name: "rhythm_signal".to_string(),
                    unit_time: 1.0,
                    segments: vec![
                        note("A4", &["A4"]),
                        note("B4", &["B4"]),
                        note("C5", &["C5"]),
                        note("C Major Chord", &["C4", "E4", "G4"]),
                        note("F4", &["F4"]),
                    ],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = SynthSettings::default();
        assert_eq!(s.silence_threshold, 1e-8);
        assert_eq!(s.aliasing_limit(44100), 22050.0);
    }

    #[test]
    fn test_parse_scene() {
        let scene = SceneConfig::parse(
            r#"
sample_rate = 8000
duration_seg = 2.0
output_dir = "out"

[settings]
nyquist_ratio = 0.25

[[signals]]
kind = "tone"
name = "beep"
freq = 440.0

[[signals]]
kind = "composite"
name = "pair"
components = [{ amplitude = 1.0, freq = 440.0 }, { amplitude = 0.5, freq = 660.0, phase = 1.0 }]

[[signals]]
kind = "rhythm"
name = "beat"
unit_time = 0.5
segments = [{ label = "A", notes = ["A4"] }, {}]
"#,
        )
        .unwrap();

        assert_eq!(scene.sample_rate, 8000);
        assert_eq!(scene.output_dir, PathBuf::from("out"));
        assert!(scene.metadata);
        assert_eq!(scene.settings.nyquist_ratio, 0.25);
        assert_eq!(scene.settings.silence_threshold, 1e-8);
        assert_eq!(scene.signals.len(), 3);
        match &scene.signals[0] {
            SignalSpec::Tone {
                amplitude, phase, ..
            } => {
                assert_eq!(*amplitude, 1.0);
                assert_eq!(*phase, 0.0);
            }
            other => panic!("unexpected spec {:?}", other),
        }
        match &scene.signals[1] {
            SignalSpec::Composite { components, .. } => assert_eq!(components[1].phase, 1.0),
            other => panic!("unexpected spec {:?}", other),
        }
        match &scene.signals[2] {
            SignalSpec::Rhythm { segments, .. } => {
                assert_eq!(segments[0].notes, vec!["A4".to_string()]);
                assert_eq!(segments[1], SegmentSpec::default());
            }
            other => panic!("unexpected spec {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let err = SceneConfig::parse(
            r#"
[[signals]]
kind = "square"
name = "nope"
"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_demo_scene_names() {
        let demo = SceneConfig::demo();
        let names: Vec<&str> = demo.signals.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["signal", "composite_signal", "rhythm_signal"]);
    }
}
