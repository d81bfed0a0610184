//! # Tonebench - Deterministic Test Signal Synthesis
//!
//! Tonebench builds sampled audio test signals from sums of cosines and
//! writes them out as 16-bit WAV files for checking audio analysis tools.
//!
//! ## Core Features
//!
//! - **Pure Tones**: `A·cos(2πft + φ)` sampled on a shared clock
//! - **Composite Signals**: sums of tone components plus already-built signals,
//!   normalized to unit peak, with aliasing protection
//! - **Rhythm Tracks**: fixed-length segments placed back to back, each segment
//!   restarting its own phase
//! - **WAV Export**: mono 16-bit PCM with an optional JSON metadata sidecar
//! - **Note Table**: 12-TET note names for building chords and melodies
//! - **Analysis**: component tables, spectrograms and chromagrams, with PNG
//!   plots behind the `plot` feature
//!
//! ## Quick Start
//!
//! ```rust
//! use tonebench::{BuildableSignal, CompositeBuilder, SampleClock};
//!
//! let clock = SampleClock::new(8000, 1.0).unwrap();
//! let mut chord = CompositeBuilder::new(clock);
//! chord.add_component(1.0, 261.63, 0.0);
//! chord.add_component(1.0, 329.63, 0.0);
//! chord.add_component(1.0, 392.0, 0.0);
//!
//! let samples = chord.build().unwrap();
//! assert_eq!(samples.len(), 8000);
//! assert!(samples.iter().all(|s| s.abs() <= 1.0));
//! ```
//!
//! ### Rhythm Tracks
//!
//! ```rust
//! use tonebench::{BuildableSignal, RhythmBuilder, SampleClock, ToneComponent};
//!
//! let clock = SampleClock::new(8000, 3.0).unwrap();
//! let mut track = RhythmBuilder::new(clock, 1.0).unwrap();
//! track.add_segment(vec![ToneComponent::new(1.0, 440.0, 0.0)], Some("A4".into())).unwrap();
//! track.add_segment(vec![], Some("rest".into())).unwrap();
//! track.add_segment(vec![ToneComponent::new(1.0, 523.25, 0.0)], None).unwrap();
//!
//! let samples = track.build().unwrap();
//! assert!(samples[8000..16000].iter().all(|&s| s == 0.0));
//! ```
//!
//! ## Architecture
//!
//! - [`clock`] - Sample rate and duration shared by every signal
//! - [`tone`] - Tone components and the single-tone signal
//! - [`composite`] - Additive composite builder
//! - [`rhythm`] - Sequential segment builder
//! - [`signal`] - The `BuildableSignal` trait, build states and metadata
//! - [`normalize`] - Peak normalization with a silence guard
//! - [`advisory`] - Non-fatal diagnostics such as dropped components
//! - [`error`] - Crate error type
//! - [`config`] - Synthesis settings and TOML scene files
//! - [`notes`] - Equal-tempered note table
//! - [`render`] - WAV and metadata export
//! - [`analysis`] - Component reports, spectrograms and chromagrams
//! - [`scene`] - Batch rendering from TOML scene files
//! - `plot` - PNG plots (feature `plot`)

pub mod advisory;
pub mod analysis;
pub mod clock;
pub mod composite;
pub mod config;
pub mod error;
pub mod normalize;
pub mod notes;
#[cfg(feature = "plot")]
pub mod plot;
pub mod render;
pub mod rhythm;
pub mod scene;
pub mod signal;
pub mod tone;

pub use advisory::Advisory;
pub use clock::SampleClock;
pub use composite::CompositeBuilder;
pub use config::{SceneConfig, SynthSettings};
pub use error::{SignalError, SignalResult};
pub use normalize::{normalize, Normalizer};
pub use notes::{NoteTable, DEFAULT_NOTE_TABLE};
pub use rhythm::{RhythmBuilder, TimelineEntry};
pub use signal::{BuildState, BuildableSignal, SignalMetadata};
pub use tone::{ToneComponent, ToneSignal};
