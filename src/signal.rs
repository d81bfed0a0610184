//! The capability every signal type shares
//!
//! Tones, composites and rhythm tracks each own a [`SampleClock`] and their own
//! accumulated state; they expose the rendered samples and a serializable
//! description through [`BuildableSignal`] instead of inheriting fields.

use crate::advisory::Advisory;
use crate::clock::SampleClock;
use crate::error::SignalResult;
use crate::rhythm::TimelineEntry;
use crate::tone::ToneComponent;
use serde::{Deserialize, Serialize};

/// Lifecycle of a builder.
///
/// `Empty -> Accumulating -> Built -> Accumulating ...`. Adding after a build
/// leaves the previous output in place (stale) until the next `build()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Empty,
    Accumulating,
    Built,
}

pub trait BuildableSignal {
    fn clock(&self) -> &SampleClock;

    /// Recompute the signal from scratch, store it and return it
    fn build(&mut self) -> SignalResult<&[f64]>;

    /// Last built signal, if any
    fn signal(&self) -> Option<&[f64]>;

    fn state(&self) -> BuildState;

    /// All tone components that feed this signal, in insertion order
    fn components(&self) -> Vec<ToneComponent>;

    fn metadata(&self) -> SignalMetadata;

    /// Non-fatal diagnostics raised while accumulating inputs
    fn advisories(&self) -> &[Advisory] {
        &[]
    }

    /// True when a signal exists but inputs were added after it was built
    fn is_stale(&self) -> bool {
        self.signal().is_some() && self.state() != BuildState::Built
    }

    fn sample_rate(&self) -> u32 {
        self.clock().sample_rate()
    }
}

/// Sidecar description written next to a rendered WAV file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalMetadata {
    Tone {
        amplitude: f64,
        freq: f64,
        phase: f64,
        sample_rate: u32,
        duration_seg: f64,
    },
    Composite {
        components: Vec<ToneComponent>,
        num_signals_added: usize,
        sample_rate: u32,
        duration_seg: f64,
    },
    Rhythm {
        unit_time: f64,
        timeline: Vec<TimelineEntry>,
        sample_rate: u32,
        duration_seg: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_serializes_with_kind_tag() {
        let meta = SignalMetadata::Composite {
            components: vec![ToneComponent::new(1.0, 440.0, 0.0)],
            num_signals_added: 1,
            sample_rate: 44100,
            duration_seg: 5.0,
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["kind"], "composite");
        assert_eq!(json["num_signals_added"], 1);
        assert_eq!(json["components"][0]["freq"], 440.0);

        let back: SignalMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(back, meta);
    }
}
