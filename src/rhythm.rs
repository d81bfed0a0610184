//! Time-segmented rhythm tracks
//!
//! A rhythm track splits its clock into fixed-width slots of `unit_time`
//! seconds. Segment `i` covers samples
//! `[floor(i·unit·sr), floor((i+1)·unit·sr))` and is rendered as an independent
//! composite on segment-local time, so every segment's tones start from their
//! own phase rather than continuing from global time. The assembled track is
//! normalized once, globally, which keeps the relative loudness of segments.

use crate::clock::SampleClock;
use crate::config::SynthSettings;
use crate::error::{SignalError, SignalResult};
use crate::normalize::Normalizer;
use crate::signal::{BuildState, BuildableSignal, SignalMetadata};
use crate::tone::ToneComponent;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One slot of a rhythm track: a note, a chord, or a rest when empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub components: Vec<ToneComponent>,
    pub label: Option<String>,
}

/// A segment positioned in absolute time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub start_time: f64,
    pub duration: f64,
    pub components: Vec<ToneComponent>,
    pub label: Option<String>,
}

impl TimelineEntry {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Label, or "Segment N" (1-based) when none was given
    pub fn display_label(&self, index: usize) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("Segment {}", index + 1))
    }
}

#[derive(Debug, Clone)]
pub struct RhythmBuilder {
    clock: SampleClock,
    settings: SynthSettings,
    unit_time: f64,
    segments: Vec<Segment>,
    signal: Option<Vec<f64>>,
    dirty: bool,
}

impl RhythmBuilder {
    pub fn new(clock: SampleClock, unit_time: f64) -> SignalResult<Self> {
        if !unit_time.is_finite() || unit_time <= 0.0 {
            return Err(SignalError::Validation(format!(
                "unit time must be a positive number of seconds, got {unit_time}"
            )));
        }
        Ok(Self {
            clock,
            settings: SynthSettings::default(),
            unit_time,
            segments: Vec::new(),
            signal: None,
            dirty: false,
        })
    }

    pub fn with_settings(mut self, settings: SynthSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn unit_time(&self) -> f64 {
        self.unit_time
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Append the next segment.
    ///
    /// Fails with a capacity error once the segments already appended reach
    /// the clock's duration, and with a validation error on a non-finite or
    /// negative-frequency component.
    pub fn add_segment(
        &mut self,
        components: Vec<ToneComponent>,
        label: Option<String>,
    ) -> SignalResult<()> {
        for comp in &components {
            comp.validate()?;
        }
        let current_duration = self.segments.len() as f64 * self.unit_time;
        if current_duration >= self.clock.duration_seg() {
            return Err(SignalError::Capacity {
                segments: self.segments.len(),
                unit_time: self.unit_time,
                duration_seg: self.clock.duration_seg(),
            });
        }
        debug!(
            "Segment {} at {:.3}s: {} components ({})",
            self.segments.len(),
            current_duration,
            components.len(),
            label.as_deref().unwrap_or("unlabeled")
        );
        self.segments.push(Segment { components, label });
        self.dirty = true;
        Ok(())
    }

    /// Segments with their absolute start times
    pub fn timeline(&self) -> Vec<TimelineEntry> {
        self.segments
            .iter()
            .enumerate()
            .map(|(i, seg)| TimelineEntry {
                start_time: i as f64 * self.unit_time,
                duration: self.unit_time,
                components: seg.components.clone(),
                label: seg.label.clone(),
            })
            .collect()
    }

    /// Global sample range `[start, end)` of segment `index`, clamped to the clock
    pub fn segment_range(&self, index: usize) -> (usize, usize) {
        let start = self.clock.index_at(index as f64 * self.unit_time);
        let end = self.clock.index_at((index + 1) as f64 * self.unit_time);
        (start, end.max(start))
    }
}

impl BuildableSignal for RhythmBuilder {
    fn clock(&self) -> &SampleClock {
        &self.clock
    }

    fn build(&mut self) -> SignalResult<&[f64]> {
        if self.segments.is_empty() {
            return Err(SignalError::State(
                "rhythm track has no segments to build".to_string(),
            ));
        }

        let sample_rate = self.clock.sample_rate();
        let mut track = self.clock.silence();

        for (idx, segment) in self.segments.iter().enumerate() {
            if segment.components.is_empty() {
                continue;
            }
            let (start_idx, end_idx) = self.segment_range(idx);
            let start_time = idx as f64 * self.unit_time;
            // t[start_idx] re-based to the segment start
            let t0 = self.clock.time_at(start_idx) - start_time;

            let mut segment_signal = vec![0.0; end_idx - start_idx];
            for comp in &segment.components {
                comp.accumulate(&mut segment_signal, t0, sample_rate);
            }
            for (s, x) in track[start_idx..end_idx]
                .iter_mut()
                .zip(segment_signal.iter())
            {
                *s += x;
            }
        }

        Normalizer::new(self.settings.silence_threshold).apply(&mut track);
        self.dirty = false;
        info!("Rhythm track built with {} segments", self.segments.len());
        Ok(self.signal.insert(track).as_slice())
    }

    fn signal(&self) -> Option<&[f64]> {
        self.signal.as_deref()
    }

    fn state(&self) -> BuildState {
        if self.segments.is_empty() {
            BuildState::Empty
        } else if self.signal.is_some() && !self.dirty {
            BuildState::Built
        } else {
            BuildState::Accumulating
        }
    }

    fn components(&self) -> Vec<ToneComponent> {
        self.segments
            .iter()
            .flat_map(|s| s.components.iter().copied())
            .collect()
    }

    fn metadata(&self) -> SignalMetadata {
        SignalMetadata::Rhythm {
            unit_time: self.unit_time,
            timeline: self.timeline(),
            sample_rate: self.clock.sample_rate(),
            duration_seg: self.clock.duration_seg(),
        }
    }
}
