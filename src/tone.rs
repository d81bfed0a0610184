//! Cosine tone generator
//!
//! The primitive layer: a single `amplitude * cos(2π·freq·t + phase)` rendered
//! over a [`SampleClock`]. Nothing here normalizes; peak scaling happens in
//! the builders so relative component amplitudes survive summation.

use crate::clock::SampleClock;
use crate::error::{SignalError, SignalResult};
use crate::signal::{BuildState, BuildableSignal, SignalMetadata};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::info;

/// One sinusoidal component. `freq == 0` is the silent placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneComponent {
    pub amplitude: f64,
    pub freq: f64,
    #[serde(default)]
    pub phase: f64,
}

impl ToneComponent {
    pub fn new(amplitude: f64, freq: f64, phase: f64) -> Self {
        Self {
            amplitude,
            freq,
            phase,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.freq == 0.0
    }

    /// Finite amplitude and phase, finite non-negative frequency
    pub fn validate(&self) -> SignalResult<()> {
        if !self.amplitude.is_finite() || !self.phase.is_finite() {
            return Err(SignalError::Validation(format!(
                "component amplitude and phase must be finite, got {} and {}",
                self.amplitude, self.phase
            )));
        }
        if !self.freq.is_finite() || self.freq < 0.0 {
            return Err(SignalError::Validation(format!(
                "component frequency must be finite and non-negative, got {}",
                self.freq
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn value_at(&self, t: f64) -> f64 {
        self.amplitude * (2.0 * PI * self.freq * t + self.phase).cos()
    }

    /// Add this component into `out`, where `out[j]` sits at time `t0 + j / sample_rate`.
    /// Placeholders contribute nothing.
    pub fn accumulate(&self, out: &mut [f64], t0: f64, sample_rate: u32) {
        if self.is_placeholder() {
            return;
        }
        let sr = sample_rate as f64;
        for (j, s) in out.iter_mut().enumerate() {
            *s += self.value_at(t0 + j as f64 / sr);
        }
    }
}

/// Raw tone over the whole clock: `amplitude * cos(2π·freq·t[i] + phase)`
pub fn render(amplitude: f64, freq: f64, phase: f64, clock: &SampleClock) -> Vec<f64> {
    let component = ToneComponent::new(amplitude, freq, phase);
    (0..clock.sample_count())
        .map(|i| component.value_at(clock.time_at(i)))
        .collect()
}

/// A single buildable tone
#[derive(Debug, Clone)]
pub struct ToneSignal {
    clock: SampleClock,
    component: ToneComponent,
    signal: Option<Vec<f64>>,
}

impl ToneSignal {
    pub fn new(amplitude: f64, freq: f64, phase: f64, clock: SampleClock) -> Self {
        Self {
            clock,
            component: ToneComponent::new(amplitude, freq, phase),
            signal: None,
        }
    }

    pub fn component(&self) -> &ToneComponent {
        &self.component
    }
}

impl BuildableSignal for ToneSignal {
    fn clock(&self) -> &SampleClock {
        &self.clock
    }

    fn build(&mut self) -> SignalResult<&[f64]> {
        let c = self.component;
        c.validate()?;
        let samples = render(c.amplitude, c.freq, c.phase, &self.clock);
        info!(
            "Tone generated: {} * cos(2π·{}·t + {})",
            c.amplitude, c.freq, c.phase
        );
        Ok(self.signal.insert(samples).as_slice())
    }

    fn signal(&self) -> Option<&[f64]> {
        self.signal.as_deref()
    }

    fn state(&self) -> BuildState {
        if self.signal.is_some() {
            BuildState::Built
        } else {
            BuildState::Accumulating
        }
    }

    fn components(&self) -> Vec<ToneComponent> {
        vec![self.component]
    }

    fn metadata(&self) -> SignalMetadata {
        SignalMetadata::Tone {
            amplitude: self.component.amplitude,
            freq: self.component.freq,
            phase: self.component.phase,
            sample_rate: self.clock.sample_rate(),
            duration_seg: self.clock.duration_seg(),
        }
    }
}
