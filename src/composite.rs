//! Additive composite builder
//!
//! Accumulates tone components and pre-rendered signals, then sums them into one
//! peak-normalized signal.

use crate::advisory::Advisory;
use crate::clock::SampleClock;
use crate::config::SynthSettings;
use crate::error::{SignalError, SignalResult};
use crate::normalize::Normalizer;
use crate::signal::{BuildState, BuildableSignal, SignalMetadata};
use crate::tone::ToneComponent;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct CompositeBuilder {
    clock: SampleClock,
    settings: SynthSettings,
    components: Vec<ToneComponent>,
    external_signals: Vec<Vec<f64>>,
    advisories: Vec<Advisory>,
    signal: Option<Vec<f64>>,
    dirty: bool,
}

impl CompositeBuilder {
    pub fn new(clock: SampleClock) -> Self {
        Self {
            clock,
            settings: SynthSettings::default(),
            components: Vec::new(),
            external_signals: Vec::new(),
            advisories: Vec::new(),
            signal: None,
            dirty: false,
        }
    }

    pub fn with_settings(mut self, settings: SynthSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Append a component unless it is malformed or risks aliasing.
    ///
    /// Non-finite values and negative frequencies are dropped. A non-placeholder frequency strictly above `sample_rate * nyquist_ratio`
    /// is dropped; the returned advisory is also logged and recorded.
    pub fn add_component(&mut self, amplitude: f64, freq: f64, phase: f64) -> Option<Advisory> {
        let component = ToneComponent::new(amplitude, freq, phase);
        if component.validate().is_err() {
            return Some(self.advise(Advisory::InvalidComponent {
                amplitude,
                freq,
                phase,
            }));
        }
        let limit = self.settings.aliasing_limit(self.clock.sample_rate());
        if freq > limit && freq != 0.0 {
            let advisory = Advisory::AliasingRisk {
                freq,
                sample_rate: self.clock.sample_rate(),
                limit,
            };
            return Some(self.advise(advisory));
        }
        self.components.push(component);
        self.dirty = true;
        None
    }

    fn advise(&mut self, advisory: Advisory) -> Advisory {
        warn!("{}", advisory);
        self.advisories.push(advisory.clone());
        advisory
    }

    /// Superimpose another built signal. It must share this clock's length.
    pub fn add_signal(&mut self, source: &dyn BuildableSignal) -> SignalResult<()> {
        let samples = source.signal().ok_or_else(|| {
            SignalError::Validation("signal to add has not been built".to_string())
        })?;
        self.add_samples(samples.to_vec())
    }

    /// Superimpose a raw pre-rendered sample array
    pub fn add_samples(&mut self, samples: Vec<f64>) -> SignalResult<()> {
        let expected = self.clock.sample_count();
        if samples.len() != expected {
            return Err(SignalError::Validation(format!(
                "added signal has {} samples, composite expects {}",
                samples.len(),
                expected
            )));
        }
        if samples.iter().any(|x| !x.is_finite()) {
            return Err(SignalError::Validation(
                "added signal contains non-finite samples".to_string(),
            ));
        }
        self.external_signals.push(samples);
        self.dirty = true;
        Ok(())
    }

    pub fn component_list(&self) -> &[ToneComponent] {
        &self.components
    }

    pub fn signal_count(&self) -> usize {
        self.external_signals.len()
    }

    pub fn external_signals(&self) -> &[Vec<f64>] {
        &self.external_signals
    }

    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }
}

impl BuildableSignal for CompositeBuilder {
    fn clock(&self) -> &SampleClock {
        &self.clock
    }

    fn build(&mut self) -> SignalResult<&[f64]> {
        if self.components.is_empty() && self.external_signals.is_empty() {
            return Err(SignalError::State(
                "composite has no components or signals to build".to_string(),
            ));
        }

        let sample_rate = self.clock.sample_rate();
        let mut composite = self.clock.silence();
        for comp in &self.components {
            comp.accumulate(&mut composite, 0.0, sample_rate);
        }
        for external in &self.external_signals {
            for (s, x) in composite.iter_mut().zip(external.iter()) {
                *s += x;
            }
        }

        Normalizer::new(self.settings.silence_threshold).apply(&mut composite);
        self.dirty = false;
        info!(
            "Composite built with {} components and {} added signals",
            self.components.len(),
            self.external_signals.len()
        );
        Ok(self.signal.insert(composite).as_slice())
    }

    fn signal(&self) -> Option<&[f64]> {
        self.signal.as_deref()
    }

    fn state(&self) -> BuildState {
        if self.components.is_empty() && self.external_signals.is_empty() {
            BuildState::Empty
        } else if self.signal.is_some() && !self.dirty {
            BuildState::Built
        } else {
            BuildState::Accumulating
        }
    }

    fn components(&self) -> Vec<ToneComponent> {
        self.components.clone()
    }

    fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    fn metadata(&self) -> SignalMetadata {
        SignalMetadata::Composite {
            components: self.components.clone(),
            num_signals_added: self.external_signals.len(),
            sample_rate: self.clock.sample_rate(),
            duration_seg: self.clock.duration_seg(),
        }
    }
}
