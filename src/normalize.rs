//! Peak normalization into [-1, 1]

/// Peaks at or below this are treated as silence and left untouched
pub const DEFAULT_SILENCE_THRESHOLD: f64 = 1e-8;

/// Peak normalizer with a near-silence guard
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    pub silence_threshold: f64,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            silence_threshold: DEFAULT_SILENCE_THRESHOLD,
        }
    }
}

impl Normalizer {
    pub fn new(silence_threshold: f64) -> Self {
        Self { silence_threshold }
    }

    /// Scale `samples` in place by 1/peak. Returns the peak found.
    pub fn apply(&self, samples: &mut [f64]) -> f64 {
        let peak = peak(samples);
        if peak > self.silence_threshold {
            for s in samples.iter_mut() {
                *s /= peak;
            }
        }
        peak
    }

    pub fn normalized(&self, samples: &[f64]) -> Vec<f64> {
        let mut out = samples.to_vec();
        self.apply(&mut out);
        out
    }
}

/// Maximum absolute sample value (0 for an empty slice)
pub fn peak(samples: &[f64]) -> f64 {
    samples.iter().map(|x| x.abs()).fold(0.0f64, f64::max)
}

/// Normalize with the default silence threshold
pub fn normalize(samples: &[f64]) -> Vec<f64> {
    Normalizer::default().normalized(samples)
}
