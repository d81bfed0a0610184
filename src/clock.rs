//! Shared discrete time base
//!
//! A [`SampleClock`] fixes the sample rate and duration that every signal of a
//! tone, composite or rhythm track is rendered against. Arrays produced against
//! a clock always have exactly [`SampleClock::sample_count`] entries, aligned
//! index-for-index with [`SampleClock::times`].

use crate::error::{SignalError, SignalResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleClock {
    sample_rate: u32,
    duration_seg: f64,
}

impl SampleClock {
    pub fn new(sample_rate: u32, duration_seg: f64) -> SignalResult<Self> {
        if sample_rate == 0 {
            return Err(SignalError::Validation(
                "sample rate must be positive".to_string(),
            ));
        }
        if !duration_seg.is_finite() || duration_seg <= 0.0 {
            return Err(SignalError::Validation(format!(
                "duration must be a positive number of seconds, got {duration_seg}"
            )));
        }
        let clock = Self {
            sample_rate,
            duration_seg,
        };
        if clock.sample_count() == 0 {
            return Err(SignalError::Validation(format!(
                "{duration_seg}s at {sample_rate} Hz holds no samples"
            )));
        }
        Ok(clock)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_seg(&self) -> f64 {
        self.duration_seg
    }

    /// floor(sample_rate * duration_seg)
    pub fn sample_count(&self) -> usize {
        (self.sample_rate as f64 * self.duration_seg).floor() as usize
    }

    pub fn nyquist(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    /// Time in seconds of sample `index`
    #[inline]
    pub fn time_at(&self, index: usize) -> f64 {
        index as f64 / self.sample_rate as f64
    }

    /// Half-open time vector `[0, duration)`
    pub fn times(&self) -> Vec<f64> {
        (0..self.sample_count()).map(|i| self.time_at(i)).collect()
    }

    /// Sample index at `seconds`, floored and clamped to the clock length
    pub fn index_at(&self, seconds: f64) -> usize {
        let idx = (seconds * self.sample_rate as f64).floor();
        if idx <= 0.0 {
            0
        } else {
            (idx as usize).min(self.sample_count())
        }
    }

    /// Zero-filled buffer of the clock's length
    pub fn silence(&self) -> Vec<f64> {
        vec![0.0; self.sample_count()]
    }
}
