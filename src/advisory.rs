//! Non-fatal diagnostics
//!
//! Advisories report input that was accepted by dropping it rather than by
//! failing the operation, so batch construction keeps going. Every advisory is
//! logged at WARN and kept on the builder that produced it.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Component frequency above the aliasing limit; the component was dropped
    AliasingRisk {
        freq: f64,
        sample_rate: u32,
        limit: f64,
    },
    /// Non-finite amplitude, frequency or phase, or a negative frequency; the
    /// component was dropped
    InvalidComponent {
        amplitude: f64,
        freq: f64,
        phase: f64,
    },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::AliasingRisk {
                freq,
                sample_rate,
                limit,
            } => write!(
                f,
                "frequency {} Hz exceeds the {} Hz limit for a {} Hz sample rate and may alias; component dropped",
                freq, limit, sample_rate
            ),
            Advisory::InvalidComponent {
                amplitude,
                freq,
                phase,
            } => write!(
                f,
                "component (amplitude {}, frequency {} Hz, phase {}) is not a finite tone with non-negative frequency; component dropped",
                amplitude, freq, phase
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let a = Advisory::AliasingRisk {
            freq: 44100.0,
            sample_rate: 44100,
            limit: 22050.0,
        };
        let msg = a.to_string();
        assert!(msg.contains("44100 Hz"));
        assert!(msg.contains("22050 Hz limit"));

        let invalid = Advisory::InvalidComponent {
            amplitude: 1.0,
            freq: f64::NAN,
            phase: 0.0,
        };
        assert!(invalid.to_string().contains("frequency NaN Hz"));
    }
}
