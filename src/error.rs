//! Error types shared by the builders, the encoder and the scene loader

use std::fmt;

/// Everything that can go wrong while building or persisting a signal
#[derive(Debug)]
pub enum SignalError {
    /// Malformed or incompatible input to a constructor or add operation
    Validation(String),
    /// Operation invoked before its prerequisite state (e.g. build with nothing added)
    State(String),
    /// Rhythm track has no room for another full segment
    Capacity {
        segments: usize,
        unit_time: f64,
        duration_seg: f64,
    },
    /// IO error
    Io(std::io::Error),
    /// WAV writer error
    Wav(hound::Error),
    /// Serialization error (JSON sidecar, TOML scene)
    Serde(String),
    /// Plot rendering error
    Plot(String),
}

impl fmt::Display for SignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalError::Validation(msg) => write!(f, "Invalid input: {}", msg),
            SignalError::State(msg) => write!(f, "Invalid state: {}", msg),
            SignalError::Capacity {
                segments,
                unit_time,
                duration_seg,
            } => write!(
                f,
                "Rhythm track is full: {} segments of {}s already span the {}s duration",
                segments, unit_time, duration_seg
            ),
            SignalError::Io(e) => write!(f, "IO error: {}", e),
            SignalError::Wav(e) => write!(f, "WAV error: {}", e),
            SignalError::Serde(msg) => write!(f, "Serialization error: {}", msg),
            SignalError::Plot(msg) => write!(f, "Plot error: {}", msg),
        }
    }
}

impl std::error::Error for SignalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SignalError::Io(e) => Some(e),
            SignalError::Wav(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SignalError {
    fn from(e: std::io::Error) -> Self {
        SignalError::Io(e)
    }
}

impl From<hound::Error> for SignalError {
    fn from(e: hound::Error) -> Self {
        SignalError::Wav(e)
    }
}

impl From<serde_json::Error> for SignalError {
    fn from(e: serde_json::Error) -> Self {
        SignalError::Serde(e.to_string())
    }
}

impl From<toml::de::Error> for SignalError {
    fn from(e: toml::de::Error) -> Self {
        SignalError::Serde(e.to_string())
    }
}

/// Result type for signal operations
pub type SignalResult<T> = Result<T, SignalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_display_mentions_duration() {
        let err = SignalError::Capacity {
            segments: 2,
            unit_time: 1.0,
            duration_seg: 2.0,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("2 segments"));
        assert!(msg.contains("2s duration"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SignalError = io.into();
        assert!(matches!(err, SignalError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
