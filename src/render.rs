//! WAV export for built signals
//!
//! Writes mono 16-bit PCM through `hound` and, optionally, a JSON sidecar
//! describing how the signal was made.

use crate::error::{SignalError, SignalResult};
use crate::normalize::Normalizer;
use crate::signal::{BuildableSignal, SignalMetadata};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const INT16_MAX: f64 = 32767.0;

/// Scale a [-1, 1] signal to i16, truncating toward zero
pub fn to_pcm16(samples: &[f64]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * INT16_MAX) as i16)
        .collect()
}

/// Sidecar path: the audio path with its extension replaced by `_metadata.json`
pub fn metadata_path(wav_path: &Path) -> PathBuf {
    let stem = wav_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    wav_path.with_file_name(format!("{}_metadata.json", stem))
}

fn ensure_parent_dir(path: &Path) -> SignalResult<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}

/// Normalize, quantize and write `samples` as a mono 16-bit WAV
pub fn write_wav(path: &Path, samples: &[f64], sample_rate: u32) -> SignalResult<()> {
    ensure_parent_dir(path)?;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let normalized = Normalizer::default().normalized(samples);
    let mut writer = hound::WavWriter::create(path, spec)?;
    for sample in to_pcm16(&normalized) {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    info!("Signal saved to {}", path.display());
    Ok(())
}

pub fn write_metadata(wav_path: &Path, metadata: &SignalMetadata) -> SignalResult<PathBuf> {
    let path = metadata_path(wav_path);
    ensure_parent_dir(&path)?;
    let json = serde_json::to_string_pretty(metadata)?;
    fs::write(&path, json)?;
    info!("Metadata saved to {}", path.display());
    Ok(path)
}

/// Files produced by [`save`]
#[derive(Debug, Clone, PartialEq)]
pub struct SavedSignal {
    pub wav: PathBuf,
    pub metadata: Option<PathBuf>,
    pub stats: SignalStats,
}

/// Persist a built signal, with its metadata sidecar when `with_metadata` is set
pub fn save(
    source: &dyn BuildableSignal,
    path: &Path,
    with_metadata: bool,
) -> SignalResult<SavedSignal> {
    let samples = source.signal().ok_or_else(|| {
        SignalError::State("signal has not been built; call build() first".to_string())
    })?;
    let sample_rate = source.sample_rate();

    write_wav(path, samples, sample_rate)?;
    let metadata = if with_metadata {
        Some(write_metadata(path, &source.metadata())?)
    } else {
        None
    };

    Ok(SavedSignal {
        wav: path.to_path_buf(),
        metadata,
        stats: SignalStats::from_samples(samples, sample_rate),
    })
}

/// Statistics about a rendered signal
#[derive(Debug, Clone, PartialEq)]
pub struct SignalStats {
    pub duration: f64,
    pub sample_count: usize,
    pub rms: f64,
    pub peak: f64,
    pub dc_offset: f64,
    pub zero_crossings: usize,
    /// Negative-to-non-negative transitions
    pub rising_crossings: usize,
}

impl SignalStats {
    pub fn from_samples(samples: &[f64], sample_rate: u32) -> Self {
        let sample_count = samples.len();
        let n = sample_count.max(1) as f64;

        let sum_squares: f64 = samples.iter().map(|x| x * x).sum();
        let rms = (sum_squares / n).sqrt();
        let peak = crate::normalize::peak(samples);
        let dc_offset = samples.iter().sum::<f64>() / n;

        let mut zero_crossings = 0;
        let mut rising_crossings = 0;
        for w in samples.windows(2) {
            let (prev, cur) = (w[0] >= 0.0, w[1] >= 0.0);
            if prev != cur {
                zero_crossings += 1;
                if cur {
                    rising_crossings += 1;
                }
            }
        }

        Self {
            duration: sample_count as f64 / sample_rate as f64,
            sample_count,
            rms,
            peak,
            dc_offset,
            zero_crossings,
            rising_crossings,
        }
    }

    /// Frequency implied by the zero-crossing rate
    pub fn estimated_frequency(&self) -> f64 {
        if self.duration > 0.0 {
            self.zero_crossings as f64 / (2.0 * self.duration)
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str("Render Statistics:\n");
        out.push_str(&format!("  Duration:       {:.3} seconds\n", self.duration));
        out.push_str(&format!("  Samples:        {}\n", self.sample_count));
        out.push_str(&format!("  RMS:            {:.3}\n", self.rms));
        out.push_str(&format!("  Peak:           {:.3}\n", self.peak));
        out.push_str(&format!("  DC Offset:      {:.6}\n", self.dc_offset));
        out.push_str(&format!("  Zero Crossings: {}\n", self.zero_crossings));
        out.push_str(&format!(
            "  Est. Frequency: {:.1} Hz\n",
            self.estimated_frequency()
        ));
        out
    }
}
