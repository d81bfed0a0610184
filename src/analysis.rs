//! Signal diagnostics: component reports, spectrogram, chromagram
//!
//! Everything here is a read-only consumer of rendered samples.

use crate::notes::{DEFAULT_REF_FREQ, PITCH_CLASSES};
use crate::rhythm::TimelineEntry;
use crate::tone::ToneComponent;
use rustfft::{num_complex::Complex, FftPlanner};
use std::f64::consts::PI;

pub const SPECTROGRAM_NPERSEG: usize = 1024;
pub const SPECTROGRAM_NOVERLAP: usize = 512;
pub const CHROMA_NFFT: usize = 2048;
pub const CHROMA_HOP: usize = 512;
pub const DEFAULT_MAX_FREQ: f64 = 8000.0;

/// Tabular listing of components, phase shown in units of π
pub fn component_table(components: &[ToneComponent]) -> String {
    if components.is_empty() {
        return "No components to analyze.\n".to_string();
    }
    let mut out = String::from("Signal components:\n");
    out.push_str(&format!(
        "{:<12}{:<15}{:<20}{:<10}\n",
        "Component", "Amplitude", "Frequency (Hz)", "Phase (π)"
    ));
    for (idx, c) in components.iter().enumerate() {
        out.push_str(&format!(
            "{:<12}{:<15.4}{:<20.2}{:<10.2}\n",
            idx + 1,
            c.amplitude,
            c.freq,
            c.phase / PI
        ));
    }
    out
}

/// Per-segment report of a rhythm timeline
pub fn timeline_report(timeline: &[TimelineEntry]) -> String {
    let mut out = String::new();
    for (i, entry) in timeline.iter().enumerate() {
        out.push_str(&format!(
            "Segment from {}s to {}s - Label: {}\n",
            entry.start_time,
            entry.end_time(),
            entry.display_label(i)
        ));
        out.push_str(&component_table(&entry.components));
    }
    out
}

/// Periodic Hann window
fn hann(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos())
        .collect()
}

/// Power spectrum |X[k]|² for k in 0..=n/2 of one windowed frame
fn frame_power(planner: &mut FftPlanner<f64>, frame: &[f64], window: &[f64]) -> Vec<f64> {
    let n = frame.len();
    let fft = planner.plan_fft_forward(n);
    let mut buffer: Vec<Complex<f64>> = frame
        .iter()
        .zip(window.iter())
        .map(|(&x, &w)| Complex { re: x * w, im: 0.0 })
        .collect();
    fft.process(&mut buffer);
    buffer[..=n / 2].iter().map(|c| c.norm_sqr()).collect()
}

/// Short-time power spectral density
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    /// Bin centre frequencies in Hz
    pub freqs: Vec<f64>,
    /// Frame centre times in seconds
    pub times: Vec<f64>,
    /// `power[frame][bin]`, density scaled (units²/Hz)
    pub power: Vec<Vec<f64>>,
}

impl Spectrogram {
    /// STFT with a Hann window, per-frame mean removal and one-sided density scaling
    pub fn compute(samples: &[f64], sample_rate: u32, nperseg: usize, noverlap: usize) -> Self {
        let nperseg = nperseg.min(samples.len());
        if nperseg < 2 {
            return Self {
                freqs: Vec::new(),
                times: Vec::new(),
                power: Vec::new(),
            };
        }
        let noverlap = if noverlap >= nperseg {
            nperseg / 2
        } else {
            noverlap
        };
        let step = nperseg - noverlap;
        let fs = sample_rate as f64;
        let window = hann(nperseg);
        let scale = 1.0 / (fs * window.iter().map(|w| w * w).sum::<f64>());
        let n_bins = nperseg / 2 + 1;
        let freqs = (0..n_bins).map(|k| k as f64 * fs / nperseg as f64).collect();

        let mut planner = FftPlanner::new();
        let mut times = Vec::new();
        let mut power = Vec::new();
        let mut start = 0;
        while start + nperseg <= samples.len() {
            let frame = &samples[start..start + nperseg];
            let mean = frame.iter().sum::<f64>() / nperseg as f64;
            let detrended: Vec<f64> = frame.iter().map(|x| x - mean).collect();
            let mut bins = frame_power(&mut planner, &detrended, &window);
            for (k, p) in bins.iter_mut().enumerate() {
                let one_sided = if k == 0 || (nperseg % 2 == 0 && k == n_bins - 1) {
                    1.0
                } else {
                    2.0
                };
                *p *= scale * one_sided;
            }
            times.push((start + nperseg / 2) as f64 / fs);
            power.push(bins);
            start += step;
        }

        Self {
            freqs,
            times,
            power,
        }
    }

    pub fn with_defaults(samples: &[f64], sample_rate: u32) -> Self {
        Self::compute(
            samples,
            sample_rate,
            SPECTROGRAM_NPERSEG,
            SPECTROGRAM_NOVERLAP,
        )
    }

    /// Keep only bins at or below `max_freq`
    pub fn cropped(&self, max_freq: f64) -> Self {
        let keep = self.freqs.iter().take_while(|&&f| f <= max_freq).count();
        Self {
            freqs: self.freqs[..keep].to_vec(),
            times: self.times.clone(),
            power: self.power.iter().map(|row| row[..keep].to_vec()).collect(),
        }
    }

    /// 10·log10(S + 1e-10)
    pub fn to_db(&self) -> Vec<Vec<f64>> {
        self.power
            .iter()
            .map(|row| row.iter().map(|p| 10.0 * (p + 1e-10).log10()).collect())
            .collect()
    }

    /// Frequency of the strongest non-DC bin of each frame
    pub fn peak_frequencies(&self) -> Vec<f64> {
        self.power
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .skip(1)
                    .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(k, _)| self.freqs[k])
                    .unwrap_or(0.0)
            })
            .collect()
    }
}

/// Energy per pitch class over time
#[derive(Debug, Clone, PartialEq)]
pub struct Chromagram {
    pub times: Vec<f64>,
    /// `chroma[frame][pitch_class]`, C = 0
    pub chroma: Vec<[f64; 12]>,
}

impl Chromagram {
    /// Fold STFT power into the 12 pitch classes of an equal-tempered scale tuned
    /// to `ref_freq`, ignoring bins above `fmax`. Each frame is L2-normalized.
    pub fn compute(samples: &[f64], sample_rate: u32, ref_freq: f64, fmax: f64) -> Self {
        let n_fft = CHROMA_NFFT.min(samples.len());
        if n_fft < 2 {
            return Self {
                times: Vec::new(),
                chroma: Vec::new(),
            };
        }
        let fs = sample_rate as f64;
        let window = hann(n_fft);

        // Pitch class of every usable bin, computed once
        let bin_classes: Vec<Option<usize>> = (0..=n_fft / 2)
            .map(|k| {
                let f = k as f64 * fs / n_fft as f64;
                if k == 0 || f > fmax {
                    None
                } else {
                    let semis = (12.0 * (f / ref_freq).log2()).round() as i64 + 9;
                    Some(semis.rem_euclid(12) as usize)
                }
            })
            .collect();

        let mut planner = FftPlanner::new();
        let mut times = Vec::new();
        let mut chroma = Vec::new();
        let mut start = 0;
        while start + n_fft <= samples.len() {
            let bins = frame_power(&mut planner, &samples[start..start + n_fft], &window);
            let mut frame = [0.0f64; 12];
            for (p, class) in bins.iter().zip(bin_classes.iter()) {
                if let Some(pc) = class {
                    frame[*pc] += p;
                }
            }
            let norm = frame.iter().map(|x| x * x).sum::<f64>().sqrt();
            if norm > 0.0 {
                for x in frame.iter_mut() {
                    *x /= norm;
                }
            }
            times.push((start + n_fft / 2) as f64 / fs);
            chroma.push(frame);
            start += CHROMA_HOP;
        }

        Self { times, chroma }
    }

    pub fn with_defaults(samples: &[f64], sample_rate: u32) -> Self {
        Self::compute(samples, sample_rate, DEFAULT_REF_FREQ, DEFAULT_MAX_FREQ)
    }

    /// Strongest pitch class name of a frame
    pub fn dominant_pitch_class(&self, frame: usize) -> Option<&'static str> {
        let row = self.chroma.get(frame)?;
        row.iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .filter(|(_, v)| **v > 0.0)
            .map(|(i, _)| PITCH_CLASSES[i])
    }
}

/// Strongest frequency (Hz) of the opening 65536 samples
pub fn dominant_frequency(samples: &[f64], sample_rate: u32) -> f64 {
    let n = samples.len().min(65536);
    if n < 2 {
        return 0.0;
    }
    let window = hann(n);
    let mut planner = FftPlanner::new();
    let bins = frame_power(&mut planner, &samples[..n], &window);
    let (bin, _) = bins
        .iter()
        .enumerate()
        .skip(1)
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or((0, &0.0));
    bin as f64 * sample_rate as f64 / n as f64
}
