//! PNG diagnostic plots (feature `plot`)
//!
//! Waveforms, rhythm timelines, spectrograms and chromagrams drawn with
//! `plotters`. Plots only read samples; they never touch the builders.

use crate::analysis::{Chromagram, Spectrogram};
use crate::error::{SignalError, SignalResult};
use crate::notes::PITCH_CLASSES;
use crate::rhythm::TimelineEntry;
use crate::tone::ToneComponent;
use plotters::prelude::*;
use std::error::Error;
use std::path::Path;
use tracing::info;

type DrawResult = Result<(), Box<dyn Error>>;

const SERIES_COLORS: [RGBColor; 8] = [
    BLUE,
    RED,
    GREEN,
    MAGENTA,
    CYAN,
    RGBColor(255, 140, 0),
    RGBColor(128, 0, 128),
    RGBColor(139, 69, 19),
];

fn series_color(idx: usize) -> RGBColor {
    SERIES_COLORS[idx % SERIES_COLORS.len()]
}

fn finish(path: &Path, result: DrawResult) -> SignalResult<()> {
    result.map_err(|e| SignalError::Plot(format!("{}: {}", path.display(), e)))?;
    info!("Plot saved to {}", path.display());
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> SignalResult<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}

/// Waveform with its components overlaid.
///
/// With components, the window spans four periods of the lowest audible
/// component and the x axis is ωt/π of that component. Without components the
/// whole signal is drawn against time in seconds.
pub fn plot_waveform(
    path: &Path,
    title: &str,
    samples: &[f64],
    sample_rate: u32,
    components: &[ToneComponent],
    added_signals: &[Vec<f64>],
) -> SignalResult<()> {
    if samples.len() < 2 {
        return Err(SignalError::Plot(format!(
            "{}: a waveform needs at least two samples, got {}",
            path.display(),
            samples.len()
        )));
    }
    ensure_parent_dir(path)?;
    finish(
        path,
        draw_waveform(path, title, samples, sample_rate, components, added_signals),
    )
}

fn draw_waveform(
    path: &Path,
    title: &str,
    samples: &[f64],
    sample_rate: u32,
    components: &[ToneComponent],
    added_signals: &[Vec<f64>],
) -> DrawResult {
    let sr = sample_rate as f64;
    let min_freq = components
        .iter()
        .filter(|c| !c.is_placeholder())
        .map(|c| c.freq)
        .fold(f64::INFINITY, f64::min);

    let (n, x_scale, x_desc) = if min_freq.is_finite() {
        let n = ((4.0 / min_freq) * sr).floor() as usize;
        // ωt/π = 2·f·t
        (n, 2.0 * min_freq / sr, "ωt / π")
    } else {
        (samples.len(), 1.0 / sr, "Time [s]")
    };
    let n = n.min(samples.len()).max(2);
    let x_at = |i: usize| i as f64 * x_scale;
    let x_end = x_at(n - 1).max(f64::EPSILON);

    let window_peak = samples.iter().take(n).map(|x| x.abs()).fold(0.0f64, f64::max);
    let comp_peak = components
        .iter()
        .map(|c| c.amplitude.abs())
        .fold(0.0f64, f64::max);
    let y_max = window_peak.max(comp_peak).max(1e-6) * 1.1;

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..x_end, -y_max..y_max)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("Amplitude")
        .draw()?;

    let t_at = |i: usize| i as f64 / sr;
    for (idx, comp) in components.iter().enumerate() {
        if comp.is_placeholder() {
            continue;
        }
        let color = series_color(idx);
        chart
            .draw_series(LineSeries::new(
                (0..n).map(|i| (x_at(i), comp.value_at(t_at(i)))),
                &color,
            ))?
            .label(format!("Component {}: {:.2} Hz", idx + 1, comp.freq))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }

    for (idx, added) in added_signals.iter().enumerate() {
        let color = series_color(components.len() + idx).mix(0.6);
        chart
            .draw_series(LineSeries::new(
                added.iter().take(n).enumerate().map(|(i, &v)| (x_at(i), v)),
                &color,
            ))?
            .label(format!("Added signal {}", idx + 1))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }

    chart
        .draw_series(LineSeries::new(
            (0..n).map(|i| (x_at(i), samples[i])),
            BLACK.stroke_width(2),
        ))?
        .label("Signal")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLACK));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Horizontal bar per rhythm segment
pub fn plot_timeline(path: &Path, timeline: &[TimelineEntry]) -> SignalResult<()> {
    ensure_parent_dir(path)?;
    finish(path, draw_timeline(path, timeline))
}

fn draw_timeline(path: &Path, timeline: &[TimelineEntry]) -> DrawResult {
    let x_end = timeline
        .iter()
        .map(|e| e.end_time())
        .fold(0.0f64, f64::max)
        .max(f64::EPSILON);

    let root = BitMapBackend::new(path, (1000, 240)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Segment timeline", ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(10)
        .build_cartesian_2d(0f64..x_end, 0f64..1f64)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(0)
        .x_desc("Time [s]")
        .draw()?;

    for (i, entry) in timeline.iter().enumerate() {
        let color = series_color(i);
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(entry.start_time, 0.35), (entry.end_time(), 0.65)],
                color.filled(),
            )))?
            .label(entry.display_label(i))
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Heat colour for v in [0, 1], dark blue to yellow
fn heat(v: f64) -> HSLColor {
    let v = v.clamp(0.0, 1.0);
    HSLColor(0.66 * (1.0 - v), 1.0, 0.15 + 0.4 * v)
}

/// Diverging blue-white-red colour for v in [0, 1]
fn coolwarm(v: f64) -> RGBColor {
    let v = v.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8, t: f64| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    let (cold, mid, warm) = ((59, 76, 192), (221, 221, 221), (180, 4, 38));
    let (from, to, t) = if v < 0.5 {
        (cold, mid, v * 2.0)
    } else {
        (mid, warm, (v - 0.5) * 2.0)
    };
    RGBColor(lerp(from.0, to.0, t), lerp(from.1, to.1, t), lerp(from.2, to.2, t))
}

fn cell_width(points: &[f64], fallback: f64) -> f64 {
    if points.len() > 1 {
        points[1] - points[0]
    } else {
        fallback
    }
}

/// Spectrogram in dB, frequencies cropped at `max_freq`
pub fn plot_spectrogram(path: &Path, spectrogram: &Spectrogram, max_freq: f64) -> SignalResult<()> {
    ensure_parent_dir(path)?;
    finish(path, draw_spectrogram(path, &spectrogram.cropped(max_freq), max_freq))
}

fn draw_spectrogram(path: &Path, spec: &Spectrogram, max_freq: f64) -> DrawResult {
    let db = spec.to_db();
    let (lo, hi) = db
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = (hi - lo).max(1e-9);
    let dt = cell_width(&spec.times, 1.0);
    let df = cell_width(&spec.freqs, 1.0);
    let t_end = spec.times.last().map(|t| t + dt / 2.0).unwrap_or(1.0);

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Spectrogram", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..t_end, 0f64..max_freq)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Time [s]")
        .y_desc("Frequency [Hz]")
        .draw()?;

    chart.draw_series(db.iter().zip(spec.times.iter()).flat_map(|(row, &t)| {
        row.iter().zip(spec.freqs.iter()).map(move |(&v, &f)| {
            Rectangle::new(
                [(t - dt / 2.0, f - df / 2.0), (t + dt / 2.0, f + df / 2.0)],
                heat((v - lo) / range).filled(),
            )
        })
    }))?;

    root.present()?;
    Ok(())
}

pub fn plot_chromagram(path: &Path, chromagram: &Chromagram) -> SignalResult<()> {
    ensure_parent_dir(path)?;
    finish(path, draw_chromagram(path, chromagram))
}

fn draw_chromagram(path: &Path, chroma: &Chromagram) -> DrawResult {
    let dt = cell_width(&chroma.times, 1.0);
    let t_end = chroma.times.last().map(|t| t + dt / 2.0).unwrap_or(1.0);

    let root = BitMapBackend::new(path, (1000, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Chromagram", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(0f64..t_end, 0f64..12f64)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .y_labels(12)
        .y_label_formatter(&|v: &f64| {
            PITCH_CLASSES
                .get(v.floor() as usize)
                .map(|s| s.to_string())
                .unwrap_or_default()
        })
        .x_desc("Time [s]")
        .y_desc("Pitch class")
        .draw()?;

    chart.draw_series(chroma.chroma.iter().zip(chroma.times.iter()).flat_map(
        |(frame, &t)| {
            frame.iter().enumerate().map(move |(pc, &v)| {
                Rectangle::new(
                    [(t - dt / 2.0, pc as f64), (t + dt / 2.0, pc as f64 + 1.0)],
                    coolwarm(v).filled(),
                )
            })
        },
    ))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colormaps_stay_in_range() {
        assert_eq!(coolwarm(0.0), RGBColor(59, 76, 192));
        assert_eq!(coolwarm(0.5), RGBColor(221, 221, 221));
        assert_eq!(coolwarm(1.0), RGBColor(180, 4, 38));
        assert_eq!(coolwarm(2.0), coolwarm(1.0));
        let HSLColor(h, _, _) = heat(1.0);
        assert!(h.abs() < 1e-12);
    }

    #[test]
    fn test_waveform_of_too_short_signal_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short_plot.png");
        for samples in [&[][..], &[1.0][..]] {
            let err = plot_waveform(&path, "short", samples, 10, &[], &[]).unwrap_err();
            assert!(matches!(err, SignalError::Plot(_)));
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_cell_width() {
        assert_eq!(cell_width(&[0.5, 0.75, 1.0], 9.0), 0.25);
        assert_eq!(cell_width(&[0.5], 9.0), 9.0);
    }
}
