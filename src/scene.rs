//! Turn scene descriptions into built signals and files on disk

use crate::analysis::{component_table, dominant_frequency, timeline_report};
use crate::clock::SampleClock;
use crate::composite::CompositeBuilder;
use crate::config::{SceneConfig, SegmentSpec, SignalSpec, SynthSettings};
use crate::error::{SignalError, SignalResult};
use crate::notes::{NoteTable, DEFAULT_TOLERANCE_CENTS};
use crate::render::{save, SavedSignal};
use crate::rhythm::RhythmBuilder;
use crate::signal::BuildableSignal;
use crate::tone::{ToneComponent, ToneSignal};
use std::f64::consts::PI;
use std::path::{Path, PathBuf};
use tracing::info;

/// A built signal of any kind
#[derive(Debug, Clone)]
pub enum SceneSignal {
    Tone(ToneSignal),
    Composite(CompositeBuilder),
    Rhythm(RhythmBuilder),
}

impl SceneSignal {
    pub fn as_buildable(&self) -> &dyn BuildableSignal {
        match self {
            SceneSignal::Tone(s) => s,
            SceneSignal::Composite(s) => s,
            SceneSignal::Rhythm(s) => s,
        }
    }

    /// Component table, or per-segment tables for a rhythm track
    pub fn report(&self) -> String {
        match self {
            SceneSignal::Tone(s) => component_table(&[*s.component()]),
            SceneSignal::Composite(s) => component_table(s.component_list()),
            SceneSignal::Rhythm(s) => timeline_report(&s.timeline()),
        }
    }
}

/// Resolve a segment's notes and explicit components into tone components
pub fn resolve_segment(spec: &SegmentSpec, notes: &NoteTable) -> SignalResult<Vec<ToneComponent>> {
    let mut components = spec.components.clone();
    for name in &spec.notes {
        let freq = notes
            .frequency(name)
            .ok_or_else(|| SignalError::Validation(format!("unknown note name '{}'", name)))?;
        components.push(ToneComponent::new(1.0, freq, 0.0));
    }
    Ok(components)
}

/// Construct and build one signal of a scene
pub fn build_signal(
    spec: &SignalSpec,
    clock: SampleClock,
    settings: SynthSettings,
    notes: &NoteTable,
) -> SignalResult<SceneSignal> {
    let mut signal = match spec {
        SignalSpec::Tone {
            amplitude,
            freq,
            phase,
            ..
        } => SceneSignal::Tone(ToneSignal::new(*amplitude, *freq, *phase, clock)),
        SignalSpec::Composite {
            components,
            added_tones,
            ..
        } => {
            let mut composite = CompositeBuilder::new(clock).with_settings(settings);
            for c in components {
                composite.add_component(c.amplitude, c.freq, c.phase);
            }
            for c in added_tones {
                let mut tone = ToneSignal::new(c.amplitude, c.freq, c.phase, clock);
                tone.build()?;
                composite.add_signal(&tone)?;
            }
            SceneSignal::Composite(composite)
        }
        SignalSpec::Rhythm {
            unit_time,
            segments,
            ..
        } => {
            let mut rhythm = RhythmBuilder::new(clock, *unit_time)?.with_settings(settings);
            for seg in segments {
                rhythm.add_segment(resolve_segment(seg, notes)?, seg.label.clone())?;
            }
            SceneSignal::Rhythm(rhythm)
        }
    };

    match &mut signal {
        SceneSignal::Tone(s) => s.build()?,
        SceneSignal::Composite(s) => s.build()?,
        SceneSignal::Rhythm(s) => s.build()?,
    };
    Ok(signal)
}

/// What to write besides the WAV files
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Waveform / timeline / spectrogram / chromagram PNGs (feature `plot`)
    pub plots: bool,
}

/// Result of rendering one scene entry
#[derive(Debug, Clone)]
pub struct RenderedSignal {
    pub name: String,
    pub signal: SceneSignal,
    pub saved: SavedSignal,
    pub dominant_freq: f64,
    pub plots: Vec<PathBuf>,
}

impl RenderedSignal {
    pub fn summary(&self, notes: &NoteTable) -> String {
        let mut out = format!("== {} -> {}\n", self.name, self.saved.wav.display());
        if let Some(meta) = &self.saved.metadata {
            out.push_str(&format!("Metadata: {}\n", meta.display()));
        }
        out.push_str(&self.saved.stats.summary());
        let note = notes
            .nearest(self.dominant_freq, DEFAULT_TOLERANCE_CENTS)
            .unwrap_or("-");
        out.push_str(&format!(
            "  Dominant Freq:  {:.1} Hz ({})\n",
            self.dominant_freq, note
        ));
        for advisory in self.signal.as_buildable().advisories() {
            out.push_str(&format!("  Warning: {}\n", advisory));
        }
        out.push_str(&self.signal.report());
        for plot in &self.plots {
            out.push_str(&format!("Plot: {}\n", plot.display()));
        }
        out
    }
}

/// Build every signal of `scene` and write it under `scene.output_dir`
pub fn render_scene(
    scene: &SceneConfig,
    notes: &NoteTable,
    options: RenderOptions,
) -> SignalResult<Vec<RenderedSignal>> {
    let clock = SampleClock::new(scene.sample_rate, scene.duration_seg)?;
    let mut rendered = Vec::with_capacity(scene.signals.len());

    for spec in &scene.signals {
        let signal = build_signal(spec, clock, scene.settings, notes)?;
        let wav = scene.output_dir.join(format!("{}.wav", spec.name()));
        rendered.push(finish_signal(
            spec.name(),
            signal,
            &wav,
            scene.metadata,
            options,
        )?);
    }

    info!(
        "Rendered {} signals into {}",
        rendered.len(),
        scene.output_dir.display()
    );
    Ok(rendered)
}

/// Save an already built signal and produce its plots
pub fn finish_signal(
    name: &str,
    signal: SceneSignal,
    wav: &Path,
    with_metadata: bool,
    options: RenderOptions,
) -> SignalResult<RenderedSignal> {
    let source = signal.as_buildable();
    let saved = save(source, wav, with_metadata)?;
    let samples = source.signal().unwrap_or(&[]);
    let dominant_freq = dominant_frequency(samples, source.sample_rate());
    let plots = if options.plots {
        write_plots(name, &signal, wav)?
    } else {
        Vec::new()
    };

    Ok(RenderedSignal {
        name: name.to_string(),
        signal,
        saved,
        dominant_freq,
        plots,
    })
}

#[cfg(feature = "plot")]
fn write_plots(name: &str, signal: &SceneSignal, wav: &Path) -> SignalResult<Vec<PathBuf>> {
    use crate::analysis::{Chromagram, Spectrogram, DEFAULT_MAX_FREQ};
    use crate::plot;

    let dir = wav.parent().unwrap_or_else(|| Path::new(""));
    let source = signal.as_buildable();
    let samples = source.signal().unwrap_or(&[]);
    let sample_rate = source.sample_rate();
    let mut written = Vec::new();

    let waveform = dir.join(format!("{}_plot.png", name));
    match signal {
        SceneSignal::Tone(s) => {
            let c = s.component();
            let title = format!(
                "Signal: {} * cos(2π{}t + {:.2}π)",
                c.amplitude,
                c.freq,
                c.phase / PI
            );
            plot::plot_waveform(&waveform, &title, samples, sample_rate, &[*c], &[])?;
        }
        SceneSignal::Composite(s) => {
            let title = format!(
                "Composite signal with {} components and {} added signals",
                s.component_list().len(),
                s.signal_count()
            );
            plot::plot_waveform(
                &waveform,
                &title,
                samples,
                sample_rate,
                s.component_list(),
                s.external_signals(),
            )?;
        }
        SceneSignal::Rhythm(s) => {
            let title = format!("Rhythm track with {} segments", s.segments().len());
            plot::plot_waveform(&waveform, &title, samples, sample_rate, &[], &[])?;
            let timeline = dir.join(format!("{}_timeline.png", name));
            plot::plot_timeline(&timeline, &s.timeline())?;
            written.push(timeline);
        }
    }
    written.insert(0, waveform);

    let spectrogram = dir.join(format!("{}_spectrogram.png", name));
    plot::plot_spectrogram(
        &spectrogram,
        &Spectrogram::with_defaults(samples, sample_rate),
        DEFAULT_MAX_FREQ,
    )?;
    written.push(spectrogram);

    let chromagram = dir.join(format!("{}_chromagram.png", name));
    plot::plot_chromagram(&chromagram, &Chromagram::with_defaults(samples, sample_rate))?;
    written.push(chromagram);

    Ok(written)
}

#[cfg(not(feature = "plot"))]
fn write_plots(name: &str, _signal: &SceneSignal, _wav: &Path) -> SignalResult<Vec<PathBuf>> {
    tracing::warn!(
        "Plots for '{}' skipped: built without the `plot` feature",
        name
    );
    Ok(Vec::new())
}

/// Parse a phase in radians; a trailing `pi` multiplies by π ("0.25pi")
pub fn parse_phase(text: &str) -> SignalResult<f64> {
    let text = text.trim();
    let (number, scale) = match text.strip_suffix("pi").or_else(|| text.strip_suffix('π')) {
        Some("") => ("1", PI),
        Some(rest) => (rest, PI),
        None => (text, 1.0),
    };
    number
        .trim()
        .parse::<f64>()
        .ok()
        .map(|v| v * scale)
        .filter(|v| v.is_finite())
        .ok_or_else(|| SignalError::Validation(format!("invalid phase '{}'", text)))
}

/// Parse `AMP:FREQ[:PHASE]`
pub fn parse_component(text: &str) -> SignalResult<ToneComponent> {
    let parts: Vec<&str> = text.split(':').collect();
    let number = |s: &str, what: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|_| SignalError::Validation(format!("invalid {} in component '{}'", what, text)))
    };
    let component = match parts.as_slice() {
        [amp, freq] => ToneComponent::new(
            number(amp, "amplitude")?,
            number(freq, "frequency")?,
            0.0,
        ),
        [amp, freq, phase] => ToneComponent::new(
            number(amp, "amplitude")?,
            number(freq, "frequency")?,
            parse_phase(phase)?,
        ),
        _ => {
            return Err(SignalError::Validation(format!(
                "component '{}' must look like AMP:FREQ[:PHASE]",
                text
            )))
        }
    };
    component.validate()?;
    Ok(component)
}

/// Parse a rhythm segment `NOTE+NOTE[@label]`.
///
/// Each `+`-separated item is a note name ("C4") or a frequency in Hz, at unit
/// amplitude. `rest` or an empty body gives a silent segment.
pub fn parse_segment(text: &str, notes: &NoteTable) -> SignalResult<SegmentSpec> {
    let (body, label) = match text.split_once('@') {
        Some((body, label)) => (body, Some(label.trim().to_string())),
        None => (text, None),
    };
    let body = body.trim();
    let mut spec = SegmentSpec {
        label,
        ..SegmentSpec::default()
    };
    if body.is_empty() || body.eq_ignore_ascii_case("rest") {
        return Ok(spec);
    }
    for item in body.split('+').map(str::trim) {
        if let Ok(freq) = item.parse::<f64>() {
            let component = ToneComponent::new(1.0, freq, 0.0);
            component.validate()?;
            spec.components.push(component);
        } else if notes.frequency(item).is_some() {
            spec.notes.push(item.to_string());
        } else {
            return Err(SignalError::Validation(format!(
                "'{}' is neither a note name nor a frequency",
                item
            )));
        }
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::DEFAULT_NOTE_TABLE;

    #[test]
    fn test_parse_phase() {
        assert_eq!(parse_phase("0").unwrap(), 0.0);
        assert!((parse_phase("0.25pi").unwrap() - PI / 4.0).abs() < 1e-12);
        assert!((parse_phase("pi").unwrap() - PI).abs() < 1e-12);
        assert!((parse_phase("1.5").unwrap() - 1.5).abs() < 1e-12);
        assert!(parse_phase("abc").is_err());
        assert!(parse_phase("inf").is_err());
        assert!(parse_phase("nanpi").is_err());
    }

    #[test]
    fn test_parse_component() {
        let c = parse_component("0.8:523.25:0.25pi").unwrap();
        assert_eq!(c.amplitude, 0.8);
        assert_eq!(c.freq, 523.25);
        assert!((c.phase - PI / 4.0).abs() < 1e-12);
        assert_eq!(parse_component("1:440").unwrap().phase, 0.0);
        assert!(parse_component("440").is_err());
        assert!(parse_component("a:440").is_err());
        for bad in ["1:nan", "1:inf", "1:-440", "nan:440", "1:440:inf"] {
            assert!(
                matches!(parse_component(bad), Err(SignalError::Validation(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_parse_segment() {
        let notes = &*DEFAULT_NOTE_TABLE;
        let chord = parse_segment("C4+E4+G4@C Major Chord", notes).unwrap();
        assert_eq!(chord.label.as_deref(), Some("C Major Chord"));
        assert_eq!(chord.notes.len(), 3);

        let mixed = parse_segment("A4 + 660", notes).unwrap();
        assert_eq!(mixed.notes, vec!["A4".to_string()]);
        assert_eq!(mixed.components[0].freq, 660.0);
        assert!(mixed.label.is_none());

        let rest = parse_segment("rest@pause", notes).unwrap();
        assert!(rest.notes.is_empty() && rest.components.is_empty());

        assert!(parse_segment("Q9", notes).is_err());
        assert!(parse_segment("A4+nan", notes).is_err());
        assert!(parse_segment("inf@loud", notes).is_err());
        assert!(parse_segment("-220", notes).is_err());
    }

    #[test]
    fn test_resolve_segment() {
        let notes = &*DEFAULT_NOTE_TABLE;
        let spec = SegmentSpec {
            label: None,
            components: vec![ToneComponent::new(0.5, 100.0, 0.0)],
            notes: vec!["A4".to_string()],
        };
        let comps = resolve_segment(&spec, notes).unwrap();
        assert_eq!(comps.len(), 2);
        assert!((comps[1].freq - 440.0).abs() < 1e-9);

        let bad = SegmentSpec {
            notes: vec!["X1".to_string()],
            ..SegmentSpec::default()
        };
        assert!(matches!(
            resolve_segment(&bad, notes),
            Err(SignalError::Validation(_))
        ));
    }

    #[test]
    fn test_build_demo_signals() {
        let demo = SceneConfig::demo();
        let clock = SampleClock::new(8000, 5.0).unwrap();
        for spec in &demo.signals {
            let built = build_signal(spec, clock, demo.settings, &DEFAULT_NOTE_TABLE).unwrap();
            let source = built.as_buildable();
            assert_eq!(source.signal().unwrap().len(), 40000);
            assert!(!built.report().is_empty());
        }
    }

    #[test]
    fn test_added_tones_count_as_signals() {
        let spec = SignalSpec::Composite {
            name: "mix".to_string(),
            components: vec![ToneComponent::new(1.0, 100.0, 0.0)],
            added_tones: vec![ToneComponent::new(1.0, 200.0, 0.0)],
        };
        let clock = SampleClock::new(1000, 1.0).unwrap();
        match build_signal(&spec, clock, SynthSettings::default(), &DEFAULT_NOTE_TABLE).unwrap() {
            SceneSignal::Composite(c) => {
                assert_eq!(c.component_list().len(), 1);
                assert_eq!(c.signal_count(), 1);
                let samples = c.signal().unwrap();
                // Both cosines peak together at t = 0
                assert!((samples[0] - 1.0).abs() < 1e-12);
            }
            other => panic!("expected composite, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_tone_fails_to_build() {
        let spec = SignalSpec::Tone {
            name: "broken".to_string(),
            amplitude: 1.0,
            freq: f64::NAN,
            phase: 0.0,
        };
        let clock = SampleClock::new(100, 1.0).unwrap();
        let err = build_signal(&spec, clock, SynthSettings::default(), &DEFAULT_NOTE_TABLE)
            .unwrap_err();
        assert!(matches!(err, SignalError::Validation(_)));
    }

    #[test]
    fn test_summary_lists_dropped_components() {
        let spec = SignalSpec::Composite {
            name: "mix".to_string(),
            components: vec![
                ToneComponent::new(1.0, 5.0, 0.0),
                ToneComponent::new(1.0, f64::NAN, 0.0),
            ],
            added_tones: Vec::new(),
        };
        let clock = SampleClock::new(100, 1.0).unwrap();
        let signal =
            build_signal(&spec, clock, SynthSettings::default(), &DEFAULT_NOTE_TABLE).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let rendered = finish_signal(
            "mix",
            signal,
            &dir.path().join("mix.wav"),
            false,
            RenderOptions::default(),
        )
        .unwrap();

        assert_eq!(rendered.signal.as_buildable().advisories().len(), 1);
        let summary = rendered.summary(&DEFAULT_NOTE_TABLE);
        assert!(summary.contains("Warning: component"));
        assert!(rendered.saved.stats.peak <= 1.0);
    }

    #[test]
    fn test_rhythm_capacity_surfaces_from_scene() {
        let spec = SignalSpec::Rhythm {
            name: "too_long".to_string(),
            unit_time: 1.0,
            segments: vec![SegmentSpec::default(); 3],
        };
        let clock = SampleClock::new(100, 2.0).unwrap();
        let err = build_signal(&spec, clock, SynthSettings::default(), &DEFAULT_NOTE_TABLE)
            .unwrap_err();
        assert!(matches!(err, SignalError::Capacity { .. }));
    }
}
