//! Tonebench CLI - render test signals to WAV

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tonebench::config::SignalSpec;
use tonebench::notes::{
    note_frequency, NoteTable, DEFAULT_REF_FREQ, DEFAULT_TOLERANCE_CENTS, PITCH_CLASSES,
};
use tonebench::scene::{
    build_signal, finish_signal, parse_component, parse_phase, parse_segment, render_scene,
    RenderOptions, RenderedSignal,
};
use tonebench::{SampleClock, SceneConfig, SynthSettings, DEFAULT_NOTE_TABLE};
use tracing::Level;

#[derive(Parser)]
#[command(name = "tonebench")]
#[command(about = "Deterministic test signal synthesizer", long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write waveform, spectrogram and chromagram PNGs (needs the `plot` feature)
    #[arg(long, global = true)]
    plots: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ClockArgs {
    /// Sample rate in Hz
    #[arg(short, long, default_value = "44100")]
    sample_rate: u32,

    /// Duration in seconds
    #[arg(short, long, default_value = "5.0")]
    duration: f64,
}

#[derive(Args)]
struct OutputArgs {
    /// Output WAV file path
    #[arg(short, long)]
    output: PathBuf,

    /// Skip the `<name>_metadata.json` sidecar
    #[arg(long)]
    no_metadata: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a single tone
    Tone {
        /// Frequency in Hz
        #[arg(short, long, default_value = "440.0")]
        freq: f64,

        /// Amplitude
        #[arg(short, long, default_value = "1.0")]
        amplitude: f64,

        /// Phase in radians, or a multiple of pi ("0.5pi")
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        phase: String,

        #[command(flatten)]
        clock: ClockArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Render a sum of components
    Composite {
        /// Component as AMP:FREQ[:PHASE], repeatable
        #[arg(short, long = "component", required = true, allow_hyphen_values = true)]
        components: Vec<String>,

        /// Tone rendered separately and added as a finished signal, AMP:FREQ[:PHASE]
        #[arg(long = "add-tone", allow_hyphen_values = true)]
        added_tones: Vec<String>,

        #[command(flatten)]
        clock: ClockArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Render a rhythm track of fixed-length segments
    Rhythm {
        /// Segment length in seconds
        #[arg(short, long, default_value = "1.0")]
        unit_time: f64,

        /// Segment as NOTE+NOTE[@label] (note names or Hz, "rest" for silence), repeatable
        #[arg(short = 'g', long = "segment", required = true)]
        segments: Vec<String>,

        #[command(flatten)]
        clock: ClockArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Render every signal of a TOML scene file
    Scene {
        /// Scene file
        file: PathBuf,

        /// Override the scene's output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Render the stock tone, composite and rhythm demo
    Demo {
        /// Output directory
        #[arg(short, long, default_value = "output_test")]
        output_dir: PathBuf,
    },

    /// List note frequencies or identify a frequency
    Notes {
        /// First octave
        #[arg(long, default_value = "4")]
        from: i32,

        /// Last octave
        #[arg(long, default_value = "4")]
        to: i32,

        /// Tuning reference for A4 in Hz
        #[arg(long = "ref", default_value = "440.0")]
        ref_freq: f64,

        /// Print the frequency of one note name
        #[arg(long)]
        lookup: Option<String>,

        /// Print the note closest to a frequency
        #[arg(long)]
        identify: Option<f64>,

        /// Tolerance for --identify in cents
        #[arg(long, default_value_t = DEFAULT_TOLERANCE_CENTS)]
        tolerance: f64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let options = RenderOptions { plots: cli.plots };
    let notes = &*DEFAULT_NOTE_TABLE;

    match cli.command {
        Commands::Tone {
            freq,
            amplitude,
            phase,
            clock,
            output,
        } => {
            let spec = SignalSpec::Tone {
                name: stem(&output.output),
                amplitude,
                freq,
                phase: parse_phase(&phase)?,
            };
            render_one(&spec, &clock, &output, options, notes)?;
        }

        Commands::Composite {
            components,
            added_tones,
            clock,
            output,
        } => {
            let parse_all = |items: &[String]| {
                items
                    .iter()
                    .map(|c| parse_component(c))
                    .collect::<Result<Vec<_>, _>>()
            };
            let spec = SignalSpec::Composite {
                name: stem(&output.output),
                components: parse_all(components.as_slice())?,
                added_tones: parse_all(added_tones.as_slice())?,
            };
            render_one(&spec, &clock, &output, options, notes)?;
        }

        Commands::Rhythm {
            unit_time,
            segments,
            clock,
            output,
        } => {
            let segments = segments
                .iter()
                .map(|s| parse_segment(s, notes))
                .collect::<Result<Vec<_>, _>>()?;
            let spec = SignalSpec::Rhythm {
                name: stem(&output.output),
                unit_time,
                segments,
            };
            render_one(&spec, &clock, &output, options, notes)?;
        }

        Commands::Scene { file, output_dir } => {
            let mut scene = SceneConfig::load(&file)?;
            if let Some(dir) = output_dir {
                scene.output_dir = dir;
            }
            print_rendered(&render_scene(&scene, notes, options)?, notes);
        }

        Commands::Demo { output_dir } => {
            let scene = SceneConfig {
                output_dir,
                ..SceneConfig::demo()
            };
            print_rendered(&render_scene(&scene, notes, options)?, notes);
        }

        Commands::Notes {
            from,
            to,
            ref_freq,
            lookup,
            identify,
            tolerance,
        } => {
            if let Some(name) = lookup {
                let table = NoteTable::equal_temperament(0..=8, ref_freq);
                match table.frequency(&name) {
                    Some(freq) => println!("{}: {:.2} Hz", name, freq),
                    None => return Err(format!("unknown note name '{}'", name).into()),
                }
            } else if let Some(freq) = identify {
                let table = NoteTable::equal_temperament(0..=8, ref_freq);
                match table.nearest(freq, tolerance) {
                    Some(name) => println!("{:.2} Hz: {}", freq, name),
                    None => println!("{:.2} Hz: no note within {} cents", freq, tolerance),
                }
            } else {
                print_note_table(from, to, ref_freq);
            }
        }
    }

    Ok(())
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "signal".to_string())
}

fn render_one(
    spec: &SignalSpec,
    clock: &ClockArgs,
    output: &OutputArgs,
    options: RenderOptions,
    notes: &NoteTable,
) -> Result<(), Box<dyn std::error::Error>> {
    let sample_clock = SampleClock::new(clock.sample_rate, clock.duration)?;
    let signal = build_signal(spec, sample_clock, SynthSettings::default(), notes)?;
    let rendered = finish_signal(
        spec.name(),
        signal,
        &output.output,
        !output.no_metadata,
        options,
    )?;
    print_rendered(std::slice::from_ref(&rendered), notes);
    Ok(())
}

fn print_rendered(rendered: &[RenderedSignal], notes: &NoteTable) {
    for signal in rendered {
        println!("{}", signal.summary(notes));
    }
}

fn print_note_table(from: i32, to: i32, ref_freq: f64) {
    println!("{:<6} {:>10}", "Note", "Hz");
    for octave in from..=to {
        for (pc, name) in PITCH_CLASSES.iter().enumerate() {
            println!(
                "{:<6} {:>10.2}",
                format!("{}{}", name, octave),
                note_frequency(pc, octave, ref_freq)
            );
        }
    }
    if (ref_freq - DEFAULT_REF_FREQ).abs() > f64::EPSILON {
        println!("(A4 = {} Hz)", ref_freq);
    }
}
