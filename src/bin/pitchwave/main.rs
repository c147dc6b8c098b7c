//! pitchwave - play notes, chords and keyboard input
//!
//! Run with: cargo run -- demo

mod keys;
mod score;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use tracing::{info, warn, Level};

use pitchwave::dsp::{MixMode, Waveform};
use pitchwave::engine::Sequencer;
use pitchwave::io::{CpalOutput, OutputStream, WavOutput};
use pitchwave::sequencing::Sequence;
use pitchwave::synth::Synth;
use pitchwave::{EngineConfig, DEFAULT_CHUNK_SIZE, DEFAULT_SAMPLE_RATE};

#[derive(Parser)]
#[command(name = "pitchwave")]
#[command(about = "Waveform synthesizer for notes and chords", long_about = None)]
struct Cli {
    /// Sample rate in Hz
    #[arg(short, long, default_value_t = DEFAULT_SAMPLE_RATE, global = true)]
    sample_rate: u32,

    /// Samples per device write
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, global = true)]
    chunk_size: usize,

    /// Average chord notes instead of summing them
    #[arg(long, global = true)]
    average_chords: bool,

    /// Maximum cached note buffers (unbounded when omitted)
    #[arg(long, global = true)]
    cache_capacity: Option<usize>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a short scale and chord progression
    Demo {
        #[arg(short, long, default_value = "sine")]
        waveform: Waveform,

        /// Render to a WAV file instead of the audio device
        #[arg(long)]
        wav: Option<PathBuf>,
    },

    /// Play notes (C4), chords (C4+E4+G4) and rests (_)
    Play {
        #[arg(required = true)]
        tokens: Vec<String>,

        #[arg(short, long, default_value = "sine")]
        waveform: Waveform,

        /// Seconds per token
        #[arg(short, long, default_value_t = score::DEFAULT_NOTE_SECONDS)]
        duration: f64,

        /// Seconds of silence after each token
        #[arg(long, default_value_t = 0.0)]
        delay: f64,

        /// Render to a WAV file instead of the audio device
        #[arg(long)]
        wav: Option<PathBuf>,
    },

    /// Play notes from the computer keyboard
    Keys {
        #[arg(short, long, default_value = "sine")]
        waveform: Waveform,

        /// Seconds per key press
        #[arg(short, long, default_value_t = 0.3)]
        duration: f64,

        /// Octave of the home row
        #[arg(short, long, default_value_t = 4)]
        octave: i32,
    },
}

impl Cli {
    fn config(&self) -> EngineConfig {
        let mix_mode = if self.average_chords {
            MixMode::Average
        } else {
            MixMode::Sum
        };
        EngineConfig::default()
            .sample_rate(self.sample_rate)
            .chunk_size(self.chunk_size)
            .mix_mode(mix_mode)
            .cache_capacity(self.cache_capacity)
    }

    fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config();
    match cli.command {
        Commands::Demo { waveform, wav } => play(&config, &score::demo(waveform)?, wav),
        Commands::Play {
            tokens,
            waveform,
            duration,
            delay,
            wav,
        } => {
            let sequence = score::parse_tokens(&tokens, waveform, duration, delay)?;
            play(&config, &sequence, wav)
        }
        Commands::Keys {
            waveform,
            duration,
            octave,
        } => keys::run(config, waveform, duration, octave),
    }
}

fn open_output(config: &EngineConfig, wav: Option<PathBuf>) -> Result<Box<dyn OutputStream>> {
    Ok(match wav {
        Some(path) => Box::new(
            WavOutput::create(&path, config.sample_rate)
                .wrap_err_with(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(CpalOutput::open(&config.stream_settings()).wrap_err("failed to open audio output")?),
    })
}

fn play(config: &EngineConfig, sequence: &Sequence, wav: Option<PathBuf>) -> Result<()> {
    let synth = Arc::new(Synth::new(config));
    let output = open_output(config, wav)?;
    let mut sequencer = Sequencer::new(synth.clone(), output)?;

    println!(
        "Playing {} events ({:.2} s) at {} Hz",
        sequence.len(),
        sequence.total_duration(),
        config.sample_rate
    );
    let report = sequencer.play_sequence(sequence).wrap_err("playback failed")?;
    sequencer.finish().wrap_err("failed to close output")?;

    for failure in &report.failures {
        warn!(index = failure.index, error = %failure.error, "event skipped");
    }
    let stats = synth.cache().stats();
    info!(
        hits = stats.hits,
        misses = stats.misses,
        generations = stats.generations,
        "cache usage"
    );
    synth.shutdown();

    println!(
        "Played {} of {} events",
        report.events_played,
        sequence.len()
    );
    Ok(())
}
