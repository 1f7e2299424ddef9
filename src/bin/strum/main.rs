//! strum - virtual guitar in the terminal
//!
//! Run with: cargo run -- play
//!
//! Offline renders (no sound card needed):
//!   cargo run -- render --string 1 --out a.wav
//!   cargo run -- chord Em --out em.wav

mod config;
mod render;
mod ui;

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange},
    execute,
};
use strum_dsp::{io::AudioOutput, synth::StringSynthesizer, Guitar};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::StrumConfig;
use render::RenderOptions;
use ui::FretboardApp;

#[derive(Parser)]
#[command(name = "strum", version, about = "Karplus-Strong virtual guitar")]
struct Cli {
    /// Settings file (defaults to ./strum.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play the fretboard from the keyboard
    Play {
        /// Logs go here so they don't tear up the TUI
        #[arg(long, default_value = "strum.log")]
        log_file: PathBuf,
    },
    /// Render a single plucked note to WAV
    Render {
        /// String index, 0 = low E
        #[arg(short, long)]
        string: usize,
        #[arg(short, long, default_value_t = 0)]
        fret: u32,
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long, default_value_t = 48_000)]
        sample_rate: u32,
        /// Fix the excitation noise for reproducible renders
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Render a strummed chord from the config to WAV
    Chord {
        name: String,
        #[arg(short, long)]
        out: PathBuf,
        /// Delay between successive strings
        #[arg(long, default_value_t = 30)]
        gap_ms: u64,
        #[arg(long, default_value_t = 48_000)]
        sample_rate: u32,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    match cli.command {
        Command::Play { log_file } => {
            init_file_logging(&log_file)?;
            let config = StrumConfig::load(cli.config.as_deref())?;
            play(config)
        }
        Command::Render {
            string,
            fret,
            out,
            sample_rate,
            seed,
        } => {
            init_stderr_logging();
            let config = StrumConfig::load(cli.config.as_deref())?;
            let options = RenderOptions {
                out: &out,
                sample_rate,
                seed,
            };
            render::note(&config, string, fret, &options)
        }
        Command::Chord {
            name,
            out,
            gap_ms,
            sample_rate,
            seed,
        } => {
            init_stderr_logging();
            let config = StrumConfig::load(cli.config.as_deref())?;
            let options = RenderOptions {
                out: &out,
                sample_rate,
                seed,
            };
            render::chord(&config, &name, gap_ms, &options)
        }
    }
}

fn play(config: StrumConfig) -> EyreResult<()> {
    let keys = config.keys.string_keys()?;
    let guitar = Guitar::new(
        config.tuning()?,
        StringSynthesizer::new(config.synth.clone()),
        AudioOutput::new(config.output.clone()),
    );
    let mut app = FretboardApp::new(guitar, config.chords, keys);

    let mut terminal = ratatui::init();
    // Focus events drive suspend/resume of the device
    if let Err(err) = execute!(std::io::stdout(), EnableFocusChange) {
        debug!("terminal focus reporting unavailable: {}", err);
    }
    let result = app.run(&mut terminal);
    if let Err(err) = execute!(std::io::stdout(), DisableFocusChange) {
        debug!("failed to disable focus reporting: {}", err);
    }
    ratatui::restore();
    result
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

fn init_file_logging(path: &Path) -> EyreResult<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
