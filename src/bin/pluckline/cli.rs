use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use pluckline::{EngineError, SynthConfig, Tempo};

/// Render plucked-string note sequences to 16-bit PCM.
#[derive(Debug, Parser)]
#[command(name = "pluckline", version, about)]
pub struct Cli {
    /// More log output (-v debug, -vv trace). RUST_LOG overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render a song to a WAV file or raw PCM on stdout
    Render(RenderArgs),
    /// Play a song on the default output device
    Play(PlayArgs),
    /// Print level and pitch of a WAV file
    Analyze {
        /// 16-bit WAV file
        path: PathBuf,
    },
}

/// Options shared by everything that synthesizes.
#[derive(Debug, Args)]
pub struct SynthArgs {
    /// Playback speed, 0.25 to 4.0
    #[arg(short, long, default_value_t = 1.0)]
    pub tempo: f32,

    /// Seed the excitation noise for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// TOML file with engine settings
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl SynthArgs {
    pub fn synth_config(&self) -> Result<SynthConfig, EngineError> {
        let mut config = match &self.config {
            Some(path) => SynthConfig::load(path)?,
            None => SynthConfig::default(),
        };
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }

    pub fn tempo(&self) -> Result<Tempo, EngineError> {
        Tempo::new(self.tempo)
    }
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Song file: `.txt` for the text format, anything else is binary
    pub input: PathBuf,

    #[command(flatten)]
    pub synth: SynthArgs,

    /// Output WAV path [default: input with a .wav extension]
    #[arg(short, long, conflicts_with = "raw")]
    pub output: Option<PathBuf>,

    /// Write headerless little-endian PCM to stdout
    #[arg(long)]
    pub raw: bool,
}

impl RenderArgs {
    pub fn wav_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("wav"))
    }
}

#[derive(Debug, Args)]
pub struct PlayArgs {
    pub input: PathBuf,

    #[command(flatten)]
    pub synth: SynthArgs,
}
