//! pluckline - plucked-string renderer
//!
//! Run with: cargo run -- render song.txt

mod cli;
mod playback;
mod report;

use std::{io, time::Instant};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use pluckline::{
    io::{open_source, wav::read_pcm16, RawPcmSink, WavSink},
    Scheduler,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, PlayArgs, RenderArgs};

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Render(args) => render(args),
        Command::Play(args) => play(args),
        Command::Analyze { path } => {
            let (samples, sample_rate) =
                read_pcm16(&path).wrap_err_with(|| format!("failed to read {}", path.display()))?;
            report::print_analysis(&path, &samples, sample_rate);
            Ok(())
        }
    }
}

/// Logs go to stderr; stdout may be carrying PCM.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,pluckline={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn render(args: RenderArgs) -> EyreResult<()> {
    let config = args.synth.synth_config()?;
    let tempo = args.synth.tempo()?;
    let mut source = open_source(&args.input)
        .wrap_err_with(|| format!("failed to open {}", args.input.display()))?;
    let mut scheduler = Scheduler::new(&config, tempo)?;

    let started = Instant::now();
    let summary = if args.raw {
        let mut sink = RawPcmSink::new(io::stdout().lock());
        scheduler.render(&mut *source, &mut sink)?
    } else {
        let path = args.wav_path();
        let mut sink = WavSink::create(&path, config.sample_rate)?;
        let summary = scheduler.render(&mut *source, &mut sink)?;
        info!(path = %path.display(), "wrote wav");
        summary
    };

    report::render_finished(&summary, started.elapsed(), config.sample_rate);
    Ok(())
}

fn play(args: PlayArgs) -> EyreResult<()> {
    let config = args.synth.synth_config()?;
    let tempo = args.synth.tempo()?;

    let started = Instant::now();
    let summary = playback::play(args.input, config.clone(), tempo)?;
    report::render_finished(&summary, started.elapsed(), config.sample_rate);
    Ok(())
}
