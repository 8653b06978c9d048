//! Real-time playback: the scheduler renders on its own thread into a
//! [`StreamSink`] and the cpal callback drains it.

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use pluckline::{
    io::{open_source, StreamSink},
    RenderSummary, Scheduler, SynthConfig, Tempo,
};
use tracing::{debug, error, info};

/// Mono frames converted per pass of the callback.
const CALLBACK_CHUNK: usize = 1_024;

pub fn play(input: PathBuf, config: SynthConfig, tempo: Tempo) -> EyreResult<RenderSummary> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let default_config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let channels = default_config.channels() as usize;
    let stream_config = cpal::StreamConfig {
        channels: default_config.channels(),
        sample_rate: cpal::SampleRate(config.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };
    debug!(
        device = device.name().unwrap_or_default(),
        channels,
        sample_rate = config.sample_rate,
        "opening output stream"
    );

    // Half a second of lookahead between render and playback.
    let (mut sink, mut reader) = StreamSink::channel(config.sample_rate as usize / 2);
    let finished = Arc::new(AtomicBool::new(false));

    let finished_cb = finished.clone();
    let mut mono = vec![0.0f32; CALLBACK_CHUNK];
    let stream = device
        .build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frames in data.chunks_mut(CALLBACK_CHUNK * channels) {
                    let count = frames.len() / channels;
                    let block = &mut mono[..count];
                    reader.fill(block);

                    // Mono to all channels
                    for (frame, &s) in frames.chunks_mut(channels).zip(block.iter()) {
                        frame.fill(s);
                    }
                }
                if reader.is_finished() {
                    finished_cb.store(true, Ordering::Release);
                }
            },
            |err| error!(%err, "audio stream error"),
            None,
        )
        .wrap_err("failed to build output stream")?;

    let render = thread::Builder::new()
        .name("pluckline-render".into())
        .spawn(move || {
            let mut source = open_source(&input)?;
            let mut scheduler = Scheduler::new(&config, tempo)?;
            scheduler.render(&mut *source, &mut sink)
        })
        .wrap_err("failed to spawn render thread")?;

    stream.play().wrap_err("failed to start playback")?;
    info!("playing... press Ctrl+C to stop");

    let started = Instant::now();
    while !finished.load(Ordering::Acquire) {
        thread::sleep(Duration::from_millis(50));
    }
    // Let the device drain its own buffer.
    thread::sleep(Duration::from_millis(200));
    drop(stream);
    debug!(elapsed = ?started.elapsed(), "playback finished");

    let summary = render
        .join()
        .map_err(|_| eyre!("render thread panicked"))??;
    Ok(summary)
}
