//! Human-readable summaries printed after a command finishes.

use std::{path::Path, time::Duration};

use pluckline::{
    analysis::{dominant_frequency, peak_level, rms_level},
    RenderSummary,
};
use tracing::info;

/// Log what a render did. Goes through tracing so raw PCM on stdout stays
/// clean.
pub fn render_finished(summary: &RenderSummary, elapsed: Duration, sample_rate: u32) {
    let audio_secs = summary.samples_written as f64 / sample_rate as f64;
    let speed = if elapsed.as_secs_f64() > 0.0 {
        audio_secs / elapsed.as_secs_f64()
    } else {
        f64::INFINITY
    };

    info!(
        samples = summary.samples_written,
        seconds = audio_secs,
        played = summary.events_played,
        skipped = summary.events_skipped,
        ignored = summary.events_ignored,
        peak_voices = summary.peak_active_voices,
        "rendered in {:.1?} ({speed:.1}x realtime)",
        elapsed
    );
}

pub fn print_analysis(path: &Path, samples: &[i16], sample_rate: u32) {
    let peak = peak_level(samples);
    let rms = rms_level(samples);

    println!("=== {} ===", path.display());
    println!("Sample rate: {sample_rate} Hz");
    println!(
        "Duration:    {:.3} s ({} samples)",
        samples.len() as f64 / sample_rate.max(1) as f64,
        samples.len()
    );
    println!("Peak:        {:.4} ({:.1} dBFS)", peak, to_dbfs(peak));
    println!("RMS:         {:.4} ({:.1} dBFS)", rms, to_dbfs(rms));
    match dominant_frequency(samples, sample_rate) {
        Some(hz) => println!("Dominant:    {hz:.1} Hz"),
        None => println!("Dominant:    -"),
    }
}

fn to_dbfs(level: f32) -> f32 {
    20.0 * level.max(1e-6).log10()
}
