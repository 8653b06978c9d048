//! Bounce a short guitar-style strum to `strum.wav` and print its pitch.
//!
//! Run with: cargo run --example offline_bounce

use pluckline::{
    analysis::{dominant_frequency, peak_level},
    io::{wav::read_pcm16, Song, WavSink},
    NoteEvent, Scheduler, SynthConfig, Tempo,
};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // E major, strummed low to high, twice
    let strings: [i16; 6] = [40, 47, 52, 56, 59, 64];
    let mut song: Song = [0u32, 1_200]
        .iter()
        .flat_map(|&start| {
            strings
                .iter()
                .enumerate()
                .map(move |(i, &key)| NoteEvent::pluck(start + i as u32 * 15, key, 0.45))
        })
        .collect();
    song.push(NoteEvent::end(3_000));

    let config = SynthConfig::seeded(1888);
    let mut scheduler = Scheduler::new(&config, Tempo::default())?;
    let mut sink = WavSink::create("strum.wav", config.sample_rate)?;
    let summary = scheduler.render(&mut song, &mut sink)?;

    println!(
        "Rendered {} samples ({} notes, peak {} voices)",
        summary.samples_written, summary.events_played, summary.peak_active_voices
    );

    let (samples, rate) = read_pcm16("strum.wav")?;
    println!("Peak level: {:.3}", peak_level(&samples));
    if let Some(hz) = dominant_frequency(&samples, rate) {
        println!("Dominant frequency: {hz:.1} Hz");
    }
    Ok(())
}
