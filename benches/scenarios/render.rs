//! Benchmarks for complete song renders through the scheduler.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput};
use pluckline::{io::Song, NoteEvent, Scheduler, SynthConfig, Tempo};

/// Broken chords every quarter second, `seconds` long.
fn arpeggio_song(seconds: u32) -> Song {
    let chord: [i16; 4] = [48, 55, 60, 64];
    let mut song: Song = (0..seconds * 4)
        .flat_map(|beat| {
            let onset = beat * 250;
            let shift = (beat % 3) as i16;
            chord
                .iter()
                .enumerate()
                .map(move |(i, &key)| NoteEvent::pluck(onset + i as u32 * 20, key + shift, 0.6))
        })
        .collect();
    song.push(NoteEvent::end(seconds * 1_000));
    song
}

pub fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/render");
    let config = SynthConfig::seeded(3);

    for &seconds in &[1u32, 5] {
        let song = arpeggio_song(seconds);
        group.throughput(Throughput::Elements(seconds as u64 * 44_100));

        for &tempo in &[1.0f32, 2.0] {
            group.bench_with_input(
                BenchmarkId::new(format!("arpeggio_tempo_{tempo}"), seconds),
                &seconds,
                |b, _| {
                    b.iter(|| {
                        let mut song = song.clone();
                        let mut out: Vec<i16> = Vec::new();
                        let tempo = Tempo::new(tempo).expect("tempo in range");
                        let mut scheduler =
                            Scheduler::new(&config, tempo).expect("default config is valid");
                        let summary = scheduler
                            .render(&mut song, &mut out)
                            .expect("song is well formed");
                        black_box(summary)
                    })
                },
            );
        }
    }

    group.finish();
}
