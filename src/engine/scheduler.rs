use tracing::{debug, trace, warn};

use crate::{
    config::SynthConfig,
    engine::{
        allocator::VoiceAllocator,
        tempo::{samples_before_ms, Tempo},
    },
    io::{sink::SampleSink, source::EventSource},
    synth::{
        message::{NoteEvent, Pitch},
        poly::VoicePool,
    },
    EngineError,
};

/*
Mixing Scheduler
================

Drives the whole render: reads note events in time order, plucks strings
when their time comes, and mixes every ringing string into one 16-bit
stream, one millisecond at a time.

Vocabulary
----------

  tick        One output sample. `tick` counts samples since the start.

  block       One millisecond of ticks. Millisecond m covers ticks
              [m·rate/1000, (m+1)·rate/1000), so blocks are 44 or 45 samples
              at 44.1 kHz and never drift.

  pending     The next event not yet dispatched, with its onset already
              scaled by tempo.

Events only take effect on block boundaries: a note at 12.7 ms of playback
time sounds from the start of millisecond 12.


The State Machine
-----------------

    ┌──────┐  pre-pass   ┌─────────┐  end-of-song  ┌──────────┐  flush  ┌──────┐
    │ Idle │ ──────────→ │ Running │ ────────────→ │ Draining │ ──────→ │ Done │
    └──────┘             └─────────┘               └──────────┘         └──────┘
                          │       ↑
                          └───────┘
               dispatch due event / render one block

  Idle      Nothing consumed. The pre-pass reads the whole source once to
            find the end-of-song time and check ordering, tells the sink how
            many samples are coming, then rewinds the source.

  Running   Each step either dispatches the pending event (if it is due) or
            renders one block. Several events at the same time are all
            dispatched before the next block.

  Draining  Hand the last buffered samples to the sink and finish it.

  Done      Terminal.


Per Tick
--------

    sum    = Σ voice.next_sample()   over the active set
    sample = clamp(sum · gain, i16)  truncated toward zero

Voices that retire during a tick leave the active set immediately.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Draining,
    Done,
}

/// What a finished (or in-progress) render did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// End-of-song time after tempo scaling
    pub end_ms: u64,
    /// Sample count announced to the sink
    pub expected_samples: u64,
    pub samples_written: u64,
    pub events_played: usize,
    /// Events dropped for an unsupported pitch or a full pool
    pub events_skipped: usize,
    /// Events found after the end-of-song marker
    pub events_ignored: usize,
    pub peak_active_voices: usize,
}

/// Convert a mixed sample to PCM.
#[inline]
pub fn to_pcm(sample: f32, gain: f32) -> i16 {
    (sample * gain).clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Result of the lookahead pass.
struct SongScan {
    end_ms: u32,
    trailing: usize,
}

/// Read the whole source once: check ordering and find the end marker.
fn scan_song<S: EventSource + ?Sized>(source: &mut S) -> Result<SongScan, EngineError> {
    source.rewind()?;

    let mut previous_ms = 0;
    let mut index = 0;
    let end_ms = loop {
        let event = source.next_event()?.ok_or(EngineError::MissingEndOfSong)?;
        if event.onset_ms < previous_ms {
            return Err(EngineError::OutOfOrderEvent {
                index,
                onset_ms: event.onset_ms,
                previous_ms,
            });
        }
        if event.is_end() {
            break event.onset_ms;
        }
        previous_ms = event.onset_ms;
        index += 1;
    };

    let mut trailing = 0;
    while source.next_event()?.is_some() {
        trailing += 1;
    }

    source.rewind()?;
    Ok(SongScan { end_ms, trailing })
}

pub struct Scheduler<A: VoiceAllocator = VoicePool> {
    voices: A,
    tempo: Tempo,
    sample_rate: u32,
    output_gain: f32,
    state: SchedulerState,
    /// Playback time of the next block to render
    current_ms: u64,
    /// Index of the next sample to render
    tick: u64,
    pending: Option<(u64, NoteEvent)>,
    /// Index of the pending event in the source, for error reports
    pending_index: usize,
    /// Unscaled onset of the last event read during playback
    last_onset_ms: u32,
    out: Vec<i16>,
    flush_samples: usize,
    summary: RenderSummary,
}

impl Scheduler<VoicePool> {
    /// Scheduler with a fresh voice pool built from `config`.
    pub fn new(config: &SynthConfig, tempo: Tempo) -> Result<Self, EngineError> {
        let pool = VoicePool::new(config)?;
        Ok(Self::with_allocator(pool, config, tempo))
    }
}

impl<A: VoiceAllocator> Scheduler<A> {
    pub fn with_allocator(voices: A, config: &SynthConfig, tempo: Tempo) -> Self {
        Self {
            voices,
            tempo,
            sample_rate: config.sample_rate,
            output_gain: config.output_gain,
            state: SchedulerState::Idle,
            current_ms: 0,
            tick: 0,
            pending: None,
            pending_index: 0,
            last_onset_ms: 0,
            out: Vec::with_capacity(config.flush_samples),
            flush_samples: config.flush_samples,
            summary: RenderSummary::default(),
        }
    }

    /// Run from the current state to `Done`.
    pub fn render<S, K>(
        &mut self,
        source: &mut S,
        sink: &mut K,
    ) -> Result<RenderSummary, EngineError>
    where
        S: EventSource + ?Sized,
        K: SampleSink + ?Sized,
    {
        while self.step(source, sink)? != SchedulerState::Done {}
        Ok(self.summary.clone())
    }

    /// Advance by one unit of work: the pre-pass, one event, one block, or
    /// the final flush. Returns the state afterwards.
    pub fn step<S, K>(
        &mut self,
        source: &mut S,
        sink: &mut K,
    ) -> Result<SchedulerState, EngineError>
    where
        S: EventSource + ?Sized,
        K: SampleSink + ?Sized,
    {
        match self.state {
            SchedulerState::Idle => self.prepare(source, sink)?,
            SchedulerState::Running => self.advance(source, sink)?,
            SchedulerState::Draining => self.drain(sink)?,
            SchedulerState::Done => {}
        }
        Ok(self.state)
    }

    fn prepare<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<(), EngineError>
    where
        S: EventSource + ?Sized,
        K: SampleSink + ?Sized,
    {
        let scan = scan_song(source)?;
        if scan.trailing > 0 {
            warn!(count = scan.trailing, "ignoring events after the end of the song");
        }

        self.summary.end_ms = self.tempo.scale_ms(scan.end_ms);
        self.summary.expected_samples = samples_before_ms(self.summary.end_ms, self.sample_rate);
        self.summary.events_ignored = scan.trailing;
        debug!(
            end_ms = self.summary.end_ms,
            expected_samples = self.summary.expected_samples,
            tempo = self.tempo.value(),
            "song scanned"
        );

        sink.begin(self.summary.expected_samples)?;
        self.load_next(source)?;
        self.state = SchedulerState::Running;
        Ok(())
    }

    fn advance<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<(), EngineError>
    where
        S: EventSource + ?Sized,
        K: SampleSink + ?Sized,
    {
        match self.pending {
            Some((onset_ms, event)) if onset_ms <= self.current_ms => {
                self.dispatch(event)?;
                if self.state == SchedulerState::Running {
                    self.load_next(source)?;
                }
            }
            Some(_) => self.render_block(sink)?,
            // The source changed between the pre-pass and playback.
            None => return Err(EngineError::MissingEndOfSong),
        }
        Ok(())
    }

    /// Read the next event of the replay into `pending`.
    fn load_next<S: EventSource + ?Sized>(&mut self, source: &mut S) -> Result<(), EngineError> {
        self.pending = match source.next_event()? {
            Some(event) => {
                if event.onset_ms < self.last_onset_ms {
                    return Err(EngineError::OutOfOrderEvent {
                        index: self.pending_index,
                        onset_ms: event.onset_ms,
                        previous_ms: self.last_onset_ms,
                    });
                }
                self.last_onset_ms = event.onset_ms;
                self.pending_index += 1;
                Some((self.tempo.scale_ms(event.onset_ms), event))
            }
            None => None,
        };
        Ok(())
    }

    fn dispatch(&mut self, event: NoteEvent) -> Result<(), EngineError> {
        let key = match event.pitch {
            Pitch::EndOfSong => {
                debug!(ms = self.current_ms, tick = self.tick, "end of song");
                self.pending = None;
                self.state = SchedulerState::Draining;
                return Ok(());
            }
            Pitch::Key(key) => key,
        };

        let volume = event.clamped_volume();
        if volume != event.volume {
            warn!(key, volume = event.volume, "volume clamped into 0..=1");
        }

        match self.voices.excite(key, volume, self.tick) {
            Ok(excitation) => {
                trace!(key, volume, ms = self.current_ms, ?excitation, "pluck");
                self.summary.events_played += 1;
                self.summary.peak_active_voices =
                    self.summary.peak_active_voices.max(self.voices.active_count());
                Ok(())
            }
            Err(err) if err.is_recoverable() => {
                warn!(onset_ms = event.onset_ms, %err, "skipping note");
                self.summary.events_skipped += 1;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Mix one millisecond of audio.
    fn render_block<K: SampleSink + ?Sized>(&mut self, sink: &mut K) -> Result<(), EngineError> {
        let end_tick = samples_before_ms(self.current_ms + 1, self.sample_rate);
        while self.tick < end_tick {
            let mixed = self.voices.mix_tick(self.tick);
            self.out.push(to_pcm(mixed, self.output_gain));
            self.tick += 1;

            if self.out.len() >= self.flush_samples {
                self.flush(sink)?;
            }
        }
        self.current_ms += 1;
        Ok(())
    }

    fn flush<K: SampleSink + ?Sized>(&mut self, sink: &mut K) -> Result<(), EngineError> {
        if self.out.is_empty() {
            return Ok(());
        }
        sink.write_block(&self.out)?;
        self.summary.samples_written += self.out.len() as u64;
        self.out.clear();
        Ok(())
    }

    fn drain<K: SampleSink + ?Sized>(&mut self, sink: &mut K) -> Result<(), EngineError> {
        self.flush(sink)?;
        sink.finish()?;
        debug!(
            samples = self.summary.samples_written,
            played = self.summary.events_played,
            skipped = self.summary.events_skipped,
            "render finished"
        );
        self.state = SchedulerState::Done;
        Ok(())
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Playback time of the next block, in milliseconds.
    pub fn current_ms(&self) -> u64 {
        self.current_ms
    }

    /// Samples rendered so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn voices(&self) -> &A {
        &self.voices
    }

    pub fn summary(&self) -> &RenderSummary {
        &self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{io::source::Song, synth::poly::Excitation};

    /// Allocator that records plucks and plays a constant level per voice.
    #[derive(Default)]
    struct Recorder {
        plucks: Vec<(i16, f32, u64)>,
        level: f32,
    }

    impl VoiceAllocator for Recorder {
        fn excite(&mut self, key: i16, volume: f32, tick: u64) -> Result<Excitation, EngineError> {
            if key < 0 {
                return Err(EngineError::UnsupportedPitch(key));
            }
            self.plucks.push((key, volume, tick));
            Ok(Excitation::Started)
        }

        fn mix_tick(&mut self, _tick: u64) -> f32 {
            self.level * self.plucks.len() as f32
        }

        fn active_count(&self) -> usize {
            self.plucks.len()
        }
    }

    fn recorder_scheduler(tempo: f32) -> Scheduler<Recorder> {
        Scheduler::with_allocator(
            Recorder::default(),
            &SynthConfig::default(),
            Tempo::new(tempo).unwrap(),
        )
    }

    #[test]
    fn pcm_conversion_clamps_instead_of_wrapping() {
        assert_eq!(to_pcm(0.5, 32_766.0), 16_383);
        assert_eq!(to_pcm(-0.5, 32_766.0), -16_383);
        assert_eq!(to_pcm(3.0, 32_766.0), i16::MAX);
        assert_eq!(to_pcm(-3.0, 32_766.0), i16::MIN);
        assert_eq!(to_pcm(f32::NAN, 32_766.0), 0);
    }

    #[test]
    fn walks_through_every_state() {
        let mut scheduler = recorder_scheduler(1.0);
        let mut song = Song::new(vec![NoteEvent::pluck(0, 60, 1.0), NoteEvent::end(2)]);
        let mut out: Vec<i16> = Vec::new();

        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(scheduler.step(&mut song, &mut out).unwrap(), SchedulerState::Running);
        assert!(out.capacity() >= 88);

        // pluck, block 0, block 1
        for _ in 0..3 {
            assert_eq!(scheduler.step(&mut song, &mut out).unwrap(), SchedulerState::Running);
        }
        assert_eq!(scheduler.current_ms(), 2);
        assert_eq!(scheduler.tick(), 88);

        // end marker
        assert_eq!(scheduler.step(&mut song, &mut out).unwrap(), SchedulerState::Draining);
        assert!(out.is_empty());
        assert_eq!(scheduler.step(&mut song, &mut out).unwrap(), SchedulerState::Done);
        assert_eq!(scheduler.step(&mut song, &mut out).unwrap(), SchedulerState::Done);
        assert_eq!(out.len(), 88);
    }

    #[test]
    fn events_fire_on_block_boundaries() {
        let mut scheduler = recorder_scheduler(1.0);
        let mut song = Song::new(vec![
            NoteEvent::pluck(0, 60, 1.0),
            NoteEvent::pluck(0, 64, 1.0),
            NoteEvent::pluck(3, 67, 1.0),
            NoteEvent::end(5),
        ]);
        let mut out: Vec<i16> = Vec::new();
        let summary = scheduler.render(&mut song, &mut out).unwrap();

        let ticks: Vec<u64> = scheduler.voices().plucks.iter().map(|p| p.2).collect();
        assert_eq!(ticks, vec![0, 0, samples_before_ms(3, 44_100)]);
        assert_eq!(summary.events_played, 3);
        assert_eq!(summary.samples_written, samples_before_ms(5, 44_100));
        assert_eq!(out.len() as u64, summary.expected_samples);
    }

    #[test]
    fn tempo_scales_onsets_and_length() {
        let mut scheduler = recorder_scheduler(2.0);
        let mut song = Song::new(vec![NoteEvent::pluck(100, 60, 1.0), NoteEvent::end(1_000)]);
        let mut out: Vec<i16> = Vec::new();
        let summary = scheduler.render(&mut song, &mut out).unwrap();

        assert_eq!(summary.end_ms, 500);
        assert_eq!(out.len(), 22_050);
        assert_eq!(scheduler.voices().plucks[0].2, samples_before_ms(50, 44_100));
    }

    #[test]
    fn skips_unsupported_notes_and_keeps_going() {
        let mut scheduler = recorder_scheduler(1.0);
        let mut song = Song::new(vec![
            NoteEvent::pluck(0, -4, 1.0),
            NoteEvent::pluck(1, 60, 1.7),
            NoteEvent::end(2),
        ]);
        let mut out: Vec<i16> = Vec::new();
        let summary = scheduler.render(&mut song, &mut out).unwrap();

        assert_eq!(summary.events_skipped, 1);
        assert_eq!(summary.events_played, 1);
        assert_eq!(scheduler.voices().plucks, vec![(60, 1.0, 44)]);
    }

    #[test]
    fn ignores_events_after_the_end() {
        let mut scheduler = recorder_scheduler(1.0);
        let mut song = Song::new(vec![
            NoteEvent::end(1),
            NoteEvent::pluck(0, 60, 1.0),
            NoteEvent::pluck(5, 61, 1.0),
        ]);
        let mut out: Vec<i16> = Vec::new();
        let summary = scheduler.render(&mut song, &mut out).unwrap();

        assert_eq!(summary.events_ignored, 2);
        assert!(scheduler.voices().plucks.is_empty());
        assert_eq!(out.len(), 44);
    }

    #[test]
    fn rejects_malformed_songs_before_output() {
        let mut out: Vec<i16> = Vec::new();

        let mut unordered = Song::new(vec![
            NoteEvent::pluck(10, 60, 1.0),
            NoteEvent::pluck(5, 62, 1.0),
            NoteEvent::end(20),
        ]);
        let err = recorder_scheduler(1.0)
            .render(&mut unordered, &mut out)
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::OutOfOrderEvent {
                index: 1,
                onset_ms: 5,
                previous_ms: 10
            }
        ));

        let mut endless = Song::new(vec![NoteEvent::pluck(0, 60, 1.0)]);
        let err = recorder_scheduler(1.0)
            .render(&mut endless, &mut out)
            .unwrap_err();
        assert!(matches!(err, EngineError::MissingEndOfSong));
        assert!(out.is_empty());
    }

    #[test]
    fn flushes_in_configured_chunks() {
        struct Chunks(Vec<usize>, bool);
        impl SampleSink for Chunks {
            fn write_block(&mut self, samples: &[i16]) -> Result<(), EngineError> {
                self.0.push(samples.len());
                Ok(())
            }
            fn finish(&mut self) -> Result<(), EngineError> {
                self.1 = true;
                Ok(())
            }
        }

        let config = SynthConfig {
            flush_samples: 100,
            ..Default::default()
        };
        let mut scheduler =
            Scheduler::with_allocator(Recorder::default(), &config, Tempo::default());
        let mut song = Song::new(vec![NoteEvent::end(10)]);
        let mut sink = Chunks(Vec::new(), false);
        scheduler.render(&mut song, &mut sink).unwrap();

        assert_eq!(sink.0, vec![100, 100, 100, 100, 41]);
        assert!(sink.1);
    }

    #[test]
    fn output_follows_the_mix() {
        let mut scheduler = Scheduler::with_allocator(
            Recorder {
                level: 0.25,
                ..Default::default()
            },
            &SynthConfig::default(),
            Tempo::default(),
        );
        let mut song = Song::new(vec![
            NoteEvent::pluck(1, 60, 1.0),
            NoteEvent::pluck(2, 61, 1.0),
            NoteEvent::end(3),
        ]);
        let mut out: Vec<i16> = Vec::new();
        scheduler.render(&mut song, &mut out).unwrap();

        assert!(out[..44].iter().all(|&s| s == 0));
        assert!(out[44..88].iter().all(|&s| s == 8_191));
        assert!(out[88..].iter().all(|&s| s == 16_383));
    }
}
