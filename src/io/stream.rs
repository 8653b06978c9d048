//! Bounded hand-off from the render thread to a playback thread.
//!
//! The scheduler stays the only thing that touches voice state; it writes
//! finished samples into a lock-free SPSC ring and the audio callback drains
//! it. When the ring is full the render side waits, so rendering runs at
//! most `capacity` samples ahead of playback.

use std::{io, thread, time::Duration};

use rtrb::{Consumer, Producer, RingBuffer};

use crate::{io::sink::SampleSink, EngineError};

/// How long the producer backs off when the ring is full.
const BACKOFF: Duration = Duration::from_millis(1);

pub struct StreamSink {
    producer: Producer<i16>,
    written: u64,
}

impl StreamSink {
    /// Sink plus the reader to hand to the playback thread.
    pub fn channel(capacity: usize) -> (Self, StreamReader) {
        let (producer, consumer) = RingBuffer::new(capacity.max(1));
        (
            Self {
                producer,
                written: 0,
            },
            StreamReader { consumer },
        )
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}

impl SampleSink for StreamSink {
    fn write_block(&mut self, samples: &[i16]) -> Result<(), EngineError> {
        for &sample in samples {
            while self.producer.push(sample).is_err() {
                if self.producer.is_abandoned() {
                    return Err(EngineError::sink(io::Error::new(
                        io::ErrorKind::BrokenPipe,
                        "playback stopped reading",
                    )));
                }
                thread::sleep(BACKOFF);
            }
        }
        self.written += samples.len() as u64;
        Ok(())
    }
}

/// Playback end of a [`StreamSink`]. Realtime-safe: never blocks or
/// allocates.
pub struct StreamReader {
    consumer: Consumer<i16>,
}

impl StreamReader {
    /// Fill `out` with samples scaled to `[-1, 1)`. Returns `n` such that
    /// `out[..n]` holds real samples in order and `out[n..]` is silence.
    pub fn fill(&mut self, out: &mut [f32]) -> usize {
        let mut copied = 0;
        for slot in out.iter_mut() {
            match self.consumer.pop() {
                Ok(sample) => {
                    *slot = sample as f32 / 32_768.0;
                    copied += 1;
                }
                // Stop at the first underrun so a late push cannot land
                // behind a gap.
                Err(_) => break,
            }
        }
        out[copied..].fill(0.0);
        copied
    }

    /// The render side is gone and everything it wrote has been read.
    pub fn is_finished(&self) -> bool {
        self.consumer.is_abandoned() && self.consumer.is_empty()
    }
}
