//! WAV container output (16-bit PCM, mono) and the matching reader used by
//! the analysis tools.

use std::fs::File;
use std::io::{self, BufWriter, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::{debug, warn};

use crate::{io::sink::SampleSink, EngineError};

/// Header description for the engine's output format.
pub fn pcm16_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Writes a RIFF/WAVE file. The header sizes are patched when the sink is
/// finished, so the output must be seekable.
pub struct WavSink<W: Write + Seek> {
    writer: Option<WavWriter<W>>,
    expected: Option<u64>,
    written: u64,
}

impl WavSink<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>, sample_rate: u32) -> Result<Self, EngineError> {
        let writer =
            WavWriter::create(path, pcm16_spec(sample_rate)).map_err(EngineError::sink)?;
        Ok(Self::from_writer(writer))
    }
}

impl<W: Write + Seek> WavSink<W> {
    pub fn new(inner: W, sample_rate: u32) -> Result<Self, EngineError> {
        let writer = WavWriter::new(inner, pcm16_spec(sample_rate)).map_err(EngineError::sink)?;
        Ok(Self::from_writer(writer))
    }

    fn from_writer(writer: WavWriter<W>) -> Self {
        Self {
            writer: Some(writer),
            expected: None,
            written: 0,
        }
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}

impl<W: Write + Seek> SampleSink for WavSink<W> {
    fn begin(&mut self, expected_samples: u64) -> Result<(), EngineError> {
        self.expected = Some(expected_samples);
        Ok(())
    }

    fn write_block(&mut self, samples: &[i16]) -> Result<(), EngineError> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            EngineError::sink(io::Error::other("WAV sink already finished"))
        })?;
        for &sample in samples {
            writer.write_sample(sample).map_err(EngineError::sink)?;
        }
        self.written += samples.len() as u64;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), EngineError> {
        if let Some(writer) = self.writer.take() {
            writer.finalize().map_err(EngineError::sink)?;
            debug!(samples = self.written, "WAV finalized");
        }
        if let Some(expected) = self.expected.filter(|&n| n != self.written) {
            warn!(expected, written = self.written, "sample count differs from header estimate");
        }
        Ok(())
    }
}

/// Mono 16-bit samples and sample rate of a WAV file. Multi-channel files
/// yield their first channel.
pub fn read_pcm16(path: impl AsRef<Path>) -> Result<(Vec<i16>, u32), EngineError> {
    let reader = WavReader::open(path).map_err(read_error)?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(EngineError::Source(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "expected 16-bit integer PCM, found {}-bit {:?}",
                spec.bits_per_sample, spec.sample_format
            ),
        )));
    }

    let channels = spec.channels.max(1) as usize;
    let samples = reader
        .into_samples::<i16>()
        .step_by(channels)
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_error)?;
    Ok((samples, spec.sample_rate))
}

fn read_error(err: hound::Error) -> EngineError {
    match err {
        hound::Error::IoError(e) => EngineError::Source(e),
        other => EngineError::Source(io::Error::new(io::ErrorKind::InvalidData, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn header_matches_engine_format() {
        let mut sink = WavSink::new(Cursor::new(Vec::new()), 44_100).unwrap();
        sink.begin(4).unwrap();
        sink.write_block(&[0, 1000, -1000, i16::MIN]).unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.written(), 4);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let mut sink = WavSink::create(&path, 22_050).unwrap();
        sink.begin(3).unwrap();
        sink.write_block(&[7, -7, 32_000]).unwrap();
        sink.finish().unwrap();

        let (samples, rate) = read_pcm16(&path).unwrap();
        assert_eq!(rate, 22_050);
        assert_eq!(samples, vec![7, -7, 32_000]);

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
    }

    #[test]
    fn writing_after_finish_fails() {
        let mut sink = WavSink::new(Cursor::new(Vec::new()), 44_100).unwrap();
        sink.finish().unwrap();
        assert!(matches!(sink.write_block(&[1]), Err(EngineError::Sink(_))));
    }
}
