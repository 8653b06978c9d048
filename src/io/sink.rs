use std::io::{BufWriter, Write};

use crate::EngineError;

/// Destination for rendered 16-bit samples.
///
/// The scheduler calls `begin` once with the number of samples it will
/// produce, then `write_block` any number of times, then `finish`.
pub trait SampleSink {
    fn begin(&mut self, _expected_samples: u64) -> Result<(), EngineError> {
        Ok(())
    }

    fn write_block(&mut self, samples: &[i16]) -> Result<(), EngineError>;

    fn finish(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Collect everything in memory.
impl SampleSink for Vec<i16> {
    fn begin(&mut self, expected_samples: u64) -> Result<(), EngineError> {
        self.reserve(expected_samples as usize);
        Ok(())
    }

    fn write_block(&mut self, samples: &[i16]) -> Result<(), EngineError> {
        self.extend_from_slice(samples);
        Ok(())
    }
}

impl<K: SampleSink + ?Sized> SampleSink for &mut K {
    fn begin(&mut self, expected_samples: u64) -> Result<(), EngineError> {
        (**self).begin(expected_samples)
    }

    fn write_block(&mut self, samples: &[i16]) -> Result<(), EngineError> {
        (**self).write_block(samples)
    }

    fn finish(&mut self) -> Result<(), EngineError> {
        (**self).finish()
    }
}

/// Headerless little-endian PCM, e.g. for piping into `aplay -f S16_LE`.
pub struct RawPcmSink<W: Write> {
    writer: BufWriter<W>,
    written: u64,
}

impl<W: Write> RawPcmSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::new(inner),
            written: 0,
        }
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}

impl<W: Write> SampleSink for RawPcmSink<W> {
    fn write_block(&mut self, samples: &[i16]) -> Result<(), EngineError> {
        for sample in samples {
            self.writer
                .write_all(&sample.to_le_bytes())
                .map_err(EngineError::sink)?;
        }
        self.written += samples.len() as u64;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), EngineError> {
        self.writer.flush().map_err(EngineError::sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_pcm_is_little_endian() {
        let mut bytes = Vec::new();
        {
            let mut sink = RawPcmSink::new(&mut bytes);
            sink.begin(3).unwrap();
            sink.write_block(&[1, -2]).unwrap();
            sink.write_block(&[i16::MAX]).unwrap();
            sink.finish().unwrap();
            assert_eq!(sink.written(), 3);
        }
        assert_eq!(bytes, vec![0x01, 0x00, 0xFE, 0xFF, 0xFF, 0x7F]);
    }

    #[test]
    fn vec_sink_appends() {
        let mut out: Vec<i16> = Vec::new();
        out.write_block(&[1, 2]).unwrap();
        out.write_block(&[3]).unwrap();
        assert_eq!(out, vec![1, 2, 3]);
    }
}
