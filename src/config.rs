//! Engine configuration.
//!
//! Everything the core needs at startup lives in [`SynthConfig`]. With the
//! `serde` feature the config can be read from TOML; missing keys fall back
//! to the defaults, so a file only has to name what it changes:
//!
//! ```toml
//! damping = 0.498
//! seed = 7
//!
//! [retirement]
//! policy = "budget"
//! cycles = 350
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{EngineError, MAX_POLYPHONY, PITCH_COUNT, SAMPLE_RATE};

/// Two-tap damping. At 0.496 a mid-range note at half volume falls below
/// the default cutoff within about a second.
pub const DEFAULT_DAMPING: f32 = 0.496;
/// Per-cycle peak below which a string counts as inaudible.
pub const DEFAULT_CUTOFF: f32 = 0.005;
/// Decay cycles granted to a string under the budgeted policy.
pub const DEFAULT_CYCLE_BUDGET: u32 = 350;
/// Float-to-PCM scale (one below `i16::MAX` for headroom).
pub const DEFAULT_OUTPUT_GAIN: f32 = 32_766.0;

/// How the pool decides a plucked string has gone silent.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "policy", rename_all = "snake_case"))]
pub enum Retirement {
    /// Retire when the peak of the last full cycle drops below `cutoff`.
    Threshold { cutoff: f32 },
    /// Retire after `cycles` trips around the delay line, whatever the level.
    Budget { cycles: u32 },
}

impl Retirement {
    /// Budgeted retirement with the reference cycle count.
    pub fn budget() -> Self {
        Retirement::Budget {
            cycles: DEFAULT_CYCLE_BUDGET,
        }
    }
}

impl Default for Retirement {
    fn default() -> Self {
        Retirement::Threshold {
            cutoff: DEFAULT_CUTOFF,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct SynthConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Pitches `0..pitch_count` get a voice slot
    pub pitch_count: usize,
    /// Maximum simultaneously ringing strings
    pub max_polyphony: usize,
    /// Two-tap averaging coefficient
    pub damping: f32,
    pub retirement: Retirement,
    pub output_gain: f32,
    /// Samples the scheduler buffers before handing them to the sink
    pub flush_samples: usize,
    /// Excitation noise seed; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            pitch_count: PITCH_COUNT,
            max_polyphony: MAX_POLYPHONY,
            damping: DEFAULT_DAMPING,
            retirement: Retirement::default(),
            output_gain: DEFAULT_OUTPUT_GAIN,
            flush_samples: SAMPLE_RATE as usize,
            seed: None,
        }
    }
}

impl SynthConfig {
    /// Same defaults with a fixed noise seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |msg: String| Err(EngineError::InvalidConfig(msg));

        if self.sample_rate < 1_000 {
            return invalid(format!(
                "sample_rate {} leaves no samples in a millisecond",
                self.sample_rate
            ));
        }
        if self.pitch_count == 0 || self.pitch_count > 128 {
            return invalid(format!("pitch_count {} must be in 1..=128", self.pitch_count));
        }
        if self.max_polyphony == 0 || self.max_polyphony > self.pitch_count {
            return invalid(format!(
                "max_polyphony {} must be in 1..={}",
                self.max_polyphony, self.pitch_count
            ));
        }
        if !(self.damping > 0.0 && self.damping <= 0.5) {
            return invalid(format!("damping {} must be in (0, 0.5]", self.damping));
        }
        match self.retirement {
            Retirement::Threshold { cutoff } if !(cutoff > 0.0) => {
                return invalid(format!("cutoff {cutoff} must be positive"));
            }
            Retirement::Budget { cycles: 0 } => {
                return invalid("cycle budget must be at least 1".to_string());
            }
            _ => {}
        }
        if !(self.output_gain > 0.0) {
            return invalid(format!("output_gain {} must be positive", self.output_gain));
        }
        if self.flush_samples == 0 {
            return invalid("flush_samples must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl SynthConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, EngineError> {
        let config: SynthConfig =
            toml::from_str(text).map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SynthConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.retirement, Retirement::Threshold { cutoff: 0.005 });

        let budgeted = SynthConfig {
            retirement: Retirement::budget(),
            ..Default::default()
        };
        assert!(budgeted.validate().is_ok());
        assert_eq!(budgeted.retirement, Retirement::Budget { cycles: 350 });
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cases = [
            SynthConfig {
                sample_rate: 999,
                ..Default::default()
            },
            SynthConfig {
                pitch_count: 0,
                ..Default::default()
            },
            SynthConfig {
                max_polyphony: 121,
                ..Default::default()
            },
            SynthConfig {
                damping: 0.51,
                ..Default::default()
            },
            SynthConfig {
                retirement: Retirement::Budget { cycles: 0 },
                ..Default::default()
            },
            SynthConfig {
                retirement: Retirement::Threshold { cutoff: 0.0 },
                ..Default::default()
            },
            SynthConfig {
                flush_samples: 0,
                ..Default::default()
            },
        ];

        for config in cases {
            assert!(
                matches!(config.validate(), Err(EngineError::InvalidConfig(_))),
                "expected {config:?} to be rejected"
            );
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SynthConfig::from_toml_str(
            r#"
damping = 0.498
seed = 7

[retirement]
policy = "budget"
cycles = 200
"#,
        )
        .unwrap();

        assert_eq!(config.damping, 0.498);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.retirement, Retirement::Budget { cycles: 200 });
        assert_eq!(config.pitch_count, PITCH_COUNT);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn toml_values_are_validated() {
        let err = SynthConfig::from_toml_str("damping = 0.9").unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));

        let err = SynthConfig::from_toml_str("bogus = 1").unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }
}
