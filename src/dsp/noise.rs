use rand::{rngs::SmallRng, Rng, SeedableRng};

/// White noise in `[-0.5, 0.5]`, the excitation for a pluck.
///
/// A fixed seed makes every pluck, and therefore a whole render,
/// reproducible sample for sample.
pub struct NoiseSource {
    rng: SmallRng,
}

impl NoiseSource {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        self.rng.random_range(-0.5..=0.5)
    }
}
