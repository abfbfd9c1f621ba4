//! Benchmark input: an immutable sequence of f32 values and its generator.

use std::ops::Deref;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::SampleConfig;
use crate::error::{Error, Result};

/// Values a reduction runs over. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    values: Vec<f32>,
}

impl Sample {
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<f32>> for Sample {
    fn from(values: Vec<f32>) -> Self {
        Self { values }
    }
}

impl Deref for Sample {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.values
    }
}

/// Pseudo-random sample generator.
///
/// Every call reseeds, so two calls with the same seed produce the same
/// values. Passing [`ArraySource::clock_seed`] gives a fresh sample per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArraySource;

impl ArraySource {
    /// Fills `buf` with values drawn uniformly from `[0, max_value)`.
    pub fn fill(buf: &mut [f32], max_value: f32, seed: u64) -> Result<()> {
        if !max_value.is_finite() || max_value <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "max_value must be finite and positive, got {max_value}"
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for v in buf.iter_mut() {
            *v = rng.random_range(0.0..max_value);
        }
        Ok(())
    }

    pub fn generate(len: usize, max_value: f32, seed: u64) -> Result<Sample> {
        let mut values = vec![0.0f32; len];
        Self::fill(&mut values, max_value, seed)?;
        Ok(Sample::from(values))
    }

    /// Generates a sample as described by `config`, returning the seed used.
    pub fn from_config(config: &SampleConfig) -> Result<(Sample, u64)> {
        let seed = config.seed.unwrap_or_else(Self::clock_seed);
        let sample = Self::generate(config.len, config.max_value, seed)?;
        Ok((sample, seed))
    }

    /// Seed derived from the wall clock.
    pub fn clock_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default()
    }
}
