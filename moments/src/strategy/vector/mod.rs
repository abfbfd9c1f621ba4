//! 4-lane vector reduction with horizontal collapse.
//!
//! Each pass loads four consecutive values per step into a 4-wide
//! accumulator. The four lane totals are then collapsed by two rounds of
//! pairwise add-across-lanes. The variance uses the `N - 1` divisor, unlike
//! the other strategies.

pub mod scalar;

#[cfg(target_arch = "aarch64")]
mod neon;

#[cfg(target_arch = "x86_64")]
mod sse;

use crate::config::ReductionConfig;
use crate::error::{Error, Result};
use crate::result::{ReductionResult, VarianceDivisor};
use crate::strategy::{Strategy, ensure_non_empty};
use crate::timer::Stopwatch;

/// Number of f32 lanes in one vector register.
pub const LANE_WIDTH: usize = 4;

/// Sum f32 values using SIMD when available.
///
/// `values.len()` must be a multiple of [`LANE_WIDTH`].
pub fn sum_f32(values: &[f32]) -> f32 {
    debug_assert!(values.len().is_multiple_of(LANE_WIDTH));
    #[cfg(target_arch = "aarch64")]
    {
        if values.len() >= LANE_WIDTH {
            return unsafe { neon::sum_f32(values) };
        }
    }
    #[cfg(target_arch = "x86_64")]
    {
        if values.len() >= LANE_WIDTH && common::cpu_features::has_sse3() {
            return unsafe { sse::sum_f32(values) };
        }
    }
    scalar::sum_f32(values)
}

/// Sum of squared differences from `mean` using SIMD when available.
///
/// `values.len()` must be a multiple of [`LANE_WIDTH`].
pub fn sum_squared_diff(values: &[f32], mean: f32) -> f32 {
    debug_assert!(values.len().is_multiple_of(LANE_WIDTH));
    #[cfg(target_arch = "aarch64")]
    {
        if values.len() >= LANE_WIDTH {
            return unsafe { neon::sum_squared_diff(values, mean) };
        }
    }
    #[cfg(target_arch = "x86_64")]
    {
        if values.len() >= LANE_WIDTH && common::cpu_features::has_sse3() {
            return unsafe { sse::sum_squared_diff(values, mean) };
        }
    }
    scalar::sum_squared_diff(values, mean)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VectorStrategy;

impl VectorStrategy {
    pub const LANE_WIDTH: usize = LANE_WIDTH;

    pub fn new(config: &ReductionConfig) -> Result<Self> {
        config.validate()?;
        if config.lane_width != LANE_WIDTH {
            return Err(Error::InvalidConfig(format!(
                "vector strategy requires lane_width {LANE_WIDTH}, got {}",
                config.lane_width
            )));
        }
        Ok(Self)
    }
}

impl Strategy for VectorStrategy {
    fn name(&self) -> &'static str {
        "simd"
    }

    fn compute(&self, sample: &[f32]) -> Result<ReductionResult> {
        ensure_non_empty(sample)?;
        if !sample.len().is_multiple_of(LANE_WIDTH) {
            return Err(Error::InvalidInputSize {
                len: sample.len(),
                reason: "length must be a multiple of the 4-lane vector width",
            });
        }
        tracing::debug!(
            simd = common::cpu_features::simd_level(),
            len = sample.len(),
            "vector reduction"
        );
        let stopwatch = Stopwatch::start();

        let mean = sum_f32(sample) / sample.len() as f32;
        let squared = sum_squared_diff(sample, mean);
        let variance = squared / VarianceDivisor::Sample.divisor(sample.len()) as f32;
        let stdev = variance.sqrt();

        Ok(ReductionResult {
            mean: mean as f64,
            stdev: stdev as f64,
            elapsed: stopwatch.elapsed(),
            divisor: VarianceDivisor::Sample,
        })
    }
}
