//! Output of a single reduction.

use std::fmt;
use std::time::Duration;

/// Divisor applied to the sum of squared deviations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarianceDivisor {
    /// `N`: population variance.
    Population,
    /// `N - 1`: sample variance (Bessel's correction).
    Sample,
}

impl VarianceDivisor {
    /// Divisor for a sample of `len` values. Callers guarantee `len >= 2`
    /// for [`VarianceDivisor::Sample`].
    #[inline]
    pub fn divisor(self, len: usize) -> f64 {
        match self {
            VarianceDivisor::Population => len as f64,
            VarianceDivisor::Sample => (len - 1) as f64,
        }
    }
}

impl fmt::Display for VarianceDivisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarianceDivisor::Population => write!(f, "N"),
            VarianceDivisor::Sample => write!(f, "N-1"),
        }
    }
}

/// Mean, standard deviation and the time taken to compute them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReductionResult {
    pub mean: f64,
    pub stdev: f64,
    pub elapsed: Duration,
    pub divisor: VarianceDivisor,
}

impl ReductionResult {
    #[inline]
    pub fn elapsed_micros(&self) -> u64 {
        self.elapsed.as_micros() as u64
    }
}

/// Ratio `serial / parallel` of elapsed times. `None` if the parallel run
/// took no measurable time.
pub fn speed_up(serial: &ReductionResult, parallel: &ReductionResult) -> Option<f64> {
    let parallel_secs = parallel.elapsed.as_secs_f64();
    if parallel_secs > 0.0 {
        Some(serial.elapsed.as_secs_f64() / parallel_secs)
    } else {
        None
    }
}
