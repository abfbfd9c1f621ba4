use crate::config::ReductionConfig;
use crate::error::Result;
use crate::result::{ReductionResult, VarianceDivisor};
use crate::strategy::{Strategy, ensure_non_empty};
use crate::timer::Stopwatch;

/// Single-threaded baseline.
///
/// Both passes walk the sample `lane_width` times, each time starting at a
/// different phase offset and striding by `lane_width`, so the memory access
/// pattern matches the vector strategy. Phase sums are added together before
/// dividing by `N`.
#[derive(Debug, Clone)]
pub struct SerialStrategy {
    lane_width: usize,
}

impl SerialStrategy {
    pub fn new(config: &ReductionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            lane_width: config.lane_width,
        })
    }

    fn phases(&self, values: &[f32], f: impl Fn(f32) -> f64) -> f64 {
        let mut total = 0.0;
        for phase in 0..self.lane_width {
            let sum: f64 = values
                .iter()
                .skip(phase)
                .step_by(self.lane_width)
                .map(|&v| f(v))
                .sum();
            total += sum;
        }
        total
    }
}

impl Strategy for SerialStrategy {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn compute(&self, sample: &[f32]) -> Result<ReductionResult> {
        ensure_non_empty(sample)?;
        let stopwatch = Stopwatch::start();

        let n = sample.len() as f64;
        let mean = self.phases(sample, |v| v as f64) / n;
        let squared = self.phases(sample, |v| {
            let diff = v as f64 - mean;
            diff * diff
        });
        let stdev = (squared / VarianceDivisor::Population.divisor(sample.len())).sqrt();

        Ok(ReductionResult {
            mean,
            stdev,
            elapsed: stopwatch.elapsed(),
            divisor: VarianceDivisor::Population,
        })
    }
}
