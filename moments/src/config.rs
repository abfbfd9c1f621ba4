//! Configuration for reductions and sample generation.

use std::time::Duration;

use crate::error::{Error, Result};

/// Length of the reference benchmark sample.
pub const DEFAULT_SAMPLE_LEN: usize = 1 << 20;

/// Upper bound (exclusive) of generated values.
pub const DEFAULT_MAX_VALUE: f32 = 100.0;

/// Execution parameters shared by all strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReductionConfig {
    /// Number of worker threads for the threaded and data-parallel strategies.
    pub worker_count: usize,
    /// Stride of the serial traversal and lane count of the vector strategy.
    pub lane_width: usize,
    /// How long a worker waits at the phase barrier before giving up.
    pub barrier_timeout: Duration,
}

impl ReductionConfig {
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_lane_width(mut self, lane_width: usize) -> Self {
        self.lane_width = lane_width;
        self
    }

    pub fn with_barrier_timeout(mut self, timeout: Duration) -> Self {
        self.barrier_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(Error::InvalidConfig("worker_count must be positive".into()));
        }
        if self.lane_width == 0 {
            return Err(Error::InvalidConfig("lane_width must be positive".into()));
        }
        if self.barrier_timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "barrier_timeout must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            worker_count: 8,
            lane_width: 4,
            barrier_timeout: Duration::from_secs(30),
        }
    }
}

/// Parameters for generating a benchmark sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub len: usize,
    pub max_value: f32,
    /// Random seed for reproducibility (None for a clock-derived seed).
    pub seed: Option<u64>,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            len: DEFAULT_SAMPLE_LEN,
            max_value: DEFAULT_MAX_VALUE,
            seed: None,
        }
    }
}
