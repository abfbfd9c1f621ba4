//! Data-parallel reduction on a dedicated rayon pool.
//!
//! Two parallel reductions back to back. The mean is computed once on the
//! calling thread between them; joining the first parallel iterator is the
//! barrier. No state is shared between workers: each chunk returns its
//! partial sum and rayon combines them.

use rayon::prelude::*;

use crate::config::ReductionConfig;
use crate::error::{Error, Result};
use crate::result::{ReductionResult, VarianceDivisor};
use crate::strategy::{Strategy, ensure_non_empty};
use crate::timer::Stopwatch;

/// Multiplier for number of chunks relative to pool threads.
/// Using 3x threads provides good load balancing when some chunks finish faster.
const CHUNKS_PER_THREAD: usize = 3;

#[derive(Debug)]
pub struct DataParallelStrategy {
    pool: rayon::ThreadPool,
}

impl DataParallelStrategy {
    pub fn new(config: &ReductionConfig) -> Result<Self> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_count)
            .thread_name(|i| format!("moments-dp-{i}"))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build thread pool: {e}")))?;
        Ok(Self { pool })
    }

    pub fn worker_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    #[inline]
    fn chunk_size(&self, len: usize) -> usize {
        let num_chunks = self.worker_count() * CHUNKS_PER_THREAD;
        (len / num_chunks).max(1)
    }
}

impl Strategy for DataParallelStrategy {
    fn name(&self) -> &'static str {
        "data-parallel"
    }

    fn compute(&self, sample: &[f32]) -> Result<ReductionResult> {
        ensure_non_empty(sample)?;
        let stopwatch = Stopwatch::start();

        let chunk_size = self.chunk_size(sample.len());
        let n = sample.len() as f64;

        let (mean, squared) = self.pool.install(|| {
            let sum: f64 = sample
                .par_chunks(chunk_size)
                .map(|chunk| chunk.iter().map(|&v| v as f64).sum::<f64>())
                .sum();
            let mean = sum / n;

            let squared: f64 = sample
                .par_chunks(chunk_size)
                .map(|chunk| {
                    chunk
                        .iter()
                        .map(|&v| {
                            let diff = v as f64 - mean;
                            diff * diff
                        })
                        .sum::<f64>()
                })
                .sum();
            (mean, squared)
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
