//! Interchangeable execution strategies for the two-moment reduction.
//!
//! Every strategy computes the mean first and then the standard deviation
//! around that finished mean. They differ only in how the work is spread
//! across threads or vector lanes.

use std::fmt;

use crate::config::ReductionConfig;
use crate::error::{Error, Result};
use crate::result::ReductionResult;

mod concurrent;
mod data_parallel;
mod serial;
pub mod vector;

pub use concurrent::ConcurrentStrategy;
pub use data_parallel::DataParallelStrategy;
pub use serial::SerialStrategy;
pub use vector::VectorStrategy;

/// A way of computing [`ReductionResult`] for a slice of samples.
pub trait Strategy: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn compute(&self, sample: &[f32]) -> Result<ReductionResult>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Single thread, strided traversal.
    Serial,
    /// Worker threads with a lock and a barrier between the two phases.
    Concurrent,
    /// Work-stealing pool running two parallel reductions.
    DataParallel,
    /// 4-wide vector lanes with horizontal reduction.
    Vector,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Serial,
        StrategyKind::Concurrent,
        StrategyKind::DataParallel,
        StrategyKind::Vector,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::Serial => "serial",
            StrategyKind::Concurrent => "threads",
            StrategyKind::DataParallel => "data-parallel",
            StrategyKind::Vector => "simd",
        }
    }

    pub fn build(self, config: &ReductionConfig) -> Result<Box<dyn Strategy>> {
        Ok(match self {
            StrategyKind::Serial => Box::new(SerialStrategy::new(config)?),
            StrategyKind::Concurrent => Box::new(ConcurrentStrategy::new(config)?),
            StrategyKind::DataParallel => Box::new(DataParallelStrategy::new(config)?),
            StrategyKind::Vector => Box::new(VectorStrategy::new(config)?),
        })
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn ensure_non_empty(sample: &[f32]) -> Result<()> {
    if sample.is_empty() {
        return Err(Error::InvalidInputSize {
            len: 0,
            reason: "sample must not be empty",
        });
    }
    Ok(())
}
