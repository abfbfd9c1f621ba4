//! Moments - mean and standard deviation under competing parallel strategies.
//!
//! One two-pass reduction (mean, then deviations from the finished mean) is
//! implemented four ways:
//! - serial, strided by the lane width
//! - worker threads sharing a locked accumulator with a barrier between passes
//! - a data-parallel rayon pool
//! - 4-lane SIMD with horizontal reduction
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use moments::{ArraySource, ReductionConfig, StrategyKind, speed_up};
//!
//! let sample = ArraySource::generate(1 << 20, 100.0, 42)?;
//! let config = ReductionConfig::default();
//!
//! let serial = StrategyKind::Serial.build(&config)?.compute(&sample)?;
//! let threads = StrategyKind::Concurrent.build(&config)?.compute(&sample)?;
//! println!("speed up: {:?}", speed_up(&serial, &threads));
//! ```

mod config;
mod error;
pub mod partition;
mod result;
mod sample;
pub mod strategy;
pub mod timer;

// ============================================================================
// Configuration and errors
// ============================================================================

pub use config::{DEFAULT_MAX_VALUE, DEFAULT_SAMPLE_LEN, ReductionConfig, SampleConfig};
pub use error::{Error, Result};

// ============================================================================
// Input and output
// ============================================================================

pub use partition::{Partition, partitions};
pub use result::{ReductionResult, VarianceDivisor, speed_up};
pub use sample::{ArraySource, Sample};

// ============================================================================
// Strategies
// ============================================================================

pub use strategy::{
    ConcurrentStrategy, DataParallelStrategy, SerialStrategy, Strategy, StrategyKind,
    VectorStrategy,
};
