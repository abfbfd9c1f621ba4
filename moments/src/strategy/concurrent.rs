//! Threaded reduction with a lock-protected accumulator and a phase barrier.
//!
//! Each worker owns one [`Partition`] and walks through three phases:
//!
//! 1. `Summing`: sum the partition, divide by the full sample length and add
//!    the partial mean into the shared accumulator under the lock.
//! 2. `BarrierWait`: block until every worker has contributed. The lock only
//!    serializes additions; the barrier is what guarantees the mean is final
//!    before anyone reads it.
//! 3. `Deviating`: sum squared deviations from the finished mean over the same
//!    partition and add them into the shared variance accumulator.
//!
//! The barrier wait is bounded. A worker that panics cancels the barrier so its
//! peers fail fast. A worker that stalls past the timeout is named in the
//! resulting [`Error::WorkerFailure`].

use std::any::Any;
use std::thread;
use std::time::Duration;

use common::barrier::{BarrierError, TimedBarrier};
use parking_lot::Mutex;

use crate::config::ReductionConfig;
use crate::error::{Error, Result};
use crate::partition::{Partition, partitions};
use crate::result::{ReductionResult, VarianceDivisor};
use crate::strategy::{Strategy, ensure_non_empty};
use crate::timer::Stopwatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Summing,
    BarrierWait,
    Deviating,
}

/// Scalars shared by all workers of one `compute` call.
#[derive(Debug)]
struct SharedAccumulators {
    mean: f64,
    variance: f64,
    /// Workers whose partial mean is already in `mean`.
    contributed: Vec<bool>,
    /// Workers that had not contributed when the first waiter timed out.
    stragglers: Option<Vec<usize>>,
}

impl SharedAccumulators {
    fn new(workers: usize) -> Self {
        Self {
            mean: 0.0,
            variance: 0.0,
            contributed: vec![false; workers],
            stragglers: None,
        }
    }

    fn record_stragglers(&mut self) {
        if self.stragglers.is_none() {
            let missing = self
                .contributed
                .iter()
                .enumerate()
                .filter(|(_, done)| !**done)
                .map(|(worker, _)| worker)
                .collect();
            self.stragglers = Some(missing);
        }
    }

    fn first_straggler(&self) -> Option<usize> {
        self.stragglers.as_ref().and_then(|s| s.first().copied())
    }
}

/// Why a worker did not finish.
#[derive(Debug)]
enum Failure {
    Panicked(String),
    Barrier(BarrierError),
}

impl Failure {
    /// Lower is closer to the root cause. Peers of a failed worker only see a
    /// cancelled barrier.
    fn rank(&self) -> u8 {
        match self {
            Failure::Panicked(_) => 0,
            Failure::Barrier(BarrierError::TimedOut { .. }) => 1,
            Failure::Barrier(BarrierError::Cancelled) => 2,
        }
    }

    /// A timeout is blamed on the first worker that never reached the
    /// barrier, falling back to the waiter that gave up.
    fn into_error(self, worker: usize, straggler: Option<usize>) -> Error {
        match self {
            Failure::Panicked(msg) => Error::WorkerFailure {
                worker,
                reason: format!("panicked: {msg}"),
            },
            Failure::Barrier(err @ BarrierError::TimedOut { .. }) => match straggler {
                Some(straggler) => Error::WorkerFailure {
                    worker: straggler,
                    reason: format!("did not reach the barrier: {err}"),
                },
                None => Error::WorkerFailure {
                    worker,
                    reason: format!("gave up waiting: {err}"),
                },
            },
            Failure::Barrier(err) => Error::WorkerFailure {
                worker,
                reason: err.to_string(),
            },
        }
    }
}

/// Cancels the barrier if the worker unwinds before passing it.
struct CancelOnUnwind<'a>(&'a TimedBarrier);

impl Drop for CancelOnUnwind<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.cancel();
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConcurrentStrategy {
    worker_count: usize,
    barrier_timeout: Duration,
}

impl ConcurrentStrategy {
    pub fn new(config: &ReductionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            worker_count: config.worker_count,
            barrier_timeout: config.barrier_timeout,
        })
    }

    fn run_worker(
        &self,
        values: &[f32],
        part: Partition,
        shared: &Mutex<SharedAccumulators>,
        barrier: &TimedBarrier,
        before_summing: &(dyn Fn(usize) + Sync),
    ) -> std::result::Result<(), BarrierError> {
        let _guard = CancelOnUnwind(barrier);
        let chunk = &values[part.range()];
        let total = values.len() as f64;

        tracing::trace!(worker = part.worker, phase = ?Phase::Summing, "worker phase");
        before_summing(part.worker);
        let partial = chunk.iter().map(|&v| v as f64).sum::<f64>() / total;
        {
            let mut acc = shared.lock();
            acc.mean += partial;
            acc.contributed[part.worker] = true;
        }

        tracing::trace!(worker = part.worker, phase = ?Phase::BarrierWait, "worker phase");
        if let Err(err) = barrier.wait_timeout(self.barrier_timeout) {
            if matches!(err, BarrierError::TimedOut { .. }) {
                shared.lock().record_stragglers();
            }
            return Err(err);
        }

        tracing::trace!(worker = part.worker, phase = ?Phase::Deviating, "worker phase");
        let mean = shared.lock().mean;
        let local: f64 = chunk
            .iter()
            .map(|&v| {
                let diff = v as f64 - mean;
                diff * diff
            })
            .sum();
        shared.lock().variance += local;

        Ok(())
    }

    /// Runs the reduction, calling `before_summing` with the worker index at
    /// the start of each worker.
    fn reduce(
        &self,
        sample: &[f32],
        before_summing: &(dyn Fn(usize) + Sync),
    ) -> Result<ReductionResult> {
        ensure_non_empty(sample)?;
        let stopwatch = Stopwatch::start();

        let parts = partitions(sample.len(), self.worker_count);
        tracing::debug!(
            len = sample.len(),
            workers = parts.len(),
            chunk = parts[0].len(),
            last = parts[parts.len() - 1].len(),
            "partitioned sample"
        );

        let shared = Mutex::new(SharedAccumulators::new(parts.len()));
        let barrier = TimedBarrier::new(parts.len());

        let outcomes: Vec<std::result::Result<(), Failure>> = thread::scope(|scope| {
            let handles: Vec<_> = parts
                .iter()
                .map(|&part| {
                    let shared = &shared;
                    let barrier = &barrier;
                    scope.spawn(move || {
                        self.run_worker(sample, part, shared, barrier, before_summing)
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(outcome) => outcome.map_err(Failure::Barrier),
                    Err(payload) => Err(Failure::Panicked(panic_message(payload.as_ref()))),
                })
                .collect()
        });

        let acc = shared.into_inner();
        let root_cause = outcomes
            .into_iter()
            .enumerate()
            .filter_map(|(worker, outcome)| outcome.err().map(|failure| (worker, failure)))
            .min_by_key(|(_, failure)| failure.rank());
        if let Some((worker, failure)) = root_cause {
            let err = failure.into_error(worker, acc.first_straggler());
            tracing::warn!("threaded reduction aborted: {err}");
            return Err(err);
        }

        let stdev = (acc.variance / VarianceDivisor::Population.divisor(sample.len())).sqrt();

        Ok(ReductionResult {
            mean: acc.mean,
            stdev,
            elapsed: stopwatch.elapsed(),
            divisor: VarianceDivisor::Population,
        })
    }
}

impl Strategy for ConcurrentStrategy {
    fn name(&self) -> &'static str {
        "threads"
    }

    fn compute(&self, sample: &[f32]) -> Result<ReductionResult> {
        self.reduce(sample, &|_: usize| {})
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::ArraySource;
    use crate::strategy::SerialStrategy;

    fn strategy(workers: usize) -> ConcurrentStrategy {
        let config = ReductionConfig::default().with_worker_count(workers);
        ConcurrentStrategy::new(&config).unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        for workers in [1, 2, 4, 8] {
            let result = strategy(workers).compute(&values).unwrap();
            assert!((result.mean - 5.0).abs() < 1e-9, "workers={workers}");
            assert!((result.stdev - 2.0).abs() < 1e-9, "workers={workers}");
        }
    }

    #[test]
    fn test_matches_serial() {
        let sample = ArraySource::generate(1 << 16, 100.0, 21).unwrap();
        let serial = SerialStrategy::new(&ReductionConfig::default())
            .unwrap()
            .compute(&sample)
            .unwrap();
        for workers in [1, 2, 4, 8] {
            let result = strategy(workers).compute(&sample).unwrap();
            assert!(
                ((result.mean - serial.mean) / serial.mean).abs() < 1e-6,
                "workers={workers}: {} vs {}",
                result.mean,
                serial.mean
            );
            assert!(((result.stdev - serial.stdev) / serial.stdev).abs() < 1e-6);
        }
    }

    #[test]
    fn test_remainder_goes_to_last_worker() {
        let values: Vec<f32> = (1..=7).map(|x| x as f32).collect();
        let result = strategy(3).compute(&values).unwrap();
        assert!((result.mean - 4.0).abs() < 1e-9);
        assert!((result.stdev - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_more_workers_than_values() {
        let result = strategy(8).compute(&[3.0]).unwrap();
        assert_eq!(result.mean, 3.0);
        assert_eq!(result.stdev, 0.0);
    }

    #[test]
    fn test_state_does_not_leak_between_calls() {
        let s = strategy(4);
        let first = s.compute(&[1.0, 1.0, 1.0, 1.0]).unwrap();
        let second = s.compute(&[1.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(first.mean, 1.0);
        assert_eq!(second.mean, 1.0);
        assert_eq!(second.stdev, 0.0);
    }

    fn fail_worker(target: usize) -> impl Fn(usize) + Sync {
        move |worker| {
            if worker == target {
                panic!("injected failure in worker {worker}");
            }
        }
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let values = vec![1.0f32; 64];
        let err = strategy(4).reduce(&values, &fail_worker(2)).unwrap_err();
        match err {
            Error::WorkerFailure { worker, reason } => {
                assert_eq!(worker, 2);
                assert!(reason.contains("injected failure"), "reason={reason}");
            }
            other => panic!("expected WorkerFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_worker_panic_does_not_wait_for_timeout() {
        let config = ReductionConfig::default()
            .with_worker_count(4)
            .with_barrier_timeout(Duration::from_secs(60));
        let s = ConcurrentStrategy::new(&config).unwrap();
        let stopwatch = Stopwatch::start();
        assert!(s.reduce(&[1.0f32; 16], &fail_worker(0)).is_err());
        assert!(stopwatch.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_stalled_worker_times_out_and_is_named() {
        let config = ReductionConfig::default()
            .with_worker_count(4)
            .with_barrier_timeout(Duration::from_millis(50));
        let s = ConcurrentStrategy::new(&config).unwrap();
        let stall = |worker: usize| {
            if worker == 1 {
                thread::sleep(Duration::from_millis(300));
            }
        };

        let err = s.reduce(&[1.0f32; 64], &stall).unwrap_err();
        match err {
            Error::WorkerFailure { worker, reason } => {
                assert_eq!(worker, 1);
                assert!(reason.contains("timed out"), "reason={reason}");
                assert!(reason.contains("did not reach the barrier"), "reason={reason}");
            }
            other => panic!("expected WorkerFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_timeout_without_known_straggler_names_waiter() {
        let timed_out = Failure::Barrier(BarrierError::TimedOut {
            arrived: 1,
            parties: 2,
            timeout: Duration::from_millis(1),
        });
        match timed_out.into_error(0, None) {
            Error::WorkerFailure { worker, reason } => {
                assert_eq!(worker, 0);
                assert!(reason.starts_with("gave up waiting"), "reason={reason}");
            }
            other => panic!("expected WorkerFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_stragglers_are_recorded_once() {
        let mut acc = SharedAccumulators::new(3);
        acc.contributed[0] = true;
        acc.record_stragglers();
        acc.contributed[1] = true;
        acc.record_stragglers();
        assert_eq!(acc.stragglers, Some(vec![1, 2]));
        assert_eq!(acc.first_straggler(), Some(1));
    }

    #[test]
    fn test_failure_rank_prefers_root_cause() {
        let panicked = Failure::Panicked("boom".into());
        let timed_out = Failure::Barrier(BarrierError::TimedOut {
            arrived: 1,
            parties: 2,
            timeout: Duration::from_millis(1),
        });
        let cancelled = Failure::Barrier(BarrierError::Cancelled);
        assert!(panicked.rank() < timed_out.rank());
        assert!(timed_out.rank() < cancelled.rank());
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
