//! Static work partitioning for the threaded strategy.

use std::ops::Range;

/// Contiguous index range `[start, stop)` owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub worker: usize,
    pub start: usize,
    pub stop: usize,
}

impl Partition {
    #[inline]
    pub fn len(&self) -> usize {
        self.stop - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.stop
    }
}

/// Splits `[0, len)` into `worker_count` partitions of `len / worker_count`
/// elements; the last partition also takes the remainder.
///
/// # Panics
///
/// Panics if `worker_count` is 0.
pub fn partitions(len: usize, worker_count: usize) -> Vec<Partition> {
    assert!(worker_count > 0, "worker_count must be > 0");

    let chunk_size = len / worker_count;
    (0..worker_count)
        .map(|worker| {
            let start = worker * chunk_size;
            let stop = if worker == worker_count - 1 {
                len
            } else {
                start + chunk_size
            };
            Partition {
                worker,
                start,
                stop,
            }
        })
        .collect()
}
