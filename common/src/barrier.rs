//! Counting barrier with a bounded wait.
//!
//! Unlike `std::sync::Barrier`, a waiter gives up after a deadline and any
//! participant can cancel the barrier, releasing every current and future
//! waiter with an error. This turns a peer that never arrives into an error
//! instead of a hang.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BarrierError {
    #[error("barrier timed out after {timeout:?} with {arrived} of {parties} parties arrived")]
    TimedOut {
        arrived: usize,
        parties: usize,
        timeout: Duration,
    },
    #[error("barrier was cancelled")]
    Cancelled,
}

/// Returned to every released waiter; exactly one of them is the leader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierWaitResult {
    is_leader: bool,
}

impl BarrierWaitResult {
    pub fn is_leader(&self) -> bool {
        self.is_leader
    }
}

#[derive(Debug, Default)]
struct State {
    arrived: usize,
    generation: u64,
    cancelled: bool,
}

#[derive(Debug)]
pub struct TimedBarrier {
    parties: usize,
    state: Mutex<State>,
    released: Condvar,
}

impl TimedBarrier {
    pub fn new(parties: usize) -> Self {
        assert!(parties > 0, "TimedBarrier parties must be positive");
        Self {
            parties,
            state: Mutex::new(State::default()),
            released: Condvar::new(),
        }
    }

    /// Blocks until all parties have arrived, the timeout elapses or the
    /// barrier is cancelled.
    ///
    /// A waiter that times out withdraws its arrival and cancels the barrier,
    /// so the remaining waiters fail with [`BarrierError::Cancelled`].
    pub fn wait_timeout(&self, timeout: Duration) -> Result<BarrierWaitResult, BarrierError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        if state.cancelled {
            return Err(BarrierError::Cancelled);
        }

        let generation = state.generation;
        state.arrived += 1;
        if state.arrived == self.parties {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.released.notify_all();
            return Ok(BarrierWaitResult { is_leader: true });
        }

        while state.generation == generation {
            if state.cancelled {
                return Err(BarrierError::Cancelled);
            }
            let timed_out = self.released.wait_until(&mut state, deadline).timed_out();
            if timed_out && state.generation == generation {
                if state.cancelled {
                    return Err(BarrierError::Cancelled);
                }
                let arrived = state.arrived;
                state.arrived -= 1;
                state.cancelled = true;
                self.released.notify_all();
                return Err(BarrierError::TimedOut {
                    arrived,
                    parties: self.parties,
                    timeout,
                });
            }
        }

        Ok(BarrierWaitResult { is_leader: false })
    }

    /// Releases all waiters with [`BarrierError::Cancelled`]. Permanent.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        state.cancelled = true;
        self.released.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    const LONG: Duration = Duration::from_secs(10);

    #[test]
    #[should_panic(expected = "TimedBarrier parties must be positive")]
    fn new_rejects_zero_parties() {
        TimedBarrier::new(0);
    }

    #[test]
    fn single_party_passes_immediately() {
        let barrier = TimedBarrier::new(1);
        let result = barrier.wait_timeout(Duration::from_millis(1)).unwrap();
        assert!(result.is_leader());
    }

    #[test]
    fn releases_all_parties_with_one_leader() {
        let barrier = Arc::new(TimedBarrier::new(4));
        let leaders = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let barrier = barrier.clone();
                let leaders = leaders.clone();
                thread::spawn(move || {
                    let result = barrier.wait_timeout(LONG).expect("barrier should release");
                    if result.is_leader() {
                        leaders.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("waiter should not panic");
        }
        assert_eq!(leaders.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn no_party_passes_before_the_last_arrives() {
        let barrier = Arc::new(TimedBarrier::new(3));
        let passed = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let barrier = barrier.clone();
                let passed = passed.clone();
                thread::spawn(move || {
                    barrier.wait_timeout(LONG).unwrap();
                    passed.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        assert_eq!(passed.load(Ordering::SeqCst), 0, "waiters should be blocked");

        barrier.wait_timeout(LONG).unwrap();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(passed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_party_times_out() {
        let barrier = TimedBarrier::new(2);
        let err = barrier
            .wait_timeout(Duration::from_millis(20))
            .expect_err("second party never arrives");
        assert_eq!(
            err,
            BarrierError::TimedOut {
                arrived: 1,
                parties: 2,
                timeout: Duration::from_millis(20),
            }
        );
        assert!(barrier.is_cancelled());
    }

    #[test]
    fn cancel_wakes_waiters() {
        let barrier = Arc::new(TimedBarrier::new(3));
        let waiter = {
            let barrier = barrier.clone();
            thread::spawn(move || barrier.wait_timeout(LONG))
        };

        thread::sleep(Duration::from_millis(20));
        barrier.cancel();

        let result = waiter.join().unwrap();
        assert_eq!(result, Err(BarrierError::Cancelled));
        assert_eq!(
            barrier.wait_timeout(LONG),
            Err(BarrierError::Cancelled),
            "late arrivals should fail too"
        );
    }

    #[test]
    fn reusable_across_generations() {
        let barrier = Arc::new(TimedBarrier::new(2));
        let peer = {
            let barrier = barrier.clone();
            thread::spawn(move || {
                for _ in 0..3 {
                    barrier.wait_timeout(LONG).unwrap();
                }
            })
        };
        for _ in 0..3 {
            barrier.wait_timeout(LONG).unwrap();
        }
        peer.join().unwrap();
    }

    #[test]
    fn error_messages() {
        let err = BarrierError::TimedOut {
            arrived: 3,
            parties: 8,
            timeout: Duration::from_secs(1),
        };
        let msg = err.to_string();
        assert!(msg.contains("3 of 8"));
        assert_eq!(BarrierError::Cancelled.to_string(), "barrier was cancelled");
    }
}
