//! The shared overflow queue (spec §6 "To the global overflow queue").
//!
//! An unbounded, mutex-protected FIFO of fibers. The ring treats it purely
//! as a blocking service: `push` never fails and blocks only on its own
//! mutex; it is the landing spot for an [`Owner`](crate::ring::Owner)'s
//! overflow batches (§4.3), the tail of a `bulk_push` that didn't fully fit
//! (§4.4), and the source `pop_batch` drains into an idle worker's ring.

use crate::backoff::Backoff;
use crate::chain::FiberChain;
use crate::fiber::Scheduled;
use crate::metrics::Metrics;
use std::sync::{Mutex, TryLockError};

/// Mutex-protected unbounded FIFO of fibers, used for cross-worker
/// hand-off and as the landing spot for local-ring overflow.
///
/// Internally just another intrusive chain — the same `FiberChain` the
/// rings use to build overflow batches — so linking a pushed batch onto the
/// existing tail is O(1) regardless of batch size.
pub struct GlobalQueue<T: Scheduled> {
    chain: Mutex<FiberChain<T>>,
    metrics: Metrics,
}

impl<T: Scheduled> GlobalQueue<T> {
    /// Creates a new, empty global queue.
    pub fn new() -> Self {
        Self {
            chain: Mutex::new(FiberChain::new()),
            metrics: Metrics::new(),
        }
    }

    /// Appends `chain` (`count` fibers) to the tail of the global queue.
    ///
    /// Blocks on the internal mutex; never fails. `count` must equal
    /// `chain.len()` — the caller already knows it, having just built or
    /// drained the chain, so it is taken as a plain parameter rather than
    /// recomputed.
    pub fn push(&self, chain: FiberChain<T>, count: usize) {
        debug_assert_eq!(chain.len(), count);
        if count == 0 {
            return;
        }
        let mut guard = self.lock();
        guard.append(chain);
        self.metrics.add_global_pushes(count as u64);
    }

    /// Pops up to `max` fibers off the front of the global queue.
    ///
    /// Returns the drained fibers as a chain (possibly shorter than `max`,
    /// possibly empty) together with its length, ready to be handed to
    /// [`Owner::bulk_push`](crate::ring::Owner::bulk_push) by the
    /// scheduler façade — the ring itself never calls this (§6).
    pub fn pop_batch(&self, max: usize) -> (FiberChain<T>, usize) {
        if max == 0 {
            return (FiberChain::new(), 0);
        }
        let mut guard = self.lock();
        let mut out = FiberChain::new();
        let mut n = 0;
        while n < max {
            match guard.pop_front() {
                Some(fiber) => {
                    out.push_back(fiber);
                    n += 1;
                }
                None => break,
            }
        }
        drop(guard);
        if n > 0 {
            self.metrics.add_global_pops(n as u64);
        }
        (out, n)
    }

    /// Number of fibers currently queued globally. Racy the instant it
    /// returns — advisory only, as spec §9's Open Question notes for any
    /// such predicate.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Acquires the chain mutex, spinning through a [`Backoff`] on
    /// contention before falling back to a blocking `lock()` once the
    /// backoff gives up. Poisoning is treated as a non-issue — the guarded
    /// state is a plain linked list with no invariant a panicking holder
    /// could have left broken.
    fn lock(&self) -> std::sync::MutexGuard<'_, FiberChain<T>> {
        let mut backoff = Backoff::new();
        loop {
            match self.chain.try_lock() {
                Ok(guard) => return guard,
                Err(TryLockError::Poisoned(poisoned)) => return poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => {
                    if backoff.is_completed() {
                        return self.chain.lock().unwrap_or_else(|e| e.into_inner());
                    }
                    backoff.snooze();
                }
            }
        }
    }

    /// True if the global queue currently holds no fibers. Advisory (see [`Self::len`]).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of this queue's push/pop counters.
    pub fn metrics(&self) -> crate::metrics::MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl<T: Scheduled> Default for GlobalQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_utils::atomic::AtomicCell;

    #[derive(Clone, Copy)]
    struct TestFiber(&'static AtomicCell<Option<TestFiber>>, u64);

    impl Scheduled for TestFiber {
        fn sched_link(&self) -> &AtomicCell<Option<TestFiber>> {
            self.0
        }
    }

    fn fiber(id: u64) -> TestFiber {
        TestFiber(Box::leak(Box::new(AtomicCell::new(None))), id)
    }

    #[test]
    fn push_then_pop_preserves_order() {
        let q = GlobalQueue::new();
        let mut chain = FiberChain::new();
        for id in 0..4 {
            chain.push_back(fiber(id));
        }
        q.push(chain, 4);
        assert_eq!(q.len(), 4);

        let (batch, n) = q.pop_batch(10);
        assert_eq!(n, 4);
        let ids: Vec<u64> = batch.map(|f| f.1).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert!(q.is_empty());
    }

    #[test]
    fn pop_batch_respects_max() {
        let q = GlobalQueue::new();
        let mut chain = FiberChain::new();
        for id in 0..10 {
            chain.push_back(fiber(id));
        }
        q.push(chain, 10);

        let (batch, n) = q.pop_batch(3);
        assert_eq!(n, 3);
        assert_eq!(batch.len(), 3);
        assert_eq!(q.len(), 7);
    }

    #[test]
    fn successive_pushes_append_in_order() {
        let q = GlobalQueue::new();
        let mut first = FiberChain::new();
        first.push_back(fiber(1));
        first.push_back(fiber(2));
        q.push(first, 2);

        let mut second = FiberChain::new();
        second.push_back(fiber(3));
        q.push(second, 1);

        let (batch, n) = q.pop_batch(10);
        assert_eq!(n, 3);
        let ids: Vec<u64> = batch.map(|f| f.1).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
