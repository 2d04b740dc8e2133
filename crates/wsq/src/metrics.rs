//! Optional counters for monitoring scheduler queue behavior.
//!
//! Mirrors the teacher's `Metrics`/`MetricsSnapshot` split: a live,
//! atomics-backed accumulator (`Metrics`) that callers update in the hot
//! path, and a plain-data snapshot (`MetricsSnapshot`) safe to hand to a
//! reporting layer. Updates are unconditional here (cheap relaxed
//! fetch-adds); [`Config::enable_metrics`](crate::config::Config) is
//! consulted by the scheduler façade to decide whether to call these
//! methods at all, the same "only if enabled" guard the teacher uses.

use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for a [`LocalQueue`](crate::ring::LocalQueue) or
/// [`GlobalQueue`](crate::global::GlobalQueue).
#[derive(Default)]
pub struct Metrics {
    pushes: AtomicU64,
    local_pops: AtomicU64,
    overflow_batches: AtomicU64,
    overflow_fibers: AtomicU64,
    steal_attempts: AtomicU64,
    steal_successes: AtomicU64,
    fibers_stolen: AtomicU64,
    global_pushes: AtomicU64,
    global_pops: AtomicU64,
}

impl Metrics {
    /// Creates a zeroed counter set.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn add_push(&self) {
        self.pushes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_local_pop(&self) {
        self.local_pops.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_overflow(&self, fibers: u64) {
        self.overflow_batches.fetch_add(1, Ordering::Relaxed);
        self.overflow_fibers.fetch_add(fibers, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_steal_attempt(&self) {
        self.steal_attempts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_steal_success(&self, fibers: u64) {
        self.steal_successes.fetch_add(1, Ordering::Relaxed);
        self.fibers_stolen.fetch_add(fibers, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_global_pushes(&self, n: u64) {
        self.global_pushes.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_global_pops(&self, n: u64) {
        self.global_pops.fetch_add(n, Ordering::Relaxed);
    }

    /// Takes a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pushes: self.pushes.load(Ordering::Relaxed),
            local_pops: self.local_pops.load(Ordering::Relaxed),
            overflow_batches: self.overflow_batches.load(Ordering::Relaxed),
            overflow_fibers: self.overflow_fibers.load(Ordering::Relaxed),
            steal_attempts: self.steal_attempts.load(Ordering::Relaxed),
            steal_successes: self.steal_successes.load(Ordering::Relaxed),
            fibers_stolen: self.fibers_stolen.load(Ordering::Relaxed),
            global_pushes: self.global_pushes.load(Ordering::Relaxed),
            global_pops: self.global_pops.load(Ordering::Relaxed),
        }
    }
}

/// A plain-data snapshot of [`Metrics`], cheap to clone and log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub pushes: u64,
    pub local_pops: u64,
    pub overflow_batches: u64,
    pub overflow_fibers: u64,
    pub steal_attempts: u64,
    pub steal_successes: u64,
    pub fibers_stolen: u64,
    pub global_pushes: u64,
    pub global_pops: u64,
}
