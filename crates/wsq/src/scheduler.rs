//! The thin scheduler façade (§2 item 5, §6).
//!
//! Everything beyond picking a fiber to run next — fiber creation, stacks,
//! context switching, thread-local "current scheduler" discovery — is out of
//! scope (§1 Non-goals) and lives in the caller's execution context. This
//! façade owns exactly one worker's local ring plus handles to its peers'
//! stealers and the shared global queue, and implements the local → global →
//! steal search order named in §6.

use crate::backoff::Backoff;
use crate::config::Config;
use crate::error::SchedulerError;
use crate::fiber::Scheduled;
use crate::global::GlobalQueue;
use crate::ring::{local_queue, Owner, Stealer};
use std::sync::Arc;

/// One worker's view of the scheduling fabric: its own local ring, handles
/// to every peer's stealer, and the shared overflow queue.
pub struct Scheduler<T: Scheduled, const N: usize> {
    local: Owner<T, N>,
    peers: Vec<Stealer<T, N>>,
    global: Arc<GlobalQueue<T>>,
    config: Config,
}

impl<T: Scheduled, const N: usize> Scheduler<T, N> {
    /// Builds the full set of per-worker schedulers for a pool of `workers`
    /// threads sharing one global queue, each with stealer handles to every
    /// other worker's ring.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::NoWorkers`] if `workers` is `0`.
    pub fn pool(workers: usize, config: Config) -> Result<Vec<Self>, SchedulerError> {
        if workers == 0 {
            return Err(SchedulerError::NoWorkers);
        }

        let global = Arc::new(GlobalQueue::new());
        let mut owners = Vec::with_capacity(workers);
        let mut stealers = Vec::with_capacity(workers);
        for _ in 0..workers {
            let (owner, stealer) = local_queue(Arc::clone(&global), config);
            owners.push(owner);
            stealers.push(stealer);
        }

        Ok(owners
            .into_iter()
            .enumerate()
            .map(|(i, local)| {
                let peers = stealers
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, s)| s.clone())
                    .collect();
                Self {
                    local,
                    peers,
                    global: Arc::clone(&global),
                    config,
                }
            })
            .collect())
    }

    /// Ring capacity (§6).
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of peers this scheduler may steal from.
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Enqueues `fiber` onto this worker's local ring (§4.2), spilling to
    /// the global queue per §4.3 if the ring is observed full. Never fails.
    pub fn enqueue(&self, fiber: T) {
        self.local.push(fiber);
    }

    /// Picks the next fiber to run, in the standard work-stealing search
    /// order: local ring, then a batch refill from the global queue, then
    /// one steal attempt against each configured peer in turn.
    ///
    /// Returns `None` only if the local ring, the global queue, and every
    /// peer were all empty at the moment they were checked.
    pub fn next(&self) -> Option<T> {
        if let Some(fiber) = self.local.get() {
            return Some(fiber);
        }

        let (batch, n) = self.global.pop_batch(self.config.global_batch);
        if n > 0 {
            self.local.bulk_push(batch);
            if let Some(fiber) = self.local.get() {
                return Some(fiber);
            }
        }

        if self.peers.is_empty() {
            return None;
        }

        // One pass over every peer is a single round; a failed round backs
        // off once before the next round rather than spinning hot on each
        // peer in turn (peers that are momentarily empty shouldn't be
        // retried immediately within the same `next()` call).
        let mut backoff = Backoff::new();
        loop {
            for peer in &self.peers {
                if let Some(fiber) = self.local.steal_from(peer) {
                    return Some(fiber);
                }
            }
            if backoff.is_completed() {
                return None;
            }
            backoff.snooze();
        }
    }

    /// Steals from the peer at `index` specifically, bypassing the usual
    /// local → global → steal search order. Exposed for schedulers that
    /// want to target a particular victim (e.g. the busiest peer).
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::NoSuchPeer`] if `index` is out of range.
    pub fn steal_from_peer(&self, index: usize) -> Result<Option<T>, SchedulerError> {
        let peer = self
            .peers
            .get(index)
            .ok_or(SchedulerError::NoSuchPeer {
                index,
                workers: self.peers.len() + 1,
            })?;
        Ok(self.local.steal_from(peer))
    }

    /// A stealer handle for this worker's ring, for external pool wiring.
    pub fn stealer(&self) -> Stealer<T, N> {
        self.local.stealer()
    }

    /// Live counters for this worker's ring, if
    /// [`Config::enable_metrics`] is set.
    pub fn metrics(&self) -> Option<crate::metrics::MetricsSnapshot> {
        self.config.enable_metrics.then(|| self.local.metrics())
    }
}
