//! The bounded local runnable ring (spec §2 item 4, §4).
//!
//! `LocalQueue::new` returns a split pair, the way the teacher's
//! `Ring<T>`/`Producer<T>` and tokio's `Local<T>`/`Steal<T>` both split a
//! ring into an owner-only write side and a many-reader steal side: an
//! [`Owner`] (push, bulk_push, get, steal_from — all owner-only per spec §3)
//! and a [`Stealer`] (grab only, `Clone`, `Send + Sync`, handed to peer
//! worker threads). Splitting at the type level means a peer thread simply
//! has no way to call `push` on a ring it doesn't own — the single-producer
//! invariant is enforced by the compiler, not by a runtime check.

use crate::chain::FiberChain;
use crate::config::Config;
use crate::fiber::Scheduled;
use crate::global::GlobalQueue;
use crate::invariants::{
    assert_half_batch, assert_room_after_steal, debug_assert_bounded_count,
    debug_assert_head_not_past_tail, debug_assert_steal_half,
};
use crate::metrics::Metrics;
use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Shared state behind an [`Owner`]/[`Stealer`] pair. Never exposed
/// directly — all access goes through one of the two handles, which is
/// what enforces spec §3's ownership split.
struct Inner<T: Scheduled, const N: usize> {
    /// Next free slot to be filled. Written only by the owner (spec §3).
    /// Cache-padded separately from `head` so a stealer spinning on `head`
    /// doesn't bounce the cache line backing the producer's `tail`.
    tail: CachePadded<AtomicU32>,
    /// Next slot to be dequeued. Written by the owner (`get`) and by
    /// stealers (`grab`), always via CAS.
    head: CachePadded<AtomicU32>,
    /// Slot `i` holds the fiber at logical index `i mod N`. Slots outside
    /// `[head, tail)` may be stale or never written; they are never read.
    buffer: [UnsafeCell<MaybeUninit<T>>; N],
}

// Safety: all cross-thread access to `buffer` is mediated by the head/tail
// protocol documented on each method below; slots are never aliased.
unsafe impl<T: Scheduled, const N: usize> Send for Inner<T, N> {}
unsafe impl<T: Scheduled, const N: usize> Sync for Inner<T, N> {}

impl<T: Scheduled, const N: usize> Inner<T, N> {
    fn new() -> Self {
        assert!(N > 0, "local queue capacity must be greater than zero");
        Self {
            tail: CachePadded::new(AtomicU32::new(0)),
            head: CachePadded::new(AtomicU32::new(0)),
            // SAFETY: an array of `MaybeUninit` needs no initialization.
            buffer: unsafe { MaybeUninit::uninit().assume_init() },
        }
    }

    #[inline]
    fn index(pos: u32) -> usize {
        (pos as usize) % N
    }

    /// # Safety
    /// The slot at `idx` must not be concurrently read or written by
    /// another thread for the duration of this call.
    #[inline]
    unsafe fn write_slot(&self, idx: usize, val: T) {
        (*self.buffer[idx].get()).write(val);
    }

    /// # Safety
    /// The slot at `idx` must hold a value written by a prior
    /// [`write_slot`](Self::write_slot) that has not yet been logically
    /// removed (i.e. `idx` is still within `[head, tail)`).
    #[inline]
    unsafe fn read_slot(&self, idx: usize) -> T {
        (*self.buffer[idx].get()).assume_init_read()
    }
}

/// The owner-only half of a local runnable ring: `push`, `bulk_push`,
/// `get`, and `steal_from` (spec §3, §4.2-§4.6).
pub struct Owner<T: Scheduled, const N: usize> {
    inner: Arc<Inner<T, N>>,
    /// Back-reference to the shared overflow queue (spec §3's data model
    /// table) — a relation, not ownership: the global queue's lifetime is
    /// governed by the execution context, not by any one worker's ring.
    global: Arc<GlobalQueue<T>>,
    metrics: Metrics,
    /// Carries `enable_metrics`, consulted before every counter update so
    /// the hot path pays nothing when metrics are off.
    config: Config,
}

/// The peer-callable half of a local runnable ring: `grab` only (spec §4.7).
/// `Clone`, `Send`, `Sync` — handed out to every worker that might want to
/// steal from this one.
pub struct Stealer<T: Scheduled, const N: usize> {
    inner: Arc<Inner<T, N>>,
}

impl<T: Scheduled, const N: usize> Clone for Stealer<T, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Creates a new local runnable ring bound to `global` as its overflow
/// queue, returning the owner/stealer split described on [`Owner`] and
/// [`Stealer`]. `config` governs this ring's ambient behaviour (currently
/// just whether metrics are tracked).
pub fn local_queue<T: Scheduled, const N: usize>(
    global: Arc<GlobalQueue<T>>,
    config: Config,
) -> (Owner<T, N>, Stealer<T, N>) {
    let inner = Arc::new(Inner::new());
    (
        Owner {
            inner: Arc::clone(&inner),
            global,
            metrics: Metrics::new(),
            config,
        },
        Stealer { inner },
    )
}

impl<T: Scheduled, const N: usize> Owner<T, N> {
    /// Compile-time ring capacity (spec §6).
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// A `Stealer` handle for peers that want to steal from this ring.
    pub fn stealer(&self) -> Stealer<T, N> {
        Stealer {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Live counters for this ring (pushes, pops, overflow, steal attempts
    /// made *against* this ring's `Stealer` are tracked on the stealing
    /// side, not here).
    pub fn metrics(&self) -> crate::metrics::MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Enqueues `fiber` (spec §4.2). Never blocks on ring contention; may
    /// block briefly on the global queue's mutex if the ring is full.
    pub fn push(&self, fiber: T) {
        loop {
            let head = self.inner.head.load(Ordering::Acquire);
            let tail = self.inner.tail.load(Ordering::Acquire);

            if tail.wrapping_sub(head) < N as u32 {
                let idx = Inner::<T, N>::index(tail);
                // SAFETY: slot `idx` is past the current head, so no
                // stealer can be reading it; we are the sole writer.
                unsafe { self.inner.write_slot(idx, fiber) };
                self.inner.tail.store(tail.wrapping_add(1), Ordering::Release);
                if self.config.enable_metrics {
                    self.metrics.add_push();
                }
                return;
            }

            if self.push_slow(fiber, head, tail) {
                if self.config.enable_metrics {
                    self.metrics.add_push();
                }
                return;
            }
            // A stealer advanced `head` in the meantime; retry the fast path.
        }
    }

    /// Overflow slow path (spec §4.3). Precondition: the ring observed full
    /// at `(head, tail)`. Moves half the ring plus `fiber` to the global
    /// queue in one batch. Returns whether the move committed.
    fn push_slow(&self, fiber: T, head: u32, tail: u32) -> bool {
        debug_assert_eq!(
            tail.wrapping_sub(head) as usize,
            N,
            "push_slow called on a ring that wasn't observed full"
        );

        let n = N / 2;
        let mut scratch = Vec::with_capacity(n);
        for i in 0..n {
            let idx = Inner::<T, N>::index(head.wrapping_add(i as u32));
            // SAFETY: these slots are within [head, tail) and not yet
            // reclaimed; only the owner reads them here.
            scratch.push(unsafe { self.inner.read_slot(idx) });
        }

        let new_head = head.wrapping_add(n as u32);
        if self
            .inner
            .head
            .compare_exchange(head, new_head, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            // A stealer claimed slots concurrently; the fast path may now succeed.
            return false;
        }

        assert_half_batch!(scratch.len(), N);

        let mut chain = FiberChain::new();
        for f in scratch {
            chain.push_back(f);
        }
        chain.push_back(fiber);

        if self.config.enable_metrics {
            self.metrics.add_overflow((n + 1) as u64);
        }
        self.global.push(chain, n + 1);
        true
    }

    /// Transfers fibers from `chain` into the ring, spilling any remainder
    /// to the global queue (spec §4.4).
    pub fn bulk_push(&self, mut chain: FiberChain<T>) {
        let tail0 = self.inner.tail.load(Ordering::Acquire);
        let head = self.inner.head.load(Ordering::Relaxed);

        let mut tail = tail0;
        while !chain.is_empty() && tail.wrapping_sub(head) < N as u32 {
            // unwrap: loop guard just checked `!chain.is_empty()`.
            let fiber = chain.pop_front().unwrap();
            let idx = Inner::<T, N>::index(tail);
            // SAFETY: tail.wrapping_sub(head) < N guarantees this slot is
            // free, and only the owner writes it.
            unsafe { self.inner.write_slot(idx, fiber) };
            tail = tail.wrapping_add(1);
        }

        debug_assert_bounded_count!(tail.wrapping_sub(head) as usize, N);
        self.inner.tail.store(tail, Ordering::Release);

        let moved = tail.wrapping_sub(tail0) as u64;
        if moved > 0 && self.config.enable_metrics {
            self.metrics.add_push();
        }

        let remaining = chain.len();
        if remaining > 0 {
            if self.config.enable_metrics {
                self.metrics.add_overflow(remaining as u64);
            }
            self.global.push(chain, remaining);
        }
    }

    /// Dequeues one fiber from the head of the ring (spec §4.5), or `None`
    /// if it is currently empty.
    pub fn get(&self) -> Option<T> {
        let mut head = self.inner.head.load(Ordering::Acquire);
        loop {
            let tail = self.inner.tail.load(Ordering::Relaxed);
            if tail == head {
                return None;
            }

            let idx = Inner::<T, N>::index(head);
            // SAFETY: tail != head means this slot is within [head, tail);
            // the CAS below certifies no peer claimed it in the interim.
            let candidate = unsafe { self.inner.read_slot(idx) };

            match self.inner.head.compare_exchange(
                head,
                head.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    if self.config.enable_metrics {
                        self.metrics.add_local_pop();
                    }
                    return Some(candidate);
                }
                Err(actual) => {
                    debug_assert_head_not_past_tail!(actual, tail);
                    head = actual;
                }
            }
        }
    }

    /// Steals up to half of `src`'s fibers into this (empty) ring,
    /// returning one of them directly (spec §4.6).
    ///
    /// # Panics
    /// In debug builds, panics if this ring is not currently empty — that
    /// is a caller contract breach, not a recoverable outcome (spec §7).
    pub fn steal_from(&self, src: &Stealer<T, N>) -> Option<T> {
        debug_assert!(
            self.inner.head.load(Ordering::Relaxed) == self.inner.tail.load(Ordering::Relaxed),
            "steal_from called on a non-empty destination ring"
        );

        if self.config.enable_metrics {
            self.metrics.add_steal_attempt();
        }

        let dst_tail = self.inner.tail.load(Ordering::Acquire);
        let mut n = src.grab(&self.inner, dst_tail);
        if n == 0 {
            return None;
        }

        let last_idx = Inner::<T, N>::index(dst_tail.wrapping_add(n as u32 - 1));
        // SAFETY: `grab` just wrote `n` fresh slots starting at `dst_tail`;
        // we are the sole reader/writer of our own buffer.
        let fiber = unsafe { self.inner.read_slot(last_idx) };
        n -= 1;

        if n > 0 {
            // Recompute the post-steal live count from `self`'s *actual*
            // head, not from `n` in isolation — `n` alone is always <= N/2
            // by construction of `grab` (§4.7), so checking it alone can
            // never catch the caller contract breach §7 describes
            // (stealing into a ring that wasn't really empty). This is the
            // unconditional, always-enforced assertion spec §4.6 step 6
            // and §7 call for, not a `debug_assert!`.
            let head = self.inner.head.load(Ordering::Acquire);
            let live_after_steal = dst_tail.wrapping_sub(head).wrapping_add(n as u32);
            assert_room_after_steal!(live_after_steal, N);
            self.inner
                .tail
                .store(dst_tail.wrapping_add(n as u32), Ordering::Release);
        }
        // else: exactly one fiber stolen; the ring stays empty to external observers.

        if self.config.enable_metrics {
            self.metrics.add_steal_success((n + 1) as u64);
        }
        Some(fiber)
    }
}

impl<T: Scheduled, const N: usize> Stealer<T, N> {
    /// Compile-time ring capacity (spec §6).
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns true if the victim currently looks stealable. Advisory only
    /// (spec §9 Open Question) — a concurrent steal or push can change the
    /// answer before the caller acts on it.
    pub fn is_stealable(&self) -> bool {
        let head = self.inner.head.load(Ordering::Acquire);
        let tail = self.inner.tail.load(Ordering::Acquire);
        head != tail
    }

    /// Claims up to half of this ring's fibers into `dst`, starting at
    /// `dst_tail` (spec §4.7). Returns the number of fibers copied.
    ///
    /// `dst` must be a ring the caller exclusively owns the tail side of
    /// for the duration of this call — guaranteed by
    /// [`Owner::steal_from`], the only caller.
    fn grab<const M: usize>(&self, dst: &Inner<T, M>, dst_tail: u32) -> usize {
        loop {
            let head = self.inner.head.load(Ordering::Acquire);
            let tail = self.inner.tail.load(Ordering::Acquire);

            let n = (tail.wrapping_sub(head) / 2) as usize;
            if n == 0 {
                return 0;
            }
            if n > N / 2 {
                // head/tail observed torn across a concurrent owner advance; retry.
                continue;
            }

            for i in 0..n {
                let src_idx = Inner::<T, N>::index(head.wrapping_add(i as u32));
                let dst_idx = Inner::<T, M>::index(dst_tail.wrapping_add(i as u32));
                // SAFETY: [head, head+n) is within the victim's live range
                // at the moment of the loads above; the CAS below certifies
                // no other stealer raced us for the same slots. `dst_idx`
                // is free because the caller guarantees exclusive access.
                let val = unsafe { self.inner.read_slot(src_idx) };
                unsafe { dst.write_slot(dst_idx, val) };
            }

            let new_head = head.wrapping_add(n as u32);
            match self.inner.head.compare_exchange(
                head,
                new_head,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    debug_assert_steal_half!(n, N);
                    return n;
                }
                Err(_) => continue, // lost the race; copied data discarded, retry
            }
        }
    }
}
